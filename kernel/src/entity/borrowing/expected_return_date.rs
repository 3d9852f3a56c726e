use error_stack::Report;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;
use vodca::{AsRefln, Fromln};

use crate::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ExpectedReturnDate(Date);

impl ExpectedReturnDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }

    /// Parses an ISO `YYYY-MM-DD` date.
    pub fn parse(input: &str) -> error_stack::Result<Self, KernelError> {
        Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(|error| {
                Report::new(error)
                    .change_context(KernelError::InvalidArgument)
                    .attach_printable(format!("Invalid expected_return_date: {input}"))
            })
    }

    /// A borrowing cannot be due before the day it is taken out.
    pub fn ensure_not_before(&self, today: Date) -> error_stack::Result<(), KernelError> {
        if self.0 < today {
            return Err(Report::new(KernelError::InvalidArgument).attach_printable(format!(
                "expected_return_date {} is before {}",
                self.0, today
            )));
        }
        Ok(())
    }
}
