use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

pub(crate) const MAX_TEXT_LENGTH: usize = 63;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn try_new(title: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        check_text("title", title.into()).map(Self)
    }
}

/// Non-blank and at most 63 characters, the width of the catalog columns.
pub(crate) fn check_text(field: &str, value: String) -> error_stack::Result<String, KernelError> {
    if value.trim().is_empty() {
        return Err(Report::new(KernelError::InvalidArgument)
            .attach_printable(format!("{field} must not be blank")));
    }
    let length = value.chars().count();
    if length > MAX_TEXT_LENGTH {
        return Err(Report::new(KernelError::InvalidArgument).attach_printable(format!(
            "{field} is {length} characters long, at most {MAX_TEXT_LENGTH} allowed"
        )));
    }
    Ok(value)
}
