use error_stack::Report;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

const FEE_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct DailyFee(Decimal);

impl DailyFee {
    pub fn new(fee: impl Into<Decimal>) -> Self {
        Self(fee.into())
    }

    /// Accepts `0.01..=9999.99` with at most two decimal places.
    pub fn try_new(fee: impl Into<Decimal>) -> error_stack::Result<Self, KernelError> {
        let fee = fee.into();
        let min = Decimal::new(1, FEE_SCALE);
        let max = Decimal::new(999_999, FEE_SCALE);
        if fee < min || fee > max {
            return Err(Report::new(KernelError::InvalidArgument)
                .attach_printable(format!("Daily fee must be between {min} and {max}: {fee}")));
        }
        if fee.normalize().scale() > FEE_SCALE {
            return Err(Report::new(KernelError::InvalidArgument).attach_printable(format!(
                "Daily fee has more than {FEE_SCALE} decimal places: {fee}"
            )));
        }
        Ok(Self(fee))
    }
}
