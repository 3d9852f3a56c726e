use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ActualReturnDate(Date);

impl ActualReturnDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }

    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }
}
