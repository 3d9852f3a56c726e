use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vodca::{AsRefln, Fromln};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Fromln, AsRefln, Serialize, Deserialize,
)]
pub struct BorrowDate(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl BorrowDate {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }

    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }
}
