use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vodca::{AsRefln, Fromln};

#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize, Fromln, AsRefln,
)]
pub struct BorrowingId(Uuid);

impl BorrowingId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}
