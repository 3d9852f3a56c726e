use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

/// Number of copies currently on the shelf. Never negative.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookInventory(i32);

impl BookInventory {
    pub fn new(inventory: impl Into<i32>) -> Self {
        Self(inventory.into())
    }

    pub fn try_new(inventory: impl Into<i32>) -> error_stack::Result<Self, KernelError> {
        let inventory = inventory.into();
        if inventory < 0 {
            return Err(Report::new(KernelError::InvalidArgument)
                .attach_printable(format!("Inventory must not be negative: {inventory}")));
        }
        Ok(Self(inventory))
    }

    pub fn is_available(&self) -> bool {
        self.0 >= 1
    }

    /// `None` when no copy is left to hand out.
    pub fn taken(&self) -> Option<Self> {
        self.is_available().then(|| Self(self.0 - 1))
    }

    /// Saturates at `i32::MAX`.
    pub fn restored(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}
