use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    Unauthenticated,
    Forbidden,
    NotFound,
    InventoryExhausted,
    AlreadyReturned,
    InvalidFilter,
    InvalidArgument,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Unauthenticated => {
                write!(f, "Authentication credentials were not provided")
            }
            KernelError::Forbidden => {
                write!(f, "You do not have permission to perform this action")
            }
            KernelError::NotFound => write!(f, "Not found"),
            KernelError::InventoryExhausted => write!(f, "No inventory available for this book."),
            KernelError::AlreadyReturned => write!(f, "This borrowing is already returned"),
            KernelError::InvalidFilter => write!(f, "'is_active' must be 'true' or 'false'"),
            KernelError::InvalidArgument => write!(f, "Invalid argument"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
