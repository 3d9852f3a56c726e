mod book;
mod borrowing;

pub use self::{book::*, borrowing::*};

/// Service output that should be answered with `201 Created`.
pub struct Created<T>(pub T);
