mod book;
mod borrowing;

pub use self::{book::*, borrowing::*};

#[cfg(test)]
pub(crate) mod testing;
