mod book;
mod borrowing;

pub use self::{book::*, borrowing::*};
