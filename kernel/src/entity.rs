mod actor;
mod book;
mod borrowing;
mod common;
mod user;

pub use self::{actor::*, book::*, borrowing::*, common::*, user::*};
