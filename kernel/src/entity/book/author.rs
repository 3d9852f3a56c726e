use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::book::title::check_text;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookAuthor(String);

impl BookAuthor {
    pub fn new(author: impl Into<String>) -> Self {
        Self(author.into())
    }

    pub fn try_new(author: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        check_text("author", author.into()).map(Self)
    }
}
