use error_stack::Report;
use vodca::References;

use crate::entity::{Borrowing, UserId};
use crate::KernelError;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Role {
    Member,
    Staff,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Eq, PartialEq, References)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn member(id: UserId) -> Self {
        Self::new(id, Role::Member)
    }

    pub fn staff(id: UserId) -> Self {
        Self::new(id, Role::Staff)
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Staff see every borrowing, members only their own.
    pub fn can_access(&self, borrowing: &Borrowing) -> bool {
        self.is_staff() || borrowing.is_owned_by(&self.id)
    }
}

/// Identity and capabilities attached to a single request.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RequestContext {
    actor: Option<Actor>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { actor: None }
    }

    pub fn authenticated(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn require_authenticated(&self) -> error_stack::Result<&Actor, KernelError> {
        self.actor.as_ref().ok_or_else(|| {
            Report::new(KernelError::Unauthenticated)
                .attach_printable("Operation requires an authenticated actor")
        })
    }

    pub fn require_staff(&self) -> error_stack::Result<&Actor, KernelError> {
        let actor = self.require_authenticated()?;
        if !actor.is_staff() {
            return Err(Report::new(KernelError::Forbidden)
                .attach_printable(format!("User {:?} is not staff", actor.id())));
        }
        Ok(actor)
    }
}
