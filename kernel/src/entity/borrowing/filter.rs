use error_stack::Report;

use crate::entity::{Borrowing, IsActive, UserId};
use crate::KernelError;

/// Parsed form of the `is_active` query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveFilter(bool);

impl ActiveFilter {
    pub fn parse(token: &str) -> error_stack::Result<Self, KernelError> {
        if token.eq_ignore_ascii_case("true") {
            Ok(Self(true))
        } else if token.eq_ignore_ascii_case("false") {
            Ok(Self(false))
        } else {
            Err(Report::new(KernelError::InvalidFilter)
                .attach_printable(format!("Unexpected is_active token: {token}")))
        }
    }
}

impl From<ActiveFilter> for IsActive {
    fn from(value: ActiveFilter) -> Self {
        IsActive::new(value.0)
    }
}

/// Selection criteria for listing borrowings.
///
/// `owner` is the visibility scope forced on non-staff actors, `user_id` the filter the caller
/// asked for. Both apply at once, so a member asking for someone else gets nothing back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowingFilter {
    owner: Option<UserId>,
    user_id: Option<UserId>,
    is_active: Option<IsActive>,
}

impl BorrowingFilter {
    pub fn new(owner: Option<UserId>, user_id: Option<UserId>, is_active: Option<IsActive>) -> Self {
        Self {
            owner,
            user_id,
            is_active,
        }
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn is_active(&self) -> Option<&IsActive> {
        self.is_active.as_ref()
    }

    pub fn matches(&self, borrowing: &Borrowing) -> bool {
        self.owner.map_or(true, |owner| borrowing.is_owned_by(&owner))
            && self.user_id.map_or(true, |user| borrowing.is_owned_by(&user))
            && self
                .is_active
                .map_or(true, |active| borrowing.is_active() == &active)
    }
}
