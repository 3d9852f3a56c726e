mod actual_return_date;
mod borrow_date;
mod expected_return_date;
mod filter;
mod id;
mod is_active;

pub use self::{
    actual_return_date::*, borrow_date::*, expected_return_date::*, filter::*, id::*,
    is_active::*,
};
use destructure::{Destructure, Mutation};
use error_stack::Report;
use vodca::References;

use crate::entity::{BookId, UserId};
use crate::KernelError;

/// A loan of one copy of a book to one user.
///
/// A borrowing starts active and is returned at most once. `actual_return_date` is set
/// exactly when `is_active` is false.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Borrowing {
    id: BorrowingId,
    book_id: BookId,
    user_id: UserId,
    borrow_date: BorrowDate,
    expected_return_date: ExpectedReturnDate,
    actual_return_date: Option<ActualReturnDate>,
    is_active: IsActive,
}

impl Borrowing {
    pub fn new(
        id: BorrowingId,
        book_id: BookId,
        user_id: UserId,
        borrow_date: BorrowDate,
        expected_return_date: ExpectedReturnDate,
        actual_return_date: Option<ActualReturnDate>,
        is_active: IsActive,
    ) -> Self {
        Self {
            id,
            book_id,
            user_id,
            borrow_date,
            expected_return_date,
            actual_return_date,
            is_active,
        }
    }

    pub fn borrow(
        id: BorrowingId,
        book_id: BookId,
        user_id: UserId,
        borrow_date: BorrowDate,
        expected_return_date: ExpectedReturnDate,
    ) -> Self {
        Self::new(
            id,
            book_id,
            user_id,
            borrow_date,
            expected_return_date,
            None,
            IsActive::new(true),
        )
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn is_returned(&self) -> bool {
        !*self.is_active.as_ref()
    }

    pub fn mark_returned(
        &mut self,
        returned_on: ActualReturnDate,
    ) -> error_stack::Result<(), KernelError> {
        if self.is_returned() {
            return Err(Report::new(KernelError::AlreadyReturned)
                .attach_printable(format!("Borrowing {:?} is already returned", self.id)));
        }
        self.substitute(|borrowing| {
            *borrowing.is_active = IsActive::new(false);
            *borrowing.actual_return_date = Some(returned_on);
        });
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::macros::{date, datetime};
    use uuid::Uuid;

    use crate::entity::{
        ActualReturnDate, BookId, BorrowDate, Borrowing, BorrowingId, ExpectedReturnDate, UserId,
    };
    use crate::KernelError;

    fn active() -> Borrowing {
        Borrowing::borrow(
            BorrowingId::new(Uuid::new_v4()),
            BookId::new(Uuid::new_v4()),
            UserId::new(Uuid::new_v4()),
            BorrowDate::new(datetime!(2024-03-01 10:00 UTC)),
            ExpectedReturnDate::new(date!(2024 - 03 - 10)),
        )
    }

    #[test]
    fn borrow_starts_active() {
        let borrowing = active();
        assert!(!borrowing.is_returned());
        assert!(borrowing.actual_return_date().is_none());
    }

    #[test]
    fn return_happens_once() {
        let mut borrowing = active();
        borrowing
            .mark_returned(ActualReturnDate::new(date!(2024 - 03 - 05)))
            .unwrap();
        assert!(borrowing.is_returned());
        assert_eq!(
            borrowing.actual_return_date(),
            &Some(ActualReturnDate::new(date!(2024 - 03 - 05)))
        );

        let report = borrowing
            .mark_returned(ActualReturnDate::new(date!(2024 - 03 - 06)))
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::AlreadyReturned);
        assert_eq!(
            borrowing.actual_return_date(),
            &Some(ActualReturnDate::new(date!(2024 - 03 - 05)))
        );
    }
}
