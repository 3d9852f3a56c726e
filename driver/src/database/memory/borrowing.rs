use std::cmp::Reverse;

use error_stack::Report;

use kernel::interface::query::BorrowingQuery;
use kernel::interface::update::BorrowingModifier;
use kernel::prelude::entity::{ActualReturnDate, Borrowing, BorrowingFilter, BorrowingId};
use kernel::KernelError;

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryBorrowingRepository;

#[async_trait::async_trait]
impl BorrowingQuery for InMemoryBorrowingRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowingId,
    ) -> error_stack::Result<Option<Borrowing>, KernelError> {
        Ok(con.state().borrowings.get(id).cloned())
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
        filter: &BorrowingFilter,
    ) -> error_stack::Result<Vec<Borrowing>, KernelError> {
        let mut found = con
            .state()
            .borrowings
            .values()
            .filter(|borrowing| filter.matches(borrowing))
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by_key(|borrowing| Reverse((*borrowing.borrow_date(), *borrowing.id())));
        Ok(found)
    }
}

#[async_trait::async_trait]
impl BorrowingModifier for InMemoryBorrowingRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        borrowing: &Borrowing,
    ) -> error_stack::Result<(), KernelError> {
        let state = con.state_mut();
        if !state.books.contains_key(borrowing.book_id()) {
            return Err(Report::new(KernelError::Internal).attach_printable(format!(
                "Borrowing references unknown book {:?}",
                borrowing.book_id()
            )));
        }
        state.borrowings.insert(*borrowing.id(), borrowing.clone());
        Ok(())
    }

    async fn mark_returned(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowingId,
        returned_on: &ActualReturnDate,
    ) -> error_stack::Result<bool, KernelError> {
        let Some(borrowing) = con.state_mut().borrowings.get_mut(id) else {
            return Ok(false);
        };
        Ok(borrowing.mark_returned(*returned_on).is_ok())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowingId,
    ) -> error_stack::Result<(), KernelError> {
        con.state_mut().borrowings.remove(id);
        Ok(())
    }
}
