use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{Book, BookId, Borrowing, BorrowingId};
use kernel::KernelError;

pub use self::{book::*, borrowing::*};

mod book;
mod borrowing;

#[derive(Debug, Clone, Default)]
pub(in crate::database) struct MemoryState {
    books: HashMap<BookId, Book>,
    borrowings: HashMap<BorrowingId, Borrowing>,
}

/// Process-local store with serializable transactions.
///
/// A transaction owns the store lock for its whole lifetime and works on a staged copy, so
/// concurrent transactions run one after another and an uncommitted one leaves no trace.
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTransaction { guard, staged })
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

impl InMemoryTransaction {
    pub(in crate::database) fn state(&self) -> &MemoryState {
        &self.staged
    }

    pub(in crate::database) fn state_mut(&mut self) -> &mut MemoryState {
        &mut self.staged
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let InMemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::{BookQuery, BorrowingQuery};
    use kernel::interface::update::{BookModifier, BorrowingModifier};
    use kernel::prelude::entity::{
        Book, BookAuthor, BookId, BookInventory, BookTitle, BorrowDate, Borrowing,
        BorrowingFilter, BorrowingId, CoverType, DailyFee, ExpectedReturnDate, UserId,
    };
    use kernel::KernelError;

    use crate::database::{InMemoryBookRepository, InMemoryBorrowingRepository, InMemoryDatabase};

    fn book(id: BookId) -> Book {
        Book::new(
            id,
            BookTitle::new("memory"),
            BookAuthor::new("author"),
            CoverType::Soft,
            BookInventory::new(1),
            DailyFee::new(Decimal::ONE),
        )
    }

    #[tokio::test]
    async fn committed_changes_are_visible() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let id = BookId::new(Uuid::new_v4());

        let mut con = db.transact().await?;
        InMemoryBookRepository.create(&mut con, &book(id)).await?;
        con.commit().await?;

        let mut con = db.transact().await?;
        assert!(InMemoryBookRepository.find_by_id(&mut con, &id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let id = BookId::new(Uuid::new_v4());

        let mut con = db.transact().await?;
        InMemoryBookRepository.create(&mut con, &book(id)).await?;
        drop(con);

        let mut con = db.transact().await?;
        InMemoryBookRepository.create(&mut con, &book(BookId::new(Uuid::new_v4()))).await?;
        con.roll_back().await?;

        let mut con = db.transact().await?;
        assert!(InMemoryBookRepository.find_by_id(&mut con, &id).await?.is_none());
        let all = InMemoryBookRepository
            .find_all(&mut con, &Default::default(), &Default::default())
            .await?;
        assert!(all.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn simultaneous_borrowings_are_ordered_by_id() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let book_id = BookId::new(Uuid::new_v4());
        let at = BorrowDate::new(datetime!(2024-03-01 10:00 UTC));
        let borrowing = |id: u128| {
            Borrowing::borrow(
                BorrowingId::new(Uuid::from_u128(id)),
                book_id,
                UserId::new(Uuid::new_v4()),
                at,
                ExpectedReturnDate::new(date!(2024 - 03 - 10)),
            )
        };

        let mut con = db.transact().await?;
        InMemoryBookRepository.create(&mut con, &book(book_id)).await?;
        for id in [2, 3, 1] {
            InMemoryBorrowingRepository
                .create(&mut con, &borrowing(id))
                .await?;
        }
        let found = InMemoryBorrowingRepository
            .find_all(&mut con, &BorrowingFilter::default())
            .await?;
        let ids = found
            .iter()
            .map(|borrowing| *borrowing.id())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            [3, 2, 1].map(|id| BorrowingId::new(Uuid::from_u128(id)))
        );
        Ok(())
    }
}
