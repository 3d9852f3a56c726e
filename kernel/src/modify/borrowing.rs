use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{ActualReturnDate, Borrowing, BorrowingId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BorrowingModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        borrowing: &Borrowing,
    ) -> error_stack::Result<(), KernelError>;
    /// Flips an active borrowing to returned. Returns `false` when it was not active anymore.
    async fn mark_returned(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowingId,
        returned_on: &ActualReturnDate,
    ) -> error_stack::Result<bool, KernelError>;
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowingId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBorrowingModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BorrowingModifier: BorrowingModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn borrowing_modifier(&self) -> &Self::BorrowingModifier;
}
