use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Borrowing, BorrowingFilter, BorrowingId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BorrowingQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowingId,
    ) -> error_stack::Result<Option<Borrowing>, KernelError>;
    /// Matching borrowings, newest `borrow_date` first, ties broken by descending id.
    async fn find_all(
        &self,
        con: &mut Self::Transaction,
        filter: &BorrowingFilter,
    ) -> error_stack::Result<Vec<Borrowing>, KernelError>;
}

pub trait DependOnBorrowingQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BorrowingQuery: BorrowingQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn borrowing_query(&self) -> &Self::BorrowingQuery;
}
