use sqlx::PgConnection;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::query::BorrowingQuery;
use kernel::interface::update::BorrowingModifier;
use kernel::prelude::entity::{
    ActualReturnDate, BookId, BorrowDate, Borrowing, BorrowingFilter, BorrowingId,
    ExpectedReturnDate, IsActive, UserId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBorrowingRepository;

#[async_trait::async_trait]
impl BorrowingQuery for PostgresBorrowingRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowingId,
    ) -> error_stack::Result<Option<Borrowing>, KernelError> {
        PgBorrowingInternal::find_by_id(con, id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        filter: &BorrowingFilter,
    ) -> error_stack::Result<Vec<Borrowing>, KernelError> {
        PgBorrowingInternal::find_all(con, filter).await
    }
}

#[async_trait::async_trait]
impl BorrowingModifier for PostgresBorrowingRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        borrowing: &Borrowing,
    ) -> error_stack::Result<(), KernelError> {
        PgBorrowingInternal::create(con, borrowing).await
    }

    async fn mark_returned(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowingId,
        returned_on: &ActualReturnDate,
    ) -> error_stack::Result<bool, KernelError> {
        PgBorrowingInternal::mark_returned(con, id, returned_on).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowingId,
    ) -> error_stack::Result<(), KernelError> {
        PgBorrowingInternal::delete(con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct BorrowingRow {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    borrow_date: OffsetDateTime,
    expected_return_date: Date,
    actual_return_date: Option<Date>,
    is_active: bool,
}

impl From<BorrowingRow> for Borrowing {
    fn from(value: BorrowingRow) -> Self {
        Borrowing::new(
            BorrowingId::new(value.id),
            BookId::new(value.book_id),
            UserId::new(value.user_id),
            BorrowDate::new(value.borrow_date),
            ExpectedReturnDate::new(value.expected_return_date),
            value.actual_return_date.map(ActualReturnDate::new),
            IsActive::new(value.is_active),
        )
    }
}

pub(in crate::database) struct PgBorrowingInternal;

impl PgBorrowingInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BorrowingId,
    ) -> error_stack::Result<Option<Borrowing>, KernelError> {
        let row = sqlx::query_as::<_, BorrowingRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                is_active
            FROM
                borrowings
            WHERE
                id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Borrowing::from))
    }

    async fn find_all(
        con: &mut PgConnection,
        filter: &BorrowingFilter,
    ) -> error_stack::Result<Vec<Borrowing>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowingRow>(
            // language=postgresql
            r#"
            SELECT
                id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                is_active
            FROM
                borrowings
            WHERE
                ($1::uuid IS NULL OR user_id = $1)
                AND ($2::uuid IS NULL OR user_id = $2)
                AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY
                borrow_date DESC,
                id DESC
            "#,
        )
        .bind(filter.owner().map(|id| *id.as_ref()))
        .bind(filter.user_id().map(|id| *id.as_ref()))
        .bind(filter.is_active().map(|active| *active.as_ref()))
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Borrowing::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        borrowing: &Borrowing,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO borrowings (
                id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(borrowing.id().as_ref())
        .bind(borrowing.book_id().as_ref())
        .bind(borrowing.user_id().as_ref())
        .bind(borrowing.borrow_date().as_ref())
        .bind(borrowing.expected_return_date().as_ref())
        .bind(borrowing.actual_return_date().map(|date| *date.as_ref()))
        .bind(borrowing.is_active().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn mark_returned(
        con: &mut PgConnection,
        id: &BorrowingId,
        returned_on: &ActualReturnDate,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE borrowings
            SET is_active = FALSE, actual_return_date = $2
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id.as_ref())
        .bind(returned_on.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(
        con: &mut PgConnection,
        id: &BorrowingId,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM borrowings
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::BorrowingQuery;
    use kernel::interface::update::{BookModifier, BorrowingModifier};
    use kernel::prelude::entity::{
        ActualReturnDate, Book, BookAuthor, BookId, BookInventory, BookTitle, BorrowDate,
        Borrowing, BorrowingFilter, BorrowingId, CoverType, DailyFee, ExpectedReturnDate,
        IsActive, UserId,
    };
    use kernel::KernelError;

    use crate::database::postgres::{
        PostgresBookRepository, PostgresBorrowingRepository, PostgresDatabase,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn lifecycle() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let book_id = BookId::new(Uuid::new_v4());
        let book = Book::new(
            book_id,
            BookTitle::new("title"),
            BookAuthor::new("author"),
            CoverType::Soft,
            BookInventory::new(1),
            DailyFee::new(Decimal::ONE),
        );
        PostgresBookRepository.create(&mut con, &book).await?;

        let user_id = UserId::new(Uuid::new_v4());
        let id = BorrowingId::new(Uuid::new_v4());
        let borrowing = Borrowing::borrow(
            id,
            book_id,
            user_id,
            BorrowDate::new(datetime!(2024-03-01 10:00 UTC)),
            ExpectedReturnDate::new(date!(2024 - 03 - 10)),
        );
        PostgresBorrowingRepository
            .create(&mut con, &borrowing)
            .await?;

        let found = PostgresBorrowingRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(borrowing));

        let returned_on = ActualReturnDate::new(date!(2024 - 03 - 05));
        assert!(
            PostgresBorrowingRepository
                .mark_returned(&mut con, &id, &returned_on)
                .await?
        );
        assert!(
            !PostgresBorrowingRepository
                .mark_returned(&mut con, &id, &returned_on)
                .await?
        );

        let filter = BorrowingFilter::new(None, Some(user_id), Some(IsActive::new(false)));
        let found = PostgresBorrowingRepository.find_all(&mut con, &filter).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].actual_return_date(), &Some(returned_on));

        PostgresBorrowingRepository.delete(&mut con, &id).await?;
        let found = PostgresBorrowingRepository.find_by_id(&mut con, &id).await?;
        assert!(found.is_none());

        con.roll_back().await
    }
}
