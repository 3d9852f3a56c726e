use std::str::FromStr;

use error_stack::Report;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    Book, BookAuthor, BookId, BookInventory, BookTitle, CoverType, DailyFee, SelectLimit,
    SelectOffset,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id).await
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id_for_update(con, id).await
    }

    async fn find_by_ids(
        &self,
        con: &mut PostgresTransaction,
        ids: &[BookId],
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_by_ids(con, ids).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con, limit, offset).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con, book).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update(con, book).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::delete(con, book_id).await
    }

    async fn decrement_inventory(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<bool, KernelError> {
        PgBookInternal::decrement_inventory(con, book_id).await
    }

    async fn increment_inventory(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::increment_inventory(con, book_id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    cover: String,
    inventory: i32,
    daily_fee: Decimal,
}

impl TryFrom<BookRow> for Book {
    type Error = Report<KernelError>;
    fn try_from(value: BookRow) -> Result<Self, Self::Error> {
        let cover = CoverType::from_str(&value.cover)
            .map_err(|report| report.change_context(KernelError::Internal))?;
        Ok(Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            cover,
            BookInventory::new(value.inventory),
            DailyFee::new(value.daily_fee),
        ))
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, cover, inventory, daily_fee
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Book::try_from).transpose()
    }

    async fn find_by_id_for_update(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, cover, inventory, daily_fee
            FROM books
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Book::try_from).transpose()
    }

    async fn find_by_ids(
        con: &mut PgConnection,
        ids: &[BookId],
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let ids = ids.iter().map(|id| *id.as_ref()).collect::<Vec<Uuid>>();
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, cover, inventory, daily_fee
            FROM books
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, cover, inventory, daily_fee
            FROM books
            ORDER BY title
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO books (id, title, author, cover, inventory, daily_fee)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.cover().as_str())
        .bind(book.inventory().as_ref())
        .bind(book.daily_fee().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            UPDATE books
            SET title = $2, author = $3, cover = $4, inventory = $5, daily_fee = $6
            WHERE id = $1
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.cover().as_str())
        .bind(book.inventory().as_ref())
        .bind(book.daily_fee().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn delete(con: &mut PgConnection, book_id: &BookId) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    // The row lock taken by UPDATE makes a concurrent decrement wait and re-check the predicate.
    async fn decrement_inventory(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE books
            SET inventory = inventory - 1
            WHERE id = $1 AND inventory > 0
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn increment_inventory(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE books
            SET inventory = LEAST(inventory::bigint + 1, 2147483647)::integer
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() != 1 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("Book {:?} vanished while restoring inventory", book_id)));
        }
        Ok(())
    }
}
