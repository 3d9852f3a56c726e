use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    Book, BookAuthor, BookId, BookInventory, BookTitle, CoverType, DailyFee, RequestContext,
};
use kernel::KernelError;

use crate::transfer::{
    BookDto, CreateBookDto, DeleteBookDto, GetAllBookDto, GetBookDto, UpdateBookDto,
};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery {
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = BookId::new(dto.id);
        let book = self.book_query().find_by_id(&mut connection, &id).await?;
        Ok(book.map(BookDto::from))
    }

    async fn list_books(&self, dto: GetAllBookDto) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let books = self
            .book_query()
            .find_all(&mut connection, &dto.limit, &dto.offset)
            .await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<T> GetBookService for T where T: DependOnDatabaseConnection + DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookModifier
{
    async fn create_book(
        &self,
        ctx: &RequestContext,
        dto: CreateBookDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        ctx.require_staff()?;
        let book = Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::try_new(dto.title)?,
            BookAuthor::try_new(dto.author)?,
            dto.cover.parse::<CoverType>()?,
            BookInventory::try_new(dto.inventory)?,
            DailyFee::try_new(dto.daily_fee)?,
        );

        let mut connection = self.database_connection().transact().await?;
        self.book_modifier().create(&mut connection, &book).await?;
        connection.commit().await?;
        tracing::info!(book = ?book.id(), "Book created");

        Ok(BookDto::from(book))
    }
}

impl<T> CreateBookService for T where T: DependOnDatabaseConnection + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    async fn update_book(
        &self,
        ctx: &RequestContext,
        dto: UpdateBookDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        ctx.require_staff()?;
        let title = dto.title.map(BookTitle::try_new).transpose()?;
        let author = dto.author.map(BookAuthor::try_new).transpose()?;
        let cover = dto.cover.map(|c| c.parse::<CoverType>()).transpose()?;
        let inventory = dto.inventory.map(BookInventory::try_new).transpose()?;
        let daily_fee = dto.daily_fee.map(DailyFee::try_new).transpose()?;

        let id = BookId::new(dto.id);
        let mut connection = self.database_connection().transact().await?;
        let Some(mut book) = self
            .book_query()
            .find_by_id_for_update(&mut connection, &id)
            .await?
        else {
            connection.roll_back().await?;
            return Err(book_not_found(&id));
        };
        book.substitute(|book| {
            if let Some(title) = title {
                *book.title = title;
            }
            if let Some(author) = author {
                *book.author = author;
            }
            if let Some(cover) = cover {
                *book.cover = cover;
            }
            if let Some(inventory) = inventory {
                *book.inventory = inventory;
            }
            if let Some(daily_fee) = daily_fee {
                *book.daily_fee = daily_fee;
            }
        });
        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;

        Ok(BookDto::from(book))
    }
}

impl<T> UpdateBookService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
}

#[async_trait::async_trait]
pub trait DeleteBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    /// Removes the book together with every borrowing that references it.
    async fn delete_book(
        &self,
        ctx: &RequestContext,
        dto: DeleteBookDto,
    ) -> error_stack::Result<(), KernelError> {
        ctx.require_staff()?;
        let id = BookId::new(dto.id);
        let mut connection = self.database_connection().transact().await?;
        if self
            .book_query()
            .find_by_id_for_update(&mut connection, &id)
            .await?
            .is_none()
        {
            connection.roll_back().await?;
            return Err(book_not_found(&id));
        }
        self.book_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;
        tracing::info!(book = ?id, "Book deleted");
        Ok(())
    }
}

impl<T> DeleteBookService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
}

fn book_not_found(id: &BookId) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("Book {:?} not found", id))
}
