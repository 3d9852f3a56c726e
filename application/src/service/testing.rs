use std::sync::Arc;

use error_stack::Report;
use rust_decimal::Decimal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use driver::database::{InMemoryBookRepository, InMemoryBorrowingRepository, InMemoryDatabase};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::notify::{DependOnNotificationSink, NotificationSink};
use kernel::interface::query::{DependOnBookQuery, DependOnBorrowingQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier, DependOnBorrowingModifier};
use kernel::prelude::entity::{
    Actor, Book, BookAuthor, BookId, BookInventory, BookTitle, CoverType, DailyFee,
    RequestContext, UserId,
};
use kernel::KernelError;

pub struct RecordingSink {
    sent: UnboundedSender<String>,
}

impl RecordingSink {
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (sent, received) = mpsc::unbounded_channel();
        (Self { sent }, received)
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &str) -> error_stack::Result<(), KernelError> {
        let _ = self.sent.send(message.to_string());
        Ok(())
    }
}

/// Fails every delivery after recording the attempt.
pub struct FailingSink {
    attempted: UnboundedSender<String>,
}

impl FailingSink {
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (attempted, received) = mpsc::unbounded_channel();
        (Self { attempted }, received)
    }
}

#[async_trait::async_trait]
impl NotificationSink for FailingSink {
    async fn send(&self, message: &str) -> error_stack::Result<(), KernelError> {
        let _ = self.attempted.send(message.to_string());
        Err(Report::new(KernelError::Internal).attach_printable("sink is down"))
    }
}

pub struct TestModule<S> {
    database: InMemoryDatabase,
    books: InMemoryBookRepository,
    borrowings: InMemoryBorrowingRepository,
    sink: Arc<S>,
}

impl<S: NotificationSink> TestModule<S> {
    pub fn new(sink: S) -> Self {
        Self {
            database: InMemoryDatabase::new(),
            books: InMemoryBookRepository,
            borrowings: InMemoryBorrowingRepository,
            sink: Arc::new(sink),
        }
    }

    pub async fn seed_book(&self, title: &str, inventory: i32) -> BookId {
        let id = BookId::new(Uuid::new_v4());
        let book = Book::new(
            id,
            BookTitle::new(title),
            BookAuthor::new("Anonymous"),
            CoverType::Hard,
            BookInventory::new(inventory),
            DailyFee::new(Decimal::new(150, 2)),
        );
        let mut con = self.database.transact().await.unwrap();
        self.books.create(&mut con, &book).await.unwrap();
        con.commit().await.unwrap();
        id
    }
}

impl TestModule<RecordingSink> {
    pub fn recording() -> (Self, UnboundedReceiver<String>) {
        let (sink, received) = RecordingSink::new();
        (Self::new(sink), received)
    }
}

impl<S: NotificationSink> DependOnDatabaseConnection for TestModule<S> {
    type DatabaseConnection = InMemoryDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl<S: NotificationSink> DependOnBookQuery for TestModule<S> {
    type BookQuery = InMemoryBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &self.books
    }
}

impl<S: NotificationSink> DependOnBookModifier for TestModule<S> {
    type BookModifier = InMemoryBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &self.books
    }
}

impl<S: NotificationSink> DependOnBorrowingQuery for TestModule<S> {
    type BorrowingQuery = InMemoryBorrowingRepository;
    fn borrowing_query(&self) -> &Self::BorrowingQuery {
        &self.borrowings
    }
}

impl<S: NotificationSink> DependOnBorrowingModifier for TestModule<S> {
    type BorrowingModifier = InMemoryBorrowingRepository;
    fn borrowing_modifier(&self) -> &Self::BorrowingModifier {
        &self.borrowings
    }
}

impl<S: NotificationSink> DependOnNotificationSink for TestModule<S> {
    type NotificationSink = S;
    fn notification_sink(&self) -> Arc<Self::NotificationSink> {
        Arc::clone(&self.sink)
    }
}

pub fn member() -> RequestContext {
    RequestContext::authenticated(Actor::member(UserId::new(Uuid::new_v4())))
}

pub fn staff() -> RequestContext {
    RequestContext::authenticated(Actor::staff(UserId::new(Uuid::new_v4())))
}
