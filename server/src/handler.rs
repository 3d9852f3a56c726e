use std::ops::Deref;
use std::sync::Arc;

use axum::extract::FromRef;
use error_stack::Report;
use vodca::References;

use driver::database::{PostgresBookRepository, PostgresBorrowingRepository, PostgresDatabase};
use driver::notify::TelegramNotifier;
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::notify::DependOnNotificationSink;
use kernel::interface::query::{DependOnBookQuery, DependOnBorrowingQuery};
use kernel::interface::update::{DependOnBookModifier, DependOnBorrowingModifier};
use kernel::KernelError;

use crate::auth::JwtVerifier;

static JWT_SECRET: &str = "JWT_SECRET";

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init().await?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

impl FromRef<AppModule> for Arc<JwtVerifier> {
    fn from_ref(module: &AppModule) -> Self {
        Arc::clone(module.verifier())
    }
}

#[derive(References)]
pub struct Handler {
    pgpool: PostgresDatabase,
    book_repository: PostgresBookRepository,
    borrowing_repository: PostgresBorrowingRepository,
    notifier: Arc<TelegramNotifier>,
    verifier: Arc<JwtVerifier>,
}

impl Handler {
    pub async fn init() -> error_stack::Result<Self, KernelError> {
        let secret = dotenvy::var(JWT_SECRET).map_err(|error| {
            Report::new(error)
                .change_context(KernelError::Internal)
                .attach_printable(format!("Env {} not specified", JWT_SECRET))
        })?;
        let pgpool = PostgresDatabase::new().await?;

        Ok(Self {
            pgpool,
            book_repository: PostgresBookRepository,
            borrowing_repository: PostgresBorrowingRepository,
            notifier: Arc::new(TelegramNotifier::new()?),
            verifier: Arc::new(JwtVerifier::new(secret)),
        })
    }
}

impl DependOnDatabaseConnection for Handler {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.pgpool
    }
}

impl DependOnBookQuery for Handler {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &self.book_repository
    }
}

impl DependOnBookModifier for Handler {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &self.book_repository
    }
}

impl DependOnBorrowingQuery for Handler {
    type BorrowingQuery = PostgresBorrowingRepository;
    fn borrowing_query(&self) -> &Self::BorrowingQuery {
        &self.borrowing_repository
    }
}

impl DependOnBorrowingModifier for Handler {
    type BorrowingModifier = PostgresBorrowingRepository;
    fn borrowing_modifier(&self) -> &Self::BorrowingModifier {
        &self.borrowing_repository
    }
}

impl DependOnNotificationSink for Handler {
    type NotificationSink = TelegramNotifier;
    fn notification_sink(&self) -> Arc<Self::NotificationSink> {
        Arc::clone(&self.notifier)
    }
}
