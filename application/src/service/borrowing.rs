use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::notify::{DependOnNotificationSink, NotificationSink};
use kernel::interface::query::{BookQuery, BorrowingQuery, DependOnBookQuery, DependOnBorrowingQuery};
use kernel::interface::update::{
    BookModifier, BorrowingModifier, DependOnBookModifier, DependOnBorrowingModifier,
};
use kernel::prelude::entity::{
    ActiveFilter, ActualReturnDate, Actor, Book, BookId, BorrowDate, Borrowing, BorrowingFilter,
    BorrowingId, ExpectedReturnDate, IsActive, RequestContext, UserId,
};
use kernel::KernelError;

use crate::transfer::{
    BorrowingDto, BorrowingOperation, BorrowingView, CreateBorrowingDto, GetAllBorrowingDto,
    GetBorrowingDto, ReturnBorrowingDto,
};

#[async_trait::async_trait]
pub trait GetBorrowingService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBorrowingQuery + DependOnBookQuery
{
    async fn list_borrowings(
        &self,
        ctx: &RequestContext,
        dto: GetAllBorrowingDto,
    ) -> error_stack::Result<Vec<BorrowingDto>, KernelError> {
        let actor = ctx.require_authenticated()?;
        let is_active = dto
            .is_active
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(ActiveFilter::parse)
            .transpose()?
            .map(IsActive::from);
        let owner = (!actor.is_staff()).then(|| *actor.id());
        let filter = BorrowingFilter::new(owner, dto.user_id.map(UserId::new), is_active);

        let mut connection = self.database_connection().transact().await?;
        let borrowings = self
            .borrowing_query()
            .find_all(&mut connection, &filter)
            .await?;

        let book_ids = borrowings
            .iter()
            .map(|borrowing| *borrowing.book_id())
            .collect::<HashSet<BookId>>()
            .into_iter()
            .collect::<Vec<BookId>>();
        let books = self
            .book_query()
            .find_by_ids(&mut connection, &book_ids)
            .await?
            .into_iter()
            .map(|book| (*book.id(), book))
            .collect::<HashMap<BookId, Book>>();

        let view = BorrowingView::select(*actor.role(), BorrowingOperation::List);
        borrowings
            .into_iter()
            .map(|borrowing| {
                let book = books
                    .get(borrowing.book_id())
                    .ok_or_else(|| missing_book(borrowing.book_id()))?;
                Ok(view.project(borrowing, book))
            })
            .collect()
    }

    async fn get_borrowing(
        &self,
        ctx: &RequestContext,
        dto: GetBorrowingDto,
    ) -> error_stack::Result<BorrowingDto, KernelError> {
        let actor = ctx.require_authenticated()?;
        let id = BorrowingId::new(dto.id);

        let mut connection = self.database_connection().transact().await?;
        let borrowing = self
            .borrowing_query()
            .find_by_id(&mut connection, &id)
            .await?
            .filter(|borrowing| actor.can_access(borrowing))
            .ok_or_else(|| borrowing_not_found(&id))?;
        let book = self
            .book_query()
            .find_by_id(&mut connection, borrowing.book_id())
            .await?
            .ok_or_else(|| missing_book(borrowing.book_id()))?;

        let view = BorrowingView::select(*actor.role(), BorrowingOperation::Retrieve);
        Ok(view.project(borrowing, &book))
    }
}

impl<T> GetBorrowingService for T where
    T: DependOnDatabaseConnection + DependOnBorrowingQuery + DependOnBookQuery
{
}

#[async_trait::async_trait]
pub trait CreateBorrowingService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnBookQuery
    + DependOnBookModifier
    + DependOnBorrowingModifier
    + DependOnNotificationSink
{
    /// Takes a copy of the book out for the caller.
    ///
    /// The inventory decrement and the new record are committed together. The notification is
    /// sent afterwards on a detached task and its outcome never reaches the caller.
    async fn create_borrowing(
        &self,
        ctx: &RequestContext,
        dto: CreateBorrowingDto,
    ) -> error_stack::Result<BorrowingDto, KernelError> {
        let actor = ctx.require_authenticated()?;
        let borrow_date = BorrowDate::now();
        let expected_return_date = ExpectedReturnDate::parse(&dto.expected_return_date)?;
        expected_return_date.ensure_not_before(borrow_date.as_ref().date())?;
        let book_id = BookId::new(dto.book_id);

        let mut connection = self.database_connection().transact().await?;
        let Some(book) = self.book_query().find_by_id(&mut connection, &book_id).await? else {
            connection.roll_back().await?;
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("Book {:?} does not exist", book_id)));
        };
        if !self
            .book_modifier()
            .decrement_inventory(&mut connection, &book_id)
            .await?
        {
            connection.roll_back().await?;
            return Err(Report::new(KernelError::InventoryExhausted)
                .attach_printable(format!("Book {:?} has no copy left", book_id)));
        }

        let borrowing = Borrowing::borrow(
            BorrowingId::new(Uuid::new_v4()),
            book_id,
            *actor.id(),
            borrow_date,
            expected_return_date,
        );
        self.borrowing_modifier()
            .create(&mut connection, &borrowing)
            .await?;
        connection.commit().await?;
        tracing::info!(borrowing = ?borrowing.id(), book = ?book_id, user = ?actor.id(), "Book borrowed");

        dispatch(
            self.notification_sink(),
            borrowing_message(actor, &book, &expected_return_date),
        );

        Ok(BorrowingView::select(*actor.role(), BorrowingOperation::Create)
            .project(borrowing, &book))
    }
}

impl<T> CreateBorrowingService for T where
    T: DependOnDatabaseConnection
        + DependOnBookQuery
        + DependOnBookModifier
        + DependOnBorrowingModifier
        + DependOnNotificationSink
{
}

#[async_trait::async_trait]
pub trait ReturnBorrowingService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnBorrowingQuery
    + DependOnBorrowingModifier
    + DependOnBookModifier
{
    /// Closes an active borrowing and puts the copy back on the shelf in one transaction.
    ///
    /// Only the owner or staff can return a borrowing; anyone else gets `NotFound`.
    async fn return_borrowing(
        &self,
        ctx: &RequestContext,
        dto: ReturnBorrowingDto,
    ) -> error_stack::Result<(), KernelError> {
        let actor = ctx.require_authenticated()?;
        let id = BorrowingId::new(dto.id);

        let mut connection = self.database_connection().transact().await?;
        let Some(borrowing) = self
            .borrowing_query()
            .find_by_id(&mut connection, &id)
            .await?
            .filter(|borrowing| actor.can_access(borrowing))
        else {
            connection.roll_back().await?;
            return Err(borrowing_not_found(&id));
        };
        if borrowing.is_returned() {
            connection.roll_back().await?;
            return Err(already_returned(&id));
        }

        let returned_on = ActualReturnDate::today();
        // A concurrent return may have won between the read and this update.
        if !self
            .borrowing_modifier()
            .mark_returned(&mut connection, &id, &returned_on)
            .await?
        {
            connection.roll_back().await?;
            return Err(already_returned(&id));
        }
        self.book_modifier()
            .increment_inventory(&mut connection, borrowing.book_id())
            .await?;
        connection.commit().await?;
        tracing::info!(borrowing = ?id, book = ?borrowing.book_id(), "Book returned");
        Ok(())
    }
}

impl<T> ReturnBorrowingService for T where
    T: DependOnDatabaseConnection
        + DependOnBorrowingQuery
        + DependOnBorrowingModifier
        + DependOnBookModifier
{
}

fn dispatch<S: NotificationSink>(sink: Arc<S>, message: String) {
    tokio::spawn(async move {
        if let Err(report) = sink.send(&message).await {
            tracing::warn!(error = ?report, "Failed to deliver borrowing notification");
        }
    });
}

fn borrowing_message(actor: &Actor, book: &Book, expected: &ExpectedReturnDate) -> String {
    let user: &Uuid = actor.id().as_ref();
    let title: &String = book.title().as_ref();
    format!(
        "<b>New borrowing</b>\nUser: {}\nBook: {}\nExpected return: {}",
        user,
        escape_html(title),
        expected.as_ref()
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn borrowing_not_found(id: &BorrowingId) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("Borrowing {:?} not found", id))
}

fn already_returned(id: &BorrowingId) -> Report<KernelError> {
    Report::new(KernelError::AlreadyReturned)
        .attach_printable(format!("Borrowing {:?} is already returned", id))
}

fn missing_book(id: &BookId) -> Report<KernelError> {
    Report::new(KernelError::Internal)
        .attach_printable(format!("Borrowing references missing book {:?}", id))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::time::Duration;

    use time::OffsetDateTime;
    use tokio::task::JoinSet;
    use uuid::Uuid;

    use kernel::prelude::entity::{BookId, RequestContext};
    use kernel::KernelError;

    use crate::service::testing::{member, staff, FailingSink, TestModule};
    use crate::service::{
        CreateBorrowingService, GetBookService, GetBorrowingService, ReturnBorrowingService,
    };
    use crate::transfer::{
        BookProjection, CreateBorrowingDto, GetAllBorrowingDto, GetBookDto, GetBorrowingDto,
        ReturnBorrowingDto,
    };

    fn in_days(days: i64) -> String {
        (OffsetDateTime::now_utc().date() + time::Duration::days(days)).to_string()
    }

    fn borrow(book_id: BookId) -> CreateBorrowingDto {
        CreateBorrowingDto {
            book_id: book_id.into(),
            expected_return_date: in_days(7),
        }
    }

    fn user_of(ctx: &RequestContext) -> Uuid {
        (*ctx.actor().unwrap().id()).into()
    }

    async fn inventory<S: kernel::interface::notify::NotificationSink>(
        module: &TestModule<S>,
        id: BookId,
    ) -> i32 {
        module
            .get_book(GetBookDto { id: id.into() })
            .await
            .unwrap()
            .unwrap()
            .inventory
    }

    #[tokio::test]
    async fn borrowing_takes_a_copy_and_notifies() -> error_stack::Result<(), KernelError> {
        let (module, mut sent) = TestModule::recording();
        let book = module.seed_book("Tom & <Jerry>", 2).await;
        let ctx = member();

        let created = module.create_borrowing(&ctx, borrow(book)).await?;
        assert_eq!(created.book, BookProjection::Id(book.into()));
        assert_eq!(created.user, None);
        assert!(created.is_active);
        assert_eq!(created.actual_return_date, None);
        assert_eq!(inventory(&module, book).await, 1);

        let message = tokio::time::timeout(Duration::from_secs(1), sent.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(message.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(message.contains(&user_of(&ctx).to_string()));
        assert!(message.contains(&in_days(7)));
        Ok(())
    }

    #[tokio::test]
    async fn empty_shelf_is_rejected() {
        let (module, _sent) = TestModule::recording();
        let book = module.seed_book("Gone", 0).await;
        let ctx = member();

        let report = module.create_borrowing(&ctx, borrow(book)).await.unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InventoryExhausted);
        assert_eq!(inventory(&module, book).await, 0);
        let listed = module
            .list_borrowings(&ctx, GetAllBorrowingDto::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn creation_rejects_bad_input() {
        let (module, _sent) = TestModule::recording();
        let book = module.seed_book("Input", 1).await;

        let report = module
            .create_borrowing(&RequestContext::anonymous(), borrow(book))
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::Unauthenticated);

        let dto = CreateBorrowingDto {
            book_id: book.into(),
            expected_return_date: "soon".to_string(),
        };
        let report = module.create_borrowing(&member(), dto).await.unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidArgument);

        let dto = CreateBorrowingDto {
            book_id: book.into(),
            expected_return_date: in_days(-1),
        };
        let report = module.create_borrowing(&member(), dto).await.unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidArgument);

        let report = module
            .create_borrowing(&member(), borrow(BookId::new(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);

        assert_eq!(inventory(&module, book).await, 1);
    }

    #[tokio::test]
    async fn concurrent_borrowers_never_overdraw() {
        let (module, _sent) = TestModule::recording();
        let module = Arc::new(module);
        let book = module.seed_book("Popular", 3).await;

        let mut tasks = JoinSet::new();
        for _ in 0..10 {
            let module = Arc::clone(&module);
            tasks.spawn(async move {
                let ctx = member();
                module.create_borrowing(&ctx, borrow(book)).await
            });
        }
        let mut succeeded = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => succeeded += 1,
                Err(report) => {
                    assert_eq!(report.current_context(), &KernelError::InventoryExhausted)
                }
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(inventory(&module, book).await, 0);

        let all = module
            .list_borrowings(&staff(), GetAllBorrowingDto::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn failing_notification_does_not_fail_the_borrowing() {
        let (sink, mut attempted) = FailingSink::new();
        let module = TestModule::new(sink);
        let book = module.seed_book("Quiet", 1).await;

        let created = module.create_borrowing(&member(), borrow(book)).await;
        assert!(created.is_ok());
        let attempt = tokio::time::timeout(Duration::from_secs(1), attempted.recv())
            .await
            .unwrap();
        assert!(attempt.is_some());
        assert_eq!(inventory(&module, book).await, 0);
    }

    #[tokio::test]
    async fn returning_restores_the_copy_once() -> error_stack::Result<(), KernelError> {
        let (module, _sent) = TestModule::recording();
        let book = module.seed_book("Round trip", 1).await;
        let ctx = member();
        let created = module.create_borrowing(&ctx, borrow(book)).await?;

        module
            .return_borrowing(&ctx, ReturnBorrowingDto { id: created.id })
            .await?;
        assert_eq!(inventory(&module, book).await, 1);

        let returned = module
            .get_borrowing(&ctx, GetBorrowingDto { id: created.id })
            .await?;
        assert!(!returned.is_active);
        assert_eq!(
            returned.actual_return_date,
            Some(OffsetDateTime::now_utc().date())
        );

        let report = module
            .return_borrowing(&ctx, ReturnBorrowingDto { id: created.id })
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::AlreadyReturned);
        assert_eq!(inventory(&module, book).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn strangers_cannot_see_or_return_a_borrowing() -> error_stack::Result<(), KernelError> {
        let (module, _sent) = TestModule::recording();
        let book = module.seed_book("Private", 1).await;
        let owner = member();
        let created = module.create_borrowing(&owner, borrow(book)).await?;

        let stranger = member();
        let report = module
            .get_borrowing(&stranger, GetBorrowingDto { id: created.id })
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);
        let report = module
            .return_borrowing(&stranger, ReturnBorrowingDto { id: created.id })
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);
        assert_eq!(inventory(&module, book).await, 0);

        let report = module
            .return_borrowing(&owner, ReturnBorrowingDto { id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);

        module
            .return_borrowing(&staff(), ReturnBorrowingDto { id: created.id })
            .await?;
        assert_eq!(inventory(&module, book).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn detail_views_depend_on_the_caller() -> error_stack::Result<(), KernelError> {
        let (module, _sent) = TestModule::recording();
        let book = module.seed_book("Detail", 1).await;
        let owner = member();
        let created = module.create_borrowing(&owner, borrow(book)).await?;

        let mine = module
            .get_borrowing(&owner, GetBorrowingDto { id: created.id })
            .await?;
        assert_eq!(mine.user, None);
        assert!(matches!(mine.book, BookProjection::Full(ref dto) if dto.title == "Detail"));

        let theirs = module
            .get_borrowing(&staff(), GetBorrowingDto { id: created.id })
            .await?;
        assert_eq!(theirs.user, Some(user_of(&owner)));
        assert!(matches!(theirs.book, BookProjection::Full(_)));
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_scoped_and_filtered() -> error_stack::Result<(), KernelError> {
        let (module, _sent) = TestModule::recording();
        let book = module.seed_book("Shared", 5).await;
        let alice = member();
        let bob = member();

        let returned = module.create_borrowing(&alice, borrow(book)).await?;
        module
            .return_borrowing(&alice, ReturnBorrowingDto { id: returned.id })
            .await?;
        module.create_borrowing(&alice, borrow(book)).await?;
        module.create_borrowing(&bob, borrow(book)).await?;

        let own = module
            .list_borrowings(&alice, GetAllBorrowingDto::default())
            .await?;
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|dto| dto.user.is_none()));
        assert!(own
            .iter()
            .all(|dto| dto.book == BookProjection::Title("Shared".to_string())));
        let mut newest_first = own.clone();
        newest_first.sort_by_key(|dto| std::cmp::Reverse((dto.borrow_date, dto.id)));
        assert_eq!(own, newest_first);

        let active = module
            .list_borrowings(
                &alice,
                GetAllBorrowingDto {
                    user_id: None,
                    is_active: Some("TRUE".to_string()),
                },
            )
            .await?;
        assert_eq!(active.len(), 1);
        assert!(active[0].is_active);

        let ignored = module
            .list_borrowings(
                &alice,
                GetAllBorrowingDto {
                    user_id: None,
                    is_active: Some(String::new()),
                },
            )
            .await?;
        assert_eq!(ignored.len(), 2);

        let peeking = module
            .list_borrowings(
                &alice,
                GetAllBorrowingDto {
                    user_id: Some(user_of(&bob)),
                    is_active: None,
                },
            )
            .await?;
        assert!(peeking.is_empty());

        let everyone = module
            .list_borrowings(&staff(), GetAllBorrowingDto::default())
            .await?;
        assert_eq!(everyone.len(), 3);
        assert!(everyone.iter().all(|dto| dto.user.is_some()));

        let bobs = module
            .list_borrowings(
                &staff(),
                GetAllBorrowingDto {
                    user_id: Some(user_of(&bob)),
                    is_active: Some("false".to_string()),
                },
            )
            .await?;
        assert!(bobs.is_empty());

        let closed = module
            .list_borrowings(
                &staff(),
                GetAllBorrowingDto {
                    user_id: None,
                    is_active: Some("false".to_string()),
                },
            )
            .await?;
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, returned.id);
        assert_eq!(closed[0].user, Some(user_of(&alice)));
        assert!(!closed[0].is_active);

        let alices = module
            .list_borrowings(
                &staff(),
                GetAllBorrowingDto {
                    user_id: Some(user_of(&alice)),
                    is_active: None,
                },
            )
            .await?;
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|dto| dto.user == Some(user_of(&alice))));

        let report = module
            .list_borrowings(
                &alice,
                GetAllBorrowingDto {
                    user_id: None,
                    is_active: Some("maybe".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidFilter);

        let report = module
            .list_borrowings(&RequestContext::anonymous(), GetAllBorrowingDto::default())
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::Unauthenticated);
        Ok(())
    }
}
