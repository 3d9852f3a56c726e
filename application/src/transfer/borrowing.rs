use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::prelude::entity::{Book, Borrowing, DestructBorrowing, Role};

use crate::transfer::BookDto;

#[derive(Debug)]
pub struct CreateBorrowingDto {
    pub book_id: Uuid,
    pub expected_return_date: String,
}

pub struct ReturnBorrowingDto {
    pub id: Uuid,
}

pub struct GetBorrowingDto {
    pub id: Uuid,
}

#[derive(Debug, Default)]
pub struct GetAllBorrowingDto {
    pub user_id: Option<Uuid>,
    pub is_active: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowingOperation {
    List,
    Retrieve,
    Create,
}

/// How a borrowing is rendered for a given caller and operation.
///
/// | view           | book          | user |
/// |----------------|---------------|------|
/// | `MemberList`   | title         | no   |
/// | `MemberDetail` | full book     | no   |
/// | `StaffList`    | title         | yes  |
/// | `StaffDetail`  | full book     | yes  |
/// | `Created`      | id            | no   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowingView {
    MemberList,
    MemberDetail,
    StaffList,
    StaffDetail,
    Created,
}

impl BorrowingView {
    pub fn select(role: Role, operation: BorrowingOperation) -> Self {
        match (role, operation) {
            (Role::Member, BorrowingOperation::List) => BorrowingView::MemberList,
            (Role::Member, BorrowingOperation::Retrieve) => BorrowingView::MemberDetail,
            (Role::Staff, BorrowingOperation::List) => BorrowingView::StaffList,
            (Role::Staff, BorrowingOperation::Retrieve) => BorrowingView::StaffDetail,
            (Role::Member | Role::Staff, BorrowingOperation::Create) => BorrowingView::Created,
        }
    }

    pub fn project(self, borrowing: Borrowing, book: &Book) -> BorrowingDto {
        let DestructBorrowing {
            id,
            book_id,
            user_id,
            borrow_date,
            expected_return_date,
            actual_return_date,
            is_active,
        } = borrowing.into_destruct();
        let (book, user) = match self {
            BorrowingView::MemberList => (BookProjection::Title(book.title().clone().into()), None),
            BorrowingView::MemberDetail => (BookProjection::Full(book.clone().into()), None),
            BorrowingView::StaffList => (
                BookProjection::Title(book.title().clone().into()),
                Some(user_id.into()),
            ),
            BorrowingView::StaffDetail => {
                (BookProjection::Full(book.clone().into()), Some(user_id.into()))
            }
            BorrowingView::Created => (BookProjection::Id(book_id.into()), None),
        };
        BorrowingDto {
            id: id.into(),
            user,
            borrow_date: borrow_date.into(),
            expected_return_date: expected_return_date.into(),
            actual_return_date: actual_return_date.map(Into::into),
            book,
            is_active: is_active.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookProjection {
    Id(Uuid),
    Title(String),
    Full(BookDto),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingDto {
    pub id: Uuid,
    /// Only filled in for staff views.
    pub user: Option<Uuid>,
    pub borrow_date: OffsetDateTime,
    pub expected_return_date: Date,
    pub actual_return_date: Option<Date>,
    pub book: BookProjection,
    pub is_active: bool,
}
