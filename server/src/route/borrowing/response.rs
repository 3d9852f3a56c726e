use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use application::transfer::{BookProjection, BorrowingDto};

use crate::controller::Exhaust;
use crate::error::Detail;
use crate::route::{BookResponse, Created};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BookField {
    Id(Uuid),
    Title(String),
    Full(BookResponse),
}

impl From<BookProjection> for BookField {
    fn from(value: BookProjection) -> Self {
        match value {
            BookProjection::Id(id) => BookField::Id(id),
            BookProjection::Title(title) => BookField::Title(title),
            BookProjection::Full(book) => BookField::Full(book.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowingResponse {
    id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    borrow_date: OffsetDateTime,
    expected_return_date: Date,
    actual_return_date: Option<Date>,
    book: BookField,
    is_active: bool,
}

impl From<BorrowingDto> for BorrowingResponse {
    fn from(value: BorrowingDto) -> Self {
        Self {
            id: value.id,
            user: value.user,
            borrow_date: value.borrow_date,
            expected_return_date: value.expected_return_date,
            actual_return_date: value.actual_return_date,
            book: value.book.into(),
            is_active: value.is_active,
        }
    }
}

pub struct Presenter;

impl Exhaust<Vec<BorrowingDto>> for Presenter {
    type To = Json<Vec<BorrowingResponse>>;
    fn emit(&self, input: Vec<BorrowingDto>) -> Self::To {
        Json(input.into_iter().map(BorrowingResponse::from).collect())
    }
}

impl Exhaust<BorrowingDto> for Presenter {
    type To = Json<BorrowingResponse>;
    fn emit(&self, input: BorrowingDto) -> Self::To {
        Json(input.into())
    }
}

impl Exhaust<Created<BorrowingDto>> for Presenter {
    type To = (StatusCode, Json<BorrowingResponse>);
    fn emit(&self, input: Created<BorrowingDto>) -> Self::To {
        (StatusCode::CREATED, Json(input.0.into()))
    }
}

impl Exhaust<()> for Presenter {
    type To = Json<Detail>;
    fn emit(&self, _: ()) -> Self::To {
        Json(Detail::new("Book successfully returned"))
    }
}
