use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use application::transfer::BookDto;
use kernel::prelude::entity::CoverType;

use crate::controller::Exhaust;
use crate::route::Created;

#[derive(Debug, Serialize)]
pub struct BookResponse {
    id: Uuid,
    title: String,
    author: String,
    cover: CoverType,
    inventory: i32,
    daily_fee: Decimal,
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author: value.author,
            cover: value.cover,
            inventory: value.inventory,
            daily_fee: value.daily_fee,
        }
    }
}

pub struct Presenter;

impl Exhaust<Vec<BookDto>> for Presenter {
    type To = Json<Vec<BookResponse>>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        Json(input.into_iter().map(BookResponse::from).collect())
    }
}

impl Exhaust<Option<BookDto>> for Presenter {
    type To = Option<Json<BookResponse>>;
    fn emit(&self, input: Option<BookDto>) -> Self::To {
        input.map(|book| Json(book.into()))
    }
}

impl Exhaust<BookDto> for Presenter {
    type To = Json<BookResponse>;
    fn emit(&self, input: BookDto) -> Self::To {
        Json(input.into())
    }
}

impl Exhaust<Created<BookDto>> for Presenter {
    type To = (StatusCode, Json<BookResponse>);
    fn emit(&self, input: Created<BookDto>) -> Self::To {
        (StatusCode::CREATED, Json(input.0.into()))
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}
