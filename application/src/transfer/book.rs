use rust_decimal::Decimal;
use uuid::Uuid;

use kernel::prelude::entity::{Book, CoverType, DestructBook, SelectLimit, SelectOffset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            author,
            cover,
            inventory,
            daily_fee,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            cover,
            inventory: inventory.into(),
            daily_fee: daily_fee.into(),
        }
    }
}

pub struct GetBookDto {
    pub id: Uuid,
}

pub struct GetAllBookDto {
    pub limit: SelectLimit,
    pub offset: SelectOffset,
}

pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub cover: String,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

#[derive(Default)]
pub struct UpdateBookDto {
    pub id: Uuid,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub inventory: Option<i32>,
    pub daily_fee: Option<Decimal>,
}

pub struct DeleteBookDto {
    pub id: Uuid,
}
