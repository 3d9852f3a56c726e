use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use application::transfer::{
    CreateBookDto, DeleteBookDto, GetAllBookDto, GetBookDto, UpdateBookDto,
};
use kernel::prelude::entity::{SelectLimit, SelectOffset};

use crate::controller::Intake;

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    title: String,
    author: String,
    cover: String,
    inventory: i32,
    daily_fee: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    title: Option<String>,
    author: Option<String>,
    cover: Option<String>,
    inventory: Option<i32>,
    daily_fee: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetAllBookRequest {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug)]
pub struct GetBookRequest {
    id: Uuid,
}

impl GetBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: Uuid,
}

impl DeleteBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct Transformer;

impl Intake<CreateBookRequest> for Transformer {
    type To = CreateBookDto;
    fn emit(&self, input: CreateBookRequest) -> Self::To {
        CreateBookDto {
            title: input.title,
            author: input.author,
            cover: input.cover,
            inventory: input.inventory,
            daily_fee: input.daily_fee,
        }
    }
}

impl Intake<(Uuid, UpdateBookRequest)> for Transformer {
    type To = UpdateBookDto;
    fn emit(&self, (id, input): (Uuid, UpdateBookRequest)) -> Self::To {
        UpdateBookDto {
            id,
            title: input.title,
            author: input.author,
            cover: input.cover,
            inventory: input.inventory,
            daily_fee: input.daily_fee,
        }
    }
}

impl Intake<GetAllBookRequest> for Transformer {
    type To = GetAllBookDto;
    fn emit(&self, input: GetAllBookRequest) -> Self::To {
        GetAllBookDto {
            limit: input.limit.map(SelectLimit::new).unwrap_or_default(),
            offset: input.offset.map(SelectOffset::new).unwrap_or_default(),
        }
    }
}

impl Intake<GetBookRequest> for Transformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<DeleteBookRequest> for Transformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}
