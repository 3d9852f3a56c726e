use error_stack::Report;
use serde::Deserialize;
use uuid::Uuid;

use application::transfer::{
    CreateBorrowingDto, GetAllBorrowingDto, GetBorrowingDto, ReturnBorrowingDto,
};
use kernel::KernelError;

use crate::controller::{Intake, TryIntake};

#[derive(Debug, Default, Deserialize)]
pub struct ListBorrowingsRequest {
    user_id: Option<String>,
    is_active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBorrowingRequest {
    book_id: String,
    expected_return_date: String,
}

#[derive(Debug)]
pub struct GetBorrowingRequest {
    id: Uuid,
}

impl GetBorrowingRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct ReturnBorrowingRequest {
    id: Uuid,
}

impl ReturnBorrowingRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

fn parse_uuid(field: &str, value: &str) -> error_stack::Result<Uuid, KernelError> {
    Uuid::parse_str(value.trim()).map_err(|error| {
        Report::new(error)
            .change_context(KernelError::InvalidArgument)
            .attach_printable(format!("{field} is not a valid id: {value}"))
    })
}

pub struct Transformer;

impl TryIntake<ListBorrowingsRequest> for Transformer {
    type To = GetAllBorrowingDto;
    type Error = Report<KernelError>;
    fn emit(&self, input: ListBorrowingsRequest) -> Result<Self::To, Self::Error> {
        let user_id = input
            .user_id
            .filter(|value| !value.is_empty())
            .map(|value| parse_uuid("user_id", &value))
            .transpose()?;
        Ok(GetAllBorrowingDto {
            user_id,
            is_active: input.is_active,
        })
    }
}

impl TryIntake<CreateBorrowingRequest> for Transformer {
    type To = CreateBorrowingDto;
    type Error = Report<KernelError>;
    fn emit(&self, input: CreateBorrowingRequest) -> Result<Self::To, Self::Error> {
        Ok(CreateBorrowingDto {
            book_id: parse_uuid("book_id", &input.book_id)?,
            expected_return_date: input.expected_return_date,
        })
    }
}

impl Intake<GetBorrowingRequest> for Transformer {
    type To = GetBorrowingDto;
    fn emit(&self, input: GetBorrowingRequest) -> Self::To {
        GetBorrowingDto { id: input.id }
    }
}

impl Intake<ReturnBorrowingRequest> for Transformer {
    type To = ReturnBorrowingDto;
    fn emit(&self, input: ReturnBorrowingRequest) -> Self::To {
        ReturnBorrowingDto { id: input.id }
    }
}
