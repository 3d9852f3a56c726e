mod request;
mod response;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::Query;
use uuid::Uuid;

use application::service::{
    CreateBorrowingService, GetBorrowingService, ReturnBorrowingService,
};

use crate::auth::Authenticated;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::borrowing::request::{
    CreateBorrowingRequest, GetBorrowingRequest, ListBorrowingsRequest, ReturnBorrowingRequest,
    Transformer,
};
use crate::route::borrowing::response::Presenter;
use crate::route::Created;

pub trait BorrowingRouter {
    fn route_borrowing(self) -> Self;
}

impl BorrowingRouter for Router<AppModule> {
    fn route_borrowing(self) -> Self {
        self.route("/borrowings", get(list).post(create))
            .route("/borrowings/:id", get(retrieve))
            .route("/borrowings/:id/return", post(return_book))
    }
}

async fn list(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Query(req): Query<ListBorrowingsRequest>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .try_intake(req)?
        .handle(|dto| async move { module.list_borrowings(&ctx, dto).await })
        .await
        .map_err(ErrorStatus::from)
}

async fn create(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<CreateBorrowingRequest>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .try_intake(req)?
        .handle(|dto| async move { module.create_borrowing(&ctx, dto).await.map(Created) })
        .await
        .map_err(ErrorStatus::from)
}

async fn retrieve(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(GetBorrowingRequest::new(id))
        .handle(|dto| async move { module.get_borrowing(&ctx, dto).await })
        .await
        .map_err(ErrorStatus::from)
}

async fn return_book(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(ReturnBorrowingRequest::new(id))
        .handle(|dto| async move { module.return_borrowing(&ctx, dto).await })
        .await
        .map_err(ErrorStatus::from)
}
