mod request;
mod response;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use application::service::{
    CreateBookService, DeleteBookService, GetBookService, UpdateBookService,
};
use kernel::KernelError;

use crate::auth::Authenticated;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::book::request::{
    CreateBookRequest, DeleteBookRequest, GetAllBookRequest, GetBookRequest, Transformer,
    UpdateBookRequest,
};
use crate::route::book::response::Presenter;
use crate::route::Created;

pub use self::response::BookResponse;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route("/books", get(list).post(create)).route(
            "/books/:id",
            get(retrieve).patch(update).delete(delete),
        )
    }
}

async fn list(
    State(module): State<AppModule>,
    Query(req): Query<GetAllBookRequest>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(req)
        .handle(|dto| async move { module.list_books(dto).await })
        .await
        .map_err(ErrorStatus::from)
}

async fn retrieve(
    State(module): State<AppModule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(GetBookRequest::new(id))
        .handle(|dto| async move { module.get_book(dto).await })
        .await
        .map_err(ErrorStatus::from)?
        .ok_or_else(|| ErrorStatus::from(KernelError::NotFound))
}

async fn create(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(req)
        .handle(|dto| async move { module.create_book(&ctx, dto).await.map(Created) })
        .await
        .map_err(ErrorStatus::from)
}

async fn update(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake((id, req))
        .handle(|dto| async move { module.update_book(&ctx, dto).await })
        .await
        .map_err(ErrorStatus::from)
}

async fn delete(
    State(module): State<AppModule>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(DeleteBookRequest::new(id))
        .handle(|dto| async move { module.delete_book(&ctx, dto).await })
        .await
        .map_err(ErrorStatus::from)
}
