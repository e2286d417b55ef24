//! HTTP glue: deserialize a command, dispatch it, return the envelope.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use vitrine_db::{Filter, Repository};
use vitrine_http::error::AppError;
use vitrine_kernel::{dispatch, GenericResponse};

use super::commands::{CreateProductCommand, RemoveProductCommand, UpdateProductCommand};
use super::handlers::ProductHandlers;
use super::models::ProductView;

pub fn router(handlers: ProductHandlers) -> Router {
    Router::new()
        .route(
            "/",
            post(create_product)
                .delete(remove_product)
                .put(update_product)
                .get(list_products),
        )
        .with_state(handlers)
}

async fn create_product(
    State(handlers): State<ProductHandlers>,
    payload: Result<Json<CreateProductCommand>, JsonRejection>,
) -> Result<GenericResponse, AppError> {
    let Json(command) = payload?;
    Ok(dispatch(handlers.create.as_ref(), command).await)
}

async fn remove_product(
    State(handlers): State<ProductHandlers>,
    payload: Result<Json<RemoveProductCommand>, JsonRejection>,
) -> Result<GenericResponse, AppError> {
    let Json(command) = payload?;
    Ok(dispatch(handlers.remove.as_ref(), command).await)
}

async fn update_product(
    State(handlers): State<ProductHandlers>,
    payload: Result<Json<UpdateProductCommand>, JsonRejection>,
) -> Result<GenericResponse, AppError> {
    let Json(command) = payload?;
    Ok(dispatch(handlers.update.as_ref(), command).await)
}

async fn list_products(
    State(handlers): State<ProductHandlers>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    let products = handlers
        .repository
        .filter_by(&Filter::All)
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok(Json(products.iter().map(ProductView::from).collect()))
}
