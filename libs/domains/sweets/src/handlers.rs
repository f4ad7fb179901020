//! HTTP handlers for the Sweets API
//!
//! Routes are split by guard so the application can layer authentication
//! per group: [`public_router`], [`customer_router`] and [`admin_router`].

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    AppError, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::SweetResult;
use crate::models::{
    CreateSweet, DeleteSweetResponse, ListQuery, PurchaseRequest, PurchaseResponse,
    RestockRequest, SortField, SortOrder, Sweet, SweetListResponse, UpdateSweet,
};
use crate::repository::SweetRepository;
use crate::service::SweetService;

pub const MSG_PURCHASED: &str = "Sweet purchased successfully";
pub const MSG_DELETED: &str = "Sweet deleted successfully";

/// OpenAPI documentation for the Sweets API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_sweets,
        list_categories,
        get_sweet,
        create_sweet,
        update_sweet,
        delete_sweet,
        purchase_sweet,
        restock_sweet,
    ),
    components(
        schemas(
            Sweet, CreateSweet, UpdateSweet, PurchaseRequest, RestockRequest,
            PurchaseResponse, DeleteSweetResponse, SweetListResponse, SortField, SortOrder
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Sweets", description = "Sweet catalog and stock endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<SweetService<R>>;

/// Routes open to anonymous callers
pub fn public_router<R: SweetRepository + 'static>(service: SweetService<R>) -> Router {
    Router::new()
        .route("/", get(list_sweets))
        .route("/categories", get(list_categories))
        .route("/{id}", get(get_sweet))
        .with_state(Arc::new(service))
}

/// Routes for any authenticated user
pub fn customer_router<R: SweetRepository + 'static>(service: SweetService<R>) -> Router {
    Router::new()
        .route("/{id}/purchase", post(purchase_sweet))
        .with_state(Arc::new(service))
}

/// Catalog mutations and restocking
pub fn admin_router<R: SweetRepository + 'static>(service: SweetService<R>) -> Router {
    Router::new()
        .route("/", post(create_sweet))
        .route("/{id}", patch(update_sweet).delete(delete_sweet))
        .route("/{id}/restock", patch(restock_sweet))
        .with_state(Arc::new(service))
}

/// All sweets routes without any guard
pub fn router<R: SweetRepository + 'static>(service: SweetService<R>) -> Router {
    public_router(service.clone())
        .merge(customer_router(service.clone()))
        .merge(admin_router(service))
}

/// List sweets with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Sweets",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of sweets", body = SweetListResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_sweets<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<SweetListResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    query.validate()?;

    let page = service.list_sweets(query).await?;
    Ok(Json(page))
}

/// Distinct sweet categories, sorted
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Sweets",
    responses(
        (status = 200, description = "Category names", body = Vec<String>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: SweetRepository>(
    State(service): State<SharedService<R>>,
) -> SweetResult<Json<Vec<String>>> {
    Ok(Json(service.categories().await?))
}

/// Get a sweet by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    responses(
        (status = 200, description = "Sweet found", body = Sweet),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_sweet<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> SweetResult<Json<Sweet>> {
    Ok(Json(service.get_sweet(id).await?))
}

/// Add a sweet to the catalog
#[utoipa::path(
    post,
    path = "",
    tag = "Sweets",
    request_body = CreateSweet,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Sweet created", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_sweet<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateSweet>,
) -> SweetResult<impl IntoResponse> {
    let sweet = service.create_sweet(input).await?;
    Ok((StatusCode::CREATED, Json(sweet)))
}

/// Partially update a sweet
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    request_body = UpdateSweet,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweet updated", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_sweet<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateSweet>,
) -> SweetResult<Json<Sweet>> {
    Ok(Json(service.update_sweet(id, input).await?))
}

/// Remove a sweet from the catalog
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweet deleted", body = DeleteSweetResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_sweet<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> SweetResult<Json<DeleteSweetResponse>> {
    service.delete_sweet(id).await?;
    Ok(Json(DeleteSweetResponse {
        message: MSG_DELETED.to_string(),
    }))
}

/// Buy units of a sweet
#[utoipa::path(
    post,
    path = "/{id}/purchase",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    request_body = PurchaseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweet purchased", body = PurchaseResponse),
        (status = 400, description = "Invalid quantity or not enough stock", body = axum_helpers::ErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn purchase_sweet<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<PurchaseRequest>,
) -> SweetResult<Json<PurchaseResponse>> {
    let sweet = service.purchase(id, input.quantity).await?;
    Ok(Json(PurchaseResponse {
        message: MSG_PURCHASED.to_string(),
        sweet,
    }))
}

/// Add units to a sweet's stock
#[utoipa::path(
    patch,
    path = "/{id}/restock",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    request_body = RestockRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweet restocked", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn restock_sweet<R: SweetRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<RestockRequest>,
) -> SweetResult<Json<Sweet>> {
    Ok(Json(service.restock(id, input.quantity).await?))
}
