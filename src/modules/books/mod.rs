pub mod models;
pub mod query;
pub mod rating;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use bookden_http::auth::CurrentUser;
use bookden_http::envelope::Envelope;
use bookden_http::error::ApiError;
use bookden_http::extract::{ApiJson, ApiPath};
use bookden_kernel::{InitCtx, Module};
use bookden_store::MemoryStore;

use models::{BookDetailResponse, BookResponse, CreateBook, UpdateBook};
use query::ListParams;
use service::BookService;

/// Books module: catalog listing, detail, and owner-gated mutation.
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            service: Arc::new(BookService::new(store)),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books).post(create_book))
            .route("/genres", get(list_genres))
            .route("/my-books", get(list_my_books))
            .route(
                "/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books with pagination, search, genre filter, and sorting",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "page", "in": "query", "schema": {"type": "integer", "minimum": 1}},
                            {"name": "limit", "in": "query", "schema": {"type": "integer", "minimum": 1, "maximum": 50}},
                            {"name": "search", "in": "query", "schema": {"type": "string"}},
                            {"name": "genre", "in": "query", "schema": {"type": "string"}},
                            {"name": "sortBy", "in": "query", "schema": {"type": "string", "enum": ["newest", "oldest", "year-desc", "year-asc", "title-asc", "title-desc", "rating-desc", "rating-asc"]}}
                        ],
                        "responses": {
                            "200": {"description": "Paginated book list"},
                            "400": {"description": "Validation error", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ErrorResponse"}}}}
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "responses": {
                            "201": {"description": "Book created"},
                            "401": {"description": "Authentication required"}
                        }
                    }
                },
                "/genres": {
                    "get": {
                        "summary": "Distinct genres, sorted",
                        "tags": ["Books"],
                        "responses": {"200": {"description": "Genre list"}}
                    }
                },
                "/my-books": {
                    "get": {
                        "summary": "Books added by the current user",
                        "tags": ["Books"],
                        "responses": {
                            "200": {"description": "Paginated book list"},
                            "401": {"description": "Authentication required"}
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Single book with reviews and rating stats",
                        "tags": ["Books"],
                        "responses": {
                            "200": {"description": "Book detail"},
                            "401": {"description": "Authentication required"},
                            "404": {"description": "Book not found"}
                        }
                    },
                    "put": {
                        "summary": "Update a book (owner only)",
                        "tags": ["Books"],
                        "responses": {
                            "200": {"description": "Book updated"},
                            "403": {"description": "Not the owner"},
                            "404": {"description": "Book not found"}
                        }
                    },
                    "delete": {
                        "summary": "Delete a book and its reviews (owner only)",
                        "tags": ["Books"],
                        "responses": {
                            "200": {"description": "Book deleted"},
                            "403": {"description": "Not the owner"},
                            "404": {"description": "Book not found"}
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// GET /: public listing.
async fn list_books(
    State(service): State<Arc<BookService>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<BookResponse>>>, ApiError> {
    let (books, pagination) = service.list(&params, None).await?;
    Ok(Json(Envelope::paginated(books, pagination)))
}

/// GET /genres: distinct genres across the catalog.
async fn list_genres(
    State(service): State<Arc<BookService>>,
) -> Result<Json<Envelope<Vec<String>>>, ApiError> {
    let genres = service.genres().await;
    Ok(Json(Envelope::data(genres)))
}

/// GET /my-books: listing scoped to the caller's books.
async fn list_my_books(
    State(service): State<Arc<BookService>>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<BookResponse>>>, ApiError> {
    let (books, pagination) = service.list(&params, Some(user_id)).await?;
    Ok(Json(Envelope::paginated(books, pagination)))
}

/// GET /{id}: detail with full review list. Requires a verified caller
/// even though the payload is not owner-scoped.
async fn get_book(
    State(service): State<Arc<BookService>>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<BookDetailResponse>>, ApiError> {
    let detail = service.detail(id).await?;
    Ok(Json(Envelope::data(detail)))
}

/// POST /: create a book owned by the caller.
async fn create_book(
    State(service): State<Arc<BookService>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CreateBook>,
) -> Result<(StatusCode, Json<Envelope<BookResponse>>), ApiError> {
    let book = service.create(user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(book, "Book created successfully")),
    ))
}

/// PUT /{id}: owner-only update.
async fn update_book(
    State(service): State<Arc<BookService>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBook>,
) -> Result<Json<Envelope<BookResponse>>, ApiError> {
    let book = service.update(user_id, id, payload).await?;
    Ok(Json(Envelope::with_message(
        book,
        "Book updated successfully",
    )))
}

/// DELETE /{id}: owner-only delete, cascading to reviews.
async fn delete_book(
    State(service): State<Arc<BookService>>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    service.delete(user_id, id).await?;
    Ok(Json(Envelope::message("Book deleted successfully")))
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<MemoryStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
