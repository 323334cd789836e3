use crate::{
    error::AppError,
    session::{bearer_token, SessionUser},
    view_cache::Lookup,
    AppState,
};
use actions::{ActionOutcome, AuthOutcome, CredentialsInput, InvoiceFormInput};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use core_types::{
    CardData, CustomerField, CustomersTableRow, InvoiceForm, InvoicesTableRow, LatestInvoice,
    Revenue,
};
use events::INVOICES_VIEW;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InvoiceSearch {
    #[serde(default)]
    query: String,
    #[serde(default = "default_page")]
    page: i64,
}
fn default_page() -> i64 { 1 }

#[derive(Debug, Deserialize)]
pub struct Search {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
pub struct InvoicesPage {
    pub invoices: Vec<InvoicesTableRow>,
    pub current_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub user: SessionUser,
}

/// Maps a write action's outcome onto HTTP.
fn action_response(outcome: ActionOutcome) -> Response {
    match outcome {
        ActionOutcome::Redirect { to } => Redirect::to(to).into_response(),
        ActionOutcome::Completed => StatusCode::NO_CONTENT.into_response(),
        ActionOutcome::Rejected(state) if state.errors.is_empty() => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(state)).into_response()
        }
        ActionOutcome::Rejected(state) => (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response(),
    }
}

/// # POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(input): Form<CredentialsInput>,
) -> Result<Json<LoginResponse>, AppError> {
    match state.authenticator.authenticate(&input).await {
        AuthOutcome::SignedIn(user) => {
            let token = state.sessions.create(&user);
            tracing::info!(user_id = %user.id, "Signed in.");
            Ok(Json(LoginResponse {
                token,
                user: SessionUser::from(&user),
            }))
        }
        AuthOutcome::Failed(message) => Err(AppError::Unauthorized(message.to_string())),
    }
}

/// # POST /api/logout
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(&token);
    }
    StatusCode::NO_CONTENT
}

/// # GET /api/dashboard/revenue
pub async fn get_revenue(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Revenue>>, AppError> {
    Ok(Json(state.db_repo.fetch_revenue().await?))
}

/// # GET /api/dashboard/latest-invoices
pub async fn get_latest_invoices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LatestInvoice>>, AppError> {
    Ok(Json(state.db_repo.fetch_latest_invoices().await?))
}

/// # GET /api/dashboard/cards
pub async fn get_card_data(State(state): State<Arc<AppState>>) -> Result<Json<CardData>, AppError> {
    Ok(Json(state.db_repo.fetch_card_data().await?))
}

/// # GET /api/dashboard/invoices?query=&page=
/// One page of the invoices table plus the page count. Served from the view cache
/// until an invoice is written.
pub async fn get_invoices(
    State(state): State<Arc<AppState>>,
    Query(search): Query<InvoiceSearch>,
) -> Result<Json<Value>, AppError> {
    let page = search.page.max(1);
    let key = format!("query={}&page={}", search.query, page);

    let generation = match state.view_cache.get(INVOICES_VIEW, &key) {
        Lookup::Hit(cached) => return Ok(Json(cached)),
        Lookup::Miss(generation) => generation,
    };

    let (invoices, total_pages) = tokio::try_join!(
        state.db_repo.fetch_filtered_invoices(&search.query, page),
        state.db_repo.fetch_invoices_pages(&search.query),
    )?;

    let body = json!(InvoicesPage {
        invoices,
        current_page: page,
        total_pages,
    });
    state.view_cache.insert(INVOICES_VIEW, &key, body.clone(), generation);
    Ok(Json(body))
}

/// # GET /api/dashboard/invoices/pages?query=
pub async fn get_invoices_pages(
    State(state): State<Arc<AppState>>,
    Query(search): Query<Search>,
) -> Result<Json<Value>, AppError> {
    let total_pages = state.db_repo.fetch_invoices_pages(&search.query).await?;
    Ok(Json(json!({ "total_pages": total_pages })))
}

/// # GET /api/dashboard/invoices/:id
pub async fn get_invoice(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<InvoiceForm>, AppError> {
    state
        .db_repo
        .fetch_invoice_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Invoice {id} not found")))
}

/// # POST /api/dashboard/invoices
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    Form(input): Form<InvoiceFormInput>,
) -> Response {
    action_response(state.invoice_actions.create_invoice(&input).await)
}

/// # PUT /api/dashboard/invoices/:id
pub async fn update_invoice(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Form(input): Form<InvoiceFormInput>,
) -> Response {
    action_response(state.invoice_actions.update_invoice(id, &input).await)
}

/// # DELETE /api/dashboard/invoices/:id
pub async fn delete_invoice(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Response {
    action_response(state.invoice_actions.delete_invoice(id).await)
}

/// # GET /api/dashboard/customers
pub async fn get_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CustomerField>>, AppError> {
    Ok(Json(state.db_repo.fetch_customers().await?))
}

/// # GET /api/dashboard/customers/table?query=
pub async fn get_customers_table(
    State(state): State<Arc<AppState>>,
    Query(search): Query<Search>,
) -> Result<Json<Vec<CustomersTableRow>>, AppError> {
    Ok(Json(state.db_repo.fetch_filtered_customers(&search.query).await?))
}
