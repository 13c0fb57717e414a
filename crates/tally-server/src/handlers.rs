//! Request handlers for the `/expenses` API.
//!
//! Each handler loads the whole document, works on it in memory and, for
//! writes, saves the whole document back while holding the state's write
//! lock.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tally_core::{CATEGORIES, Category, Expense, FixedExpense, MonthData, MonthSummary, save_month, summarize};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// `?user=U&month=M` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    pub user: Option<String>,
    pub month: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing(field))
}

/// Login body: `{isAuth: true, username, password}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// A submitted month before `user` and `month` are checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthSubmission {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    month: Option<String>,
    #[serde(default)]
    salary: f64,
    /// `null` and absent both mean empty.
    #[serde(default)]
    expenses: Option<Vec<Expense>>,
    #[serde(default)]
    fixed_expenses: Option<Vec<FixedExpense>>,
}

impl MonthSubmission {
    fn into_month(self) -> Result<MonthData, ApiError> {
        Ok(MonthData {
            user: required(self.user, "user")?,
            month: required(self.month, "month")?,
            salary: self.salary,
            expenses: self.expenses.unwrap_or_default(),
            fixed_expenses: self.fixed_expenses.unwrap_or_default(),
        })
    }
}

/// Public view of a user: no password.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_fixed_expenses: Option<Vec<FixedExpense>>,
}

/// The document as seen by one user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub users: Vec<UserView>,
    pub default_fixed_expenses: Vec<FixedExpense>,
    pub months: Vec<MonthData>,
    pub revision: u64,
}

/// `GET /expenses?user=U[&month=M]`
pub async fn get_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Json<Value>, ApiError> {
    let user = required(query.user, "user")?;
    let data = state.store().load().await?;
    let owner = data
        .user(&user)
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {user}")))?;

    if let Some(month) = query.month.filter(|m| !m.is_empty()) {
        let found = data
            .month(&user, &month)
            .ok_or_else(|| ApiError::NotFound("Month not found".to_string()))?;
        return Ok(Json(serde_json::to_value(found).map_err(internal)?));
    }

    let view = UserData {
        users: vec![UserView {
            username: owner.username.clone(),
            default_fixed_expenses: owner.default_fixed_expenses.clone(),
        }],
        default_fixed_expenses: data.default_fixed_expenses.clone(),
        months: data.months_for(&user).cloned().collect(),
        revision: data.revision,
    };
    Ok(Json(serde_json::to_value(view).map_err(internal)?))
}

/// `POST /expenses`: login when the body has `isAuth: true`, else save a month.
pub async fn post_expenses(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid JSON body: {e}")))?;

    if payload.get("isAuth") == Some(&Value::Bool(true)) {
        let req: AuthRequest = serde_json::from_value(payload)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid login body: {e}")))?;
        return login(&state, req).await;
    }

    let submission: MonthSubmission = serde_json::from_value(payload)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid month body: {e}")))?;
    save(&state, submission.into_month()?).await
}

async fn login(state: &AppState, req: AuthRequest) -> Result<Json<Value>, ApiError> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let _guard = state.lock_writes().await;
    let mut data = state.store().load().await?;
    let outcome = auth::authenticate(&mut data, &username, &password, state.hash_passwords())?;
    if outcome.modified() {
        state.store().save(&data).await?;
    }

    Ok(Json(json!({
        "success": true,
        "created": outcome.created,
        "username": username,
    })))
}

async fn save(state: &AppState, month: MonthData) -> Result<Json<Value>, ApiError> {
    let _guard = state.lock_writes().await;
    let mut data = state.store().load().await?;
    let stored = save_month(&mut data, month, state.policy())?;
    let revision = state.store().save(&data).await?;

    tracing::info!(user = %stored.user, month = %stored.month, revision, "Saved month");
    Ok(Json(json!({ "success": true, "data": stored })))
}

/// `DELETE /expenses?user=U&month=M`
pub async fn delete_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Json<Value>, ApiError> {
    let user = required(query.user, "user")?;
    let month = required(query.month, "month")?;

    let _guard = state.lock_writes().await;
    let mut data = state.store().load().await?;
    if !data.remove_month(&user, &month) {
        return Err(ApiError::NotFound("Month not found".to_string()));
    }
    state.store().save(&data).await?;

    tracing::info!(user = %user, month = %month, "Deleted month");
    Ok(Json(json!({ "success": true })))
}

/// `GET /expenses/summary?user=U&month=M`
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Json<MonthSummary>, ApiError> {
    let user = required(query.user, "user")?;
    let month = required(query.month, "month")?;

    let data = state.store().load().await?;
    let found = data
        .month(&user, &month)
        .ok_or_else(|| ApiError::NotFound("Month not found".to_string()))?;
    Ok(Json(summarize(found)))
}

/// `GET /categories`
pub async fn categories() -> Json<&'static [Category]> {
    Json(CATEGORIES)
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tally",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn internal(err: serde_json::Error) -> ApiError {
    ApiError::Internal(err.to_string())
}
