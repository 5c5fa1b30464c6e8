use axum::extract::State;
use axum::{Extension, Json};

use crate::app::AppState;
use crate::auth::AuthenticatedCustomer;
use crate::domain::aggregates::Customer;
use crate::error::ApiError;

/// The customer behind the bearer token.
pub async fn me(State(s): State<AppState>, Extension(AuthenticatedCustomer(claims)): Extension<AuthenticatedCustomer>) -> Result<Json<Customer>, ApiError> {
    s.repos.customers.find(claims.sub).await?.map(Json).ok_or(ApiError::NotFound("customer"))
}
