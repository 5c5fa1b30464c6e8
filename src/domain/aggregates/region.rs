//! Region: a set of countries sharing currency and tax configuration

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub currency_code: String,
    /// Lower-case ISO 3166-1 alpha-2 codes.
    pub countries: Vec<String>,
}
