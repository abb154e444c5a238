//! Typed bind values for the generated statements.

use crate::store::RecordId;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A value that can be bound to a PostgreSQL query.
#[derive(Clone, Debug)]
pub enum SqlParam {
    Int(i64),
    Uuid(uuid::Uuid),
    Text(String),
    /// Bound as `jsonb`.
    Json(serde_json::Value),
}

impl From<&RecordId> for SqlParam {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Int(n) => SqlParam::Int(*n),
            RecordId::Uuid(u) => SqlParam::Uuid(*u),
            RecordId::Text(s) => SqlParam::Text(s.clone()),
        }
    }
}

/// Bind every param in order onto `query`.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            SqlParam::Int(n) => query.bind(*n),
            SqlParam::Uuid(u) => query.bind(*u),
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::Json(v) => query.bind(v.clone()),
        };
    }
    query
}
