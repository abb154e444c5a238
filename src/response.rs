//! Response bodies for resource routes.

use crate::store::Record;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Body of a successful delete.
#[derive(Serialize)]
pub struct DeleteBody {
    pub message: String,
    pub data: Vec<Record>,
}

/// Rows as a bare JSON array; create, list and update all answer this way.
pub fn records(rows: Vec<Record>) -> (StatusCode, Json<Vec<Record>>) {
    (StatusCode::OK, Json(rows))
}

pub fn record(row: Record) -> (StatusCode, Json<Record>) {
    (StatusCode::OK, Json(row))
}

pub fn deleted(label: &str, rows: Vec<Record>) -> (StatusCode, Json<DeleteBody>) {
    (
        StatusCode::OK,
        Json(DeleteBody {
            message: format!("{} deleted", label),
            data: rows,
        }),
    )
}
