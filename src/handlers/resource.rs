//! Resource CRUD handlers: list, create, read, update, delete.

use crate::config::{Operation, PkType, ResolvedResource};
use crate::error::AppError;
use crate::extractors::ResourceForm;
use crate::response;
use crate::state::AppState;
use crate::store::RecordId;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub fn parse_id(id_str: &str, pk_type: PkType) -> Result<RecordId, AppError> {
    Ok(match pk_type {
        PkType::Uuid => {
            let u = uuid::Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest("invalid uuid".into()))?;
            RecordId::Uuid(u)
        }
        PkType::BigInt | PkType::Int => {
            let n: i64 = id_str.parse().map_err(|_| AppError::BadRequest("invalid id".into()))?;
            RecordId::Int(n)
        }
        PkType::Text => RecordId::Text(id_str.to_string()),
    })
}

fn resource_for<'a>(state: &'a AppState, path_segment: &str, op: Operation) -> Result<&'a ResolvedResource, AppError> {
    let resource = state
        .model
        .resource_by_path(path_segment)
        .ok_or_else(|| AppError::UnknownResource(path_segment.to_string()))?;
    if !resource.allows(op) {
        return Err(AppError::BadRequest(format!("{} not allowed", op)));
    }
    Ok(resource)
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource_for(&state, &path_segment, Operation::List)?;
    let rows = state.crud.list(resource).await?;
    Ok(response::records(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    ResourceForm(payload): ResourceForm,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource_for(&state, &path_segment, Operation::Create)?;
    let rows = state.crud.create(resource, &payload).await?;
    Ok(response::records(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource_for(&state, &path_segment, Operation::Read)?;
    let id = parse_id(&id_str, resource.pk_type)?;
    let row = state.crud.read(resource, &id).await?;
    Ok(response::record(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    ResourceForm(payload): ResourceForm,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource_for(&state, &path_segment, Operation::Update)?;
    let id = parse_id(&id_str, resource.pk_type)?;
    let rows = state.crud.update(resource, &id, &payload).await?;
    Ok(response::records(rows))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource_for(&state, &path_segment, Operation::Delete)?;
    let id = parse_id(&id_str, resource.pk_type)?;
    let rows = state.crud.delete(resource, &id).await?;
    Ok(response::deleted(&resource.label, rows))
}
