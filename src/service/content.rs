use crate::controller::dispatch::{HandlerFuture, RequestContext};
use crate::error::{ApiError, ApiResult};
use crate::models::response::{DataResponse, MessageResponse};
use crate::models::Resource;
use crate::validation::Document;
use crate::AppState;
use actix_web::web::Data;
use actix_web::HttpResponse;
use chrono::Utc;
use log::info;
use serde_json::Value;

pub fn list<R: Resource>(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let filter: Document = R::FILTERS
            .iter()
            .filter_map(|key| {
                ctx.query(key)
                    .map(|value| (key.to_string(), Value::String(value.to_string())))
            })
            .collect();
        let documents = state.repo.find_all(R::COLLECTION, filter).await?;
        Ok(HttpResponse::Ok().json(DataResponse::list(documents)))
    })
}

pub fn get<R: Resource>(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let id = ctx.param("id")?;
        let document = state
            .repo
            .find_by_id(R::COLLECTION, id)
            .await?
            .ok_or_else(not_found::<R>)?;
        Ok(HttpResponse::Ok().json(DataResponse::success(document)))
    })
}

pub fn create<R: Resource>(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let item: R = ctx.json()?;
        let created = insert(&state, &item).await?;
        Ok(HttpResponse::Created().json(DataResponse::success(created)))
    })
}

pub fn replace<R: Resource>(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let id = ctx.param("id")?;
        let item: R = ctx.json()?;
        let existing = state
            .repo
            .find_by_id(R::COLLECTION, id)
            .await?
            .ok_or_else(not_found::<R>)?;

        let now = Value::String(Utc::now().to_rfc3339());
        let mut document = to_document(&item)?;
        let created_at = existing.get("createdAt").cloned().unwrap_or_else(|| now.clone());
        document.insert("createdAt".to_string(), created_at);
        document.insert("updatedAt".to_string(), now);

        let updated = state
            .repo
            .replace(R::COLLECTION, id, document)
            .await?
            .ok_or_else(not_found::<R>)?;
        Ok(HttpResponse::Ok().json(DataResponse::success(updated)))
    })
}

pub fn delete<R: Resource>(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let id = ctx.param("id")?;
        if !state.repo.delete(R::COLLECTION, id).await? {
            return Err(not_found::<R>());
        }
        info!("Deleted {} {}", R::LABEL, id);
        Ok(HttpResponse::Ok().json(MessageResponse::success(format!(
            "{} deleted successfully",
            R::LABEL
        ))))
    })
}

/// Stamps `createdAt`/`updatedAt` and stores the item.
pub async fn insert<R: Resource>(state: &AppState, item: &R) -> ApiResult<Document> {
    let now = Value::String(Utc::now().to_rfc3339());
    let mut document = to_document(item)?;
    document.insert("createdAt".to_string(), now.clone());
    document.insert("updatedAt".to_string(), now);
    Ok(state.repo.insert(R::COLLECTION, document).await?)
}

fn to_document<R: Resource>(item: &R) -> ApiResult<Document> {
    match serde_json::to_value(item) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(ApiError::Internal(format!(
            "{} did not serialize to an object",
            R::LABEL
        ))),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::NotFound(format!("{} not found", R::LABEL))
}
