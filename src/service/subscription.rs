use crate::controller::dispatch::{HandlerFuture, RequestContext};
use crate::error::ApiError;
use crate::models::response::DataResponse;
use crate::models::subscription::Subscription;
use crate::models::Resource;
use crate::service::content;
use crate::validation::Document;
use crate::AppState;
use actix_web::web::Data;
use actix_web::HttpResponse;
use log::info;
use serde_json::Value;

pub fn subscribe(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let subscription = ctx.json::<Subscription>()?.normalized();

        let mut filter = Document::new();
        filter.insert(
            "email".to_string(),
            Value::String(subscription.email.clone()),
        );
        if state
            .repo
            .find_one(Subscription::COLLECTION, filter)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(
                "This email is already subscribed".to_string(),
            ));
        }

        let created = content::insert(&state, &subscription).await?;
        info!("New newsletter subscription");
        Ok(HttpResponse::Created().json(DataResponse::success(created)))
    })
}
