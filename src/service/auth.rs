use crate::config::jwt_auth::{self, ADMIN_ROLE, SELF_SERVICE_ROLE};
use crate::controller::dispatch::{HandlerFuture, RequestContext};
use crate::error::ApiError;
use crate::models::response::DataResponse;
use crate::models::token_claims::{RefreshRequest, TokenPayload};
use crate::AppState;
use actix_web::web::Data;
use actix_web::HttpResponse;
use log::{info, warn};

pub fn issue_tokens(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let payload: TokenPayload = ctx.json()?;
        // Elevated roles are granted by admins only.
        if let Some(role) = payload.role.as_deref().filter(|r| *r != SELF_SERVICE_ROLE) {
            let caller = jwt_auth::authenticate(&state.issuer, ctx.access_token())?;
            jwt_auth::require_role(Some(&caller), ADMIN_ROLE).map_err(|e| {
                warn!("User {} tried to grant role {}", caller.user_id, role);
                e
            })?;
            info!(
                "User {} granted role {} to user {}",
                caller.user_id, role, payload.user_id
            );
        }
        let pair = state.issuer.issue(&payload)?;
        info!("Issued a token pair for user {}", payload.user_id);
        Ok(HttpResponse::Ok().json(pair))
    })
}

pub fn refresh_tokens(state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let request: RefreshRequest = ctx.json()?;
        let pair = state.issuer.refresh(&request.refresh_token).map_err(|e| {
            warn!("Refresh rejected: {}", e);
            ApiError::from(e)
        })?;
        Ok(HttpResponse::Ok().json(pair))
    })
}

pub fn current_session(_state: Data<AppState>, ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let identity = ctx
            .identity()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("You are not logged in".to_string()))?;
        Ok(HttpResponse::Ok().json(DataResponse::success(identity)))
    })
}
