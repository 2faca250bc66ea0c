//! Explicit per-route step chains.
//!
//! Every [`Route`] owns an ordered list of [`Step`]s that run before its
//! terminal handler. A step either enriches the [`RequestContext`] and lets the
//! chain continue, or returns an error that becomes the response; the handler
//! only runs once every step has passed.

use crate::config::jwt_auth;
use crate::error::{ApiError, ApiResult};
use crate::models::token_claims::TokenPayload;
use crate::validation::{self, Document, ValidationError, ValidationSchema};
use crate::AppState;
use actix_web::http::Method;
use actix_web::web::{self, Bytes, Data};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures::future::LocalBoxFuture;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub type HandlerFuture = LocalBoxFuture<'static, ApiResult<HttpResponse>>;

pub type Handler = fn(Data<AppState>, RequestContext) -> HandlerFuture;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Parse the body as JSON and replace it with the validated document.
    Validate(&'static ValidationSchema),
    /// Require a valid access token and record its identity.
    Authenticate,
    /// Require the authenticated identity to carry this role.
    RequireRole(&'static str),
}

impl Step {
    pub fn run(&self, ctx: &mut RequestContext, state: &AppState) -> ApiResult<()> {
        match *self {
            Step::Validate(schema) => {
                let body = ctx.parse_body()?;
                ctx.body = Some(validation::validate(schema, &body)?);
            }
            Step::Authenticate => {
                let identity = jwt_auth::authenticate(&state.issuer, ctx.access_token.as_deref())?;
                ctx.identity = Some(identity);
            }
            Step::RequireRole(role) => jwt_auth::require_role(ctx.identity.as_ref(), role)?,
        }
        Ok(())
    }
}

pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub steps: Vec<Step>,
    pub handler: Handler,
}

impl Route {
    pub fn new(method: Method, path: &'static str, handler: Handler) -> Self {
        Route {
            method,
            path,
            steps: Vec::new(),
            handler,
        }
    }

    pub fn get(path: &'static str, handler: Handler) -> Self {
        Route::new(Method::GET, path, handler)
    }

    pub fn post(path: &'static str, handler: Handler) -> Self {
        Route::new(Method::POST, path, handler)
    }

    pub fn put(path: &'static str, handler: Handler) -> Self {
        Route::new(Method::PUT, path, handler)
    }

    pub fn delete(path: &'static str, handler: Handler) -> Self {
        Route::new(Method::DELETE, path, handler)
    }

    pub fn with(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

pub struct RequestContext {
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    access_token: Option<String>,
    raw_body: Bytes,
    body: Option<Document>,
    identity: Option<TokenPayload>,
}

impl RequestContext {
    pub fn new(req: &HttpRequest, raw_body: Bytes) -> Self {
        RequestContext {
            params: req
                .match_info()
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            query: web::Query::<HashMap<String, String>>::from_query(req.query_string())
                .map(web::Query::into_inner)
                .unwrap_or_default(),
            access_token: jwt_auth::access_token(req),
            raw_body,
            body: None,
            identity: None,
        }
    }

    pub fn param(&self, name: &str) -> ApiResult<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::Internal(format!("route has no `{name}` parameter")))
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn identity(&self) -> Option<&TokenPayload> {
        self.identity.as_ref()
    }

    /// The validated body if a `Validate` step ran, the raw body otherwise.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let value = match &self.body {
            Some(document) => Value::Object(document.clone()),
            None => self.parse_body()?,
        };
        serde_json::from_value(value).map_err(|e| ValidationError::body(e.to_string()).into())
    }

    fn parse_body(&self) -> ApiResult<Value> {
        if self.raw_body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Document::new()));
        }
        serde_json::from_slice(&self.raw_body)
            .map_err(|e| ValidationError::body(format!("malformed JSON: {e}")).into())
    }
}

pub async fn dispatch(
    route: Arc<Route>,
    req: HttpRequest,
    body: Bytes,
    state: Data<AppState>,
) -> HttpResponse {
    let mut ctx = RequestContext::new(&req, body);

    for step in &route.steps {
        if let Err(err) = step.run(&mut ctx, &state) {
            return error_response(&route, err);
        }
    }

    match (route.handler)(state, ctx).await {
        Ok(response) => response,
        Err(err) => error_response(&route, err),
    }
}

fn error_response(route: &Route, err: ApiError) -> HttpResponse {
    match &err {
        ApiError::Internal(cause) => {
            error!("{} {} failed: {}", route.method, route.path, cause)
        }
        other => debug!("{} {} rejected: {}", route.method, route.path, other),
    }
    err.error_response()
}
