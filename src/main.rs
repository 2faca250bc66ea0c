use crate::config::config::Config;
use crate::config::jwt_auth::ADMIN_ROLE;
use crate::controller::dispatch::Route;
use crate::models::response::{ErrorResponse, MessageResponse};
use crate::models::token_claims::TokenPayload;
use crate::repository::database::Database;
use crate::repository::Repository;
use crate::util::real_ip_key_extractor::RealIpKeyExtractor;
use crate::util::token::TokenIssuer;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::middleware::Logger;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder, Result};
use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::fmt::Display;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;

mod config;
mod controller;
mod error;
mod models;
mod repository;
mod service;
mod util;
mod validation;

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse::success(
        "Everything is working as expected",
    ))
}

async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(ErrorResponse::failed("Resource not found")))
}

pub struct AppState {
    repo: Arc<dyn Repository>,
    issuer: TokenIssuer,
    trusted_reverse_proxy_ip: IpAddr,
}

fn init_logging() {
    if log4rs::init_file("./log-config.yml", Default::default()).is_ok() {
        return;
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let fallback = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    if let Ok(fallback) = fallback {
        let _ = log4rs::init_config(fallback);
    }
}

fn fatal(stage: &str, err: impl Display) -> io::Error {
    error!("{} failed: {}", stage, err);
    io::Error::new(io::ErrorKind::Other, format!("{stage} failed: {err}"))
}

/// `issue-admin <user-id> <email>`: prints an admin token pair and exits.
/// Admin roles cannot be self-issued over HTTP, so the first one comes from here.
fn issue_admin(issuer: &TokenIssuer, mut args: impl Iterator<Item = String>) -> io::Result<()> {
    let (Some(user_id), Some(email)) = (args.next(), args.next()) else {
        return Err(fatal("issue-admin", "usage: issue-admin <user-id> <email>"));
    };
    let pair = issuer
        .issue(&TokenPayload {
            user_id,
            email,
            role: Some(ADMIN_ROLE.to_string()),
        })
        .map_err(|e| fatal("issue-admin", e))?;
    let rendered = serde_json::to_string_pretty(&pair).map_err(|e| fatal("issue-admin", e))?;
    println!("{rendered}");
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_logging();

    let config = Config::init().map_err(|e| fatal("configuration", e))?;
    let issuer = TokenIssuer::new(&config.tokens).map_err(|e| fatal("token setup", e))?;

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("issue-admin") {
        return issue_admin(&issuer, args);
    }

    let db = Database::connect(&config)
        .await
        .map_err(|e| fatal("database connection", e))?;

    let app_data = web::Data::new(AppState {
        repo: Arc::new(db),
        issuer,
        trusted_reverse_proxy_ip: config.trusted_reverse_proxy_ip,
    });

    let routes: Arc<[Arc<Route>]> = controller::handler::route_table()
        .into_iter()
        .map(Arc::new)
        .collect();

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second)
        .burst_size(config.rate_limit_burst)
        .key_extractor(RealIpKeyExtractor)
        .finish()
        .ok_or_else(|| fatal("rate limiter setup", "per-second and burst values must be non-zero"))?;

    info!(
        "Serving {} routes on {}:{}",
        routes.len(),
        config.host,
        config.port
    );

    HttpServer::new(move || {
        let routes = Arc::clone(&routes);
        App::new()
            .app_data(app_data.clone())
            .configure(|cfg| controller::handler::config(cfg, &routes))
            .service(health_check)
            .default_service(web::route().to(not_found))
            .wrap(Logger::default())
            .wrap(Governor::new(&governor_conf))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
