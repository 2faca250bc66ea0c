use crate::AppState;
use actix_governor::{KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::web;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Rate-limit key: the client IP, read from `Forwarded`/`X-Forwarded-For`
/// only when the peer is the trusted reverse proxy.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RealIpKeyExtractor;

impl KeyExtractor for RealIpKeyExtractor {
    type Key = IpAddr;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let trusted_proxy = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.trusted_reverse_proxy_ip);
        let connection_info = req.connection_info();

        client_ip(
            req.peer_addr().map(|socket| socket.ip()),
            trusted_proxy,
            connection_info.realip_remote_addr(),
        )
        .ok_or_else(|| SimpleKeyExtractionError::new("Could not extract client IP address from request"))
    }
}

pub fn client_ip(
    peer: Option<IpAddr>,
    trusted_proxy: Option<IpAddr>,
    forwarded: Option<&str>,
) -> Option<IpAddr> {
    match peer {
        Some(peer) if Some(peer) == trusted_proxy => forwarded.and_then(parse_ip).or(Some(peer)),
        other => other,
    }
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    SocketAddr::from_str(raw)
        .map(|socket| socket.ip())
        .or_else(|_| IpAddr::from_str(raw))
        .ok()
}
