//! services/api/src/web/client_info.rs
//!
//! Server-observed facts about the requester: address, coarse location and
//! user agent. Everything here is best effort and taken from headers set by
//! whatever proxy or CDN sits in front of the service.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

const CITY_HEADERS: &[&str] = &["x-vercel-ip-city", "x-city"];
const REGION_HEADERS: &[&str] = &["x-vercel-ip-country-region", "x-region"];
const COUNTRY_HEADERS: &[&str] = &[
    "x-vercel-ip-country",
    "cloudfront-viewer-country",
    "cf-ipcountry",
    "x-country",
];

/// Location reported when no geolocation header is present.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Extracted per request by the analytics ingestion handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub location: String,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            ip_address: client_ip(headers, remote_addr),
            location: client_location(headers),
            user_agent: header_value(headers, header::USER_AGENT.as_str()).unwrap_or_default(),
        }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the server was started with connect info.
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, remote_addr))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// First non-empty value among `names`, in priority order.
fn first_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| header_value(headers, name))
        .find(|value| !value.trim().is_empty())
}

/// The first hop of the forwarding chain, or the socket peer address.
pub fn client_ip(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> String {
    match first_header(headers, &["x-forwarded-for", "x-real-ip"]) {
        Some(chain) => chain
            .split(',')
            .next()
            .map(|ip| ip.trim().to_string())
            .unwrap_or_default(),
        None => remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default(),
    }
}

/// City, region and country joined by `", "`, skipping the missing parts.
pub fn client_location(headers: &HeaderMap) -> String {
    let parts: Vec<String> = [CITY_HEADERS, REGION_HEADERS, COUNTRY_HEADERS]
        .into_iter()
        .filter_map(|names| first_header(headers, names))
        .collect();

    if parts.is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        parts.join(", ")
    }
}
