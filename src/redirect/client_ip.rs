//! Client IP extraction for visit records
//!
//! Takes the first `X-Forwarded-For` entry when one parses, otherwise the
//! socket peer address. No proxy trust validation; the IP only feeds the
//! uniqueness approximation, it gates nothing.

use axum::http::HeaderMap;
use std::net::IpAddr;

pub fn extract_client_ip(headers: &HeaderMap, socket_addr: IpAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .unwrap_or(socket_addr)
}
