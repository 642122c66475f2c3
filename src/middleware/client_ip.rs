use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::Request};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// 取客户端标识：x-real-ip，其次 x-forwarded-for 第一个非空地址，再次连接地址，最后为 "unknown"
pub fn client_identifier<B>(req: &Request<B>) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let forwarded = || {
        header("x-forwarded-for")
            .and_then(|s| s.split(',').map(str::trim).find(|ip| !ip.is_empty()))
    };

    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    header("x-real-ip")
        .or_else(forwarded)
        .map(str::to_string)
        .or(remote_ip)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
