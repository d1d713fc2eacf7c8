//! Client IP extraction from HTTP headers with trust validation
//!
//! This module implements client IP extraction that:
//! - Reads Cloudflare's CF-Connecting-IP when running behind Cloudflare
//! - Walks Forwarded / X-Forwarded-For chains right to left, skipping
//!   trusted proxy hops
//! - Falls back to the socket remote address when headers are absent or
//!   untrusted

use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv4Addr};
use tracing::warn;

use crate::config::{ProxyConfig, TrustedProxyMode};

/// Extract the client IP address for a request
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `socket_addr` - The socket remote address (fallback)
/// * `config` - Proxy trust settings
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: IpAddr, config: &ProxyConfig) -> IpAddr {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).unwrap_or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => {
            let chain = forwarded_chain(headers);
            select_from_chain(&chain, config).unwrap_or(socket_addr)
        }
        TrustedProxyMode::None => socket_addr,
    }
}

fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Client-to-proxy address chain, preferring RFC 7239 Forwarded over
/// X-Forwarded-For. Hops whose address is unknown or obfuscated stay in the
/// chain as `None` so hop counting remains positional.
fn forwarded_chain(headers: &HeaderMap) -> Vec<Option<IpAddr>> {
    let forwarded: Vec<Option<IpAddr>> = headers
        .get_all("forwarded")
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter(|element| !element.trim().is_empty())
        .map(|element| {
            element.split(';').find_map(|pair| {
                let (key, value) = pair.trim().split_once('=')?;
                key.trim()
                    .eq_ignore_ascii_case("for")
                    .then(|| parse_node(value))
            })?
        })
        .collect();

    if !forwarded.is_empty() {
        return forwarded;
    }

    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter(|node| !node.trim().is_empty())
        .map(parse_node)
        .collect()
}

/// Parse a node such as `192.0.2.1`, `"192.0.2.1:8080"` or `"[2001:db8::1]:443"`
fn parse_node(raw: &str) -> Option<IpAddr> {
    let node = raw.trim().trim_matches('"');

    if let Some(rest) = node.strip_prefix('[') {
        return rest.split(']').next()?.parse().ok();
    }
    if let Ok(ip) = node.parse::<IpAddr>() {
        return Some(ip);
    }
    let (host, _port) = node.rsplit_once(':')?;
    host.parse::<Ipv4Addr>().ok().map(IpAddr::V4)
}

/// Pick the client hop. `None` means the chosen hop is unknown and the
/// caller falls back to the socket address.
fn select_from_chain(chain: &[Option<IpAddr>], config: &ProxyConfig) -> Option<IpAddr> {
    if chain.is_empty() {
        return None;
    }

    // Skip a fixed number of hops from the right
    if let Some(num_trusted) = config.num_trusted_proxies {
        if chain.len() > num_trusted {
            return chain[chain.len() - num_trusted - 1];
        }
        return chain[0];
    }

    // Rightmost hop that is not one of our proxies; an unknown hop is never
    // trusted
    if !config.trusted_proxies.is_empty() {
        let is_trusted = |hop: &Option<IpAddr>| {
            hop.is_some_and(|ip| config.trusted_proxies.iter().any(|net| net.contains(&ip)))
        };
        return chain
            .iter()
            .rev()
            .find(|hop| !is_trusted(*hop))
            .copied()
            .unwrap_or(chain[0]);
    }

    chain[chain.len() - 1]
}
