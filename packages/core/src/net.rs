//! Local machine identity
//!
//! Resolves the address used to decide whether an inventory entry refers to
//! the machine running keyseed. Selection is a pure function over an address
//! list so it can be tested without real interfaces.

use std::net::{IpAddr, Ipv4Addr};

/// First IPv4 address that is not a loopback address, in iteration order
pub fn first_non_loopback_ipv4<I>(addrs: I) -> Option<Ipv4Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addrs.into_iter().find_map(|addr| match addr {
        IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
        _ => None,
    })
}

/// Resolve the local machine's non-loopback IPv4 address
///
/// Returns `None` when enumeration fails or no candidate exists. This is the
/// sole non-fatal error path in keyseed: without a local address, every
/// inventory entry is treated as remote and no key generation is scheduled.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => first_non_loopback_ipv4(interfaces.iter().map(|i| i.ip())),
        Err(e) => {
            tracing::warn!("Failed to enumerate network interfaces: {e}");
            None
        }
    }
}
