//! Best-effort reverse DNS for display names.

use std::net::IpAddr;

/// Display name for `host`: its reverse-DNS name when `host` is an IP literal
/// that resolves, otherwise `host` itself. Never fails.
pub async fn display_name(host: &str) -> String {
    let Ok(ip) = host.parse::<IpAddr>() else {
        return host.to_string();
    };

    match tokio::task::spawn_blocking(move || reverse_lookup(ip)).await {
        Ok(Some(name)) => name,
        Ok(None) => host.to_string(),
        Err(e) => {
            tracing::debug!(host = %host, error = %e, "Reverse lookup task failed");
            host.to_string()
        }
    }
}

/// Blocking reverse lookup of `ip`. Returns `None` when no name is registered.
#[cfg(unix)]
pub fn reverse_lookup(ip: IpAddr) -> Option<String> {
    use std::ffi::CStr;

    let mut host = [0 as libc::c_char; libc::NI_MAXHOST as usize];
    let flags = libc::NI_NAMEREQD;

    // SAFETY: the sockaddr structs are fully initialised and outlive the call,
    // and `host` is a writable buffer whose length is passed alongside it.
    // getnameinfo NUL-terminates the buffer on success.
    let ret = unsafe {
        match ip {
            IpAddr::V4(v4) => {
                let mut addr: libc::sockaddr_in = std::mem::zeroed();
                addr.sin_family = libc::AF_INET as libc::sa_family_t;
                addr.sin_addr = libc::in_addr {
                    s_addr: u32::from_ne_bytes(v4.octets()),
                };
                libc::getnameinfo(
                    &addr as *const _ as *const libc::sockaddr,
                    std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
                    host.as_mut_ptr(),
                    host.len() as libc::socklen_t,
                    std::ptr::null_mut(),
                    0,
                    flags,
                )
            }
            IpAddr::V6(v6) => {
                let mut addr: libc::sockaddr_in6 = std::mem::zeroed();
                addr.sin6_family = libc::AF_INET6 as libc::sa_family_t;
                addr.sin6_addr = libc::in6_addr {
                    s6_addr: v6.octets(),
                };
                libc::getnameinfo(
                    &addr as *const _ as *const libc::sockaddr,
                    std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t,
                    host.as_mut_ptr(),
                    host.len() as libc::socklen_t,
                    std::ptr::null_mut(),
                    0,
                    flags,
                )
            }
        }
    };

    if ret != 0 {
        return None;
    }

    // SAFETY: getnameinfo succeeded, so `host` holds a NUL-terminated string.
    let name = unsafe { CStr::from_ptr(host.as_ptr()) }.to_string_lossy();
    normalize_name(&name)
}

#[cfg(not(unix))]
pub fn reverse_lookup(_ip: IpAddr) -> Option<String> {
    None
}

/// Trim the trailing root dot; empty names count as missing.
fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    (!name.is_empty()).then(|| name.to_string())
}
