//! Proxy URL encoding.

/// Characters kept verbatim in a proxy URL besides the unreserved set.
const PROXY_SAFE: [char; 4] = [':', '/', '@', '?'];

/// Percent-encodes a proxy URL, keeping `:` `/` `@` `?` so the scheme,
/// credentials, host and port stay intact.
///
/// `http://user:p@ss word@host:8080` → `http://user:p@ss%20word@host:8080`
pub fn encode_proxy_url(proxy: &str) -> String {
    let mut out = String::with_capacity(proxy.len());
    let mut rest = proxy;
    while let Some(idx) = rest.find(PROXY_SAFE) {
        out.push_str(&urlencoding::encode(&rest[..idx]));
        // All safe characters are ASCII, so one byte.
        out.push_str(&rest[idx..idx + 1]);
        rest = &rest[idx + 1..];
    }
    out.push_str(&urlencoding::encode(rest));
    out
}
