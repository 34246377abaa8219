//! Percent-encoding for downloaded file names and proxy URLs.
//!
//! Both encoders leave only the unreserved set (`A-Z a-z 0-9 - _ . ~`) as-is.
//! The proxy encoder additionally keeps the URL delimiters `:` `/` `@` `?`
//! so credentials and host survive.

mod proxy;
mod sanitize;

pub use proxy::encode_proxy_url;
pub use sanitize::{sanitize_file_name, sanitize_os_file_name};
