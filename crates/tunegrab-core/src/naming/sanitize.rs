//! File name sanitization by percent-encoding.

use std::ffi::OsStr;

/// Percent-encodes a file name; the result is used as the real on-disk name.
///
/// Every byte outside `A-Z a-z 0-9 - _ . ~` becomes `%XX`, spaces included.
/// Deterministic but not idempotent: encoding twice turns `%` into `%25`.
pub fn sanitize_file_name(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Same as [`sanitize_file_name`] for names that may not be valid UTF-8.
/// On Unix the raw bytes are encoded, so no information is lost.
pub fn sanitize_os_file_name(name: &OsStr) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        urlencoding::encode_binary(name.as_bytes()).into_owned()
    }
    #[cfg(not(unix))]
    {
        sanitize_file_name(&name.to_string_lossy())
    }
}
