//! Mirror path derivation for downloaded images
//!
//! A downloaded image lands at a local path derived deterministically from the
//! path component of its address, rooted under the configured mirror
//! directory. `https://x.test/img/a.png` with root `_media` becomes
//! `_media/img/a.png`.

use std::path::{Component, Path, PathBuf};
use url::Url;

/// Derives the local file path for an image address under the mirror root
///
/// Percent-encoding is decoded where valid UTF-8, path segments are joined
/// verbatim, and any `..`/root components are dropped so the result can never
/// escape the mirror directory. An address whose path ends in `/` (or is
/// empty) falls back to an `index` file in that directory.
pub fn mirror_path(root: &Path, url: &Url) -> PathBuf {
    let decoded = percent_decode(url.path());
    let relative = decoded.trim_start_matches('/');

    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        // Keep only plain segments; url::Url has already resolved dot
        // segments, this guards against encoded ones.
        if let Component::Normal(segment) = component {
            path.push(segment);
        }
    }

    if relative.is_empty() || relative.ends_with('/') {
        path.push("index");
    }

    path
}

/// Decodes percent-encoded bytes, falling back to the raw text when the
/// decoded bytes are not valid UTF-8
fn percent_decode(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| path.to_string())
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
