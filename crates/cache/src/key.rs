use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Debug;

/// Build a canonical cache key from a base name and keyword-style arguments.
///
/// Arguments are sorted by name before concatenation, so argument order never
/// affects cache identity. If any value fails to serialize, the whole key
/// degrades to a content hash of the raw arguments; the caller never sees
/// an operational error from key construction.
pub fn canonical_key<T: Serialize + Debug>(base: &str, args: &[(&str, T)]) -> String {
    let mut sorted: Vec<&(&str, T)> = args.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let mut out = String::from(base);
    for (name, value) in sorted {
        match serde_json::to_string(value) {
            Ok(json) => {
                out.push(':');
                out.push_str(name);
                out.push('=');
                out.push_str(&json);
            }
            Err(err) => {
                log::warn!("Cache key argument '{name}' is not serializable ({err}); falling back to content hash");
                return hashed_key(base, args);
            }
        }
    }
    out
}

fn hashed_key<T: Debug>(base: &str, args: &[(&str, T)]) -> String {
    let mut sorted: Vec<&(&str, T)> = args.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    for (name, value) in sorted {
        hasher.update(b"|");
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(format!("{value:?}").as_bytes());
    }
    format!("{base}:{:x}", hasher.finalize())
}
