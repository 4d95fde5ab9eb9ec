use std::env;
use std::ffi::OsStr;

/// The value of `key` if it is set and not blank.
pub fn non_empty<K: AsRef<OsStr>>(key: K) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
