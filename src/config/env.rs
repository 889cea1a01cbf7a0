//! Environment variable helpers.

/// Read an environment variable, falling back to `default` when unset or empty.
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read an environment variable, returning `None` when unset or empty.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// True only when the variable is set to the literal `"true"`.
///
/// Anything else, including "yes" or "1", is treated as false; the Makefile
/// interface has always used the literal string.
pub fn env_is_true(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| v == "true")
}
