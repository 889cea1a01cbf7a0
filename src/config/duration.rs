//! # Duration Parsing
//!
//! Handles parsing Go-syntax duration strings from timeout environment
//! variables ("30m", "1h", "2h30m").
//!
//! Timeout values originate in Makefiles and CI variables that predate this
//! harness, so the accepted syntax matches Go's `time.ParseDuration`: one or
//! more `<number><unit>` segments with units ns, us, ms, s, m, h. A bare
//! number without a unit is malformed. Malformed values never fail the caller;
//! they fall back to the documented default with an observable warning.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use tracing::warn;

use super::ValueSource;

/// Full-string shape check: one or more number+unit segments, nothing else.
static DURATION_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+(?:\.[0-9]+)?(?:ns|us|µs|ms|s|m|h))+$")
        .expect("duration shape regex is valid")
});

/// Segment extractor, applied after the shape check passes.
static DURATION_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<number>[0-9]+(?:\.[0-9]+)?)(?P<unit>ns|us|µs|ms|s|m|h)")
        .expect("duration segment regex is valid")
});

/// Parse a Go-syntax duration string ("30m", "1h", "2h30m", "90s").
///
/// Returns an error for empty strings, bare numbers, unknown units, and any
/// trailing garbage.
pub fn parse_go_duration(duration_str: &str) -> Result<Duration> {
    let trimmed = duration_str.trim();

    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("duration string cannot be empty"));
    }

    if !DURATION_SHAPE.is_match(trimmed) {
        return Err(anyhow::anyhow!(
            "invalid duration '{}'. Expected one or more <number><unit> segments \
             (e.g., '30m', '1h', '2h30m')",
            trimmed
        ));
    }

    let mut total = Duration::ZERO;
    for segment in DURATION_SEGMENT.captures_iter(trimmed) {
        let number: f64 = segment["number"].parse().map_err(|e| {
            anyhow::anyhow!("invalid number in duration '{}': {}", trimmed, e)
        })?;

        let unit_nanos: f64 = match &segment["unit"] {
            "ns" => 1.0,
            "us" | "µs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" => 60.0 * 1_000_000_000.0,
            "h" => 3_600.0 * 1_000_000_000.0,
            other => {
                return Err(anyhow::anyhow!(
                    "invalid unit '{}' in duration '{}'",
                    other,
                    trimmed
                ));
            }
        };

        let nanos = number * unit_nanos;
        if !nanos.is_finite() || nanos > u64::MAX as f64 {
            return Err(anyhow::anyhow!("duration '{}' overflows", trimmed));
        }
        total += Duration::from_nanos(nanos.round() as u64);
    }

    Ok(total)
}

/// Parse a duration-valued environment variable with fallback.
///
/// Empty or unset values resolve to `default` silently; malformed values
/// resolve to `default` with a warning naming the offending value. The
/// returned [`ValueSource`] tells diagnostics (and tests) whether the fallback
/// path was taken.
pub fn duration_from_env_with_source(var: &str, default: Duration) -> (Duration, ValueSource) {
    let Ok(raw) = std::env::var(var) else {
        return (default, ValueSource::Default);
    };
    if raw.is_empty() {
        return (default, ValueSource::Default);
    }

    match parse_go_duration(&raw) {
        Ok(parsed) => (parsed, ValueSource::Explicit),
        Err(_) => {
            warn!(
                "Invalid {} '{}', using default {:?}",
                var, raw, default
            );
            (default, ValueSource::Default)
        }
    }
}

/// Convenience wrapper over [`duration_from_env_with_source`] when the source
/// indicator is not needed.
pub fn duration_from_env(var: &str, default: Duration) -> Duration {
    duration_from_env_with_source(var, default).0
}
