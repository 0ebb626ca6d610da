//! Timeout configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout applied when none, or a zero one, is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout configuration attached to every request passing the middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time downstream processing may take (e.g. "100ms", "5s").
    /// Zero is replaced by [`DEFAULT_TIMEOUT`] when the middleware is built.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_TIMEOUT,
        }
    }
}

impl TimeoutConfig {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// The config the middleware actually enforces.
    pub fn effective(self) -> Self {
        if self.duration.is_zero() {
            Self::default()
        } else {
            self
        }
    }

    /// Duration as rendered in the `X-Timeout` header.
    pub fn duration_text(&self) -> String {
        format_duration(self.duration)
    }
}

/// Canonical duration text: `100ms`, `1.5s`, `2m0s`, `1h0m0s`.
///
/// Sub-second durations use the largest unit below a second that keeps the integer
/// part non-zero; longer ones are split into hours, minutes and fractional seconds.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let nanos = duration.as_nanos();
    if nanos < NANOS_PER_SEC {
        let (scale, unit) = match nanos {
            n if n < 1_000 => (1, "ns"),
            n if n < 1_000_000 => (1_000, "µs"),
            _ => (1_000_000, "ms"),
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let secs = duration.as_secs();
    let (hours, minutes) = (secs / 3600, secs / 60 % 60);
    let seconds = decimal(
        u128::from(secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos()),
        NANOS_PER_SEC,
    );

    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, m) => format!("{m}m{seconds}s"),
        (h, m) => format!("{h}h{m}m{seconds}s"),
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// `value / scale` with trailing zeros of the fraction dropped.
fn decimal(value: u128, scale: u128) -> String {
    let (whole, fraction) = (value / scale, value % scale);
    if fraction == 0 {
        return whole.to_string();
    }

    let width = scale.ilog10() as usize;
    let fraction = format!("{fraction:0width$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}
