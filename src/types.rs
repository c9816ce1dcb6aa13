use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// How the tasks of one layer are executed.
///
/// - `Sequential`: one after another on the scheduler's own task
///   (deterministic completion order).
/// - `Parallel`: on a bounded worker pool; completion order inside a layer
///   is not deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Parallel
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(format!(
                "invalid mode: {other} (expected \"sequential\" or \"parallel\")"
            )),
        }
    }
}

/// Parse a duration with a unit suffix: `"250ms"`, `"3s"`, `"1m"`, `"2h"`.
///
/// Values that do not fit in a [`Duration`] are rejected rather than
/// wrapped.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' needs a unit (ms, s, m or h)"))?;
    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(format!("duration '{s}' has no number"));
    }

    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid number in duration '{s}': {e}"))?;
    let seconds_per_unit = match unit.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => return Err(format!("unknown duration unit '{other}'; expected ms, s, m or h")),
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
