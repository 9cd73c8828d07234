use std::convert::Infallible;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Which binary a scenario step invokes.
///
/// - `Previous`: the release downloaded into the scratch directory.
/// - `Current`: the binary under test (`[binaries].current` or `--current`).
/// - `Path`: anything else, taken literally after template rendering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BinaryRef {
    Previous,
    Current,
    Path(String),
}

impl From<String> for BinaryRef {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "previous" => BinaryRef::Previous,
            "current" => BinaryRef::Current,
            _ => BinaryRef::Path(s),
        }
    }
}

impl FromStr for BinaryRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BinaryRef::from(s.to_string()))
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"20m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
