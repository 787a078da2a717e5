//! Zone id lists: the built-in default set and user-supplied list files.

use std::path::Path;

use crate::error::Result;

/// Every IANA zone id known to the bundled database, in database order.
pub fn default_zone_ids() -> Vec<&'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect()
}

/// Parse a zone list: one id per line, `#` starts a comment, blank lines are
/// skipped.
pub fn parse_zone_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and parse a zone list file.
pub fn read_zone_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_zone_list(&text))
}
