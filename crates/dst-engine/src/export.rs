//! Tab-separated serialization of validity ranges and zone lists.

use std::io::Write;

use chrono::FixedOffset;

use crate::error::Result;
use crate::finder::TransitionInstant;
use crate::range::{ValidityRange, ZoneTable};

/// Header row of the range files.
pub const RANGE_HEADER: [&str; 5] = [
    "timezone",
    "current_offset",
    "valid_from",
    "new_offset",
    "valid_until",
];

/// Header row of the zone-id list files.
pub const ZONE_LIST_HEADER: &str = "timezone";

/// Render an offset as `+H:MM:SS`, or `-H:MM:SS` for negative and zero offsets.
pub fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds > 0 { '+' } else { '-' };
    let abs = seconds.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        abs / 3600,
        (abs % 3600) / 60,
        abs % 60
    )
}

/// Render a transition as local `YYYY-MM-DDTHH:mm:ss` immediately followed by
/// the offset the wall clock showed at that moment.
pub fn format_timestamp(instant: &TransitionInstant) -> String {
    format!(
        "{}{}",
        instant.local.format("%Y-%m-%dT%H:%M:%S"),
        format_offset(instant.old_offset)
    )
}

/// Fields of the export row for one range, or `None` for a zero-width range.
pub fn range_row(zone: &str, range: &ValidityRange) -> Option<[String; 5]> {
    match range {
        ValidityRange::Opening { until } => Some([
            zone.to_string(),
            String::new(),
            String::new(),
            String::new(),
            format_timestamp(until),
        ]),
        ValidityRange::Bounded { from, until } => {
            if range.is_zero_width() {
                return None;
            }
            Some([
                zone.to_string(),
                format_offset(from.old_offset),
                format_timestamp(from),
                format_offset(from.new_offset),
                format_timestamp(until),
            ])
        }
        ValidityRange::OpenEnded { from } => Some([
            zone.to_string(),
            format_offset(from.old_offset),
            format_timestamp(from),
            format_offset(from.new_offset),
            String::new(),
        ]),
    }
}

/// Write the header and one row per non-zero-width range, returning the number
/// of data rows written.
pub fn write_ranges<W: Write>(writer: &mut W, table: &ZoneTable<Vec<ValidityRange>>) -> Result<usize> {
    writeln!(writer, "{}", RANGE_HEADER.join("\t"))?;

    let mut rows = 0;
    for (zone, ranges) in table.iter() {
        for row in ranges.iter().filter_map(|range| range_row(zone, range)) {
            writeln!(writer, "{}", row.join("\t"))?;
            rows += 1;
        }
    }
    Ok(rows)
}

/// Write the header and one zone id per line.
pub fn write_zone_list<W, S>(writer: &mut W, zones: &[S]) -> Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    writeln!(writer, "{}", ZONE_LIST_HEADER)?;
    for zone in zones {
        writeln!(writer, "{}", zone.as_ref())?;
    }
    Ok(())
}
