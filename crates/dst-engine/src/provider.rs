//! Timezone data providers.
//!
//! The finder only needs three things from a zone: whether it ever observes
//! DST, its adjustment rules, and a way to resolve its UTC offset at a local
//! instant. [`ZoneProvider`] is that seam; [`TzdbProvider`] implements it on
//! top of the IANA database shipped with `chrono-tz`.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::{DstError, Result};
use crate::finder::OffsetResolver;
use crate::rule::{days_in_month, resolve_transition_date, AdjustmentRule, TransitionRule};

/// Earliest year inspected when deciding whether a zone has ever observed DST.
const DST_HISTORY_START_YEAR: i32 = 1900;

/// Everything the finder needs to know about one zone.
pub struct ZoneRules {
    pub supports_dst: bool,
    pub rules: Vec<AdjustmentRule>,
    pub resolver: Box<dyn OffsetResolver>,
}

/// Source of per-zone adjustment rules.
pub trait ZoneProvider {
    /// Load a zone's rules, covering at least `start_year..=end_year`.
    ///
    /// # Errors
    /// Returns `DstError::UnknownTimezone` if the id cannot be resolved.
    fn load(&self, zone_id: &str, start_year: i32, end_year: i32) -> Result<ZoneRules>;
}

/// Provider backed by the `chrono-tz` copy of the IANA timezone database.
///
/// The database stores concrete transitions rather than abstract rules, so
/// adjustment rules are reconstructed year by year from the observed UTC
/// offset changes and merged into spans wherever one rule pair fits consecutive years.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzdbProvider;

impl ZoneProvider for TzdbProvider {
    fn load(&self, zone_id: &str, start_year: i32, end_year: i32) -> Result<ZoneRules> {
        let tz: Tz = zone_id
            .parse()
            .map_err(|_| DstError::UnknownTimezone(zone_id.to_string()))?;
        if start_year > end_year {
            return Err(DstError::InvalidYearRange {
                start: start_year,
                end: end_year,
            });
        }

        let supports_dst = observes_dst(&tz, end_year);
        let rules = if supports_dst {
            derive_rules(&tz, start_year, end_year)?
        } else {
            Vec::new()
        };

        Ok(ZoneRules {
            supports_dst,
            rules,
            resolver: Box::new(TzResolver::new(tz)),
        })
    }
}

/// Offset resolver over a `chrono-tz` zone.
#[derive(Debug, Clone, Copy)]
pub struct TzResolver {
    tz: Tz,
}

impl TzResolver {
    pub fn new(tz: Tz) -> Self {
        TzResolver { tz }
    }
}

impl OffsetResolver for TzResolver {
    /// Maps the local time to its earliest valid UTC instant. Local times that
    /// fall in a gap are pushed forward until they exist.
    fn offset_at(&self, local: NaiveDateTime) -> FixedOffset {
        let mut probe = local;
        // Gaps never exceed one day (Pacific/Apia skipped 2011-12-30).
        for _ in 0..=48 {
            if let Some(dt) = self.tz.from_local_datetime(&probe).earliest() {
                return dt.offset().fix();
            }
            probe += Duration::minutes(30);
        }
        self.tz.offset_from_utc_datetime(&local).fix()
    }
}

fn dst_active(tz: &Tz, utc: NaiveDateTime) -> bool {
    tz.offset_from_utc_datetime(&utc).dst_offset() != Duration::zero()
}

/// Whether the zone shows a DST component at any point up to `end_year`.
fn observes_dst(tz: &Tz, end_year: i32) -> bool {
    (DST_HISTORY_START_YEAR..=end_year).any(|year| {
        (1..=12).any(|month| {
            [1, 15].iter().any(|&day| {
                NaiveDate::from_ymd_opt(year, month, day)
                    .and_then(|d| d.and_hms_opt(12, 0, 0))
                    .is_some_and(|probe| dst_active(tz, probe))
            })
        })
    })
}

fn offset_at_utc(tz: &Tz, utc: NaiveDateTime) -> FixedOffset {
    tz.offset_from_utc_datetime(&utc).fix()
}

/// A UTC offset change, at local wall time before the change.
#[derive(Debug, Clone, Copy)]
struct OffsetChange {
    local: NaiveDateTime,
    /// The offset grows, i.e. clocks move forward.
    entering: bool,
}

/// Offset changes whose local time falls within `year`, in order.
///
/// Only the total UTC offset is compared. A relabelling between standard and
/// daylight time that leaves the offset unchanged is not a change, and zones
/// whose database marks winter as daylight time still enter in spring.
fn offset_changes_in_year(tz: &Tz, year: i32) -> Vec<OffsetChange> {
    let (Some(first), Some(next_first)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year + 1, 1, 1),
    ) else {
        return Vec::new();
    };

    // Probe a day either side so changes near midnight local time are seen
    // regardless of the zone's offset.
    let stop = next_first.and_time(NaiveTime::MIN) + Duration::days(1);
    let mut prev = first.and_time(NaiveTime::MIN) - Duration::days(1);
    let mut prev_offset = offset_at_utc(tz, prev);
    let mut changes = Vec::new();

    while prev < stop {
        let probe = prev + Duration::days(1);
        let offset = offset_at_utc(tz, probe);
        if offset != prev_offset {
            let utc = bisect_change(tz, prev, probe);
            let old_offset = offset_at_utc(tz, utc - Duration::seconds(1));
            let new_offset = offset_at_utc(tz, utc);
            let local = utc + Duration::seconds(i64::from(old_offset.local_minus_utc()));
            if local.year() == year && old_offset != new_offset {
                changes.push(OffsetChange {
                    local,
                    entering: new_offset.local_minus_utc() > old_offset.local_minus_utc(),
                });
            }
        }
        prev = probe;
        prev_offset = offset;
    }

    changes
}

/// First UTC second in `(lo, hi]` whose offset differs from the one at `lo`.
fn bisect_change(tz: &Tz, mut lo: NaiveDateTime, mut hi: NaiveDateTime) -> NaiveDateTime {
    let lo_offset = offset_at_utc(tz, lo);
    while hi - lo > Duration::seconds(1) {
        let mid = lo + Duration::seconds((hi - lo).num_seconds() / 2);
        if offset_at_utc(tz, mid) == lo_offset {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

/// Local start and end of `year`'s DST period.
///
/// A year with a single change uses it for both sides, so the finder emits
/// exactly that one transition for the year.
fn year_sides(tz: &Tz, year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let changes = offset_changes_in_year(tz, year);
    let start = changes.iter().find(|c| c.entering).map(|c| c.local);
    let end = changes.iter().rev().find(|c| !c.entering).map(|c| c.local);

    match (start, end) {
        (Some(start), Some(end)) => Some((start, end)),
        (Some(only), None) | (None, Some(only)) => Some((only, only)),
        (None, None) => None,
    }
}

/// Floating rule that lands on `local`; week 5 when it is the month's last
/// such weekday.
fn floating_rule_for(local: NaiveDateTime) -> Result<TransitionRule> {
    let day = local.day();
    let week = if day + 7 > days_in_month(local.year(), local.month()) {
        5
    } else {
        (day - 1) / 7 + 1
    };
    TransitionRule::floating(local.month(), week as u8, local.weekday(), local.time())
}

fn reproduces(rule: &TransitionRule, year: i32, expected: NaiveDateTime) -> bool {
    resolve_transition_date(rule, year).is_ok_and(|resolved| resolved == expected)
}

/// Pick the rule for the change at `local`, preferring the encoding that also
/// fits the following year.
fn pick_rule(local: NaiveDateTime, next: Option<(i32, NaiveDateTime)>) -> Result<TransitionRule> {
    let floating = floating_rule_for(local)?;
    if local.time() != NaiveTime::MIN {
        return Ok(floating);
    }
    let fixed = TransitionRule::fixed(local.month(), local.day(), NaiveTime::MIN)?;
    match next {
        Some((year, expected))
            if !reproduces(&floating, year, expected) && reproduces(&fixed, year, expected) =>
        {
            Ok(fixed)
        }
        _ => Ok(floating),
    }
}

/// Reconstruct adjustment rules for `start_year..=end_year`.
fn derive_rules(tz: &Tz, start_year: i32, end_year: i32) -> Result<Vec<AdjustmentRule>> {
    let years: Vec<(i32, Option<(NaiveDateTime, NaiveDateTime)>)> = (start_year..=end_year)
        .map(|year| (year, year_sides(tz, year)))
        .collect();

    let mut rules: Vec<AdjustmentRule> = Vec::new();
    for (idx, &(year, sides)) in years.iter().enumerate() {
        let Some((start, end)) = sides else {
            continue;
        };

        if let Some(last) = rules.last_mut() {
            if last.end_year == year - 1
                && reproduces(&last.daylight_start, year, start)
                && reproduces(&last.daylight_end, year, end)
            {
                last.end_year = year;
                continue;
            }
        }

        let next = years
            .get(idx + 1)
            .and_then(|&(y, s)| s.map(|sides| (y, sides)));
        let start_rule = pick_rule(start, next.map(|(y, s)| (y, s.0)))?;
        let end_rule = pick_rule(end, next.map(|(y, s)| (y, s.1)))?;
        rules.push(AdjustmentRule::new(year, year, start_rule, end_rule)?);
    }

    Ok(rules)
}
