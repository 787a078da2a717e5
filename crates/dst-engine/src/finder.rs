//! Discover every DST transition instant of a zone within a year window.
//!
//! Walks a cursor forward from 1 January of the start year, asking the zone's
//! adjustment rules for the next transition at or after the cursor, until the
//! rules run out or the transition falls after the end year. The flat list is
//! then folded into one [`YearTransitionPair`] per calendar year.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DstError, Result};
use crate::rule::{resolve_transition_date, rule_for_year, validate_rules, AdjustmentRule};

/// Distance from a transition at which old and new offsets are sampled.
/// Far enough to be clear of the gap or fold around the change itself.
const OFFSET_PROBE_MARGIN_HOURS: i64 = 6;

/// Resolves a zone's UTC offset for a local wall-clock instant.
pub trait OffsetResolver {
    fn offset_at(&self, local: NaiveDateTime) -> FixedOffset;
}

impl<F> OffsetResolver for F
where
    F: Fn(NaiveDateTime) -> FixedOffset,
{
    fn offset_at(&self, local: NaiveDateTime) -> FixedOffset {
        self(local)
    }
}

/// A single offset change, at local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionInstant {
    /// Local time at which the change happens (not UTC).
    pub local: NaiveDateTime,
    /// Offset in force before the change.
    pub old_offset: FixedOffset,
    /// Offset in force after the change.
    pub new_offset: FixedOffset,
}

/// First and last transition of one calendar year.
///
/// A year with a single transition carries it in both `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTransitionPair {
    pub start: TransitionInstant,
    pub end: Option<TransitionInstant>,
}

impl YearTransitionPair {
    /// True when the year contributed only one transition.
    pub fn is_degenerate(&self) -> bool {
        self.end.is_some_and(|end| end.local == self.start.local)
    }
}

/// Find all transitions in `start_year..=end_year`, paired per calendar year.
///
/// An empty `rules` slice yields an empty result.
///
/// # Errors
/// Returns `DstError::InvalidYearRange` if `start_year > end_year`,
/// `DstError::OverlappingRules` if the rules are unordered or overlap, and
/// `DstError::InvalidRule` if a rule resolves to a date that does not exist.
pub fn find_transitions<R>(
    start_year: i32,
    end_year: i32,
    rules: &[AdjustmentRule],
    resolver: &R,
) -> Result<Vec<YearTransitionPair>>
where
    R: OffsetResolver + ?Sized,
{
    let instants = find_transition_instants(start_year, end_year, rules, resolver)?;
    Ok(pair_by_year(instants))
}

/// Find all transitions in `start_year..=end_year` as a flat chronological list.
pub fn find_transition_instants<R>(
    start_year: i32,
    end_year: i32,
    rules: &[AdjustmentRule],
    resolver: &R,
) -> Result<Vec<TransitionInstant>>
where
    R: OffsetResolver + ?Sized,
{
    if start_year > end_year {
        return Err(DstError::InvalidYearRange {
            start: start_year,
            end: end_year,
        });
    }
    validate_rules(rules)?;

    let margin = Duration::hours(OFFSET_PROBE_MARGIN_HOURS);
    let mut cursor = NaiveDate::from_ymd_opt(start_year, 1, 1)
        .ok_or(DstError::InvalidYearRange {
            start: start_year,
            end: end_year,
        })?
        .and_time(NaiveTime::MIN);

    let mut instants = Vec::new();
    while let Some(local) = next_transition(cursor, rules)? {
        if local.year() > end_year {
            break;
        }
        instants.push(TransitionInstant {
            local,
            old_offset: resolver.offset_at(local - margin),
            new_offset: resolver.offset_at(local + margin),
        });
        cursor = local + Duration::days(1);
    }

    Ok(instants)
}

/// The next transition at or after `cursor`, or `None` once no rule applies.
fn next_transition(
    cursor: NaiveDateTime,
    rules: &[AdjustmentRule],
) -> Result<Option<NaiveDateTime>> {
    let year = cursor.year();
    let Some(rule) = rule_for_year(rules, year) else {
        return Ok(None);
    };

    let (start, end) = rule.transitions_in(year)?;
    if start >= cursor {
        return Ok(Some(start));
    }
    if end >= cursor {
        return Ok(Some(end));
    }

    // Both of this year's transitions are behind us: take next year's start.
    let Some(next_rule) = rule_for_year(rules, year + 1) else {
        return Ok(None);
    };
    let next_start = resolve_transition_date(&next_rule.daylight_start, year + 1)?;
    if next_start < cursor {
        return Err(DstError::NonMonotonicTransition {
            cursor,
            found: next_start,
        });
    }
    Ok(Some(next_start))
}

/// Group chronological transitions by calendar year and keep each year's first
/// and last. Year order follows first appearance.
pub fn pair_by_year(instants: Vec<TransitionInstant>) -> Vec<YearTransitionPair> {
    let mut groups: Vec<(i32, Vec<TransitionInstant>)> = Vec::new();
    for instant in instants {
        let year = instant.local.year();
        match groups.iter_mut().find(|(y, _)| *y == year) {
            Some((_, group)) => group.push(instant),
            None => groups.push((year, vec![instant])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(_, group)| {
            let first = *group.first()?;
            let last = *group.last()?;
            Some(YearTransitionPair {
                start: first,
                end: Some(last),
            })
        })
        .collect()
}
