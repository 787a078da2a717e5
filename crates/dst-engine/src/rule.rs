//! Abstract DST adjustment rules and their resolution to concrete local dates.
//!
//! A zone's daylight-saving behaviour is described by a short list of
//! [`AdjustmentRule`]s, each valid for an inclusive span of years. Every rule
//! carries a start and an end [`TransitionRule`], which is either a fixed
//! calendar date or an "Nth weekday of month" rule.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::{DstError, Result};

/// When, within a year, a daylight-saving change happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRule {
    /// The same calendar date every year.
    ///
    /// `time` is carried for completeness but is not applied on resolution:
    /// fixed rules always resolve to midnight.
    Fixed { month: u32, day: u32, time: NaiveTime },
    /// The `week`-th `weekday` of `month`. Week 5 means "last": when a month has
    /// only four occurrences of the weekday the fourth is used.
    Floating {
        month: u32,
        week: u8,
        weekday: Weekday,
        time: NaiveTime,
    },
}

impl TransitionRule {
    /// Build a fixed-date rule, validating the month and day ranges.
    pub fn fixed(month: u32, day: u32, time: NaiveTime) -> Result<Self> {
        check_month(month)?;
        if !(1..=31).contains(&day) {
            return Err(DstError::InvalidRule(format!("day {} out of range", day)));
        }
        Ok(TransitionRule::Fixed { month, day, time })
    }

    /// Build a floating ("Nth weekday") rule, validating the month and week.
    pub fn floating(month: u32, week: u8, weekday: Weekday, time: NaiveTime) -> Result<Self> {
        check_month(month)?;
        if !(1..=5).contains(&week) {
            return Err(DstError::InvalidRule(format!("week {} out of range", week)));
        }
        Ok(TransitionRule::Floating {
            month,
            week,
            weekday,
            time,
        })
    }
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(DstError::InvalidRule(format!("month {} out of range", month)))
    }
}

/// A pair of start/end transition rules valid for `start_year..=end_year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentRule {
    pub start_year: i32,
    pub end_year: i32,
    pub daylight_start: TransitionRule,
    pub daylight_end: TransitionRule,
}

impl AdjustmentRule {
    pub fn new(
        start_year: i32,
        end_year: i32,
        daylight_start: TransitionRule,
        daylight_end: TransitionRule,
    ) -> Result<Self> {
        if start_year > end_year {
            return Err(DstError::InvalidYearRange {
                start: start_year,
                end: end_year,
            });
        }
        Ok(AdjustmentRule {
            start_year,
            end_year,
            daylight_start,
            daylight_end,
        })
    }

    pub fn covers(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// Local start and end transition moments of this rule in `year`.
    pub fn transitions_in(&self, year: i32) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((
            resolve_transition_date(&self.daylight_start, year)?,
            resolve_transition_date(&self.daylight_end, year)?,
        ))
    }
}

/// The rule covering `year`, if any.
pub fn rule_for_year(rules: &[AdjustmentRule], year: i32) -> Option<&AdjustmentRule> {
    rules.iter().find(|r| r.covers(year))
}

/// Check that rules are ordered by year and never overlap.
pub fn validate_rules(rules: &[AdjustmentRule]) -> Result<()> {
    for pair in rules.windows(2) {
        if pair[1].start_year <= pair[0].end_year {
            return Err(DstError::OverlappingRules(pair[1].start_year));
        }
    }
    Ok(())
}

/// Resolve a transition rule to the local date and time it fires in `year`.
///
/// Fixed rules resolve to midnight of their date. Floating rules start from
/// day `week * 7 - 6`, move forward to the requested weekday, and step back a
/// week if that overshoots the end of the month.
pub fn resolve_transition_date(rule: &TransitionRule, year: i32) -> Result<NaiveDateTime> {
    match *rule {
        TransitionRule::Fixed { month, day, .. } => NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| d.and_time(NaiveTime::MIN))
            .ok_or_else(|| {
                DstError::InvalidRule(format!("{:04}-{:02}-{:02} does not exist", year, month, day))
            }),
        TransitionRule::Floating {
            month,
            week,
            weekday,
            time,
        } => {
            if !(1..=5).contains(&week) {
                return Err(DstError::InvalidRule(format!("week {} out of range", week)));
            }
            let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                DstError::InvalidRule(format!("month {} of year {} does not exist", month, year))
            })?;
            let first_code = first.weekday().num_days_from_sunday();
            let target_code = weekday.num_days_from_sunday();
            let base = u32::from(week) * 7 - 6;

            let mut day = if first_code <= target_code {
                base + (target_code - first_code)
            } else {
                base + (7 - first_code + target_code)
            };
            if day > days_in_month(year, month) {
                day -= 7;
            }

            NaiveDate::from_ymd_opt(year, month, day)
                .map(|d| d.and_time(time))
                .ok_or_else(|| {
                    DstError::InvalidRule(format!("{:04}-{:02}-{:02} does not exist", year, month, day))
                })
        }
    }
}

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}
