//! Tests for transition discovery and per-year pairing.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use dst_engine::finder::{find_transition_instants, pair_by_year};
use dst_engine::{find_transitions, to_ranges, AdjustmentRule, DstError, TransitionRule, ZoneTable};

fn at(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn hours(h: i32) -> FixedOffset {
    FixedOffset::east_opt(h * 3600).unwrap()
}

fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn floating(month: u32, week: u8, weekday: Weekday, h: u32) -> TransitionRule {
    TransitionRule::floating(month, week, weekday, time(h)).unwrap()
}

/// Resolver that reports `daylight` inside any of `windows` and `standard`
/// elsewhere.
fn windowed(
    windows: Vec<(NaiveDateTime, NaiveDateTime)>,
    standard: i32,
    daylight: i32,
) -> impl Fn(NaiveDateTime) -> FixedOffset {
    move |local| {
        if windows.iter().any(|(s, e)| local >= *s && local < *e) {
            hours(daylight)
        } else {
            hours(standard)
        }
    }
}

fn constant(offset: i32) -> impl Fn(NaiveDateTime) -> FixedOffset {
    move |_| hours(offset)
}

/// Two one-year rules whose transitions fall on 2022-03-25, 2022-10-14,
/// 2023-03-27 and 2023-10-29.
fn two_year_rules() -> Vec<AdjustmentRule> {
    vec![
        AdjustmentRule::new(
            2022,
            2022,
            floating(3, 5, Weekday::Fri, 2),
            floating(10, 2, Weekday::Fri, 3),
        )
        .unwrap(),
        AdjustmentRule::new(
            2023,
            2023,
            floating(3, 5, Weekday::Mon, 2),
            floating(10, 5, Weekday::Sun, 3),
        )
        .unwrap(),
    ]
}

fn two_year_resolver() -> impl Fn(NaiveDateTime) -> FixedOffset {
    windowed(
        vec![
            (at(2022, 3, 25, 2), at(2022, 10, 14, 3)),
            (at(2023, 3, 27, 2), at(2023, 10, 29, 3)),
        ],
        2,
        3,
    )
}

// ---------------------------------------------------------------------------
// Concrete two-year scenario
// ---------------------------------------------------------------------------

#[test]
fn two_years_yield_two_pairs_with_offsets() {
    let pairs = find_transitions(2022, 2023, &two_year_rules(), &two_year_resolver())
        .expect("should find transitions");

    assert_eq!(pairs.len(), 2);

    assert_eq!(pairs[0].start.local, at(2022, 3, 25, 2));
    assert_eq!(pairs[0].start.old_offset, hours(2));
    assert_eq!(pairs[0].start.new_offset, hours(3));

    let end = pairs[0].end.expect("2022 should have an end transition");
    assert_eq!(end.local, at(2022, 10, 14, 3));
    assert_eq!(end.old_offset, hours(3));
    assert_eq!(end.new_offset, hours(2));

    assert_eq!(pairs[1].start.local, at(2023, 3, 27, 2));
    assert_eq!(pairs[1].end.unwrap().local, at(2023, 10, 29, 3));
}

#[test]
fn two_years_chain_into_three_ranges() {
    let pairs = find_transitions(2022, 2023, &two_year_rules(), &two_year_resolver()).unwrap();
    let mut table = ZoneTable::new();
    table.insert("Test/Zone", pairs);

    let ranges = to_ranges(&table);
    let zone = ranges.get("Test/Zone").unwrap();
    assert_eq!(zone.len(), 3);

    let bridge = &zone[1];
    assert_eq!(bridge.from().unwrap().local, at(2022, 10, 14, 3));
    assert_eq!(bridge.until().unwrap().local, at(2023, 3, 27, 2));
}

#[test]
fn end_year_bounds_the_search() {
    let pairs = find_transitions(2022, 2022, &two_year_rules(), &two_year_resolver()).unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs.iter().all(|p| p.start.local.year() == 2022));
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn no_rules_means_no_transitions() {
    let pairs = find_transitions(2000, 2030, &[], &constant(0)).unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn inverted_year_range_is_rejected() {
    assert!(matches!(
        find_transitions(2024, 2023, &two_year_rules(), &constant(0)),
        Err(DstError::InvalidYearRange {
            start: 2024,
            end: 2023
        })
    ));
}

#[test]
fn overlapping_rules_are_rejected() {
    let start = floating(3, 5, Weekday::Sun, 2);
    let end = floating(10, 5, Weekday::Sun, 3);
    let rules = vec![
        AdjustmentRule::new(2000, 2010, start, end).unwrap(),
        AdjustmentRule::new(2005, 2020, start, end).unwrap(),
    ];
    assert!(matches!(
        find_transitions(2000, 2020, &rules, &constant(0)),
        Err(DstError::OverlappingRules(2005))
    ));
}

#[test]
fn search_stops_at_first_uncovered_year() {
    let start = floating(3, 5, Weekday::Sun, 2);
    let end = floating(10, 5, Weekday::Sun, 3);
    let rules = vec![
        AdjustmentRule::new(2000, 2001, start, end).unwrap(),
        AdjustmentRule::new(2003, 2004, start, end).unwrap(),
    ];
    let instants = find_transition_instants(2000, 2004, &rules, &constant(1)).unwrap();
    assert_eq!(instants.len(), 4);
    assert!(instants.iter().all(|t| t.local.year() <= 2001));

    // Starting in a year with no rule finds nothing, even if later years have one.
    let none = find_transition_instants(2002, 2004, &rules, &constant(1)).unwrap();
    assert!(none.is_empty());
}

#[test]
fn southern_hemisphere_rule_yields_one_transition_per_year() {
    // DST starts in October and ends in April: the search from 1 January finds
    // the October start first and then moves straight to the next year.
    let rules = vec![AdjustmentRule::new(
        2022,
        2023,
        floating(10, 1, Weekday::Sun, 2),
        floating(4, 1, Weekday::Sun, 3),
    )
    .unwrap()];

    let pairs = find_transitions(2022, 2023, &rules, &constant(10)).unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|p| p.is_degenerate()));
    assert_eq!(pairs[0].start.local, at(2022, 10, 2, 2));
    assert_eq!(pairs[1].start.local, at(2023, 10, 1, 2));
}

#[test]
fn transition_on_cursor_is_emitted() {
    // A fixed 1 January start coincides with the initial cursor.
    let rules = vec![AdjustmentRule::new(
        2020,
        2020,
        TransitionRule::fixed(1, 1, NaiveTime::MIN).unwrap(),
        floating(10, 5, Weekday::Sun, 3),
    )
    .unwrap()];

    let instants = find_transition_instants(2020, 2020, &rules, &constant(1)).unwrap();
    assert_eq!(instants.len(), 2);
    assert_eq!(instants[0].local, at(2020, 1, 1, 0));
}

#[test]
fn identical_start_and_end_dates_collapse_to_one_transition() {
    let same = TransitionRule::fixed(6, 1, NaiveTime::MIN).unwrap();
    let rules = vec![AdjustmentRule::new(2021, 2021, same, same).unwrap()];

    let pairs = find_transitions(2021, 2021, &rules, &constant(0)).unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].is_degenerate());
}

#[test]
fn fixed_rules_ignore_time_of_day() {
    let rules = vec![AdjustmentRule::new(
        2019,
        2019,
        TransitionRule::fixed(3, 22, time(2)).unwrap(),
        TransitionRule::fixed(9, 22, time(3)).unwrap(),
    )
    .unwrap()];

    let instants = find_transition_instants(2019, 2019, &rules, &constant(3)).unwrap();
    assert_eq!(instants[0].local, at(2019, 3, 22, 0));
    assert_eq!(instants[1].local, at(2019, 9, 22, 0));
}

#[test]
fn next_year_start_never_precedes_cursor_at_rule_boundary() {
    // The 2022 end lands on the evening of 31 December, pushing the cursor into
    // 2023 past a 1 January start. The search must keep moving forward.
    let rules = vec![
        AdjustmentRule::new(
            2022,
            2022,
            floating(3, 5, Weekday::Sun, 2),
            floating(12, 5, Weekday::Sat, 23),
        )
        .unwrap(),
        AdjustmentRule::new(
            2023,
            2024,
            TransitionRule::fixed(1, 1, NaiveTime::MIN).unwrap(),
            TransitionRule::fixed(12, 31, NaiveTime::MIN).unwrap(),
        )
        .unwrap(),
    ];

    let instants = find_transition_instants(2022, 2024, &rules, &constant(1))
        .expect("boundary years should not regress");
    assert_eq!(instants[1].local, at(2022, 12, 31, 23));
    for window in instants.windows(2) {
        assert!(window[0].local < window[1].local);
    }
}

#[test]
fn offsets_are_sampled_six_hours_either_side() {
    // Distinct offsets exactly six hours before and after the change.
    let change = at(2024, 3, 31, 2);
    let resolver = move |local: NaiveDateTime| {
        if local == change - chrono::Duration::hours(6) {
            hours(5)
        } else if local == change + chrono::Duration::hours(6) {
            hours(7)
        } else {
            hours(0)
        }
    };
    let rules = vec![AdjustmentRule::new(
        2024,
        2024,
        floating(3, 5, Weekday::Sun, 2),
        floating(10, 5, Weekday::Sun, 3),
    )
    .unwrap()];

    let instants = find_transition_instants(2024, 2024, &rules, &resolver).unwrap();
    assert_eq!(instants[0].old_offset, hours(5));
    assert_eq!(instants[0].new_offset, hours(7));
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

#[test]
fn pairing_keeps_first_and_last_of_each_year() {
    let instant = |local| dst_engine::TransitionInstant {
        local,
        old_offset: hours(0),
        new_offset: hours(1),
    };
    let pairs = pair_by_year(vec![
        instant(at(2020, 3, 1, 2)),
        instant(at(2020, 5, 1, 2)),
        instant(at(2020, 10, 1, 2)),
        instant(at(2021, 4, 1, 2)),
    ]);

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].start.local, at(2020, 3, 1, 2));
    assert_eq!(pairs[0].end.unwrap().local, at(2020, 10, 1, 2));
    assert!(pairs[1].is_degenerate());
}
