use std::collections::BTreeSet;

use chalkboard::recurrence::*;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
}

fn weekly(days: &[u8]) -> Recurrence {
    Recurrence::Weekly { days: days.iter().copied().collect() }
}

#[test]
fn test_daily_is_always_due() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for offset in 0..400 {
        let day = (start + Duration::days(offset)).and_hms_opt(12, 0, 0).unwrap();
        assert!(is_due_today(&Recurrence::Daily, day));
    }
}

#[test]
fn test_weekly_without_days_is_never_due() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for offset in 0..14 {
        let day = (start + Duration::days(offset)).and_hms_opt(8, 0, 0).unwrap();
        assert!(!is_due_today(&weekly(&[]), day));
    }
}

#[test]
fn test_weekly_mon_wed_fri() {
    let rule = weekly(&[1, 3, 5]);
    // 2024-03-10 is a Sunday.
    let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    for offset in 0..7 {
        let day = sunday + Duration::days(offset);
        let expected = matches!(offset, 1 | 3 | 5);
        assert_eq!(weekday_index(day), offset as u8);
        assert_eq!(is_due_today(&rule, day.and_hms_opt(9, 0, 0).unwrap()), expected, "day {}", day);
    }
}

#[test]
fn test_monthly_31_skips_short_months() {
    let rule = Recurrence::Monthly { day: Some(31) };
    assert!(is_due_today(&rule, at("2024-01-31", "10:00")));
    assert!(!is_due_today(&rule, at("2024-01-30", "10:00")));
    let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    for offset in 0..30 {
        assert!(!is_due_today(&rule, (april + Duration::days(offset)).and_hms_opt(10, 0, 0).unwrap()));
    }
    let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    for offset in 0..29 {
        assert!(!is_due_today(&rule, (feb + Duration::days(offset)).and_hms_opt(10, 0, 0).unwrap()));
    }
}

#[test]
fn test_monthly_without_day_is_never_due() {
    assert!(!is_due_today(&Recurrence::Monthly { day: None }, at("2024-05-01", "10:00")));
}

#[test]
fn test_specific_date() {
    let rule = Recurrence::SpecificDate { date: Some("2024-03-15".into()) };
    assert!(is_due_today(&rule, at("2024-03-15", "00:00")));
    assert!(is_due_today(&rule, at("2024-03-15", "23:59")));
    assert!(!is_due_today(&rule, at("2024-03-14", "12:00")));
    assert!(!is_due_today(&rule, at("2024-03-16", "12:00")));
    assert!(!is_due_today(&Recurrence::SpecificDate { date: None }, at("2024-03-15", "12:00")));
    assert!(!is_due_today(&Recurrence::SpecificDate { date: Some("2024-3-15".into()) }, at("2024-03-15", "12:00")));
}

#[test]
fn test_unknown_frequency_is_due() {
    let rule = Recurrence::from_columns(Some("fortnightly"), None, None, None);
    assert_eq!(rule, Recurrence::Unrecognized { raw: Some("fortnightly".into()) });
    assert!(is_due_today(&rule, at("2024-03-15", "12:00")));
    let missing = Recurrence::from_columns(None, Some(&[1]), Some(3), None);
    assert!(is_due_today(&missing, at("2024-03-16", "12:00")));
}

#[test]
fn test_from_columns_keys_off_frequency() {
    // Stale selector columns of other frequencies are ignored.
    let rule = Recurrence::from_columns(Some("monthly"), Some(&[0, 1, 2, 3, 4, 5, 6]), Some(15), Some("2024-03-15"));
    assert_eq!(rule, Recurrence::Monthly { day: Some(15) });

    let alias = Recurrence::from_columns(Some("few_days_per_week"), Some(&[2, 2, 9, -1]), None, None);
    assert_eq!(alias, Recurrence::Weekly { days: BTreeSet::from([2]) });

    let out_of_range = Recurrence::from_columns(Some("monthly"), None, Some(40), None);
    assert_eq!(out_of_range, Recurrence::Monthly { day: None });
}

#[test]
fn test_minutes_since_midnight() {
    assert_eq!(minutes_since_midnight(Some("09:30")), 570);
    assert_eq!(minutes_since_midnight(Some("09:30:00")), 570);
    assert_eq!(minutes_since_midnight(Some("00:00")), 0);
    assert!(minutes_since_midnight(None) > minutes_since_midnight(Some("23:59")));
    assert_eq!(minutes_since_midnight(Some("")), NO_DEADLINE);
    assert_eq!(minutes_since_midnight(Some("later")), NO_DEADLINE);
}

#[test]
fn test_overdue() {
    let nine = at("2024-03-12", "09:00");
    assert!(is_overdue(Some("08:00"), false, nine));
    assert!(!is_overdue(Some("08:00"), true, nine));
    assert!(!is_overdue(None, false, nine));
    assert!(!is_overdue(Some("09:00"), false, nine));
    assert!(!is_overdue(Some("garbage"), false, nine));
    assert!(!is_overdue(Some("23:59"), false, at("2024-03-12", "23:59")));
    assert!(!is_overdue(Some("23:59"), false, at("2024-03-13", "00:00")));
}

#[test]
fn test_board_order() {
    use std::cmp::Ordering;
    assert_eq!(board_order(Some("08:00"), "b", Some("09:00"), "a"), Ordering::Less);
    assert_eq!(board_order(None, "a", Some("23:59"), "z"), Ordering::Greater);
    assert_eq!(board_order(Some("08:00"), "Apple", Some("08:00:00"), "apple"), Ordering::Less);
    assert_eq!(board_order(None, "a", None, "b"), Ordering::Less);
}

#[test]
fn test_weekday_scenario() {
    let task = weekly(&[1, 2, 3, 4, 5]);
    let saturday = at("2024-03-16", "10:00");
    assert!(!is_due_today(&task, saturday));

    let tuesday = at("2024-03-12", "10:00");
    assert!(is_due_today(&task, tuesday));
    assert!(is_overdue(Some("09:00"), false, tuesday));
    assert!(!is_overdue(Some("09:00"), true, tuesday));
}

fn any_recurrence() -> impl Strategy<Value = Recurrence> {
    prop_oneof![
        Just(Recurrence::Daily),
        proptest::collection::btree_set(0_u8..7, 0..7).prop_map(|days| Recurrence::Weekly { days }),
        proptest::option::of(1_u32..=31).prop_map(|day| Recurrence::Monthly { day }),
        proptest::option::of("[0-9]{4}-[0-9]{2}-[0-9]{2}").prop_map(|date| Recurrence::SpecificDate { date }),
        proptest::option::of("[a-z_]{0,12}").prop_map(|raw| Recurrence::Unrecognized { raw }),
    ]
}

fn any_instant() -> impl Strategy<Value = NaiveDateTime> {
    (0_i64..3650, 0_u32..24, 0_u32..60).prop_map(|(d, h, m)| {
        (NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(d))
            .and_hms_opt(h, m, 0)
            .unwrap()
    })
}

proptest! {
    #[test]
    fn due_and_overdue_are_idempotent(rule in any_recurrence(), now in any_instant(), due in proptest::option::of("[0-9]{1,2}:[0-9]{2}(:[0-9]{2})?"), done in any::<bool>()) {
        prop_assert_eq!(is_due_today(&rule, now), is_due_today(&rule, now));
        prop_assert_eq!(is_overdue(due.as_deref(), done, now), is_overdue(due.as_deref(), done, now));
    }

    #[test]
    fn daily_always_due(now in any_instant()) {
        prop_assert!(is_due_today(&Recurrence::Daily, now));
    }

    #[test]
    fn completed_never_overdue(now in any_instant(), due in "[0-9]{2}:[0-9]{2}") {
        prop_assert!(!is_overdue(Some(due.as_str()), true, now));
    }

    #[test]
    fn weekly_matches_membership(days in proptest::collection::btree_set(0_u8..7, 0..7), now in any_instant()) {
        let expected = days.contains(&weekday_index(now.date()));
        prop_assert_eq!(is_due_today(&Recurrence::Weekly { days }, now), expected);
    }
}
