//! Routine compliance engine (PRD-05): deadline calculation, completion
//! status classification, and schedule applicability.
//!
//! Every function here is pure. Deadlines are computed from a calendar
//! date, a time-of-day slot, and an IANA timezone, then stored and
//! compared as UTC instants; the caller's wall clock never participates.

use chrono::{Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Hours between the on-time deadline and the end of the grace period.
/// The grace window is a fixed absolute duration, not "end of next day".
pub const GRACE_PERIOD_HOURS: i64 = 24;

/// Full English weekday names, the only accepted spelling for schedule
/// day lists. Matching is case-sensitive.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Slot of the day a routine step belongs to. Determines the local
/// wall-clock anchor of the on-time deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
        }
    }

    /// Local wall-clock anchor for the on-time deadline: noon for morning
    /// steps, the last millisecond of the day for evening steps.
    fn deadline_anchor(self) -> NaiveTime {
        let anchor = match self {
            TimeOfDay::Morning => NaiveTime::from_hms_opt(12, 0, 0),
            TimeOfDay::Evening => NaiveTime::from_hms_milli_opt(23, 59, 59, 999),
        };
        // Both literals are in range.
        anchor.unwrap_or(NaiveTime::MIN)
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(TimeOfDay::Morning),
            "evening" => Ok(TimeOfDay::Evening),
            other => Err(CoreError::validation(format!(
                "Unknown time of day: '{other}' (expected 'morning' or 'evening')"
            ))),
        }
    }
}

/// Lifecycle state of a single scheduled routine step occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    /// Scheduled but not yet completed, grace period still open.
    Pending,
    /// Completed at or before the on-time deadline.
    OnTime,
    /// Completed after the on-time deadline but within the grace period.
    Late,
    /// Grace period elapsed without completion.
    Missed,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionStatus::Pending => "pending",
            CompletionStatus::OnTime => "on-time",
            CompletionStatus::Late => "late",
            CompletionStatus::Missed => "missed",
        }
    }

    /// Whether this status counts as a fulfilled step for streak purposes.
    /// Late completions still count; pending and missed do not.
    pub fn is_fulfilled(self) -> bool {
        matches!(self, CompletionStatus::OnTime | CompletionStatus::Late)
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompletionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CompletionStatus::Pending),
            "on-time" => Ok(CompletionStatus::OnTime),
            "late" => Ok(CompletionStatus::Late),
            "missed" => Ok(CompletionStatus::Missed),
            other => Err(CoreError::validation(format!(
                "Unknown completion status: '{other}'"
            ))),
        }
    }
}

/// How often a routine product is applied.
///
/// Serialized as a token: `daily`, `1x_week` through `6x_week`, or
/// `specific_days`. Every non-daily frequency relies on an explicit
/// weekday list to decide applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Daily,
    /// 1 through 6 applications per week, on the listed weekdays.
    PerWeek(u8),
    SpecificDays,
}

impl Frequency {
    pub const MIN_PER_WEEK: u8 = 1;
    pub const MAX_PER_WEEK: u8 = 6;

    pub fn as_token(self) -> String {
        match self {
            Frequency::Daily => "daily".to_string(),
            Frequency::PerWeek(n) => format!("{n}x_week"),
            Frequency::SpecificDays => "specific_days".to_string(),
        }
    }

    /// Whether this frequency needs a weekday list to ever apply.
    pub fn requires_days(self) -> bool {
        !matches!(self, Frequency::Daily)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_token())
    }
}

impl std::str::FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => return Ok(Frequency::Daily),
            "specific_days" => return Ok(Frequency::SpecificDays),
            _ => {}
        }
        if let Some(count) = s.strip_suffix("x_week") {
            if let Ok(n) = count.parse::<u8>() {
                if (Self::MIN_PER_WEEK..=Self::MAX_PER_WEEK).contains(&n) {
                    return Ok(Frequency::PerWeek(n));
                }
            }
        }
        Err(CoreError::validation(format!(
            "Unknown frequency: '{s}' (expected 'daily', '1x_week'..'6x_week', or 'specific_days')"
        )))
    }
}

impl TryFrom<String> for Frequency {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.as_token()
    }
}

// ---------------------------------------------------------------------------
// Deadline calculation
// ---------------------------------------------------------------------------

/// The scheduling-relevant slice of a routine product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub frequency: Frequency,
    /// Full English weekday names. Ignored for `Daily`.
    pub days: Option<Vec<String>>,
}

/// Deadline pair for one scheduled occurrence, both as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDeadlines {
    pub on_time_deadline: Timestamp,
    pub grace_period_end: Timestamp,
}

/// Compute the on-time deadline and grace period end for a routine step
/// scheduled on `scheduled_date` in the subscriber's `timezone`.
///
/// The wall-clock anchor (noon or 23:59:59.999) is interpreted in the
/// given zone using that zone's UTC offset on that date, so DST is
/// handled by the zone database rather than a stored fixed offset. The
/// grace period end is exactly [`GRACE_PERIOD_HOURS`] after the on-time
/// deadline in absolute time, even across a DST transition.
pub fn calculate_deadlines(
    scheduled_date: NaiveDate,
    time_of_day: TimeOfDay,
    timezone: &str,
) -> Result<StepDeadlines, CoreError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))?;
    let local = scheduled_date.and_time(time_of_day.deadline_anchor());
    let on_time_deadline = resolve_local(tz, local)?;
    Ok(StepDeadlines {
        on_time_deadline,
        grace_period_end: on_time_deadline + Duration::hours(GRACE_PERIOD_HOURS),
    })
}

/// Widest DST gap probed before giving up. 48 hours covers every zone in
/// the IANA database, including whole-day skips from date-line moves.
const MAX_GAP_PROBE_HOURS: i64 = 48;

/// Map a wall-clock time in `tz` to a single UTC instant.
///
/// A fall-back transition makes the wall time ambiguous; the earlier
/// instant wins. A spring-forward transition can skip the wall time
/// entirely; the post-transition offset is then applied, found by probing
/// forward one hour at a time.
fn resolve_local(tz: Tz, local: NaiveDateTime) -> Result<Timestamp, CoreError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            for hours in 1..=MAX_GAP_PROBE_HOURS {
                let probe = local + Duration::hours(hours);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return Ok(dt.with_timezone(&Utc) - Duration::hours(hours));
                }
            }
            Err(CoreError::Internal(format!(
                "No UTC mapping for {local} in {tz}"
            )))
        }
    }
}

/// The calendar date it is in `timezone` at instant `at`. Occurrence
/// generation and the streak walk both anchor to this, never to the
/// server's own date.
pub fn local_date_in(timezone: &str, at: Timestamp) -> Result<NaiveDate, CoreError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))?;
    Ok(at.with_timezone(&tz).date_naive())
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

/// Classify a completion timestamp against a deadline pair. Both
/// boundaries are inclusive: completing exactly at the on-time deadline
/// is on time, exactly at the grace period end is late.
pub fn determine_status(
    completed_at: Timestamp,
    on_time_deadline: Timestamp,
    grace_period_end: Timestamp,
) -> CompletionStatus {
    if completed_at <= on_time_deadline {
        CompletionStatus::OnTime
    } else if completed_at <= grace_period_end {
        CompletionStatus::Late
    } else {
        CompletionStatus::Missed
    }
}

// ---------------------------------------------------------------------------
// Schedule applicability
// ---------------------------------------------------------------------------

/// Whether a routine step applies on `date`.
///
/// Daily steps apply every day regardless of any weekday list. All other
/// frequencies apply only when the date's full English weekday name is in
/// the list (case-sensitive); an absent or empty list never applies.
/// `date` is a calendar date in the subscriber's timezone.
pub fn should_generate_for_date(policy: &SchedulePolicy, date: NaiveDate) -> bool {
    if policy.frequency == Frequency::Daily {
        return true;
    }
    match &policy.days {
        Some(days) if !days.is_empty() => {
            let name = weekday_name(date);
            days.iter().any(|day| day == name)
        }
        _ => false,
    }
}

/// Full English weekday name for a date, matching [`WEEKDAY_NAMES`].
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> Timestamp {
        utc(y, m, d, h, min, s) + Duration::milliseconds(ms as i64)
    }

    // -- calculate_deadlines ------------------------------------------------

    #[test]
    fn morning_deadline_london_winter() {
        let deadlines =
            calculate_deadlines(date(2025, 1, 15), TimeOfDay::Morning, "Europe/London").unwrap();
        assert_eq!(deadlines.on_time_deadline, utc(2025, 1, 15, 12, 0, 0));
        assert_eq!(deadlines.grace_period_end, utc(2025, 1, 16, 12, 0, 0));
    }

    #[test]
    fn morning_deadline_london_summer_time() {
        // 2025-03-30 is the day Europe/London springs forward to BST.
        let deadlines =
            calculate_deadlines(date(2025, 3, 30), TimeOfDay::Morning, "Europe/London").unwrap();
        assert_eq!(deadlines.on_time_deadline, utc(2025, 3, 30, 11, 0, 0));
        assert_eq!(deadlines.grace_period_end, utc(2025, 3, 31, 11, 0, 0));
    }

    #[test]
    fn evening_deadline_is_last_millisecond_of_day() {
        let deadlines =
            calculate_deadlines(date(2025, 1, 15), TimeOfDay::Evening, "Europe/London").unwrap();
        assert_eq!(
            deadlines.on_time_deadline,
            utc_ms(2025, 1, 15, 23, 59, 59, 999)
        );
        assert_eq!(
            deadlines.grace_period_end,
            utc_ms(2025, 1, 16, 23, 59, 59, 999)
        );
    }

    #[test]
    fn evening_deadline_new_york_crosses_utc_midnight() {
        let deadlines =
            calculate_deadlines(date(2025, 1, 15), TimeOfDay::Evening, "America/New_York")
                .unwrap();
        // EST is UTC-5, so the local end of day lands on the next UTC date.
        assert_eq!(
            deadlines.on_time_deadline,
            utc_ms(2025, 1, 16, 4, 59, 59, 999)
        );
    }

    #[test]
    fn morning_deadline_tokyo() {
        let deadlines =
            calculate_deadlines(date(2025, 1, 15), TimeOfDay::Morning, "Asia/Tokyo").unwrap();
        assert_eq!(deadlines.on_time_deadline, utc(2025, 1, 15, 3, 0, 0));
    }

    #[test]
    fn morning_deadline_sydney_southern_summer() {
        let deadlines =
            calculate_deadlines(date(2025, 1, 15), TimeOfDay::Morning, "Australia/Sydney")
                .unwrap();
        // AEDT is UTC+11 in January.
        assert_eq!(deadlines.on_time_deadline, utc(2025, 1, 15, 1, 0, 0));
    }

    #[test]
    fn grace_period_is_exactly_24_hours_across_spring_forward() {
        // New York springs forward on 2025-03-09; the grace window for a
        // 2025-03-08 step spans the transition but stays 24 absolute hours.
        let deadlines =
            calculate_deadlines(date(2025, 3, 8), TimeOfDay::Morning, "America/New_York")
                .unwrap();
        assert_eq!(deadlines.on_time_deadline, utc(2025, 3, 8, 17, 0, 0));
        assert_eq!(
            deadlines.grace_period_end - deadlines.on_time_deadline,
            Duration::hours(24)
        );
        assert_eq!(deadlines.grace_period_end, utc(2025, 3, 9, 17, 0, 0));
    }

    #[test]
    fn skipped_wall_time_uses_post_transition_offset() {
        // Pacific/Apia skipped 2011-12-30 entirely when Samoa crossed the
        // date line; the calculation must still produce an instant.
        let deadlines =
            calculate_deadlines(date(2011, 12, 30), TimeOfDay::Morning, "Pacific/Apia").unwrap();
        assert_eq!(
            deadlines.grace_period_end - deadlines.on_time_deadline,
            Duration::hours(24)
        );
        // Post-transition offset is UTC+14.
        assert_eq!(deadlines.on_time_deadline, utc(2011, 12, 29, 22, 0, 0));
    }

    #[test]
    fn ambiguous_wall_time_resolves_to_earlier_instant() {
        // Sao Paulo left DST at midnight on 2019-02-17, repeating the
        // 23:00-24:00 hour of 2019-02-16. The earlier (-02) reading wins.
        let deadlines =
            calculate_deadlines(date(2019, 2, 16), TimeOfDay::Evening, "America/Sao_Paulo")
                .unwrap();
        assert_eq!(
            deadlines.on_time_deadline,
            utc_ms(2019, 2, 17, 1, 59, 59, 999)
        );
    }

    #[test]
    fn deadlines_are_deterministic() {
        let a = calculate_deadlines(date(2025, 6, 1), TimeOfDay::Evening, "Europe/Berlin").unwrap();
        let b = calculate_deadlines(date(2025, 6, 1), TimeOfDay::Evening, "Europe/Berlin").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let err =
            calculate_deadlines(date(2025, 1, 15), TimeOfDay::Morning, "Mars/Olympus_Mons")
                .unwrap_err();
        assert_matches!(err, CoreError::InvalidTimezone(tz) if tz == "Mars/Olympus_Mons");
    }

    #[test]
    fn empty_timezone_is_rejected() {
        let err = calculate_deadlines(date(2025, 1, 15), TimeOfDay::Morning, "").unwrap_err();
        assert_matches!(err, CoreError::InvalidTimezone(_));
    }

    #[test]
    fn local_date_straddles_utc_midnight() {
        let at = utc(2025, 1, 15, 23, 30, 0);
        assert_eq!(local_date_in("Asia/Tokyo", at).unwrap(), date(2025, 1, 16));
        assert_eq!(local_date_in("America/New_York", at).unwrap(), date(2025, 1, 15));
        assert_eq!(local_date_in("Europe/London", at).unwrap(), date(2025, 1, 15));

        let early = utc(2025, 1, 15, 3, 30, 0);
        assert_eq!(local_date_in("America/New_York", early).unwrap(), date(2025, 1, 14));
    }

    #[test]
    fn local_date_rejects_unknown_zone() {
        let err = local_date_in("Nowhere/Null", utc(2025, 1, 15, 0, 0, 0)).unwrap_err();
        assert_matches!(err, CoreError::InvalidTimezone(_));
    }

    // -- determine_status ---------------------------------------------------

    #[test]
    fn completion_before_deadline_is_on_time() {
        let on_time = utc(2025, 1, 15, 12, 0, 0);
        let grace = utc(2025, 1, 16, 12, 0, 0);
        let status = determine_status(utc(2025, 1, 15, 8, 30, 0), on_time, grace);
        assert_eq!(status, CompletionStatus::OnTime);
    }

    #[test]
    fn completion_exactly_at_deadline_is_on_time() {
        let on_time = utc(2025, 1, 15, 12, 0, 0);
        let grace = utc(2025, 1, 16, 12, 0, 0);
        assert_eq!(
            determine_status(on_time, on_time, grace),
            CompletionStatus::OnTime
        );
    }

    #[test]
    fn completion_one_millisecond_past_deadline_is_late() {
        let on_time = utc(2025, 1, 15, 12, 0, 0);
        let grace = utc(2025, 1, 16, 12, 0, 0);
        let status = determine_status(on_time + Duration::milliseconds(1), on_time, grace);
        assert_eq!(status, CompletionStatus::Late);
    }

    #[test]
    fn completion_exactly_at_grace_end_is_late() {
        let on_time = utc(2025, 1, 15, 12, 0, 0);
        let grace = utc(2025, 1, 16, 12, 0, 0);
        assert_eq!(determine_status(grace, on_time, grace), CompletionStatus::Late);
    }

    #[test]
    fn completion_one_millisecond_past_grace_end_is_missed() {
        let on_time = utc(2025, 1, 15, 12, 0, 0);
        let grace = utc(2025, 1, 16, 12, 0, 0);
        let status = determine_status(grace + Duration::milliseconds(1), on_time, grace);
        assert_eq!(status, CompletionStatus::Missed);
    }

    // -- should_generate_for_date -------------------------------------------

    fn policy(frequency: Frequency, days: Option<&[&str]>) -> SchedulePolicy {
        SchedulePolicy {
            frequency,
            days: days.map(|d| d.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn daily_applies_every_day() {
        let p = policy(Frequency::Daily, None);
        let monday = date(2025, 1, 6);
        for offset in 0..7 {
            assert!(should_generate_for_date(&p, monday + Duration::days(offset)));
        }
    }

    #[test]
    fn daily_ignores_day_list() {
        let p = policy(Frequency::Daily, Some(&["Monday"]));
        // 2025-01-07 is a Tuesday.
        assert!(should_generate_for_date(&p, date(2025, 1, 7)));
    }

    #[test]
    fn specific_days_applies_only_on_listed_days() {
        let p = policy(Frequency::SpecificDays, Some(&["Monday", "Thursday"]));
        assert!(should_generate_for_date(&p, date(2025, 1, 6))); // Monday
        assert!(!should_generate_for_date(&p, date(2025, 1, 7))); // Tuesday
        assert!(should_generate_for_date(&p, date(2025, 1, 9))); // Thursday
        assert!(!should_generate_for_date(&p, date(2025, 1, 11))); // Saturday
    }

    #[test]
    fn per_week_uses_day_list() {
        let p = policy(Frequency::PerWeek(2), Some(&["Tuesday", "Friday"]));
        assert!(should_generate_for_date(&p, date(2025, 1, 7))); // Tuesday
        assert!(!should_generate_for_date(&p, date(2025, 1, 8))); // Wednesday
        assert!(should_generate_for_date(&p, date(2025, 1, 10))); // Friday
    }

    #[test]
    fn non_daily_without_days_never_applies() {
        let p = policy(Frequency::PerWeek(3), None);
        for offset in 0..7 {
            assert!(!should_generate_for_date(&p, date(2025, 1, 6) + Duration::days(offset)));
        }
    }

    #[test]
    fn non_daily_with_empty_days_never_applies() {
        let p = policy(Frequency::SpecificDays, Some(&[]));
        assert!(!should_generate_for_date(&p, date(2025, 1, 6)));
    }

    #[test]
    fn day_matching_is_case_sensitive() {
        let p = policy(Frequency::SpecificDays, Some(&["monday", "MONDAY"]));
        assert!(!should_generate_for_date(&p, date(2025, 1, 6))); // Monday
    }

    #[test]
    fn weekday_names_follow_calendar() {
        assert_eq!(weekday_name(date(2025, 1, 6)), "Monday");
        assert_eq!(weekday_name(date(2025, 1, 12)), "Sunday");
        assert_eq!(weekday_name(date(2024, 2, 29)), "Thursday");
    }

    // -- token parsing ------------------------------------------------------

    #[test]
    fn frequency_tokens_round_trip() {
        for token in ["daily", "1x_week", "3x_week", "6x_week", "specific_days"] {
            let parsed: Frequency = token.parse().unwrap();
            assert_eq!(parsed.as_token(), token);
        }
    }

    #[test]
    fn invalid_frequency_tokens_are_rejected() {
        for token in ["weekly", "0x_week", "7x_week", "x_week", "Daily", ""] {
            assert_matches!(token.parse::<Frequency>(), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn status_tokens_round_trip() {
        for token in ["pending", "on-time", "late", "missed"] {
            let parsed: CompletionStatus = token.parse().unwrap();
            assert_eq!(parsed.as_str(), token);
        }
    }

    #[test]
    fn fulfilled_statuses() {
        assert!(CompletionStatus::OnTime.is_fulfilled());
        assert!(CompletionStatus::Late.is_fulfilled());
        assert!(!CompletionStatus::Pending.is_fulfilled());
        assert!(!CompletionStatus::Missed.is_fulfilled());
    }

    #[test]
    fn time_of_day_tokens_round_trip() {
        for token in ["morning", "evening"] {
            let parsed: TimeOfDay = token.parse().unwrap();
            assert_eq!(parsed.as_str(), token);
        }
        assert_matches!("noon".parse::<TimeOfDay>(), Err(CoreError::Validation(_)));
    }
}
