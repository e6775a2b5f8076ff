//! Streak aggregation over persisted routine step completions (PRD-07).
//!
//! A streak is the number of consecutive perfect days ending at an
//! explicit `today`, walking backward. The walk stops at the first day
//! that is not perfect, including days with no scheduled steps at all.
//! "Today" is an input, not the wall clock, so callers decide whose
//! calendar the streak is measured against.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::compliance::CompletionStatus;
use crate::error::CoreError;
use crate::types::DbId;

/// Days fetched per storage round trip while walking backward. Streaks
/// shorter than this resolve in a single query.
pub const STREAK_WINDOW_DAYS: i64 = 60;

/// Read access to completion statuses, grouped by scheduled date.
///
/// Implemented for the Postgres pool in the repository crate; tests use
/// in-memory maps.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    /// Statuses of every completion row for `profile_id` with a scheduled
    /// date in `[from, to]`, keyed by that date. Dates without rows are
    /// simply absent from the map.
    async fn statuses_by_date(
        &self,
        profile_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, Vec<CompletionStatus>>, CoreError>;
}

/// Whether a day's statuses make it perfect: at least one scheduled step,
/// every one of them fulfilled (on time or late).
pub fn is_perfect_day(statuses: &[CompletionStatus]) -> bool {
    !statuses.is_empty() && statuses.iter().all(|s| s.is_fulfilled())
}

/// Count consecutive perfect days ending at `today`, walking backward
/// until the first imperfect or unscheduled day.
///
/// Statuses are fetched in [`STREAK_WINDOW_DAYS`]-day windows; the walk
/// only requests the next window after every day of the current one
/// proved perfect, so the early-termination behavior of a day-by-day
/// walk is preserved. There is no upper bound on the result.
pub async fn current_streak<S>(
    source: &S,
    profile_id: DbId,
    today: NaiveDate,
) -> Result<i64, CoreError>
where
    S: CompletionSource + ?Sized,
{
    let mut streak: i64 = 0;
    let mut newest = today;
    loop {
        let oldest = newest - Duration::days(STREAK_WINDOW_DAYS - 1);
        let by_date = source.statuses_by_date(profile_id, oldest, newest).await?;

        let mut day = newest;
        loop {
            match by_date.get(&day) {
                Some(statuses) if is_perfect_day(statuses) => streak += 1,
                _ => return Ok(streak),
            }
            if day == oldest {
                break;
            }
            day -= Duration::days(1);
        }
        newest = oldest - Duration::days(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::CompletionStatus::{Late, Missed, OnTime, Pending};
    use assert_matches::assert_matches;

    /// In-memory source that honors the requested date range, like the
    /// real repository does.
    struct MapSource {
        rows: HashMap<NaiveDate, Vec<CompletionStatus>>,
    }

    #[async_trait]
    impl CompletionSource for MapSource {
        async fn statuses_by_date(
            &self,
            _profile_id: DbId,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<HashMap<NaiveDate, Vec<CompletionStatus>>, CoreError> {
            Ok(self
                .rows
                .iter()
                .filter(|(date, _)| (from..=to).contains(*date))
                .map(|(date, statuses)| (*date, statuses.clone()))
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CompletionSource for FailingSource {
        async fn statuses_by_date(
            &self,
            _profile_id: DbId,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<HashMap<NaiveDate, Vec<CompletionStatus>>, CoreError> {
            Err(CoreError::StorageUnavailable(
                "connection refused".to_string(),
            ))
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// `len` consecutive days of `statuses`, newest day = `newest`.
    fn run(newest: NaiveDate, len: i64, statuses: &[CompletionStatus]) -> MapSource {
        let mut rows = HashMap::new();
        for offset in 0..len {
            rows.insert(newest - Duration::days(offset), statuses.to_vec());
        }
        MapSource { rows }
    }

    #[tokio::test]
    async fn no_history_means_zero() {
        let source = MapSource { rows: HashMap::new() };
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 0);
    }

    #[tokio::test]
    async fn single_perfect_day() {
        let source = run(d("2025-01-15"), 1, &[OnTime, OnTime]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 1);
    }

    #[tokio::test]
    async fn seven_perfect_days() {
        let source = run(d("2025-01-15"), 7, &[OnTime]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 7);
    }

    #[tokio::test]
    async fn thirty_perfect_days() {
        let source = run(d("2025-01-15"), 30, &[OnTime, Late]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 30);
    }

    #[tokio::test]
    async fn late_completions_keep_a_day_perfect() {
        let source = run(d("2025-01-15"), 3, &[Late, Late]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 3);
    }

    #[tokio::test]
    async fn missed_step_breaks_the_walk() {
        let mut source = run(d("2025-01-15"), 3, &[OnTime]);
        source
            .rows
            .insert(d("2025-01-12"), vec![OnTime, Missed]);
        // Perfect days further back must not be reached.
        source.rows.insert(d("2025-01-11"), vec![OnTime]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 3);
    }

    #[tokio::test]
    async fn pending_today_means_zero() {
        let mut source = run(d("2025-01-14"), 5, &[OnTime]);
        source.rows.insert(d("2025-01-15"), vec![Pending, OnTime]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 0);
    }

    #[tokio::test]
    async fn gap_day_without_rows_breaks_the_walk() {
        let mut source = run(d("2025-01-15"), 2, &[OnTime]);
        // 2025-01-13 has no rows at all; 12 and earlier are perfect.
        source.rows.insert(d("2025-01-12"), vec![OnTime]);
        source.rows.insert(d("2025-01-11"), vec![OnTime]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 2);
    }

    #[tokio::test]
    async fn day_with_empty_status_set_breaks_the_walk() {
        let mut source = run(d("2025-01-15"), 2, &[OnTime]);
        source.rows.insert(d("2025-01-13"), vec![]);
        let streak = current_streak(&source, 1, d("2025-01-15")).await.unwrap();
        assert_eq!(streak, 2);
    }

    #[tokio::test]
    async fn streak_spans_multiple_fetch_windows() {
        let source = run(d("2025-03-31"), 75, &[OnTime]);
        let streak = current_streak(&source, 1, d("2025-03-31")).await.unwrap();
        assert_eq!(streak, 75);
    }

    #[tokio::test]
    async fn streak_exactly_one_window_long() {
        let source = run(d("2025-03-31"), STREAK_WINDOW_DAYS, &[OnTime]);
        let streak = current_streak(&source, 1, d("2025-03-31")).await.unwrap();
        assert_eq!(streak, STREAK_WINDOW_DAYS);
    }

    #[tokio::test]
    async fn explicit_today_slices_history() {
        // History runs through the 15th, but the caller asks as of the 10th.
        let source = run(d("2025-01-15"), 10, &[OnTime]);
        let streak = current_streak(&source, 1, d("2025-01-10")).await.unwrap();
        assert_eq!(streak, 5);
    }

    #[tokio::test]
    async fn storage_failure_surfaces() {
        let result = current_streak(&FailingSource, 1, d("2025-01-15")).await;
        assert_matches!(result, Err(CoreError::StorageUnavailable(_)));
    }

    #[test]
    fn perfect_day_requires_at_least_one_fulfilled_step() {
        assert!(is_perfect_day(&[OnTime]));
        assert!(is_perfect_day(&[OnTime, Late]));
        assert!(!is_perfect_day(&[]));
        assert!(!is_perfect_day(&[OnTime, Pending]));
        assert!(!is_perfect_day(&[OnTime, Missed]));
    }
}
