//! Completion repository behavior: idempotent generation, the
//! single-mutation guard, the expiry sweep, and the streak walk against
//! real rows.

use chrono::{Duration, NaiveDate};
use sqlx::PgPool;

use glow_core::compliance::{calculate_deadlines, determine_status, CompletionStatus, TimeOfDay};
use glow_core::streak::current_streak;
use glow_core::types::Timestamp;
use glow_db::models::completion::{Completion, CreateCompletion};
use glow_db::models::profile::{CreateProfile, Profile};
use glow_db::models::routine::{CreateRoutine, CreateRoutineProduct, RoutineProduct};
use glow_db::repositories::{
    CompletionRepo, PgCompletionSource, ProfileRepo, RoutineProductRepo, RoutineRepo,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn seed_profile(pool: &PgPool, timezone: &str) -> Profile {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            email: format!("{}@example.com", timezone.replace('/', "-").to_lowercase()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            timezone: Some(timezone.to_string()),
            skin_type: None,
            birth_date: None,
            notes: None,
        },
    )
    .await
    .unwrap()
}

async fn seed_daily_step(pool: &PgPool, profile: &Profile, time_of_day: &str) -> RoutineProduct {
    let routine = RoutineRepo::create(
        pool,
        &CreateRoutine {
            profile_id: profile.id,
            name: "Basics".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    RoutineProductRepo::create(
        pool,
        &CreateRoutineProduct {
            routine_id: routine.id,
            profile_id: profile.id,
            step_name: "Cleanse".to_string(),
            product_name: None,
            instructions: None,
            frequency: "daily".to_string(),
            days: None,
            time_of_day: time_of_day.to_string(),
            sort_order: 0,
        },
    )
    .await
    .unwrap()
}

/// Insert a pending occurrence with deadlines computed the way the
/// seeder computes them.
async fn seed_occurrence(
    pool: &PgPool,
    profile: &Profile,
    product: &RoutineProduct,
    scheduled: NaiveDate,
) -> Completion {
    let time_of_day: TimeOfDay = product.time_of_day.parse().unwrap();
    let deadlines = calculate_deadlines(scheduled, time_of_day, &profile.timezone).unwrap();
    CompletionRepo::create_if_absent(
        pool,
        &CreateCompletion {
            routine_product_id: product.id,
            profile_id: profile.id,
            scheduled_date: scheduled,
            time_of_day: product.time_of_day.clone(),
            on_time_deadline: deadlines.on_time_deadline,
            grace_period_end: deadlines.grace_period_end,
        },
    )
    .await
    .unwrap()
    .unwrap()
}

async fn complete_at(pool: &PgPool, row: &Completion, completed_at: Timestamp) -> Completion {
    let status = determine_status(completed_at, row.on_time_deadline, row.grace_period_end);
    CompletionRepo::record_completion(pool, row.id, completed_at, status)
        .await
        .unwrap()
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn occurrence_generation_is_idempotent(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;
    let scheduled = date("2025-01-15");

    let first = seed_occurrence(&pool, &profile, &product, scheduled).await;
    assert_eq!(first.status, "pending");

    let deadlines =
        calculate_deadlines(scheduled, TimeOfDay::Morning, &profile.timezone).unwrap();
    let second = CompletionRepo::create_if_absent(
        &pool,
        &CreateCompletion {
            routine_product_id: product.id,
            profile_id: profile.id,
            scheduled_date: scheduled,
            time_of_day: "morning".to_string(),
            on_time_deadline: deadlines.on_time_deadline,
            grace_period_end: deadlines.grace_period_end,
        },
    )
    .await
    .unwrap();
    assert!(second.is_none());

    let rows = CompletionRepo::list_for_profile_date(&pool, profile.id, scheduled)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stored_deadlines_follow_the_profile_timezone(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;

    let winter = seed_occurrence(&pool, &profile, &product, date("2025-01-15")).await;
    assert_eq!(
        winter.on_time_deadline.to_rfc3339(),
        "2025-01-15T12:00:00+00:00"
    );

    let summer = seed_occurrence(&pool, &profile, &product, date("2025-03-30")).await;
    assert_eq!(
        summer.on_time_deadline.to_rfc3339(),
        "2025-03-30T11:00:00+00:00"
    );
    assert_eq!(
        summer.grace_period_end - summer.on_time_deadline,
        Duration::hours(24)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_is_recorded_once(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;
    let row = seed_occurrence(&pool, &profile, &product, date("2025-01-15")).await;

    let completed = complete_at(&pool, &row, row.on_time_deadline - Duration::hours(1)).await;
    assert_eq!(completed.status, "on-time");
    assert!(completed.completed_at.is_some());

    // A second attempt does not overwrite the first.
    let again = CompletionRepo::record_completion(
        &pool,
        row.id,
        row.on_time_deadline,
        CompletionStatus::OnTime,
    )
    .await
    .unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn late_completion_within_grace(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "evening").await;
    let row = seed_occurrence(&pool, &profile, &product, date("2025-01-15")).await;

    let completed = complete_at(&pool, &row, row.on_time_deadline + Duration::hours(6)).await;
    assert_eq!(completed.status, "late");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_flips_only_pending_rows_past_grace(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;

    let expired = seed_occurrence(&pool, &profile, &product, date("2025-01-10")).await;
    let open = seed_occurrence(&pool, &profile, &product, date("2025-01-12")).await;
    let done = seed_occurrence(&pool, &profile, &product, date("2025-01-11")).await;
    complete_at(&pool, &done, done.on_time_deadline).await;

    // A moment after the oldest grace window closes, before the newest.
    let now = expired.grace_period_end + Duration::seconds(1);
    let flipped = CompletionRepo::mark_missed_expired(&pool, now).await.unwrap();
    assert_eq!(flipped, 1);

    let expired_row = CompletionRepo::find_by_id(&pool, expired.id).await.unwrap().unwrap();
    assert_eq!(expired_row.status, "missed");
    let open_row = CompletionRepo::find_by_id(&pool, open.id).await.unwrap().unwrap();
    assert_eq!(open_row.status, "pending");
    let done_row = CompletionRepo::find_by_id(&pool, done.id).await.unwrap().unwrap();
    assert_eq!(done_row.status, "on-time");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_does_not_flip_at_exact_grace_end(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;
    let row = seed_occurrence(&pool, &profile, &product, date("2025-01-10")).await;

    let flipped = CompletionRepo::mark_missed_expired(&pool, row.grace_period_end)
        .await
        .unwrap();
    assert_eq!(flipped, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn swept_row_accepts_a_backdated_completion(pool: PgPool) {
    let profile = seed_profile(&pool, "Europe/London").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;
    let row = seed_occurrence(&pool, &profile, &product, date("2025-01-10")).await;

    CompletionRepo::mark_missed_expired(&pool, row.grace_period_end + Duration::seconds(1))
        .await
        .unwrap();

    // The sweep ran first, but the recorded completion time was within
    // grace, so the row ends up late rather than stuck at missed.
    let completed_at = row.grace_period_end - Duration::hours(2);
    let status = determine_status(completed_at, row.on_time_deadline, row.grace_period_end);
    let updated = CompletionRepo::record_completion(&pool, row.id, completed_at, status)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "late");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_counts_group_by_token(pool: PgPool) {
    let profile = seed_profile(&pool, "UTC").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;

    let a = seed_occurrence(&pool, &profile, &product, date("2025-01-13")).await;
    let b = seed_occurrence(&pool, &profile, &product, date("2025-01-14")).await;
    seed_occurrence(&pool, &profile, &product, date("2025-01-15")).await;
    complete_at(&pool, &a, a.on_time_deadline).await;
    complete_at(&pool, &b, b.grace_period_end).await;

    let mut counts =
        CompletionRepo::status_counts_in_range(&pool, profile.id, date("2025-01-13"), date("2025-01-15"))
            .await
            .unwrap();
    counts.sort();
    assert_eq!(
        counts,
        vec![
            ("late".to_string(), 1),
            ("on-time".to_string(), 1),
            ("pending".to_string(), 1),
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn streak_walk_reads_real_rows(pool: PgPool) {
    let profile = seed_profile(&pool, "UTC").await;
    let product = seed_daily_step(&pool, &profile, "morning").await;

    // 12th missed, 13th-15th completed on time.
    let missed = seed_occurrence(&pool, &profile, &product, date("2025-01-12")).await;
    CompletionRepo::mark_missed_expired(&pool, missed.grace_period_end + Duration::seconds(1))
        .await
        .unwrap();
    for day in ["2025-01-13", "2025-01-14", "2025-01-15"] {
        let row = seed_occurrence(&pool, &profile, &product, date(day)).await;
        complete_at(&pool, &row, row.on_time_deadline).await;
    }

    let streak = current_streak(&PgCompletionSource(&pool), profile.id, date("2025-01-15"))
        .await
        .unwrap();
    assert_eq!(streak, 3);

    // Another profile's rows stay out of the walk.
    let other = seed_profile(&pool, "Asia/Tokyo").await;
    let streak_other = current_streak(&PgCompletionSource(&pool), other.id, date("2025-01-15"))
        .await
        .unwrap();
    assert_eq!(streak_other, 0);
}
