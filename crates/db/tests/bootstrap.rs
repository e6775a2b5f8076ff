//! Schema bootstrap checks: migrations apply cleanly and seed data lands.

use sqlx::PgPool;

use glow_db::repositories::RoleRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn migrations_create_expected_tables(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = 'public' ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

    for expected in [
        "admin_sessions",
        "admin_users",
        "api_keys",
        "audit_log",
        "goals",
        "profiles",
        "progress_photos",
        "roles",
        "routine_products",
        "routine_step_completions",
        "routines",
        "survey_responses",
        "surveys",
    ] {
        assert!(names.contains(&expected), "missing table {expected}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_are_seeded(pool: PgPool) {
    let roles = RoleRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "coach"]);

    let admin = RoleRepo::find_by_name(&pool, "admin").await.unwrap();
    assert!(admin.is_some());
    let missing = RoleRepo::find_by_name(&pool, "superuser").await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_succeeds(pool: PgPool) {
    glow_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updated_at_trigger_fires(pool: PgPool) {
    let before: (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM roles WHERE name = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();

    sqlx::query("UPDATE roles SET description = 'changed' WHERE name = 'admin'")
        .execute(&pool)
        .await
        .unwrap();

    let after: (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM roles WHERE name = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(after.0 > before.0);
}
