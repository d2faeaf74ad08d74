//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `resolveit_test`)
//!   `TEST_DB_PASSWORD` (default: `resolveit_test`)
//!   `TEST_DB_NAME` (default: `resolveit_test`)

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, Utc};
use resolveit_common::AppError;
use resolveit_db::entities::{
    complaint,
    escalation::{self, EscalationType},
    staff_application::{self, ApplicationStatus},
    user::{self, Role},
};
use resolveit_db::repositories::{
    ComplaintRepository, ComplaintStatusRepository, EscalationRepository,
    StaffApplicationRepository, UserRepository,
};
use resolveit_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;

async fn prepared() -> (TestDatabase, Arc<DatabaseConnection>) {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.migrate().await.expect("Migrations failed");
    db.cleanup().await.expect("Cleanup failed");
    let conn = db.connection_arc();
    (db, conn)
}

fn user_row(id: &str, role: Role) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        full_name: Set(format!("User {id}")),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("hash".to_string()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn complaint_row(
    id: &str,
    status_id: Option<String>,
    created_at: DateTime<Utc>,
) -> complaint::ActiveModel {
    complaint::ActiveModel {
        id: Set(id.to_string()),
        title: Set("Broken printer".to_string()),
        description: Set("It jams.".to_string()),
        category: Set("Facilities".to_string()),
        anonymous: Set(false),
        user_id: Set(None),
        assigned_to_id: Set(None),
        status_id: Set(status_id),
        created_at: Set(created_at.into()),
        updated_at: Set(None),
    }
}

fn escalation_row(id: &str, complaint_id: &str, target_id: &str) -> escalation::ActiveModel {
    escalation::ActiveModel {
        id: Set(id.to_string()),
        complaint_id: Set(complaint_id.to_string()),
        escalated_by_id: Set(None),
        escalated_to_id: Set(target_id.to_string()),
        reason: Set("Needs senior attention".to_string()),
        escalation_type: Set(EscalationType::Manual),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
        resolved_at: Set(None),
    }
}

fn application_row(id: &str, user_id: &str) -> staff_application::ActiveModel {
    staff_application::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        categories: Set("IT".to_string()),
        experience: Set("Two years of IT support".to_string()),
        skills: Set("Troubleshooting".to_string()),
        availability: Set("Weekdays".to_string()),
        motivation: Set("I want to help".to_string()),
        previous_experience: Set(None),
        status: Set(ApplicationStatus::Pending),
        reviewed_by_id: Set(None),
        reviewed_at: Set(None),
        admin_notes: Set(None),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_active_escalation_conflicts() {
    let (db, conn) = prepared().await;
    let users = UserRepository::new(Arc::clone(&conn));
    let complaints = ComplaintRepository::new(Arc::clone(&conn));
    let escalations = EscalationRepository::new(Arc::clone(&conn));

    users.create(user_row("target-1", Role::Admin)).await.unwrap();
    users.create(user_row("target-2", Role::Admin)).await.unwrap();
    complaints
        .create(complaint_row("c-esc", None, Utc::now()))
        .await
        .unwrap();

    escalations
        .create(escalation_row("e-1", "c-esc", "target-1"))
        .await
        .unwrap();
    let err = escalations
        .create(escalation_row("e-2", "c-esc", "target-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Once the active escalation is resolved, a new one is allowed again
    escalations
        .resolve_all_for_complaint("c-esc", Utc::now().into())
        .await
        .unwrap();
    escalations
        .create(escalation_row("e-3", "c-esc", "target-2"))
        .await
        .unwrap();

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_pending_application_conflicts() {
    let (db, conn) = prepared().await;
    let users = UserRepository::new(Arc::clone(&conn));
    let applications = StaffApplicationRepository::new(Arc::clone(&conn));

    users.create(user_row("applicant-1", Role::User)).await.unwrap();

    applications
        .create(application_row("ap-1", "applicant-1"))
        .await
        .unwrap();
    let err = applications
        .create(application_row("ap-2", "applicant-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_email_conflicts() {
    let (db, conn) = prepared().await;
    let users = UserRepository::new(Arc::clone(&conn));

    users.create(user_row("dup", Role::User)).await.unwrap();
    let mut second = user_row("dup-2", Role::User);
    second.email = Set("dup@example.com".to_string());
    let err = users.create(second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_sweep_query_skips_status_less_complaints() {
    let (db, conn) = prepared().await;
    let complaints = ComplaintRepository::new(Arc::clone(&conn));
    let statuses = ComplaintStatusRepository::new(Arc::clone(&conn));

    let new_status = statuses
        .get_or_create("st-new".to_string(), "NEW", "New")
        .await
        .unwrap();
    let old = Utc::now() - Duration::days(10);
    complaints
        .create(complaint_row("c-status-less", None, old))
        .await
        .unwrap();
    complaints
        .create(complaint_row("c-open", Some(new_status.id.clone()), old))
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::days(3);
    let overdue = complaints
        .find_open_older_than(cutoff.into(), &[])
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, "c-open");

    // Closed statuses drop out of the sweep as well
    let closed_status = statuses
        .get_or_create("st-closed".to_string(), "CLOSED", "Closed")
        .await
        .unwrap();
    complaints
        .create(complaint_row("c-closed", Some(closed_status.id.clone()), old))
        .await
        .unwrap();
    let overdue = complaints
        .find_open_older_than(cutoff.into(), std::slice::from_ref(&closed_status.id))
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, "c-open");

    db.cleanup().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
