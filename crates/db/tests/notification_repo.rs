//! Integration tests for the notification and preference repositories.
//!
//! Exercises read-state transitions, ownership scoping, retention purge,
//! preference upserts and the schema's self-notification constraint.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use stackit_core::notification::{NotificationPreferences, NotificationType};
use stackit_core::types::DbId;
use stackit_db::models::notification::CreateNotification;
use stackit_db::models::question::CreateQuestion;
use stackit_db::models::user::CreateUser;
use stackit_db::repositories::{
    NotificationPreferenceRepo, NotificationRepo, QuestionRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, name: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn question(pool: &PgPool, author_id: DbId) -> DbId {
    QuestionRepo::create(
        pool,
        author_id,
        &CreateQuestion {
            title: "Title".to_string(),
            body: "Body".to_string(),
            tags: vec![],
        },
    )
    .await
    .unwrap()
    .id
}

fn answer_notification(user_id: DbId, actor: DbId, question_id: DbId) -> CreateNotification {
    CreateNotification {
        user_id,
        notification_type: NotificationType::Answer,
        message: "bob answered your question".to_string(),
        question_id: Some(question_id),
        answer_id: None,
        comment_id: None,
        actor_user_id: Some(actor),
    }
}

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_list_newest_first(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let q = question(&pool, alice).await;

    let first = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();
    let mut vote = answer_notification(alice, bob, q);
    vote.notification_type = NotificationType::Vote;
    vote.message = "bob upvoted your question".to_string();
    let second = NotificationRepo::create(&pool, &vote).await.unwrap();

    assert_eq!(first.notification_type, "answer");
    assert!(!first.is_read);
    assert!(first.read_at.is_none());

    let all = NotificationRepo::list_for_user(&pool, alice, false, None, 20, 0)
        .await
        .unwrap();
    assert_eq!(
        all.iter().map(|n| n.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    let votes = NotificationRepo::list_for_user(&pool, alice, false, Some("vote"), 20, 0)
        .await
        .unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].id, second.id);

    let bobs = NotificationRepo::list_for_user(&pool, bob, false, None, 20, 0)
        .await
        .unwrap();
    assert!(bobs.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn self_notification_violates_check_constraint(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let q = question(&pool, alice).await;

    let err = NotificationRepo::create(&pool, &answer_notification(alice, alice, q))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.constraint(), Some("ck_notifications_not_self"));
}

// ---------------------------------------------------------------------------
// Read state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_read_is_idempotent_and_keeps_first_read_at(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let q = question(&pool, alice).await;
    let n = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();

    assert!(NotificationRepo::mark_read(&pool, n.id, alice).await.unwrap());
    let first = NotificationRepo::find_by_id(&pool, n.id).await.unwrap().unwrap();
    let first_read_at = first.read_at.expect("read_at must be set");

    assert!(NotificationRepo::mark_read(&pool, n.id, alice).await.unwrap());
    let again = NotificationRepo::find_by_id(&pool, n.id).await.unwrap().unwrap();
    assert!(again.is_read);
    assert_eq!(again.read_at, Some(first_read_at));

    assert_eq!(NotificationRepo::unread_count(&pool, alice).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_read_ignores_other_users(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let q = question(&pool, alice).await;
    let n = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();

    assert!(!NotificationRepo::mark_read(&pool, n.id, bob).await.unwrap());
    assert!(!NotificationRepo::delete(&pool, n.id, bob).await.unwrap());
    assert_eq!(NotificationRepo::mark_many_read(&pool, bob, &[n.id]).await.unwrap(), 0);
    assert_eq!(NotificationRepo::unread_count(&pool, alice).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_many_and_all_count_only_transitions(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let q = question(&pool, alice).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let n = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
            .await
            .unwrap();
        ids.push(n.id);
    }

    assert_eq!(
        NotificationRepo::mark_many_read(&pool, alice, &ids[..2]).await.unwrap(),
        2
    );
    // Already-read ids do not count again.
    assert_eq!(
        NotificationRepo::mark_many_read(&pool, alice, &ids[..2]).await.unwrap(),
        0
    );
    assert_eq!(NotificationRepo::unread_count(&pool, alice).await.unwrap(), 1);

    assert_eq!(NotificationRepo::mark_all_read(&pool, alice).await.unwrap(), 1);
    assert_eq!(NotificationRepo::mark_all_read(&pool, alice).await.unwrap(), 0);

    let unread = NotificationRepo::list_for_user(&pool, alice, true, None, 20, 0)
        .await
        .unwrap();
    assert!(unread.is_empty());
}

// ---------------------------------------------------------------------------
// Retention and stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_older_than_removes_old_rows_read_or_unread(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let q = question(&pool, alice).await;

    let old = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();
    let old_read = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();
    let fresh = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();

    for id in [old.id, old_read.id] {
        sqlx::query("UPDATE notifications SET created_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now() - Duration::days(45))
            .execute(&pool)
            .await
            .unwrap();
    }
    assert!(NotificationRepo::mark_read(&pool, old_read.id, alice).await.unwrap());

    let deleted = NotificationRepo::delete_older_than(&pool, Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    assert!(NotificationRepo::find_by_id(&pool, old.id).await.unwrap().is_none());
    assert!(NotificationRepo::find_by_id(&pool, old_read.id).await.unwrap().is_none());
    assert!(NotificationRepo::find_by_id(&pool, fresh.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_aggregate_by_type(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let q = question(&pool, alice).await;

    let n = NotificationRepo::create(&pool, &answer_notification(alice, bob, q))
        .await
        .unwrap();
    let mut mention = answer_notification(alice, bob, q);
    mention.notification_type = NotificationType::Mention;
    NotificationRepo::create(&pool, &mention).await.unwrap();
    NotificationRepo::mark_read(&pool, n.id, alice).await.unwrap();

    let stats = NotificationRepo::stats(&pool, alice).await.unwrap();
    assert_eq!(stats.total_notifications, 2);
    assert_eq!(stats.unread_count, 1);
    assert_eq!(stats.answer_count, 1);
    assert_eq!(stats.mention_count, 1);
    assert_eq!(stats.comment_count, 0);
    assert!(stats.latest_notification.is_some());

    let empty = NotificationRepo::stats(&pool, bob).await.unwrap();
    assert_eq!(empty.total_notifications, 0);
    assert!(empty.latest_notification.is_none());
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn preferences_absent_until_upserted_then_replaced(pool: PgPool) {
    let alice = user(&pool, "alice").await;

    assert!(NotificationPreferenceRepo::get_for_user(&pool, alice)
        .await
        .unwrap()
        .is_none());

    let saved = NotificationPreferenceRepo::upsert(
        &pool,
        alice,
        &NotificationPreferences {
            answer_notifications: false,
            comment_notifications: true,
            mention_notifications: false,
            vote_notifications: true,
        },
    )
    .await
    .unwrap();
    assert!(!saved.answer_notifications);
    assert!(!saved.mention_notifications);

    let replaced = NotificationPreferenceRepo::upsert(
        &pool,
        alice,
        &NotificationPreferences {
            answer_notifications: true,
            comment_notifications: false,
            mention_notifications: true,
            vote_notifications: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(replaced.id, saved.id);
    assert!(replaced.answer_notifications);
    assert!(!replaced.comment_notifications);
    assert!(replaced.mention_notifications);
    assert!(!replaced.vote_notifications);
}
