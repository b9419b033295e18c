use chrono::Duration;
use quiz_core::model::{QuestionId, SessionId};
use quiz_core::time::{fixed_now, remaining_seconds};
use storage::repository::DeadlineStore;
use storage::sqlite::SqliteRepository;

async fn repo() -> SqliteRepository {
    let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
    repo.migrate().await.unwrap();
    repo
}

#[tokio::test]
async fn deadline_survives_and_resumes() {
    let repo = repo().await;
    let session = SessionId::new("sess-a");
    let question = QuestionId::new(7);
    let now = fixed_now();

    let expiry = repo
        .resume_or_create(&session, question, 30, now)
        .await
        .unwrap();
    assert_eq!(expiry, now + Duration::seconds(30));

    // a "restart" 20 seconds in reads the same record back
    let restarted = now + Duration::seconds(20);
    let resumed = repo
        .resume_or_create(&session, question, 30, restarted)
        .await
        .unwrap();
    assert_eq!(resumed, expiry);
    assert_eq!(remaining_seconds(resumed, restarted), 10);
}

#[tokio::test]
async fn expired_deadline_is_replaced() {
    let repo = repo().await;
    let session = SessionId::new("sess-b");
    let question = QuestionId::new(1);
    let now = fixed_now();

    repo.resume_or_create(&session, question, 5, now)
        .await
        .unwrap();

    let later = now + Duration::seconds(6);
    let fresh = repo
        .resume_or_create(&session, question, 5, later)
        .await
        .unwrap();
    assert_eq!(fresh, later + Duration::seconds(5));
}

#[tokio::test]
async fn clear_is_idempotent() {
    let repo = repo().await;
    let session = SessionId::new("sess-c");
    let question = QuestionId::new(3);
    let now = fixed_now();

    repo.resume_or_create(&session, question, 30, now)
        .await
        .unwrap();
    assert!(repo.get(&session, question).await.unwrap().is_some());

    repo.clear(&session, question).await.unwrap();
    assert!(repo.get(&session, question).await.unwrap().is_none());
    repo.clear(&session, question).await.unwrap();
}

#[tokio::test]
async fn composite_key_scopes_records() {
    let repo = repo().await;
    let now = fixed_now();
    let session_a = SessionId::new("sess-a");
    let session_b = SessionId::new("sess-b");
    let question = QuestionId::new(1);

    let a = repo
        .resume_or_create(&session_a, question, 30, now)
        .await
        .unwrap();
    let b = repo
        .resume_or_create(&session_b, question, 60, now)
        .await
        .unwrap();
    assert_ne!(a, b);

    repo.clear(&session_a, question).await.unwrap();
    assert!(repo.get(&session_b, question).await.unwrap().is_some());
}

#[tokio::test]
async fn migrations_are_rerunnable() {
    let repo = repo().await;
    repo.migrate().await.unwrap();
}
