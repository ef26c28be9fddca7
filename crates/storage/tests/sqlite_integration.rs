use lesson_core::intervals::WatchedInterval;
use lesson_core::model::{LessonId, NoteDraft, NoteId};
use lesson_core::time::fixed_now;
use storage::repository::{NoteRepository, ProgressRepository};
use storage::sqlite::SqliteStore;

async fn store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();
    store
}

#[tokio::test]
async fn progress_round_trips_through_sqlite() {
    let store = store().await;
    let lesson_id = LessonId::new(1);

    let intervals = vec![
        WatchedInterval::new(0.0, 60.0),
        WatchedInterval::new(200.0, 210.0),
    ];
    store.save_intervals(lesson_id, &intervals).await.unwrap();
    store.save_last_position(lesson_id, 207.5).await.unwrap();

    let record = store.load_progress(lesson_id).await.unwrap().unwrap();
    assert_eq!(record.watched_intervals, intervals);
    assert_eq!(record.last_position_secs, 207.5);

    let progress = record.into_progress();
    assert_eq!(progress.percent_watched(600.0), 12);
}

#[tokio::test]
async fn position_write_does_not_clobber_intervals() {
    let store = store().await;
    let lesson_id = LessonId::new(2);

    store
        .save_intervals(lesson_id, &[WatchedInterval::new(0.0, 30.0)])
        .await
        .unwrap();
    store.save_last_position(lesson_id, 29.0).await.unwrap();
    store.save_last_position(lesson_id, 31.0).await.unwrap();

    let record = store.load_progress(lesson_id).await.unwrap().unwrap();
    assert_eq!(record.watched_intervals, vec![WatchedInterval::new(0.0, 30.0)]);
    assert_eq!(record.last_position_secs, 31.0);
}

#[tokio::test]
async fn first_time_lesson_reads_as_absent() {
    let store = store().await;
    assert!(
        store
            .load_progress(LessonId::new(404))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn corrupt_interval_blob_degrades_to_empty() {
    let store = store().await;
    let lesson_id = LessonId::new(3);

    sqlx::query(
        "INSERT INTO lesson_progress (lesson_id, last_position_secs, watched_intervals)
         VALUES (3, 42.0, 'definitely not json')",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let record = store.load_progress(lesson_id).await.unwrap().unwrap();
    assert!(record.watched_intervals.is_empty());
    assert_eq!(record.last_position_secs, 42.0);
}

#[tokio::test]
async fn notes_round_trip_sorted_by_time() {
    let store = store().await;
    let lesson_id = LessonId::new(4);

    let late = NoteDraft::new(120.0, "watch this part again")
        .validate(fixed_now(), None)
        .unwrap()
        .assign_id(NoteId::generate());
    let early = NoteDraft::new(15.0, "key definition")
        .validate(fixed_now(), None)
        .unwrap()
        .assign_id(NoteId::generate());

    store.upsert_note(lesson_id, &late).await.unwrap();
    store.upsert_note(lesson_id, &early).await.unwrap();

    let notes = store.list_notes(lesson_id).await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id(), early.id());
    assert_eq!(notes[0].text(), "key definition");
    assert_eq!(notes[0].created_at(), fixed_now());
    assert_eq!(notes[1].id(), late.id());
}

#[tokio::test]
async fn note_delete_is_idempotent_and_scoped() {
    let store = store().await;
    let lesson_a = LessonId::new(5);
    let lesson_b = LessonId::new(6);

    let note = NoteDraft::new(10.0, "only in lesson five")
        .validate(fixed_now(), None)
        .unwrap()
        .assign_id(NoteId::generate());
    store.upsert_note(lesson_a, &note).await.unwrap();

    // Deleting under the wrong lesson removes nothing.
    store.delete_note(lesson_b, note.id()).await.unwrap();
    assert_eq!(store.list_notes(lesson_a).await.unwrap().len(), 1);

    store.delete_note(lesson_a, note.id()).await.unwrap();
    store.delete_note(lesson_a, note.id()).await.unwrap();
    assert!(store.list_notes(lesson_a).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_note_row_is_skipped() {
    let store = store().await;

    sqlx::query(
        "INSERT INTO lesson_notes (lesson_id, note_id, time_secs, text, created_at)
         VALUES (7, 'not-a-uuid', 10.0, 'orphan', '2023-11-14T22:13:20Z')",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let good = NoteDraft::new(20.0, "valid")
        .validate(fixed_now(), None)
        .unwrap()
        .assign_id(NoteId::generate());
    store.upsert_note(LessonId::new(7), &good).await.unwrap();

    let notes = store.list_notes(LessonId::new(7)).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id(), good.id());
}
