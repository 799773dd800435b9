mod common;

use common::{count, store};
use resty_data::DataError;
use resty_data_sqlx::{with_session, SqlxErrorExt};

async fn insert_cat(session: &mut resty_data_sqlx::Session) -> Result<(), DataError> {
    sqlx::query("INSERT INTO animals (name) VALUES ('cat')")
        .execute(session.conn())
        .await
        .map_err(|e| e.into_data_error())?;
    Ok(())
}

#[tokio::test]
async fn committed_work_is_kept() {
    let store = store().await;
    with_session(&store, |mut session| async move {
        insert_cat(&mut session).await?;
        session.commit().await
    })
    .await
    .unwrap();
    assert_eq!(count(&store, "animals").await, 1);
}

#[tokio::test]
async fn dropped_session_rolls_back_and_frees_its_connection() {
    let store = store().await;
    let result: Result<(), DataError> = with_session(&store, |mut session| async move {
        insert_cat(&mut session).await?;
        Err(DataError::Other("validation failed".into()))
    })
    .await;
    assert!(matches!(result, Err(DataError::Other(_))));

    // One pooled connection: this only succeeds if the session was released.
    assert_eq!(count(&store, "animals").await, 0);
}

#[tokio::test]
async fn explicit_rollback() {
    let store = store().await;
    let mut session = store.session().await.unwrap();
    insert_cat(&mut session).await.unwrap();
    session.rollback().await.unwrap();
    assert_eq!(count(&store, "animals").await, 0);
}

#[tokio::test]
async fn sessions_are_numbered() {
    let store = store().await;
    let first = store.session().await.unwrap();
    let first_id = first.id();
    drop(first);
    let second = store.session().await.unwrap();
    assert!(second.id() > first_id);
}

#[tokio::test]
async fn errors_propagate_through_the_scope() {
    let store = store().await;
    let result: Result<i64, DataError> = with_session(&store, |mut session| async move {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM no_such_table")
            .fetch_one(session.conn())
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(row.0)
    })
    .await;
    assert!(matches!(result, Err(DataError::Database(_))));
}
