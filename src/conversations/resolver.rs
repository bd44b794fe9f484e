//! Find-or-create for 1:1 conversations.
//!
//! A direct conversation must never be one that a group or a recruitment
//! claims as its chat room. If a race ever produces two qualifying
//! conversations for the same pair, the first candidate encountered wins;
//! there is no recency tie-break.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::{store, AppError, AppResult};

pub async fn get_or_create_conversation(
    pool: &SqlitePool,
    user_a: &str,
    user_b: &str,
) -> AppResult<String> {
    if user_a == user_b {
        return Err(AppError::InvalidArgument("自分にメッセージを送ることはできません".to_owned()));
    }

    let mine = store::conversations::ids_for_user(pool, user_a).await?;
    if mine.is_empty() {
        return create_direct(pool, user_a, user_b).await;
    }

    let mine: HashSet<String> = mine.into_iter().collect();
    let theirs = store::conversations::ids_for_user(pool, user_b).await?;
    for candidate in theirs {
        if !mine.contains(&candidate) {
            continue;
        }
        if store::groups::name_by_chat_room(pool, &candidate).await?.is_some() {
            continue;
        }
        if store::recruitments::is_chat_room(pool, &candidate).await? {
            continue;
        }
        return Ok(candidate);
    }

    create_direct(pool, user_a, user_b).await
}

// Two sequential writes, no transaction: a failure in between leaves an
// orphaned conversation with no participants. Known gap.
async fn create_direct(pool: &SqlitePool, user_a: &str, user_b: &str) -> AppResult<String> {
    let id = store::conversations::create(pool).await?;
    store::conversations::add_participant(pool, &id, user_a).await?;
    store::conversations::add_participant(pool, &id, user_b).await?;
    Ok(id)
}
