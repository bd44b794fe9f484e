use sqlx::SqlitePool;
use tracing::warn;

use crate::{store, AppError, AppResult, Notifier};

/// Inserts the message, then fans out to every other participant. Each
/// recipient's fan-out is independently best-effort; a delivery failure
/// never undoes the message itself.
pub(crate) async fn send_message(
    pool: &SqlitePool,
    notifier: &Notifier,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> AppResult<String> {
    if !store::conversations::is_participant(pool, conversation_id, sender_id).await? {
        return Err(AppError::NotFound("会話が見つかりません".to_owned()));
    }

    let message_id =
        store::conversations::insert_message(pool, conversation_id, sender_id, content).await?;

    let sender = store::profiles::nickname(pool, sender_id).await?;
    let group_name = store::groups::name_by_chat_room(pool, conversation_id).await?;

    for recipient in store::conversations::participants(pool, conversation_id).await? {
        if recipient == sender_id {
            continue;
        }
        if let Err(e) = fanout_message(
            pool,
            notifier,
            conversation_id,
            sender_id,
            sender.as_deref(),
            group_name.as_deref(),
            &recipient,
        )
        .await
        {
            warn!("message notification for {recipient} failed: {e}");
        }
    }

    Ok(message_id)
}

async fn fanout_message(
    pool: &SqlitePool,
    notifier: &Notifier,
    conversation_id: &str,
    sender_id: &str,
    sender_nickname: Option<&str>,
    group_name: Option<&str>,
    recipient: &str,
) -> AppResult<()> {
    let sender = sender_nickname.unwrap_or("名無しトレーニー");
    let content = match group_name {
        Some(group) => format!("{group}で{sender}さんがメッセージを送信しました"),
        None => format!("{sender}さんからメッセージが届いています"),
    };
    store::notifications::insert(
        pool,
        recipient,
        sender_id,
        "message",
        &content,
        Some(&format!("/c/{conversation_id}")),
    )
    .await?;
    notifier
        .notify_message(pool, recipient, sender_nickname, group_name.is_some(), group_name)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversations::resolver::get_or_create_conversation;
    use crate::store::testing;
    use crate::Config;

    fn notifier() -> Notifier {
        Notifier::new(Config::for_tests())
    }

    #[tokio::test]
    async fn outsiders_cannot_post() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;
        testing::seed_user(&pool, "c", "次郎", Some("jiro@example.com"), None).await;

        let convo = get_or_create_conversation(&pool, "a", "b").await.unwrap();
        let err = send_message(&pool, &notifier(), &convo, "c", "混ぜて")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn message_notifies_the_other_participant() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;

        let convo = get_or_create_conversation(&pool, "a", "b").await.unwrap();
        send_message(&pool, &notifier(), &convo, "a", "今日行く？").await.unwrap();

        let rows = store::notifications::list_for_user(&pool, "b").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].2, "message");
        assert!(store::notifications::list_for_user(&pool, "a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unread_counts_follow_the_watermark() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;

        let convo = get_or_create_conversation(&pool, "a", "b").await.unwrap();
        send_message(&pool, &notifier(), &convo, "a", "one").await.unwrap();
        send_message(&pool, &notifier(), &convo, "a", "two").await.unwrap();

        assert_eq!(store::conversations::unread_count(&pool, &convo, "b").await.unwrap(), 2);
        // own messages never count as unread
        assert_eq!(store::conversations::unread_count(&pool, &convo, "a").await.unwrap(), 0);

        // backdate the messages so the watermark set "now" clears them
        sqlx::query("UPDATE messages SET created_at = created_at - 10")
            .execute(&pool)
            .await
            .unwrap();
        store::conversations::mark_read(&pool, &convo, "b").await.unwrap();
        assert_eq!(store::conversations::unread_count(&pool, &convo, "b").await.unwrap(), 0);
    }
}
