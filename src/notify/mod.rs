//! Notification fan-out: email via the transactional provider plus a LINE
//! push for recipients who linked their LINE identity. Email is
//! semi-mandatory (a missing recipient address or a provider failure is an
//! error); the push is always best-effort. No idempotency: firing the same
//! event twice notifies twice.

mod email;
pub mod inbox;
mod line;
pub mod relay;

use sqlx::SqlitePool;
use tracing::warn;

use crate::{store, AppError, AppResult, Config};

/// Outcome of one fan-out. Degraded-but-successful deliveries carry their
/// skipped/failed secondary effects in `warnings` instead of being silently
/// discarded.
#[derive(Debug, Default)]
pub struct Fanout {
    pub email_sent: bool,
    pub push_sent: bool,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    config: Config,
}

impl Notifier {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// New-follower event, delivered to the followed user.
    pub async fn notify_follow(
        &self,
        pool: &SqlitePool,
        following_id: &str,
        follower_id: &str,
    ) -> AppResult<Fanout> {
        let follower = store::profiles::nickname(pool, follower_id)
            .await?
            .unwrap_or_else(|| "名無しトレーニー".to_owned());
        let subject = "【FITPEAK】新しいフォロワー".to_owned();
        let body = format!(
            "{follower}さんにフォローされました。\n{}/p/{follower_id}",
            self.config.base_url
        );
        self.deliver(pool, following_id, &subject, &body).await
    }

    /// New chat message event, individual or group.
    pub async fn notify_message(
        &self,
        pool: &SqlitePool,
        recipient_user_id: &str,
        sender_nickname: Option<&str>,
        is_group: bool,
        group_name: Option<&str>,
    ) -> AppResult<Fanout> {
        let sender = sender_nickname.unwrap_or("名無しトレーニー");
        let (subject, body) = if is_group {
            let group = group_name.unwrap_or("グループ");
            (
                format!("【FITPEAK】{group}に新着メッセージ"),
                format!("{group}で{sender}さんがメッセージを送信しました。"),
            )
        } else {
            (
                "【FITPEAK】新着メッセージ".to_owned(),
                format!("{sender}さんからメッセージが届いています。"),
            )
        };
        self.deliver(pool, recipient_user_id, &subject, &body).await
    }

    /// Recruitment application event, delivered to the recruitment owner.
    pub async fn notify_application(
        &self,
        pool: &SqlitePool,
        creator_id: &str,
        recruitment_title: Option<&str>,
        applicant_nickname: Option<&str>,
    ) -> AppResult<Fanout> {
        let title = recruitment_title.unwrap_or("募集");
        let applicant = applicant_nickname.unwrap_or("名無しトレーニー");
        let subject = "【FITPEAK】合トレ参加申請".to_owned();
        let body = format!("「{title}」に{applicant}さんから参加申請が届いています。");
        self.deliver(pool, creator_id, &subject, &body).await
    }

    async fn deliver(
        &self,
        pool: &SqlitePool,
        recipient_id: &str,
        subject: &str,
        body: &str,
    ) -> AppResult<Fanout> {
        let Some((address, line_user_id)) = store::profiles::contact(pool, recipient_id).await?
        else {
            return Err(AppError::NotFound(format!("user {recipient_id} not found")));
        };
        // Hard precondition: a recipient without a resolvable email address
        // is an error, not a skip.
        let Some(address) = address else {
            return Err(AppError::NotFound(format!(
                "user {recipient_id} has no email address"
            )));
        };

        let mut outcome = Fanout::default();

        match (&self.config.resend_api_key, &self.config.email_from) {
            (Some(api_key), Some(from)) => {
                email::send(&self.http, api_key, from, &address, subject, body).await?;
                outcome.email_sent = true;
            }
            _ => outcome.warnings.push("email provider not configured, skipped".to_owned()),
        }

        // Push is opt-in by linkage and always best-effort.
        if let Some(line_user_id) = line_user_id {
            match &self.config.line_messaging_token {
                Some(token) => match line::push(&self.http, token, &line_user_id, body).await {
                    Ok(()) => outcome.push_sent = true,
                    Err(e) => {
                        warn!("LINE push to {recipient_id} failed: {e}");
                        outcome.warnings.push(format!("LINE push failed: {e}"));
                    }
                },
                None => outcome
                    .warnings
                    .push("LINE messaging token not configured, skipped".to_owned()),
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    fn notifier() -> Notifier {
        Notifier::new(Config::for_tests())
    }

    #[tokio::test]
    async fn missing_email_is_a_hard_error() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", None, None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;

        let err = notifier().notify_follow(&pool, "a", "b").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let pool = testing::pool().await;
        let err = notifier()
            .notify_message(&pool, "ghost", Some("太郎"), false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unconfigured_providers_degrade_with_warnings() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), Some("L42")).await;

        let outcome = notifier().notify_follow(&pool, "b", "a").await.unwrap();
        assert!(!outcome.email_sent);
        assert!(!outcome.push_sent);
        // one skip for email, one for the linked-but-unconfigured push
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[tokio::test]
    async fn push_is_skipped_silently_without_linked_identity() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;

        let outcome = notifier()
            .notify_application(&pool, "b", Some("ベンチ会"), Some("太郎"))
            .await
            .unwrap();
        assert!(!outcome.push_sent);
        assert_eq!(outcome.warnings.len(), 1);
    }
}
