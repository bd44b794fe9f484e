use std::fmt;

use sqlx::SqlitePool;
use tracing::warn;

use crate::{store, AppError, AppResult, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParticipationStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

impl ParticipationStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ParticipationStatus::Pending => "pending",
            ParticipationStatus::Approved => "approved",
            ParticipationStatus::Rejected => "rejected",
            ParticipationStatus::Withdrawn => "withdrawn",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ParticipationStatus::Pending),
            "approved" => Some(ParticipationStatus::Approved),
            "rejected" => Some(ParticipationStatus::Rejected),
            "withdrawn" => Some(ParticipationStatus::Withdrawn),
            _ => None,
        }
    }

    /// pending → approved | rejected, approved → withdrawn. Terminal states
    /// never transition, and nothing goes back to pending.
    pub(crate) fn can_transition(self, to: Self) -> bool {
        use ParticipationStatus::*;
        matches!(
            (self, to),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Withdrawn)
        )
    }
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates the pending participation and fires the application fan-out to
/// the owner best-effort.
pub(crate) async fn apply(
    pool: &SqlitePool,
    notifier: &Notifier,
    recruitment_id: &str,
    applicant_id: &str,
) -> AppResult<()> {
    let Some((owner_id, title, _status, _room)) = store::recruitments::get(pool, recruitment_id).await?
    else {
        return Err(AppError::NotFound("募集が見つかりません".to_owned()));
    };
    if owner_id == applicant_id {
        return Err(AppError::InvalidArgument("自分の募集には申請できません".to_owned()));
    }

    store::recruitments::add_participant(pool, recruitment_id, applicant_id).await?;

    if let Err(e) = fanout_application(pool, notifier, recruitment_id, &owner_id, &title, applicant_id).await {
        warn!("application notification for {owner_id} failed: {e}");
    }
    Ok(())
}

async fn fanout_application(
    pool: &SqlitePool,
    notifier: &Notifier,
    recruitment_id: &str,
    owner_id: &str,
    title: &str,
    applicant_id: &str,
) -> AppResult<()> {
    let applicant = store::profiles::nickname(pool, applicant_id).await?;
    let nickname = applicant.as_deref().unwrap_or("名無しトレーニー");
    store::notifications::insert(
        pool,
        owner_id,
        applicant_id,
        "application",
        &format!("「{title}」に{nickname}さんから参加申請が届きました"),
        Some(&format!("/rec/{recruitment_id}")),
    )
    .await?;
    notifier
        .notify_application(pool, owner_id, Some(title), applicant.as_deref())
        .await?;
    Ok(())
}

/// Owner decision or self-withdrawal, guarded by the transition table.
pub(crate) async fn transition(
    pool: &SqlitePool,
    recruitment_id: &str,
    user_id: &str,
    to: ParticipationStatus,
) -> AppResult<()> {
    let Some(raw) = store::recruitments::participant_status(pool, recruitment_id, user_id).await?
    else {
        return Err(AppError::NotFound("参加申請が見つかりません".to_owned()));
    };
    let from = ParticipationStatus::parse(&raw)
        .ok_or_else(|| AppError::InvalidArgument(format!("不明な参加状態: {raw}")))?;

    if !from.can_transition(to) {
        return Err(AppError::InvalidArgument(format!("{from}から{to}には変更できません")));
    }

    store::recruitments::set_participant_status(pool, recruitment_id, user_id, to.as_str()).await
}

/// Approval: status change, then chat-room membership, then the in-app
/// notification. The membership grant and notification are secondary.
pub(crate) async fn approve(
    pool: &SqlitePool,
    recruitment_id: &str,
    chat_room_id: &str,
    applicant_id: &str,
) -> AppResult<()> {
    transition(pool, recruitment_id, applicant_id, ParticipationStatus::Approved).await?;

    store::conversations::add_participant(pool, chat_room_id, applicant_id).await?;

    let Some((owner_id, title, _status, _room)) = store::recruitments::get(pool, recruitment_id).await?
    else {
        return Ok(());
    };
    if let Err(e) = store::notifications::insert(
        pool,
        applicant_id,
        &owner_id,
        "application_approved",
        &format!("「{title}」への参加が承認されました"),
        Some(&format!("/rec/{recruitment_id}")),
    )
    .await
    {
        warn!("approval notification for {applicant_id} failed: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;
    use crate::Config;
    use ParticipationStatus::*;

    fn notifier() -> Notifier {
        Notifier::new(Config::for_tests())
    }

    async fn seed_recruitment(pool: &SqlitePool, owner: &str) -> (String, String) {
        let room = store::conversations::create(pool).await.unwrap();
        store::conversations::add_participant(pool, &room, owner).await.unwrap();
        let id = store::recruitments::insert(
            pool,
            &store::recruitments::NewRecruitment {
                owner_id: owner,
                title: "ベンチ合トレ",
                description: "",
                body_part: Some("胸"),
                event_at: None,
                location: Some("ゴールドジム渋谷"),
                level: Some("中級"),
                chat_room_id: &room,
            },
        )
        .await
        .unwrap();
        (id, room)
    }

    #[test]
    fn transition_table() {
        assert!(Pending.can_transition(Approved));
        assert!(Pending.can_transition(Rejected));
        assert!(Approved.can_transition(Withdrawn));

        assert!(!Approved.can_transition(Pending));
        assert!(!Rejected.can_transition(Pending));
        assert!(!Rejected.can_transition(Approved));
        assert!(!Withdrawn.can_transition(Approved));
        assert!(!Pending.can_transition(Withdrawn));
    }

    #[tokio::test]
    async fn owner_cannot_apply_to_own_recruitment() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "owner", "主", Some("o@example.com"), None).await;
        let (rec, _room) = seed_recruitment(&pool, "owner").await;

        let err = apply(&pool, &notifier(), &rec, "owner").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn apply_notifies_the_owner() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "owner", "主", Some("o@example.com"), None).await;
        testing::seed_user(&pool, "app", "申請者", Some("a@example.com"), None).await;
        let (rec, _room) = seed_recruitment(&pool, "owner").await;

        apply(&pool, &notifier(), &rec, "app").await.unwrap();

        assert_eq!(
            store::recruitments::participant_status(&pool, &rec, "app").await.unwrap().as_deref(),
            Some("pending")
        );
        let rows = store::notifications::list_for_user(&pool, "owner").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].2, "application");
    }

    #[tokio::test]
    async fn approval_grants_chat_room_membership() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "owner", "主", Some("o@example.com"), None).await;
        testing::seed_user(&pool, "app", "申請者", Some("a@example.com"), None).await;
        let (rec, room) = seed_recruitment(&pool, "owner").await;
        apply(&pool, &notifier(), &rec, "app").await.unwrap();

        approve(&pool, &rec, &room, "app").await.unwrap();

        assert_eq!(
            store::recruitments::participant_status(&pool, &rec, "app").await.unwrap().as_deref(),
            Some("approved")
        );
        assert!(store::conversations::is_participant(&pool, &room, "app").await.unwrap());
        let rows = store::notifications::list_for_user(&pool, "app").await.unwrap();
        assert_eq!(rows[0].2, "application_approved");
    }

    #[tokio::test]
    async fn terminal_states_are_frozen() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "owner", "主", Some("o@example.com"), None).await;
        testing::seed_user(&pool, "app", "申請者", Some("a@example.com"), None).await;
        let (rec, _room) = seed_recruitment(&pool, "owner").await;
        apply(&pool, &notifier(), &rec, "app").await.unwrap();

        transition(&pool, &rec, "app", Rejected).await.unwrap();
        let err = transition(&pool, &rec, "app", Approved).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert_eq!(
            store::recruitments::participant_status(&pool, &rec, "app").await.unwrap().as_deref(),
            Some("rejected")
        );
    }
}
