use sqlx::SqlitePool;

use crate::AppResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub email: Option<String>,
    pub line_user_id: Option<String>,
    pub nickname: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub header_url: Option<String>,
    pub prefecture: Option<String>,
    pub home_gym: Option<String>,
    pub bench_press_max: Option<i64>,
    pub squat_max: Option<i64>,
    pub deadlift_max: Option<i64>,
    pub achievements: Option<String>,
    pub certifications: Option<String>,
    pub show_prefecture: bool,
    pub show_home_gym: bool,
    pub show_lift_maxes: bool,
}

/// Mutable, owner-editable profile fields.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProfileUpdate {
    pub nickname: String,
    #[serde(default)]
    pub bio: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub header_url: Option<String>,
    pub prefecture: Option<String>,
    pub home_gym: Option<String>,
    pub bench_press_max: Option<i64>,
    pub squat_max: Option<i64>,
    pub deadlift_max: Option<i64>,
    pub achievements: Option<serde_json::Value>,
    pub certifications: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub show_prefecture: bool,
    #[serde(default = "default_true")]
    pub show_home_gym: bool,
    #[serde(default = "default_true")]
    pub show_lift_maxes: bool,
}

fn default_true() -> bool {
    true
}

pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    nickname: &str,
    email: Option<&str>,
    line_user_id: Option<&str>,
) -> AppResult<()> {
    sqlx::query("INSERT INTO profiles (user_id,nickname,email,line_user_id,created_at) VALUES (?,?,?,?,?)")
        .bind(user_id)
        .bind(nickname)
        .bind(email)
        .bind(line_user_id)
        .bind(super::now())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, user_id: &str) -> AppResult<Option<ProfileRow>> {
    Ok(sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id=?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn find_by_line_id(pool: &SqlitePool, line_user_id: &str) -> AppResult<Option<String>> {
    Ok(
        sqlx::query_as::<_, (String,)>("SELECT user_id FROM profiles WHERE line_user_id=?")
            .bind(line_user_id)
            .fetch_optional(pool)
            .await?
            .map(|(user_id,)| user_id),
    )
}

pub async fn nickname(pool: &SqlitePool, user_id: &str) -> AppResult<Option<String>> {
    Ok(
        sqlx::query_as::<_, (String,)>("SELECT nickname FROM profiles WHERE user_id=?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .map(|(nickname,)| nickname),
    )
}

/// Contact identity for notification delivery. Administrative read: ignores
/// visibility flags and block edges on purpose.
pub async fn contact(
    pool: &SqlitePool,
    user_id: &str,
) -> AppResult<Option<(Option<String>, Option<String>)>> {
    Ok(
        sqlx::query_as::<_, (Option<String>, Option<String>)>(
            "SELECT email,line_user_id FROM profiles WHERE user_id=?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?,
    )
}

pub async fn update(pool: &SqlitePool, user_id: &str, update: &ProfileUpdate) -> AppResult<()> {
    let achievements = update
        .achievements
        .as_ref()
        .map(|v| serde_json::Value::Array(crate::sanitize::ensure_list(v.clone())).to_string());
    let certifications = update
        .certifications
        .as_ref()
        .map(|v| serde_json::Value::Array(crate::sanitize::ensure_list(v.clone())).to_string());

    // email is the notification address; an update that omits it keeps the
    // stored one instead of clearing the contact record
    sqlx::query(
        "UPDATE profiles SET nickname=?, bio=?, email=COALESCE(?, email), avatar_url=?, header_url=?,
            prefecture=?, home_gym=?, bench_press_max=?, squat_max=?, deadlift_max=?,
            achievements=?, certifications=?, show_prefecture=?, show_home_gym=?, show_lift_maxes=?
         WHERE user_id=?",
    )
    .bind(&update.nickname)
    .bind(&update.bio)
    .bind(&update.email)
    .bind(&update.avatar_url)
    .bind(&update.header_url)
    .bind(&update.prefecture)
    .bind(&update.home_gym)
    .bind(update.bench_press_max)
    .bind(update.squat_max)
    .bind(update.deadlift_max)
    .bind(achievements)
    .bind(certifications)
    .bind(update.show_prefecture)
    .bind(update.show_home_gym)
    .bind(update.show_lift_maxes)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Listing row: (user_id, nickname, prefecture, avatar_url).
pub type ListingRow = (String, String, Option<String>, Option<String>);

pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<ListingRow>> {
    Ok(sqlx::query_as::<_, ListingRow>(
        "SELECT user_id,nickname,prefecture,avatar_url FROM profiles ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?)
}

pub async fn list_by_prefecture(
    pool: &SqlitePool,
    variants: &[&str],
) -> AppResult<Vec<ListingRow>> {
    if variants.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; variants.len()].join(",");
    let sql = format!(
        "SELECT user_id,nickname,prefecture,avatar_url FROM profiles
         WHERE prefecture IN ({placeholders}) ORDER BY created_at DESC"
    );
    let mut query = sqlx::query_as::<_, ListingRow>(&sql);
    for variant in variants {
        query = query.bind(*variant);
    }
    Ok(query.fetch_all(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    #[tokio::test]
    async fn contact_resolves_email_and_line_id() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "u1", "太郎", Some("taro@example.com"), Some("L123")).await;

        let got = contact(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(got.0.as_deref(), Some("taro@example.com"));
        assert_eq!(got.1.as_deref(), Some("L123"));
        assert!(contact(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_matches_stored_variants() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "u1", "太郎", None, None).await;
        testing::seed_user(&pool, "u2", "花子", None, None).await;
        testing::seed_user(&pool, "u3", "次郎", None, None).await;
        for (user_id, prefecture) in [("u1", "東京都"), ("u2", "東京"), ("u3", "大阪府")] {
            sqlx::query("UPDATE profiles SET prefecture=? WHERE user_id=?")
                .bind(prefecture)
                .bind(user_id)
                .execute(&pool)
                .await
                .unwrap();
        }

        let rows = list_by_prefecture(&pool, &crate::geo::match_values("東京都"))
            .await
            .unwrap();
        let mut ids: Vec<_> = rows.iter().map(|r| r.0.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["u1", "u2"]);
    }
}
