use sqlx::SqlitePool;

use crate::AppResult;

/// Idempotent table bootstrap, run at startup and by tests.
pub async fn init(pool: &SqlitePool) -> AppResult<()> {
    for ddl in DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

const DDL: [&str; 13] = [
    "CREATE TABLE IF NOT EXISTS profiles (
        user_id TEXT PRIMARY KEY,
        email TEXT,
        line_user_id TEXT,
        nickname TEXT NOT NULL,
        bio TEXT NOT NULL DEFAULT '',
        avatar_url TEXT,
        header_url TEXT,
        prefecture TEXT,
        home_gym TEXT,
        bench_press_max INTEGER,
        squat_max INTEGER,
        deadlift_max INTEGER,
        achievements TEXT,
        certifications TEXT,
        show_prefecture INTEGER NOT NULL DEFAULT 1,
        show_home_gym INTEGER NOT NULL DEFAULT 1,
        show_lift_maxes INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS follows (
        follower_id TEXT NOT NULL,
        following_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (follower_id, following_id)
    )",
    "CREATE TABLE IF NOT EXISTS blocks (
        blocker_id TEXT NOT NULL,
        blocked_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (blocker_id, blocked_id)
    )",
    "CREATE TABLE IF NOT EXISTS reports (
        id TEXT PRIMARY KEY,
        reporter_id TEXT NOT NULL,
        target_id TEXT NOT NULL,
        target_type TEXT NOT NULL,
        reason TEXT NOT NULL,
        details TEXT,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        sender_id TEXT NOT NULL,
        type TEXT NOT NULL,
        content TEXT NOT NULL,
        link TEXT,
        is_read INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS conversation_participants (
        conversation_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        last_read_at INTEGER,
        UNIQUE (conversation_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL,
        sender_id TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS groups (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL,
        prefecture TEXT,
        header_image_url TEXT,
        creator_id TEXT NOT NULL,
        chat_room_id TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS group_members (
        group_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (group_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS recruitments (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        body_part TEXT,
        event_at INTEGER,
        location TEXT,
        level TEXT,
        status TEXT NOT NULL DEFAULT 'open',
        chat_room_id TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS recruitment_participants (
        recruitment_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at INTEGER NOT NULL,
        UNIQUE (recruitment_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS buckets (
        name TEXT PRIMARY KEY,
        size_limit INTEGER NOT NULL,
        allowed_mime TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
];
