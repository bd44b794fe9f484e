use serde::Serialize;

use crate::{AppError, AppResult};

const PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

pub(super) async fn push(
    http: &reqwest::Client,
    channel_token: &str,
    to: &str,
    text: &str,
) -> AppResult<()> {
    let response = http
        .post(PUSH_URL)
        .bearer_auth(channel_token)
        .json(&PushRequest {
            to,
            messages: [TextMessage { kind: "text", text }],
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!("LINE push failed: {status} {detail}")));
    }
    Ok(())
}
