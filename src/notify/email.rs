use serde::Serialize;

use crate::{AppError, AppResult};

const SEND_URL: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

pub(super) async fn send(
    http: &reqwest::Client,
    api_key: &str,
    from: &str,
    to: &str,
    subject: &str,
    text: &str,
) -> AppResult<()> {
    let response = http
        .post(SEND_URL)
        .bearer_auth(api_key)
        .json(&EmailRequest { from, to: [to], subject, text })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!("email send failed: {status} {detail}")));
    }
    Ok(())
}
