use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::{AppResult, Config};

pub(crate) type LineClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

pub(crate) const PROFILE_URL: &str = "https://api.line.me/v2/profile";

pub(crate) fn line_client(config: &Config) -> AppResult<LineClient> {
    let (Some(channel_id), Some(channel_secret)) =
        (&config.line_channel_id, &config.line_channel_secret)
    else {
        return Err("LINEログインのチャネルキーが設定されていません".into());
    };

    let auth_url = AuthUrl::new("https://access.line.me/oauth2/v2.1/authorize".to_string())
        .map_err(|e| e.to_string())?;
    let token_url = TokenUrl::new("https://api.line.me/oauth2/v2.1/token".to_string())
        .map_err(|e| e.to_string())?;
    let redirect_url = RedirectUrl::new(format!("{}/lockin", config.base_url))
        .map_err(|e| e.to_string())?;

    Ok(BasicClient::new(ClientId::new(channel_id.clone()))
        .set_client_secret(ClientSecret::new(channel_secret.clone()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}
