use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::user::{AuthProvider, OAuthProfile};

/// Resolves provider access tokens into user profiles.
pub(crate) struct OAuthClient {
    client: Client,
    google_userinfo_url: String,
    kakao_userinfo_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    #[serde(default)]
    verified_email: bool,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoUser {
    id: i64,
    #[serde(default)]
    kakao_account: KakaoAccount,
    #[serde(default)]
    properties: KakaoProperties,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    #[serde(default)]
    is_email_verified: bool,
    #[serde(default)]
    profile: KakaoProperties,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
}

impl From<GoogleUserInfo> for OAuthProfile {
    fn from(info: GoogleUserInfo) -> Self {
        OAuthProfile {
            provider: AuthProvider::Google,
            provider_id: info.id,
            email: info.email.filter(|_| info.verified_email),
            name: info.name,
        }
    }
}

impl From<KakaoUser> for OAuthProfile {
    fn from(user: KakaoUser) -> Self {
        let account = user.kakao_account;
        OAuthProfile {
            provider: AuthProvider::Kakao,
            provider_id: user.id.to_string(),
            email: account.email.filter(|_| account.is_email_verified),
            name: account.profile.nickname.or(user.properties.nickname),
        }
    }
}

impl OAuthClient {
    pub(crate) fn new(client: Client, google_userinfo_url: &str, kakao_userinfo_url: &str) -> Self {
        Self {
            client,
            google_userinfo_url: google_userinfo_url.to_string(),
            kakao_userinfo_url: kakao_userinfo_url.to_string(),
        }
    }

    pub(crate) async fn fetch_profile(
        &self,
        provider: AuthProvider,
        access_token: &str,
    ) -> Result<OAuthProfile, DomainError> {
        match provider {
            AuthProvider::Google => Ok(self
                .get_json::<GoogleUserInfo>(provider, &self.google_userinfo_url, access_token)
                .await?
                .into()),
            AuthProvider::Kakao => Ok(self
                .get_json::<KakaoUser>(provider, &self.kakao_userinfo_url, access_token)
                .await?
                .into()),
            AuthProvider::Email => Err(DomainError::Validation {
                field: "provider",
                message: "must be google or kakao",
            }),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        provider: AuthProvider,
        url: &str,
        access_token: &str,
    ) -> Result<T, DomainError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| DomainError::Upstream(format!("{provider} userinfo: {err}")))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(DomainError::InvalidCredentials);
            }
            status => {
                warn!(%provider, %status, "oauth provider rejected userinfo request");
                return Err(DomainError::Upstream(format!(
                    "{provider} userinfo returned {status}"
                )));
            }
        }

        response
            .json::<T>()
            .await
            .map_err(|err| DomainError::Upstream(format!("{provider} userinfo body: {err}")))
    }
}
