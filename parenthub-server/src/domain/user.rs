use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
    Expert,
    Admin,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Expert => "expert",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Role::User),
            "expert" => Ok(Role::Expert),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::Unexpected(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AccountStatus {
    Active,
    Banned,
}

impl AccountStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Banned => "banned",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(AccountStatus::Active),
            "banned" => Ok(AccountStatus::Banned),
            other => Err(DomainError::Unexpected(format!(
                "unknown account status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AuthProvider {
    Email,
    Google,
    Kakao,
}

impl AuthProvider {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
            AuthProvider::Kakao => "kakao",
        }
    }

    /// Parses the `{provider}` path segment of the OAuth endpoint.
    pub(crate) fn parse_oauth(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(AuthProvider::Google),
            "kakao" => Ok(AuthProvider::Kakao),
            _ => Err(DomainError::Validation {
                field: "provider",
                message: "must be google or kakao",
            }),
        }
    }
}

impl FromStr for AuthProvider {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(AuthProvider::Email),
            "google" => Ok(AuthProvider::Google),
            "kakao" => Ok(AuthProvider::Kakao),
            other => Err(DomainError::Unexpected(format!(
                "unknown auth provider: {other}"
            ))),
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) nickname: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        let nickname = normalize_nickname(&self.nickname)?;
        let password_len = self.password.chars().count();
        if !(6..=128).contains(&password_len) {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 6..128 chars",
            });
        }
        Ok(Self {
            email,
            password: self.password,
            nickname,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// Profile returned by an OAuth provider after the access token was accepted.
#[derive(Debug, Clone)]
pub(crate) struct OAuthProfile {
    pub(crate) provider: AuthProvider,
    pub(crate) provider_id: String,
    pub(crate) email: Option<String>,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) email: Option<String>,
    pub(crate) nickname: String,
    pub(crate) role: Role,
    pub(crate) status: AccountStatus,
    pub(crate) provider: AuthProvider,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn is_banned(&self) -> bool {
        self.status == AccountStatus::Banned
    }
}

pub(crate) fn normalize_nickname(nickname: &str) -> Result<String, DomainError> {
    let nickname = nickname.trim();
    let len = nickname.chars().count();
    if !(2..=20).contains(&len) {
        return Err(DomainError::Validation {
            field: "nickname",
            message: "must be 2..20 chars",
        });
    }
    Ok(nickname.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{
        AuthProvider, LoginRequest, RegisterRequest, Role, normalize_email, normalize_nickname,
    };

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn nickname_rules_count_characters_not_bytes() {
        assert!(normalize_nickname("a").is_err());
        assert!(normalize_nickname("엄마").is_ok());
        assert!(normalize_nickname("123456789012345678901").is_err());
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "short".to_string(),
            nickname: "nick1".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            email: " Test@Example.com ".to_string(),
            password: "secret1".to_string(),
            nickname: "  nick1 ".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.email, "test@example.com");
        assert_eq!(validated.nickname, "nick1");
    }

    #[test]
    fn login_rejects_empty_password() {
        let req = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn roles_and_providers_round_trip_through_storage_strings() {
        for role in [Role::User, Role::Expert, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().expect("known role"), role);
        }
        assert!("email".parse::<AuthProvider>().is_ok());
        assert!(AuthProvider::parse_oauth("email").is_err());
        assert_eq!(
            AuthProvider::parse_oauth(" Kakao ").expect("kakao is an oauth provider"),
            AuthProvider::Kakao
        );
    }
}
