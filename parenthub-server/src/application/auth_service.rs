use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{
    AuthProvider, LoginRequest, OAuthProfile, RegisterRequest, User, normalize_email,
    normalize_nickname,
};
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: JwtService,
}

impl<R: UserRepository> AuthService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";
    const GENERATED_NICKNAME_ATTEMPTS: usize = 5;

    pub(crate) fn new(repo: R, jwt: JwtService) -> Self {
        Self { repo, jwt }
    }

    pub(crate) fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        if self.repo.email_exists(&req.email).await? {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }
        if self.repo.nickname_exists(&req.nickname).await? {
            return Err(DomainError::AlreadyExists("nickname".to_string()));
        }

        let password_hash = self.hash_password(&req.password)?;

        let new_user = Self::into_new_user(req, password_hash);
        let user = self.repo.create_user(new_user).await?;
        info!(user_id = user.id, "user registered");

        self.issue(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_credentials_by_email(&req.email).await? {
            Some(user_creds) => user_creds,
            None => {
                // стремимся к одинаковому времени проверки если user не найден
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;

        if user_creds.user.is_banned() {
            warn!(user_id = user_creds.user.id, "banned user tried to log in");
            return Err(DomainError::Forbidden);
        }

        self.issue(user_creds.user)
    }

    /// Signs in with a profile already verified by the OAuth provider,
    /// creating the account on first sign-in.
    pub(crate) async fn oauth_sign_in(
        &self,
        profile: OAuthProfile,
    ) -> Result<AuthResult, DomainError> {
        if let Some(user) = self
            .repo
            .find_by_provider_id(profile.provider, &profile.provider_id)
            .await?
        {
            if user.is_banned() {
                warn!(user_id = user.id, provider = %profile.provider, "banned user tried oauth sign-in");
                return Err(DomainError::Forbidden);
            }
            return self.issue(user);
        }

        let email = match profile.email.as_deref() {
            Some(email) => match normalize_email(email) {
                Ok(email) => Some(email),
                Err(_) => {
                    warn!(provider = %profile.provider, "provider returned an invalid email, ignoring it");
                    None
                }
            },
            None => None,
        };
        if let Some(email) = email.as_deref()
            && self.repo.email_exists(email).await?
        {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let nickname = self.pick_nickname(profile.name.as_deref()).await?;
        let user = self
            .repo
            .create_user(NewUser {
                email,
                nickname,
                password_hash: None,
                provider: profile.provider,
                provider_id: Some(profile.provider_id),
            })
            .await?;
        info!(user_id = user.id, provider = %profile.provider, "user created from oauth profile");

        self.issue(user)
    }

    /// Returns `true` when the nickname is well-formed and not taken.
    pub(crate) async fn check_nickname(&self, nickname: &str) -> Result<bool, DomainError> {
        let nickname = normalize_nickname(nickname)?;
        Ok(!self.repo.nickname_exists(&nickname).await?)
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    pub(crate) fn into_new_user(req: RegisterRequest, password_hash: String) -> NewUser {
        NewUser {
            email: Some(req.email),
            nickname: req.nickname,
            password_hash: Some(password_hash),
            provider: AuthProvider::Email,
            provider_id: None,
        }
    }

    async fn pick_nickname(&self, display_name: Option<&str>) -> Result<String, DomainError> {
        let preferred = display_name
            .map(|name| name.trim().chars().take(20).collect::<String>())
            .and_then(|name| normalize_nickname(&name).ok());
        if let Some(nickname) = preferred
            && !self.repo.nickname_exists(&nickname).await?
        {
            return Ok(nickname);
        }

        for _ in 0..Self::GENERATED_NICKNAME_ATTEMPTS {
            let suffix = Uuid::new_v4().as_u128() % 10_000;
            let nickname = format!("user-{suffix:04}");
            if !self.repo.nickname_exists(&nickname).await? {
                return Ok(nickname);
            }
        }
        Ok(format!("user-{}", &Uuid::new_v4().simple().to_string()[..12]))
    }

    fn issue(&self, user: User) -> Result<AuthResult, DomainError> {
        let access_token = self
            .jwt
            .generate_token(&user)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult { user, access_token })
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::AuthService;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{
        AccountStatus, AuthProvider, LoginRequest, OAuthProfile, RegisterRequest, Role, User,
    };
    use crate::infrastructure::jwt::JwtService;

    #[derive(Default)]
    struct StoredUser {
        user: Option<User>,
        password_hash: Option<String>,
        provider_id: Option<String>,
    }

    #[derive(Clone, Default)]
    struct FakeUserRepo {
        users: Arc<Mutex<Vec<StoredUser>>>,
    }

    impl FakeUserRepo {
        fn insert(&self, input: NewUser) -> User {
            let mut users = self.users.lock().expect("users mutex poisoned");
            let now = Utc::now();
            let user = User {
                id: users.len() as i64 + 1,
                email: input.email,
                nickname: input.nickname,
                role: Role::User,
                status: AccountStatus::Active,
                provider: input.provider,
                created_at: now,
                updated_at: now,
            };
            users.push(StoredUser {
                user: Some(user.clone()),
                password_hash: input.password_hash,
                provider_id: input.provider_id,
            });
            user
        }

        fn set_status(&self, user_id: i64, status: AccountStatus) {
            let mut users = self.users.lock().expect("users mutex poisoned");
            for stored in users.iter_mut() {
                if let Some(user) = stored.user.as_mut()
                    && user.id == user_id
                {
                    user.status = status;
                }
            }
        }

        fn count(&self) -> usize {
            self.users.lock().expect("users mutex poisoned").len()
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            Ok(self.insert(input))
        }

        async fn find_credentials_by_email(
            &self,
            email: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            let users = self.users.lock().expect("users mutex poisoned");
            Ok(users.iter().find_map(|stored| {
                let user = stored.user.as_ref()?;
                let hash = stored.password_hash.as_ref()?;
                (user.provider == AuthProvider::Email && user.email.as_deref() == Some(email))
                    .then(|| UserCredentials {
                        user: user.clone(),
                        password_hash: hash.clone(),
                    })
            }))
        }

        async fn find_by_provider_id(
            &self,
            provider: AuthProvider,
            provider_id: &str,
        ) -> Result<Option<User>, DomainError> {
            let users = self.users.lock().expect("users mutex poisoned");
            Ok(users.iter().find_map(|stored| {
                let user = stored.user.as_ref()?;
                (user.provider == provider && stored.provider_id.as_deref() == Some(provider_id))
                    .then(|| user.clone())
            }))
        }

        async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
            let users = self.users.lock().expect("users mutex poisoned");
            Ok(users
                .iter()
                .filter_map(|stored| stored.user.as_ref())
                .any(|user| user.email.as_deref() == Some(email)))
        }

        async fn nickname_exists(&self, nickname: &str) -> Result<bool, DomainError> {
            let users = self.users.lock().expect("users mutex poisoned");
            Ok(users
                .iter()
                .filter_map(|stored| stored.user.as_ref())
                .any(|user| user.nickname == nickname))
        }
    }

    fn register_req(email: &str, nickname: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            nickname: nickname.to_string(),
        }
    }

    fn test_jwt() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", 3600)
    }

    #[tokio::test]
    async fn register_creates_user_and_returns_token() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), test_jwt());

        let result = service
            .register(register_req("  A@X.com ", " nick1 ", "secret1"))
            .await
            .expect("register must succeed");

        assert_eq!(result.user.email.as_deref(), Some("a@x.com"));
        assert_eq!(result.user.nickname, "nick1");
        assert_eq!(result.user.role, Role::User);
        let claims = service
            .jwt()
            .verify_token(&result.access_token)
            .expect("issued token must verify");
        assert_eq!(claims.user_id, result.user.id);
        assert_eq!(claims.nickname, "nick1");
    }

    #[tokio::test]
    async fn register_reports_email_conflict_before_nickname() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), test_jwt());
        service
            .register(register_req("a@x.com", "nick1", "secret1"))
            .await
            .expect("first registration must succeed");

        let err = service
            .register(register_req("a@x.com", "fresh", "secret1"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, DomainError::AlreadyExists(field) if field == "email"));

        let err = service
            .register(register_req("a@x.com", "nick1", "secret1"))
            .await
            .expect_err("duplicate email and nickname must fail");
        assert!(matches!(err, DomainError::AlreadyExists(field) if field == "email"));

        let err = service
            .register(register_req("b@x.com", "nick1", "secret1"))
            .await
            .expect_err("duplicate nickname must fail");
        assert!(matches!(err, DomainError::AlreadyExists(field) if field == "nickname"));
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let service = AuthService::new(FakeUserRepo::default(), test_jwt());

        let req = LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo, test_jwt());
        service
            .register(register_req("a@x.com", "nick1", "correct-password"))
            .await
            .expect("register must succeed");

        let req = LoginRequest {
            email: "a@x.com".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo, test_jwt());
        let registered = service
            .register(register_req("a@x.com", "nick1", "correct-password"))
            .await
            .expect("register must succeed");

        let req = LoginRequest {
            email: " A@X.COM ".to_string(),
            password: "correct-password".to_string(),
        };

        let result = service.login(req).await.expect("login must succeed");
        assert_eq!(result.user.id, registered.user.id);
        assert!(!result.access_token.is_empty());
    }

    #[tokio::test]
    async fn login_rejects_banned_account() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), test_jwt());
        let registered = service
            .register(register_req("a@x.com", "nick1", "correct-password"))
            .await
            .expect("register must succeed");
        repo.set_status(registered.user.id, AccountStatus::Banned);

        let req = LoginRequest {
            email: "a@x.com".to_string(),
            password: "correct-password".to_string(),
        };
        let err = service.login(req).await.expect_err("banned login must fail");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn check_nickname_reports_availability() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo, test_jwt());
        service
            .register(register_req("a@x.com", "nick1", "secret1"))
            .await
            .expect("register must succeed");

        assert!(!service.check_nickname(" nick1 ").await.expect("valid nickname"));
        assert!(service.check_nickname("nick2").await.expect("valid nickname"));
        assert!(service.check_nickname("x").await.is_err());
    }

    #[tokio::test]
    async fn oauth_sign_in_creates_user_once() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), test_jwt());
        let profile = OAuthProfile {
            provider: AuthProvider::Kakao,
            provider_id: "998877".to_string(),
            email: None,
            name: Some("하늘맘".to_string()),
        };

        let first = service
            .oauth_sign_in(profile.clone())
            .await
            .expect("first sign-in must create the user");
        assert_eq!(first.user.nickname, "하늘맘");
        assert_eq!(first.user.provider, AuthProvider::Kakao);

        let second = service
            .oauth_sign_in(profile)
            .await
            .expect("second sign-in must reuse the user");
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn oauth_sign_in_generates_nickname_when_name_is_taken() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), test_jwt());
        service
            .register(register_req("a@x.com", "nick1", "secret1"))
            .await
            .expect("register must succeed");

        let result = service
            .oauth_sign_in(OAuthProfile {
                provider: AuthProvider::Google,
                provider_id: "google-1".to_string(),
                email: Some("g@x.com".to_string()),
                name: Some("nick1".to_string()),
            })
            .await
            .expect("sign-in must succeed");
        assert!(result.user.nickname.starts_with("user-"));
        assert_eq!(result.user.email.as_deref(), Some("g@x.com"));
    }

    #[tokio::test]
    async fn oauth_sign_in_refuses_email_owned_by_another_account() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo, test_jwt());
        service
            .register(register_req("a@x.com", "nick1", "secret1"))
            .await
            .expect("register must succeed");

        let err = service
            .oauth_sign_in(OAuthProfile {
                provider: AuthProvider::Google,
                provider_id: "google-1".to_string(),
                email: Some("A@x.com".to_string()),
                name: None,
            })
            .await
            .expect_err("email already used by an email account");
        assert!(matches!(err, DomainError::AlreadyExists(field) if field == "email"));
    }

    #[tokio::test]
    async fn oauth_sign_in_rejects_banned_user() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), test_jwt());
        let profile = OAuthProfile {
            provider: AuthProvider::Google,
            provider_id: "google-7".to_string(),
            email: None,
            name: None,
        };
        let created = service
            .oauth_sign_in(profile.clone())
            .await
            .expect("sign-in must succeed");
        repo.set_status(created.user.id, AccountStatus::Banned);

        let err = service
            .oauth_sign_in(profile)
            .await
            .expect_err("banned user must be rejected");
        assert!(matches!(err, DomainError::Forbidden));
    }
}
