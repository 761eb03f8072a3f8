use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSettings {
    Local {
        dir: String,
    },
    Supabase {
        url: String,
        service_role_key: String,
    },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub upload_max_bytes: usize,
    pub upload_max_dimension: u32,
    pub storage: StorageSettings,
    pub storage_bucket: String,
    pub public_base_url: String,
    pub google_userinfo_url: String,
    pub kakao_userinfo_url: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = u32::try_from(parse_usize_env("DATABASE_MAX_CONNECTIONS", 10)?)
            .context("DATABASE_MAX_CONNECTIONS is too large")?;
        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        let jwt_ttl_seconds: i64 = std::env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| (30 * 24 * 60 * 60).to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 10 * 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 30)?;

        let upload_max_bytes = parse_usize_env("UPLOAD_MAX_BYTES", 1024 * 1024)?;
        let upload_max_dimension = u32::try_from(parse_usize_env("UPLOAD_MAX_DIMENSION", 1200)?)
            .context("UPLOAD_MAX_DIMENSION is too large")?;

        let storage = parse_storage_settings(
            &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string()),
        )?;
        let storage_bucket =
            std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "uploads".to_string());
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        let google_userinfo_url = std::env::var("GOOGLE_USERINFO_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v2/userinfo".to_string());
        let kakao_userinfo_url = std::env::var("KAKAO_USERINFO_URL")
            .unwrap_or_else(|_| "https://kapi.kakao.com/v2/user/me".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            upload_max_bytes,
            upload_max_dimension,
            storage,
            storage_bucket,
            public_base_url,
            google_userinfo_url,
            kakao_userinfo_url,
        })
    }
}

fn parse_storage_settings(backend: &str) -> Result<StorageSettings> {
    match backend.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(StorageSettings::Local {
            dir: std::env::var("LOCAL_STORAGE_DIR")
                .unwrap_or_else(|_| "./data/uploads".to_string()),
        }),
        "supabase" => Ok(StorageSettings::Supabase {
            url: get_required("SUPABASE_URL")
                .context("SUPABASE_URL is required for STORAGE_BACKEND=supabase")?,
            service_role_key: get_required("SUPABASE_SERVICE_ROLE_KEY")
                .context("SUPABASE_SERVICE_ROLE_KEY is required for STORAGE_BACKEND=supabase")?,
        }),
        other => Err(anyhow!(
            "unknown STORAGE_BACKEND '{other}', expecting local or supabase"
        )),
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{StorageSettings, parse_cors_origins, parse_storage_settings};

    #[test]
    fn cors_origins_are_trimmed_and_filtered() {
        assert_eq!(
            parse_cors_origins(" http://a.test , ,http://b.test".to_string()),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn storage_backend_must_be_known() {
        assert!(matches!(
            parse_storage_settings(" LOCAL "),
            Ok(StorageSettings::Local { .. })
        ));
        assert!(parse_storage_settings("s3").is_err());
    }
}
