use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub upstream: UpstreamConfig,
    pub catalog: CatalogConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Which implementation of the category API backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    /// Procurement REST backend over HTTP
    Http,
    /// Seeded in-process store, for local development
    Memory,
}

/// Connection settings for the procurement backend
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub mode: UpstreamMode,
    /// Base URL of the REST API, e.g. `http://localhost:8080/api`
    pub base_url: String,
    /// Bearer token forwarded on every call (optional)
    pub api_token: Option<String>,
    pub timeout: Duration,
}

/// Sizing of the catalog manager fetches
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Fixed page size of the catalog list view
    pub page_size: u32,
    /// Limit used when fetching the parent candidate universe of a department
    pub candidate_fetch_limit: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            upstream: UpstreamConfig::from_env()?,
            catalog: CatalogConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl UpstreamMode {
    fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "CATEGORY_API_MODE must be 'http' or 'memory', got '{}'",
                other
            )),
        }
    }
}

impl UpstreamConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 15;

    pub fn from_env() -> Result<Self, String> {
        let mode = UpstreamMode::parse(
            &env::var("CATEGORY_API_MODE").unwrap_or_else(|_| "http".to_string()),
        )?;

        let base_url = match mode {
            UpstreamMode::Http => env::var("CATEGORY_API_BASE_URL").map_err(|_| {
                "CATEGORY_API_BASE_URL must be set when CATEGORY_API_MODE=http".to_string()
            })?,
            UpstreamMode::Memory => env::var("CATEGORY_API_BASE_URL").unwrap_or_default(),
        };

        let api_token = env::var("CATEGORY_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        let timeout_secs = env::var("CATEGORY_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CATEGORY_API_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            mode,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl CatalogConfig {
    const DEFAULT_PAGE_SIZE: u32 = 10;
    const DEFAULT_CANDIDATE_FETCH_LIMIT: u32 = 1000;

    pub fn from_env() -> Result<Self, String> {
        let page_size = env::var("CATALOG_PAGE_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|_| "CATALOG_PAGE_SIZE must be a valid number".to_string())?;

        let candidate_fetch_limit = env::var("CANDIDATE_FETCH_LIMIT")
            .unwrap_or_else(|_| Self::DEFAULT_CANDIDATE_FETCH_LIMIT.to_string())
            .parse::<u32>()
            .map_err(|_| "CANDIDATE_FETCH_LIMIT must be a valid number".to_string())?;

        if page_size == 0 || candidate_fetch_limit == 0 {
            return Err("CATALOG_PAGE_SIZE and CANDIDATE_FETCH_LIMIT must be positive".to_string());
        }

        Ok(Self {
            page_size,
            candidate_fetch_limit,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            candidate_fetch_limit: Self::DEFAULT_CANDIDATE_FETCH_LIMIT,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Procurement Categories API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Category tree and catalog views for the procurement front-end".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
