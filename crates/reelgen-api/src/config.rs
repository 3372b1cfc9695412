//! API configuration.

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Shared secret required on `/api/*` when set
    pub api_secret: Option<String>,
    /// Prefix for returned output URLs, e.g. `https://cdn.example.com`
    pub public_base_url: Option<String>,
    /// Renders allowed to run at once
    pub max_concurrent_renders: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            api_secret: None,
            public_base_url: None,
            max_concurrent_renders: 1,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            api_secret: std::env::var("API_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|s| s.trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            max_concurrent_renders: std::env::var("MAX_CONCURRENT_RENDERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(1),
        }
    }

    /// Public URL of a published output file.
    pub fn output_url(&self, file_name: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/outputs/{}", base, file_name),
            None => format!("/outputs/{}", file_name),
        }
    }
}
