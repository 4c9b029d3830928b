pub mod network {
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;
    pub const TOKEN_LIFETIME_SECS: i64 = 3_600;
}

pub mod limits {
    pub const ERROR_BODY_MAX_CHARS: usize = 300;
    pub const DEFAULT_ROW_LIMIT: i64 = 1_000;
}

pub mod api {
    pub const BASE_URL: &str = "https://www.googleapis.com/webmasters/v3";
    pub const BASE_URL_ENV: &str = "GSC_API_BASE_URL";
    pub const SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";
    pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
    pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
}

pub mod credentials {
    pub const ENV_SERVICE_ACCOUNT_FILE: &str = "GOOGLE_SERVICE_ACCOUNT_FILE";
    pub const ENV_SERVICE_ACCOUNT_JSON: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";
    pub const DOT_ENV_FILE: &str = ".env";
}
