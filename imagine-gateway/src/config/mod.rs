use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_IMAGE_PROVIDER_URL: &str = "https://api.creartai.com/api/v1/text2image";
const DEFAULT_CHAT_PROVIDER_URL: &str = "https://api.deepinfra.com/v1/openai/chat/completions";
const DEFAULT_CHAT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo";
const DEFAULT_DENYLIST: &str = "subash,baniya";

/// Paths that must never be served, matched as prefixes of the request path.
const DEFAULT_BLOCKED_PATHS: &[&str] = &[
    "/src",
    "/public/quotes.json",
    "/quotes.json",
    "/.env",
    "/Cargo.toml",
    "/Cargo.lock",
    "/target",
];

/// How much upstream error detail reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerbosityMode {
    /// Raw upstream error text is returned (development).
    Verbose,
    /// A fixed user-facing message is returned.
    #[default]
    Generic,
}

impl VerbosityMode {
    pub fn from_environment(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("development") || v.eq_ignore_ascii_case("dev") => {
                VerbosityMode::Verbose
            }
            _ => VerbosityMode::Generic,
        }
    }
}

/// CORS origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated allow-list. Unset, blank or `*` means any origin.
    pub fn parse(raw: Option<&str>) -> Self {
        let origins: Vec<String> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub verbosity: VerbosityMode,
    pub allowed_origins: AllowedOrigins,
    pub image_provider: ImageProviderConfig,
    pub chat_provider: ChatProviderConfig,
    pub denylist: Vec<String>,
    pub site: SiteConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageProviderConfig {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ChatProviderConfig {
    pub url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Directory holding `index.html`, `imagine.html`, `chat.html` and `404.html`.
    pub pages_dir: PathBuf,
    /// Directory of static assets served at `/` and `/public`.
    pub public_dir: PathBuf,
    pub blocked_paths: Vec<String>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(GatewayConfig {
            common,
            verbosity: VerbosityMode::from_environment(env::var("ENVIRONMENT").ok().as_deref()),
            allowed_origins: AllowedOrigins::parse(env::var("ALLOWED_ORIGINS").ok().as_deref()),
            image_provider: ImageProviderConfig {
                url: get_env("IMAGE_PROVIDER_URL", DEFAULT_IMAGE_PROVIDER_URL),
                timeout: get_secs("IMAGE_PROVIDER_TIMEOUT_SECS", 120)?,
            },
            chat_provider: ChatProviderConfig {
                url: get_env("CHAT_PROVIDER_URL", DEFAULT_CHAT_PROVIDER_URL),
                model: get_env("CHAT_MODEL", DEFAULT_CHAT_MODEL),
                timeout: get_secs("CHAT_PROVIDER_TIMEOUT_SECS", 60)?,
            },
            denylist: split_list(&get_env("DENYLIST", DEFAULT_DENYLIST)),
            site: SiteConfig {
                pages_dir: env::var("PAGES_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| crate_dir().join("pages")),
                public_dir: env::var("PUBLIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| crate_dir().join("public")),
                blocked_paths: DEFAULT_BLOCKED_PATHS.iter().map(|p| p.to_string()).collect(),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }
}

/// Resolve the crate directory whether started from the workspace root or
/// from inside `imagine-gateway/`.
fn crate_dir() -> PathBuf {
    let base_path = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if base_path.ends_with("imagine-gateway") {
        base_path
    } else {
        base_path.join("imagine-gateway")
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_secs(key: &str, default: u64) -> Result<Duration, AppError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Duration::from_secs).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} must be a number of seconds: {}", key, e))
        }),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
