use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

fn string_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
fn flag_env(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

/// Settings for the API binary.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub port: u16,
    pub max_connections: u32,
    pub run_migrations: bool,
    /// Snapshot directory for the in-memory backend.
    pub data_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: string_env("DATABASE_URL"),
            bind_addr: string_env("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_env("PORT", 5000),
            max_connections: parse_env("DB_MAX_CONNECTIONS", 5),
            run_migrations: flag_env("RUN_MIGRATIONS", true),
            data_dir: string_env("VIBE_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data")),
        }
    }
}

/// Settings for the client library: where the API lives and the optional AI key.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.into(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            api_base: string_env("VIBE_API_BASE")
                .or_else(|| string_env("VITE_API_BASE"))
                .unwrap_or(d.api_base),
            gemini_api_key: string_env("GEMINI_API_KEY"),
            gemini_model: string_env("GEMINI_MODEL").unwrap_or(d.gemini_model),
            gemini_api_base: string_env("GEMINI_API_BASE").unwrap_or(d.gemini_api_base),
            data_dir: string_env("VIBE_DATA_DIR").map(PathBuf::from).unwrap_or(d.data_dir),
        }
    }
}
