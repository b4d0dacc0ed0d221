use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// Top-level configuration, assembled once at startup and never re-read
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub seats: SeatsConfig,
    pub storage: StorageConfig,
    pub library: LibraryConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct SeatsConfig {
    pub total: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub seats_file: PathBuf,
    pub database_url: Option<String>,
    pub pool_size: u32,
    /// Run on the volatile store when the configured backend is unreachable at startup.
    pub fallback_to_memory: bool,
}

// Letterhead printed on receipts
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub name: String,
    pub tagline: String,
    pub owner: String,
    pub phone: String,
    pub address: String,
    pub map_url: String,
    pub hours: String,
    pub receipt_prefix: String,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub expiring_within_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File => "file",
            StorageBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "file" | "json" => Ok(StorageBackend::File),
            "postgres" | "postgresql" | "database" | "db" => Ok(StorageBackend::Postgres),
            other => Err(ConfigError::Message(format!(
                "STORAGE_BACKEND must be one of memory, file, postgres (got '{}')",
                other
            ))),
        }
    }
}

// Flat view of the environment; keys are the lowercased variable names
#[derive(Debug, Deserialize)]
struct RawConfig {
    host: String,
    port: u16,
    rust_log: String,
    total_seats: i64,
    storage_backend: String,
    seats_file: String,
    database_url: Option<String>,
    db_pool_size: u32,
    storage_fallback_to_memory: bool,
    receipt_prefix: String,
    library_name: String,
    library_tagline: String,
    library_owner: String,
    library_phone: String,
    library_address: String,
    library_map_url: String,
    library_hours: String,
    expiring_within_days: i64,
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", 4000_i64)?
        .set_default("rust_log", "seat_ledger=debug,tower_http=debug")?
        .set_default("total_seats", 75_i64)?
        .set_default("storage_backend", "file")?
        .set_default("seats_file", "data/seats.json")?
        .set_default("db_pool_size", 10_i64)?
        .set_default("storage_fallback_to_memory", false)?
        .set_default("receipt_prefix", "AL")?
        .set_default("library_name", "Aspirant Library")?
        .set_default("library_tagline", "Learn. Explore. Achieve.")?
        .set_default("library_owner", "Chirag Kumar")?
        .set_default("library_phone", "+91 99914 18414")?
        .set_default(
            "library_address",
            "Bighar Rd, near PWD office, Jagjivan Pura, Fatehabad, Haryana 125050",
        )?
        .set_default("library_map_url", "https://maps.app.goo.gl/VPeGqPzQ6b4gKm616")?
        .set_default("library_hours", "Open 24x7")?
        .set_default("expiring_within_days", 7_i64)
}

impl Config {
    /// Reads the process environment on top of the built-in defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = builder_with_defaults()?
            .add_source(Environment::default().try_parsing(true))
            .build()?;
        Self::from_raw(source.try_deserialize()?)
    }

    /// Builds a configuration from explicit key/value pairs, ignoring the environment.
    /// Keys use the lowercased variable names, e.g. `("total_seats", "5")`.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let mut builder = builder_with_defaults()?;
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value)?;
        }
        Self::from_raw(builder.build()?.try_deserialize()?)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.total_seats < 1 || raw.total_seats > i64::from(i32::MAX) {
            return Err(ConfigError::Message(format!(
                "TOTAL_SEATS must be a positive integer (got {})",
                raw.total_seats
            )));
        }
        let backend: StorageBackend = raw.storage_backend.parse()?;
        let database_url = raw.database_url.filter(|url| !url.trim().is_empty());
        if backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Message(
                "DATABASE_URL must be set when STORAGE_BACKEND=postgres".to_string(),
            ));
        }
        if raw.db_pool_size == 0 {
            return Err(ConfigError::Message("DB_POOL_SIZE must be at least 1".to_string()));
        }

        Ok(Config {
            app: AppConfig {
                host: raw.host,
                port: raw.port,
                rust_log: raw.rust_log,
            },
            seats: SeatsConfig {
                total: raw.total_seats as u32,
            },
            storage: StorageConfig {
                backend,
                seats_file: PathBuf::from(raw.seats_file),
                database_url,
                pool_size: raw.db_pool_size,
                fallback_to_memory: raw.storage_fallback_to_memory,
            },
            library: LibraryConfig {
                name: raw.library_name,
                tagline: raw.library_tagline,
                owner: raw.library_owner,
                phone: raw.library_phone,
                address: raw.library_address,
                map_url: raw.library_map_url,
                hours: raw.library_hours,
                receipt_prefix: raw.receipt_prefix,
            },
            dashboard: DashboardConfig {
                expiring_within_days: raw.expiring_within_days.max(0),
            },
        })
    }
}
