//! Runtime configuration, read from `XAMLEYDI_*` environment variables.
//!
//! A `.env` file in the working directory is loaded first when present.
//! Unparseable values fall back to their default with a warning instead of
//! aborting start-up.

use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::QueryError;
use crate::source::memory::{read_json_records, MemorySource};
use crate::source::rest::RestSource;
use crate::source::sqlite::SqliteSource;
use crate::source::ComplaintSource;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SQLITE_PATH: &str = "complaints.sqlite";
const DEFAULT_EXPORT_PREFIX: &str = "plaintes";

/// Which query service backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Sqlite,
    Rest,
    Json,
}

impl SourceKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(SourceKind::Sqlite),
            "rest" => Some(SourceKind::Rest),
            "json" => Some(SourceKind::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub source: SourceKind,
    pub sqlite_path: PathBuf,
    pub rest_url: Option<String>,
    pub rest_key: Option<String>,
    pub json_path: Option<PathBuf>,
    /// JSON dump loaded into the SQLite database at start-up.
    pub seed_path: Option<PathBuf>,
    /// First segment of export filenames.
    pub export_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            source: SourceKind::default(),
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            rest_url: None,
            rest_key: None,
            json_path: None,
            seed_path: None,
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        if let Some(host) = get("XAMLEYDI_HOST") {
            config.host = host;
        }
        if let Some(port) = get("XAMLEYDI_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => config.port = p,
                Err(_) => warn!("invalid XAMLEYDI_PORT '{}', using {}", port, DEFAULT_PORT),
            }
        }
        if let Some(kind) = get("XAMLEYDI_SOURCE") {
            match SourceKind::parse(&kind) {
                Some(k) => config.source = k,
                None => warn!("unknown XAMLEYDI_SOURCE '{}', using sqlite", kind),
            }
        }
        if let Some(path) = get("XAMLEYDI_SQLITE_PATH") {
            config.sqlite_path = PathBuf::from(path);
        }
        config.rest_url = get("XAMLEYDI_REST_URL");
        config.rest_key = get("XAMLEYDI_REST_KEY");
        config.json_path = get("XAMLEYDI_JSON_PATH").map(PathBuf::from);
        config.seed_path = get("XAMLEYDI_SEED_JSON").map(PathBuf::from);
        if let Some(prefix) = get("XAMLEYDI_EXPORT_PREFIX") {
            config.export_prefix = prefix;
        }
        config
    }

    /// Opens the configured query service.
    pub fn build_source(&self) -> Result<Arc<dyn ComplaintSource>, QueryError> {
        match self.source {
            SourceKind::Sqlite => {
                let source = SqliteSource::new(self.sqlite_path.clone());
                source.ensure_schema()?;
                if let Some(seed) = &self.seed_path {
                    let inserted = source.insert_complaints(&read_json_records(seed)?)?;
                    info!("seeded {} complaints from {}", inserted, seed.display());
                }
                Ok(Arc::new(source))
            }
            SourceKind::Rest => {
                let url = self.rest_url.as_deref().ok_or_else(|| {
                    QueryError::Rejected("XAMLEYDI_REST_URL is required for the rest source".into())
                })?;
                Ok(Arc::new(RestSource::new(url, self.rest_key.clone())?))
            }
            SourceKind::Json => {
                let path = self.json_path.as_ref().ok_or_else(|| {
                    QueryError::Rejected("XAMLEYDI_JSON_PATH is required for the json source".into())
                })?;
                Ok(Arc::new(MemorySource::from_json_file(path)?))
            }
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_every_key() {
        let config = AppConfig::from_lookup(lookup(&[
            ("XAMLEYDI_HOST", "0.0.0.0"),
            ("XAMLEYDI_PORT", "9000"),
            ("XAMLEYDI_SOURCE", "REST"),
            ("XAMLEYDI_REST_URL", "https://example.test"),
            ("XAMLEYDI_REST_KEY", "secret"),
            ("XAMLEYDI_EXPORT_PREFIX", "complaints"),
        ]));
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 9000));
        assert_eq!(config.source, SourceKind::Rest);
        assert_eq!(config.rest_url.as_deref(), Some("https://example.test"));
        assert_eq!(config.rest_key.as_deref(), Some("secret"));
        assert_eq!(config.export_prefix, "complaints");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("XAMLEYDI_PORT", "eighty"),
            ("XAMLEYDI_SOURCE", "oracle"),
            ("XAMLEYDI_REST_KEY", "  "),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.source, SourceKind::Sqlite);
        assert_eq!(config.rest_key, None);
    }

    #[test]
    fn remote_sources_need_their_location() {
        let rest = AppConfig {
            source: SourceKind::Rest,
            ..Default::default()
        };
        assert!(matches!(rest.build_source(), Err(QueryError::Rejected(_))));

        let json = AppConfig {
            source: SourceKind::Json,
            ..Default::default()
        };
        assert!(matches!(json.build_source(), Err(QueryError::Rejected(_))));
    }

    #[test]
    fn sqlite_source_creates_its_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            sqlite_path: dir.path().join("complaints.sqlite"),
            ..Default::default()
        };
        assert!(config.build_source().is_ok());
        assert!(dir.path().join("complaints.sqlite").exists());
    }

    #[tokio::test]
    async fn sqlite_source_can_be_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(
            &seed,
            r#"[{"id": "p1", "commune": "Dakar"}, {"id": "p2", "commune": "Thies"}]"#,
        )
        .unwrap();
        let config = AppConfig::from_lookup(lookup(&[
            ("XAMLEYDI_SQLITE_PATH", dir.path().join("db.sqlite").to_str().unwrap()),
            ("XAMLEYDI_SEED_JSON", seed.to_str().unwrap()),
        ]));

        let source = config.build_source().unwrap();
        let communes = crate::fetcher::distinct_communes(source.as_ref()).await.unwrap();
        assert_eq!(communes, vec!["DAKAR", "THIES"]);
    }
}
