use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tokio::fs;

use crate::validation::ExtensionCase;

pub const CONFIG_PATH_VAR: &str = "GALLERY_UPLOADS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub async fn load_config(path: &str) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file `{path}`"))?;
    let parsed = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file `{path}`"))?;
    Ok(parsed)
}

/// Loads the file named by `GALLERY_UPLOADS_CONFIG` (or `config.toml`),
/// falling back to defaults when it doesn't exist.
pub async fn load_from_env() -> anyhow::Result<Config> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    if !Path::new(&path).exists() {
        // no subscriber yet, so this goes straight to stderr
        eprintln!("config file `{path}` not found, using defaults");
        return Ok(Config::default());
    }

    load_config(&path).await
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub bind_address: String,
    pub storage_dir: PathBuf,
    /// Where multipart image parts are spooled; the OS temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    pub public_prefix: String,
    pub max_upload_bytes: usize,
    pub serve_uploads: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".into(),
            storage_dir: PathBuf::from("./uploads/"),
            temp_dir: None,
            public_prefix: "/uploads/".into(),
            max_upload_bytes: 32 << 20,
            serve_uploads: true,
        }
    }
}

impl GeneralConfig {
    pub fn public_path(&self, file_name: &str) -> String {
        format!("{}{file_name}", self.public_prefix)
    }

    pub fn spool_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// What the listing does when it meets a file outside the whitelist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPolicy {
    /// End the scan and return what was collected so far.
    #[default]
    Stop,
    Skip,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub extension_case: ExtensionCase,
    pub listing_on_disallowed: ListingPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { max_age_secs: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    pub directives: Vec<String>,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            directives: vec!["gallery_uploads=info".into(), "tower_http=info".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub policy: PolicyConfig,
    pub cors: CorsConfig,
    pub instrumentation: InstrumentationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.general.bind_address, "0.0.0.0:8080");
        assert_eq!(cfg.general.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(cfg.general.public_path("a.png"), "/uploads/a.png");
        assert_eq!(cfg.policy.listing_on_disallowed, ListingPolicy::Stop);
        assert_eq!(cfg.policy.extension_case, ExtensionCase::Sensitive);
        assert_eq!(cfg.cors.max_age_secs, 300);
    }

    #[test]
    fn partial_sections_override() {
        let cfg: Config = toml::from_str(
            r#"
            [general]
            storage_dir = "/srv/gallery/"

            [policy]
            extension_case = "insensitive"
            listing_on_disallowed = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.general.storage_dir, PathBuf::from("/srv/gallery/"));
        assert_eq!(cfg.general.public_prefix, "/uploads/");
        assert_eq!(cfg.policy.extension_case, ExtensionCase::Insensitive);
        assert_eq!(cfg.policy.listing_on_disallowed, ListingPolicy::Skip);
    }
}
