use std::{fs, path::Path};

use anyhow::Context;
use client_core::{
    search_client::{DEFAULT_API_URL, DEFAULT_PER_PAGE, MAX_PER_PAGE},
    SearchClientConfig,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";
pub const DEFAULT_INITIAL_TERM: &str = "cats";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub access_key: Option<String>,
    pub per_page: u32,
    pub initial_term: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            access_key: None,
            per_page: DEFAULT_PER_PAGE,
            initial_term: DEFAULT_INITIAL_TERM.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    access_key: Option<String>,
    per_page: Option<u32>,
    initial_term: Option<String>,
}

/// Defaults, then the config file, then the process environment.
///
/// An explicitly named file must exist; the default `gallery.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            settings.apply_file(&raw)?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                settings.apply_file(&raw)?;
            }
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

impl Settings {
    pub fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings =
            toml::from_str(raw).context("failed to parse gallery config")?;
        if let Some(v) = file_cfg.api_url {
            self.api_url = v;
        }
        if let Some(v) = file_cfg.access_key {
            self.access_key = Some(v);
        }
        if let Some(v) = file_cfg.per_page {
            self.per_page = v;
        }
        if let Some(v) = file_cfg.initial_term {
            self.initial_term = v;
        }
        Ok(())
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("UNSPLASH_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("APP__API_URL") {
            self.api_url = v;
        }

        if let Some(v) = lookup("UNSPLASH_ACCESS_KEY") {
            self.access_key = Some(v);
        }
        if let Some(v) = lookup("APP__ACCESS_KEY") {
            self.access_key = Some(v);
        }

        if let Some(v) = lookup("APP__PER_PAGE") {
            match v.parse::<u32>() {
                Ok(parsed) => self.per_page = parsed,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid APP__PER_PAGE"),
            }
        }
    }

    pub fn client_config(&self) -> anyhow::Result<SearchClientConfig> {
        let access_key = self
            .access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .context("no access key configured; set UNSPLASH_ACCESS_KEY or pass --access-key")?;
        Ok(SearchClientConfig {
            api_url: self.api_url.clone(),
            access_key: access_key.to_string(),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        settings
            .apply_file(
                r#"
                api_url = "http://localhost:9000"
                per_page = 12
                initial_term = "dogs"
                "#,
            )
            .expect("apply");

        assert_eq!(settings.api_url, "http://localhost:9000");
        assert_eq!(settings.per_page, 12);
        assert_eq!(settings.initial_term, "dogs");
        assert_eq!(settings.access_key, None);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut settings = Settings::default();
        let err = settings.apply_file("per_page = \"many\"").expect_err("must fail");
        assert!(err.to_string().contains("failed to parse gallery config"));
    }

    #[test]
    fn app_prefixed_env_wins_over_provider_env() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[
            ("UNSPLASH_ACCESS_KEY", "provider-key"),
            ("APP__ACCESS_KEY", "app-key"),
            ("UNSPLASH_API_URL", "http://provider"),
        ]));

        assert_eq!(settings.access_key.as_deref(), Some("app-key"));
        assert_eq!(settings.api_url, "http://provider");
    }

    #[test]
    fn invalid_per_page_env_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[("APP__PER_PAGE", "lots")]));
        assert_eq!(settings.per_page, DEFAULT_PER_PAGE);

        settings.apply_env(env(&[("APP__PER_PAGE", "8")]));
        assert_eq!(settings.per_page, 8);
    }

    #[test]
    fn client_config_requires_access_key() {
        let settings = Settings::default();
        assert!(settings.client_config().is_err());

        let settings = Settings {
            access_key: Some("  ".into()),
            ..Settings::default()
        };
        assert!(settings.client_config().is_err());
    }

    #[test]
    fn client_config_clamps_per_page() {
        let settings = Settings {
            access_key: Some(" key ".into()),
            per_page: 500,
            ..Settings::default()
        };
        let config = settings.client_config().expect("config");
        assert_eq!(config.access_key, "key");
        assert_eq!(config.per_page, MAX_PER_PAGE);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn load_settings_reads_named_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "initial_term = \"owls\"").expect("write");

        let settings = load_settings(Some(file.path())).expect("load");
        assert_eq!(settings.initial_term, "owls");
    }

    #[test]
    fn load_settings_fails_for_missing_named_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        let err = load_settings(Some(&missing)).expect_err("must fail");
        assert!(err.to_string().contains("failed to read config file"));
    }
}
