use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, Map};
use serde::Deserialize;

const CONFIG_FILE: &str = "spell_import";
const ENV_PREFIX: &str = "SPELLS";
const DEFAULT_DB_PATH: &str = "data/spells.sqlite";
const DEFAULT_COMPENDIUM_PATH: &str = "data/Spells Compendium 1.2.1.xml";

/// What a batch run does when one entry fails to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first bad entry; nothing is written.
    #[default]
    Abort,
    /// Log and report bad entries, import the rest.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: PathBuf,
    pub compendium: PathBuf,
    pub on_error: FailurePolicy,
    pub strict_components: bool,
}

impl Settings {
    /// Defaults, then `spell_import.toml` if present, then `SPELLS_*` env vars.
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(environment(None)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .set_default("database", DEFAULT_DB_PATH)?
            .set_default("compendium", DEFAULT_COMPENDIUM_PATH)?
            .set_default("on_error", "abort")?
            .set_default("strict_components", false)?
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Invalid settings")
    }
}

/// `SPELLS_*` variables, read from the process environment unless `vars` is given.
fn environment(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .source(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults() {
        let s = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(s.database, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(s.compendium, PathBuf::from(DEFAULT_COMPENDIUM_PATH));
        assert_eq!(s.on_error, FailurePolicy::Abort);
        assert!(!s.strict_components);
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = r#"
            database = "/tmp/other.sqlite"
            on_error = "skip"
            strict_components = true
        "#;
        let s = Settings::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap();
        assert_eq!(s.database, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(s.on_error, FailurePolicy::Skip);
        assert!(s.strict_components);
        assert_eq!(s.compendium, PathBuf::from(DEFAULT_COMPENDIUM_PATH));
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        let toml = r#"
            on_error = "abort"
            strict_components = false
        "#;
        let vars: Map<String, String> = [
            ("SPELLS_ON_ERROR", "skip"),
            ("SPELLS_STRICT_COMPONENTS", "true"),
            ("SPELLS_DATABASE", "/tmp/env.sqlite"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let s = Settings::from_builder(
            Config::builder()
                .add_source(File::from_str(toml, FileFormat::Toml))
                .add_source(environment(Some(vars))),
        )
        .unwrap();
        assert_eq!(s.on_error, FailurePolicy::Skip);
        assert!(s.strict_components);
        assert_eq!(s.database, PathBuf::from("/tmp/env.sqlite"));
        assert_eq!(s.compendium, PathBuf::from(DEFAULT_COMPENDIUM_PATH));
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let vars: Map<String, String> = [("DATABASE", "/tmp/x.sqlite"), ("ON_ERROR", "skip")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let s = Settings::from_builder(Config::builder().add_source(environment(Some(vars))))
            .unwrap();
        assert_eq!(s.database, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(s.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = Settings::from_builder(
            Config::builder().add_source(File::from_str("on_error = \"retry\"", FileFormat::Toml)),
        );
        assert!(result.is_err());
    }
}
