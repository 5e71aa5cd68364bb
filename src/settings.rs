// src/settings.rs

use std::{net::SocketAddr, path::Path};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::rules::ClassifierRules;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_SOURCE: &str = "enhanced_backend";

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Log {
    #[serde(
        serialize_with = "serialize_level",
        deserialize_with = "deserialize_level"
    )]
    pub level: Level,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatterSettings {
    /// Tag echoed as `metadata.source` on every non-error response.
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub log: Log,
    pub formatter: FormatterSettings,
    #[serde(default)]
    pub classifier: ClassifierRules,
}

impl Settings {
    /// Load settings from the given TOML file, with sane defaults.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("log.level", "info")?
            .set_default("formatter.source", DEFAULT_SOURCE)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_level<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(level.as_str())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        let settings = Settings::from_file(None).unwrap();
        assert_eq!(settings.web.address, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(settings.log.level, Level::INFO);
        assert_eq!(settings.formatter.source, DEFAULT_SOURCE);
        assert_eq!(settings.classifier, ClassifierRules::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = toml_file(
            r#"
            [web]
            address = "0.0.0.0:9000"

            [log]
            level = "debug"

            [classifier]
            weak_chart_threshold = 3
            avoid_table = ["breakup", "distribution"]
            "#,
        );
        let settings = Settings::from_file(Some(file.path())).unwrap();
        assert_eq!(settings.web.address, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(settings.log.level, Level::DEBUG);
        assert_eq!(settings.formatter.source, DEFAULT_SOURCE);
        assert_eq!(settings.classifier.weak_chart_threshold, 3);
        assert_eq!(settings.classifier.avoid_table, ["breakup", "distribution"]);
        assert_eq!(
            settings.classifier.table,
            ClassifierRules::default().table
        );
    }

    #[test]
    fn invalid_address_is_rejected() {
        let file = toml_file("[web]\naddress = \"not an address\"\n");
        assert!(Settings::from_file(Some(file.path())).is_err());
    }

    #[test]
    fn invalid_level_is_rejected() {
        let file = toml_file("[log]\nlevel = \"loud\"\n");
        assert!(Settings::from_file(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_rejected() {
        assert!(Settings::from_file(Some(Path::new("/nonexistent/settings.toml"))).is_err());
    }
}
