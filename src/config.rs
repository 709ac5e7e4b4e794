use crate::{error::WikiError, title::PageTitle};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

/// Conventional config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "wiki.toml";

/// Overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "WIKI_DATA_DIR";
/// Overrides `port`.
pub const PORT_ENV: &str = "WIKI_PORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Content root holding one `<Title>.txt` per page.
    pub data_dir: PathBuf,
    /// Directory with `edit.html`/`view.html`/`index.html` overrides. Builtins when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    pub bind: IpAddr,
    pub port: u16,
    /// Page `/` redirects to.
    pub front_page: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        WikiConfig {
            data_dir: PathBuf::from("data"),
            templates_dir: None,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            front_page: "FrontPage".to_string(),
        }
    }
}

impl WikiConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<WikiConfig, WikiError> {
        tracing::debug!("Reading config from: {:?}", path.as_ref());
        let content = read_to_string(path)?;
        let config: WikiConfig = toml::from_str(&content)?;
        config.front_page()?;
        Ok(config)
    }

    /// Like [`WikiConfig::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<WikiConfig, WikiError> {
        if !path.as_ref().exists() {
            tracing::debug!(
                "Config file {:?} not found, using defaults",
                path.as_ref()
            );
            return Ok(WikiConfig::default());
        }
        WikiConfig::from_file(path)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WikiError> {
        tracing::debug!("Writing config to: {:?}", path.as_ref());
        let toml_string = toml::to_string(self)?;
        write(path, toml_string)?;
        Ok(())
    }

    /// Apply `WIKI_DATA_DIR` and `WIKI_PORT` from the process environment.
    pub fn apply_env(&mut self) -> Result<(), WikiError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<(), WikiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.trim().parse().map_err(|_| {
                WikiError::Serialization(format!("{PORT_ENV}={port:?} is not a valid port"))
            })?;
        }
        Ok(())
    }

    pub fn front_page(&self) -> Result<PageTitle, WikiError> {
        self.front_page.parse()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = WikiConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.front_page().unwrap().as_str(), "FrontPage");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "port = 9000\ndata_dir = \"pages\"\n").unwrap();

        let config = WikiConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("pages"));
        assert_eq!(config.front_page, "FrontPage");
        assert_eq!(config.templates_dir, None);
    }

    #[test]
    fn test_round_trip_through_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        let config = WikiConfig {
            templates_dir: Some(PathBuf::from("tpl")),
            front_page: "Home".to_string(),
            ..Default::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(WikiConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = WikiConfig::from_file_or_default(tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, WikiConfig::default());
        assert!(WikiConfig::from_file(tmp.path().join("absent.toml"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_invalid_front_page_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "front_page = \"../etc\"\n").unwrap();
        assert!(matches!(
            WikiConfig::from_file(&path),
            Err(WikiError::InvalidTitle(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(DATA_DIR_ENV, "/srv/wiki"), (PORT_ENV, "8181")].into();
        let mut config = WikiConfig::default();
        config
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/wiki"));
        assert_eq!(config.port, 8181);

        let mut config = WikiConfig::default();
        let result = config.apply_vars(|key| (key == PORT_ENV).then(|| "eighty".to_string()));
        assert!(matches!(result, Err(WikiError::Serialization(_))));
    }
}
