//! Project layout and configuration.
//!
//! A windmill project is a directory with a `windmill.conf` file and
//! folders for WML files, generated DAGs and custom operators. The conf
//! file is YAML; a directory whose conf is missing or unreadable is not a
//! windmill project.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Defaults for a freshly scaffolded project.
pub struct ProjectDefaults;

impl ProjectDefaults {
    pub const PROJECT_NAME: &'static str = "windmill-project";
    pub const PROJECT_CONF: &'static str = "windmill.conf";
    pub const WML_FOLDER: &'static str = "wmls";
    pub const DAGS_FOLDER: &'static str = "dags";
    pub const OPERATORS_FOLDER: &'static str = "custom_operators";
}

/// Defaults for the backend the editor talks to.
pub struct ServerDefaults;

impl ServerDefaults {
    pub const HOST: &'static str = "localhost";
    pub const PORT: u16 = 8000;

    pub fn base_url() -> String {
        format!("http://{}:{}", Self::HOST, Self::PORT)
    }
}

/// Where the workflow backend listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: ServerDefaults::HOST.to_string(),
            port: ServerDefaults::PORT,
        }
    }
}

impl ServerConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// The `windmill.conf` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_remote: Option<String>,
    pub wml_dir: String,
    pub dags_dir: String,
    pub operators_dir: String,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: ProjectDefaults::PROJECT_NAME.to_string(),
            git_remote: None,
            wml_dir: ProjectDefaults::WML_FOLDER.to_string(),
            dags_dir: ProjectDefaults::DAGS_FOLDER.to_string(),
            operators_dir: ProjectDefaults::OPERATORS_FOLDER.to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// A default config with the given project name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reads the conf file from a project root. Any failure (missing file,
    /// unreadable file, malformed YAML) means the directory is not a valid
    /// windmill project.
    pub fn from_conf_file(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(ProjectDefaults::PROJECT_CONF);
        let not_a_project = || ConfigError::NotAProject {
            path: root.display().to_string(),
        };
        let raw = std::fs::read_to_string(&path).map_err(|_| not_a_project())?;
        serde_yaml::from_str(&raw).map_err(|_| not_a_project())
    }

    /// Writes the conf file into a project root.
    pub fn save(&self, root: &Path) -> Result<(), ConfigError> {
        let raw = serde_yaml::to_string(self)?;
        std::fs::write(root.join(ProjectDefaults::PROJECT_CONF), raw)?;
        Ok(())
    }

    /// Creates the project directory skeleton (wml/dags/operators folders
    /// plus the conf file) under `parent`.
    pub fn scaffold(&self, parent: &Path) -> Result<PathBuf, ConfigError> {
        let root = parent.join(&self.name);
        for dir in [&self.wml_dir, &self.dags_dir, &self.operators_dir] {
            std::fs::create_dir_all(root.join(dir))?;
        }
        self.save(&root)?;
        Ok(root)
    }

    /// Path of a WML file inside the project.
    pub fn wml_path(&self, root: &Path, filename: &str) -> PathBuf {
        root.join(&self.wml_dir).join(crate::wml::with_suffix(filename))
    }
}
