//! User configuration
//!
//! Settings live in `vimgdb/config.toml` under the platform configuration
//! directory. Every field is optional; a missing file means all defaults.
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

const APP_DIR: &str = "vimgdb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the Vim server to synchronise with
    pub servername: String,
    /// Vim executable
    pub vim: PathBuf,
    /// GDB executable
    pub gdb: PathBuf,
    /// Vim script defining the signs, sourced when Vim is started
    pub vimrc: PathBuf,
    /// Extra GDB commands run at startup
    pub gdbinit: Option<PathBuf>,
    /// Log at debug level
    pub debug: bool,
    pub remote_timeout_ms: u64,
    pub command_timeout_ms: u64,
    /// Number of console commands remembered
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servername: "VIMGDB".to_string(),
            vim: PathBuf::from("vim"),
            gdb: PathBuf::from("gdb"),
            vimrc: config_dir().join("vimrc"),
            gdbinit: None,
            debug: false,
            remote_timeout_ms: 2000,
            command_timeout_ms: 10000,
            history_size: 100,
        }
    }
}

impl Config {
    /// Load the configuration from `path`, falling back to defaults if the
    /// file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Load the configuration from its default location
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(default_path())
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(contents)?;
        config.vimrc = normalise_path(&config.vimrc).into_owned();
        config.gdbinit = config
            .gdbinit
            .map(|gdbinit| normalise_path(&gdbinit).into_owned());
        Ok(config)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Directory holding the configuration file and vimrc
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Expand a leading `~` to the home directory
pub fn normalise_path(path: &Path) -> Cow<'_, Path> {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped));
        }
        tracing::warn!("cannot determine home directory, using path as-is");
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.servername, "VIMGDB");
        assert_eq!(config.remote_timeout(), Duration::from_secs(2));
        assert!(config.vimrc.ends_with("vimgdb/vimrc"));
    }

    #[test]
    fn partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
servername = "WORK"
gdb = "/opt/gdb/bin/gdb"
gdbinit = "/etc/vimgdb.gdb"
history_size = 5
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.servername, "WORK");
        assert_eq!(config.gdb, PathBuf::from("/opt/gdb/bin/gdb"));
        assert_eq!(config.gdbinit, Some(PathBuf::from("/etc/vimgdb.gdb")));
        assert_eq!(config.history_size, 5);
        assert_eq!(config.vim, PathBuf::from("vim"));
        assert_eq!(config.command_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "servername = 3").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("servrname = \"X\"").is_err());
    }

    #[test]
    fn tilde_expansion() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = Config::from_toml("vimrc = \"~/.vimgdb/vimrc\"").unwrap();
        assert_eq!(config.vimrc, home.join(".vimgdb/vimrc"));

        assert_eq!(
            normalise_path(Path::new("/abs/path")),
            Path::new("/abs/path")
        );
    }
}
