//! Global context for libdock operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::ops::LibrarySettings;
use crate::util::config::{self, Config};

/// Environment variable overriding the libdock home directory.
pub const HOME_ENV: &str = "LIBDOCK_HOME";

/// Project-local configuration directory name.
pub const PROJECT_DIR: &str = ".libdock";

/// Project directories for libdock
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "libdock", "libdock"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global libdock data
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(HOME_ENV) {
            Some(home) => PathBuf::from(home),
            None => match PROJECT_DIRS.as_ref() {
                Some(dirs) => dirs.config_dir().to_path_buf(),
                None => PathBuf::from(PROJECT_DIR),
            },
        };

        Ok(GlobalContext {
            cwd,
            home,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the libdock home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join(PROJECT_DIR).join("config.toml")
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Config {
        config::load_config(&self.config_path(), &self.project_config_path(), &self.cwd)
    }

    /// Resolve library locations from a configuration, filling in platform defaults.
    pub fn library_settings(&self, config: &Config) -> LibrarySettings {
        LibrarySettings {
            package_path: config
                .paths
                .package_path
                .clone()
                .unwrap_or_else(config::default_package_path),
            default_library_path: config.paths.default_libraries.clone(),
            sketchbook_path: config
                .paths
                .sketchbook
                .clone()
                .unwrap_or_else(config::default_sketchbook_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_home(tmp.path().join("home"));

        assert_eq!(ctx.config_path(), tmp.path().join("home").join("config.toml"));
        assert_eq!(
            ctx.project_config_path(),
            tmp.path().join(".libdock").join("config.toml")
        );
    }

    #[test]
    fn test_library_settings_from_project_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".libdock")).unwrap();
        std::fs::write(
            tmp.path().join(".libdock").join("config.toml"),
            r#"
[paths]
package_path = "pkgs"
default_libraries = "ide/libraries"
sketchbook = "sketchbook"
"#,
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_home(tmp.path().join("home"));
        let config = ctx.load_config();
        let settings = ctx.library_settings(&config);

        assert_eq!(settings.package_path, tmp.path().join("pkgs"));
        assert_eq!(
            settings.default_library_path,
            Some(tmp.path().join("ide/libraries"))
        );
        assert_eq!(
            settings.sketchbook_libraries(),
            tmp.path().join("sketchbook").join("libraries")
        );
        assert_eq!(
            settings.index_path(),
            tmp.path().join("pkgs").join("library_index.json")
        );
    }
}
