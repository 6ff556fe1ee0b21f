//! Bundler configuration
//!
//! Settings are layered, later layers winning field by field: built-in
//! defaults, the user config file, `monofile.toml` in the working directory,
//! then a file named on the command line. Command-line flags are applied by
//! the binary on top of the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use etcetera::BaseStrategy;
use log::debug;
use serde::{Deserialize, Serialize};

/// Name of the project-level configuration file
pub const PROJECT_CONFIG_FILE: &str = "monofile.toml";

/// Manifest read when neither the command line nor a config names one
pub const DEFAULT_MANIFEST: &str = "monofile.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Package clause used when the single root is an ad-hoc unit, or when
    /// several roots are merged and the first is ad-hoc
    pub adhoc_package_name: String,
    /// Package clause used when several named roots are merged
    pub merged_package_name: String,
    /// Precede each inlined package with a `// package <path>` banner
    pub annotate_packages: bool,
    /// Loader manifest to read
    pub manifest: Option<PathBuf>,
    /// Package clause overriding every other rule
    #[serde(skip)]
    pub package_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adhoc_package_name: "main".to_owned(),
            merged_package_name: "bundled".to_owned(),
            annotate_packages: true,
            manifest: None,
            package_name: None,
        }
    }
}

/// One configuration file; absent keys leave the layer below untouched
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    adhoc_package_name: Option<String>,
    merged_package_name: Option<String>,
    annotate_packages: Option<bool>,
    manifest: Option<PathBuf>,
}

impl Config {
    /// Resolve the configuration from the standard locations plus `explicit`
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(path) = user_config_path().filter(|path| path.is_file()) {
            layers.push(path);
        }
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.is_file() {
            layers.push(project);
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            layers.push(path.to_path_buf());
        }
        Self::from_layers(&layers)
    }

    /// Apply each file in order on top of the defaults
    pub fn from_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut config = Self::default();
        for path in paths {
            debug!("Reading config {}", path.display());
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            let layer: ConfigLayer = toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file: {}", path.display()))?;
            config.apply(layer);
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(name) = layer.adhoc_package_name {
            self.adhoc_package_name = name;
        }
        if let Some(name) = layer.merged_package_name {
            self.merged_package_name = name;
        }
        if let Some(annotate) = layer.annotate_packages {
            self.annotate_packages = annotate;
        }
        if let Some(manifest) = layer.manifest {
            self.manifest = Some(manifest);
        }
    }

    /// Reject package names Go would not accept in a package clause
    pub fn validate(&self) -> Result<()> {
        let names = [
            Some(&self.adhoc_package_name),
            Some(&self.merged_package_name),
            self.package_name.as_ref(),
        ];
        for name in names.into_iter().flatten() {
            if !is_package_name(name) {
                bail!("invalid package name `{name}`");
            }
        }
        Ok(())
    }

    /// Manifest to load: the configured one or [`DEFAULT_MANIFEST`]
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
    }
}

/// `<config dir>/monofile/monofile.toml` for the current user
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("monofile").join(PROJECT_CONFIG_FILE))
}

fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && name != "_"
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_layers(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.adhoc_package_name, "main");
        assert_eq!(config.merged_package_name, "bundled");
        assert!(config.annotate_packages);
        assert_eq!(config.manifest_path(), PathBuf::from("monofile.json"));
    }

    #[test]
    fn test_later_layers_win_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let user = write_config(
            &dir,
            "user.toml",
            "merged_package_name = \"solution\"\nannotate_packages = false\n",
        );
        let project = write_config(&dir, "project.toml", "annotate_packages = true\n");

        let config = Config::from_layers(&[user, project]).unwrap();
        assert_eq!(config.merged_package_name, "solution");
        assert!(config.annotate_packages);
        assert_eq!(config.adhoc_package_name, "main");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "bad.toml", "annotate = false\n");
        let err = Config::from_layers(&[path]).unwrap_err();
        assert!(format!("{err:#}").contains("unknown field"));
    }

    #[test]
    fn test_invalid_package_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "bad.toml", "adhoc_package_name = \"my-main\"\n");
        assert!(Config::from_layers(&[path]).is_err());

        let config = Config {
            package_name: Some("_".to_owned()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
