use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// ~/.matrixcalc on every platform.
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::home_dir().map(|h| h.join(".matrixcalc"))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

pub fn default_registry_path() -> PathBuf {
    config_dir()
        .map(|d| d.join("matrices.json"))
        .unwrap_or_else(|| PathBuf::from("matrices.json"))
}

pub fn resolve_config_path(cli_path: &Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = cli_path {
        return Some(p.clone());
    }
    default_config_path()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Registry file; defaults to ~/.matrixcalc/matrices.json
    #[serde(default)]
    pub registry: Option<PathBuf>,
    /// Decimals shown for floating values in `--exact` output.
    #[serde(default)]
    pub precision: Option<usize>,
}

impl Config {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
    }

    /// Missing file means defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_toml_file(p),
            _ => Ok(Self::default()),
        }
    }

    /// CLI flag wins over the config file, which wins over the default.
    pub fn registry_path(&self, cli_path: &Option<PathBuf>) -> PathBuf {
        cli_path
            .clone()
            .or_else(|| self.registry.clone())
            .unwrap_or_else(default_registry_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn reads_fields_and_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "registry = \"/tmp/m.json\"\nprecision = 4\n").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.precision, Some(4));
        assert_eq!(cfg.registry_path(&None), PathBuf::from("/tmp/m.json"));
        assert_eq!(cfg.registry_path(&Some(PathBuf::from("x.json"))), PathBuf::from("x.json"));

        fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
