//! Configuration for pyts.
//!
//! Loads config from:
//! 1. Global: ~/.config/pyts/config.toml
//! 2. Per-project: .pyts/config.toml (overrides global)
//!
//! Command-line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [translate]
//! indent_width = 4
//! runtime_module = "./runtime"
//! lazy_comprehensions = true
//! ```

use pyts_transpile::TranslateOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Translation settings. Unset fields leave the previous layer's value.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TranslateConfig {
    pub indent_width: Option<usize>,
    pub runtime_module: Option<String>,
    pub lazy_comprehensions: Option<bool>,
    pub hoist_chain_operands: Option<bool>,
    pub diagnostics: Option<bool>,
}

impl TranslateConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            indent_width: other.indent_width.or(self.indent_width),
            runtime_module: other.runtime_module.or(self.runtime_module),
            lazy_comprehensions: other.lazy_comprehensions.or(self.lazy_comprehensions),
            hoist_chain_operands: other.hoist_chain_operands.or(self.hoist_chain_operands),
            diagnostics: other.diagnostics.or(self.diagnostics),
        }
    }

    /// Write the set fields over `options`.
    pub fn apply(&self, options: &mut TranslateOptions) {
        if let Some(width) = self.indent_width {
            options.indent_width = width;
        }
        if let Some(module) = &self.runtime_module {
            options.runtime_module = module.clone();
        }
        if let Some(lazy) = self.lazy_comprehensions {
            options.lazy_comprehensions = lazy;
        }
        if let Some(hoist) = self.hoist_chain_operands {
            options.hoist_chain_operands = hoist;
        }
        if let Some(diagnostics) = self.diagnostics {
            options.diagnostics = diagnostics;
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PytsConfig {
    pub translate: TranslateConfig,
}

impl PytsConfig {
    /// Global config merged with the project config under `root`.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::load_file(&global_path)? {
                config = config.merge(global);
            }
        }
        let project_path = root.join(".pyts").join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = config.merge(project);
        }
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("pyts").join("config.toml"))
    }

    /// A missing file is not an error; an unreadable or invalid one is.
    fn load_file(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("reading {}: {err}", path.display()))?;
        let config = toml::from_str(&content)
            .map_err(|err| anyhow::anyhow!("parsing {}: {err}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Some(config))
    }

    fn merge(self, other: Self) -> Self {
        Self {
            translate: self.translate.merge(other.translate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_project_config(dir: &TempDir, content: &str) {
        let pyts_dir = dir.path().join(".pyts");
        std::fs::create_dir_all(&pyts_dir).unwrap();
        let mut file = std::fs::File::create(pyts_dir.join("config.toml")).unwrap();
        writeln!(file, "{content}").unwrap();
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = PytsConfig::load_file(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_project_file() {
        let dir = TempDir::new().unwrap();
        write_project_config(
            &dir,
            r#"
[translate]
indent_width = 4
runtime_module = "./rt"
"#,
        );
        let path = dir.path().join(".pyts").join("config.toml");
        let config = PytsConfig::load_file(&path).unwrap().unwrap();
        assert_eq!(config.translate.indent_width, Some(4));
        assert_eq!(config.translate.runtime_module.as_deref(), Some("./rt"));
        assert_eq!(config.translate.lazy_comprehensions, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_project_config(&dir, "[translate]\nindent_width = \"wide\"");
        let path = dir.path().join(".pyts").join("config.toml");
        assert!(PytsConfig::load_file(&path).is_err());
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let global = PytsConfig {
            translate: TranslateConfig {
                indent_width: Some(4),
                lazy_comprehensions: Some(true),
                ..TranslateConfig::default()
            },
        };
        let project = PytsConfig {
            translate: TranslateConfig {
                indent_width: Some(8),
                ..TranslateConfig::default()
            },
        };
        let merged = global.merge(project);
        assert_eq!(merged.translate.indent_width, Some(8));
        assert_eq!(merged.translate.lazy_comprehensions, Some(true));
    }

    #[test]
    fn test_apply_keeps_unset_defaults() {
        let config = TranslateConfig {
            diagnostics: Some(true),
            ..TranslateConfig::default()
        };
        let mut options = TranslateOptions::default();
        config.apply(&mut options);
        assert!(options.diagnostics);
        assert_eq!(options.indent_width, TranslateOptions::default().indent_width);
        assert!(options.hoist_chain_operands);
    }
}
