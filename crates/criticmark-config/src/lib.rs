use criticmark_syntax::RangeKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// How the cursor treats the syntax characters of a range while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMovement {
    /// Brackets and metadata are ordinary characters.
    Unchanged,
    /// Brackets and the substitution separator are skipped in one step.
    IgnoreBracket,
    /// Like `IgnoreBracket`, and the metadata header is skipped as well.
    #[default]
    IgnoreMetadata,
    /// The whole range is a single unit.
    IgnoreCompletely,
}

/// Whether a single step may rest on the outer or inner edge of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketMovement {
    #[default]
    Unchanged,
    StayInside,
    StayOutside,
}

/// Resolution for a metadata field that differs between an existing range
/// and a new edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Ignore the field when deciding compatibility; the merged range drops it.
    Skip,
    /// A difference makes the ranges incompatible.
    Split,
    KeepOld,
    KeepNew,
    /// A difference makes the ranges incompatible and new markup is placed
    /// outside the existing range.
    MoveOutside,
}

/// One value per range kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct PerType<T> {
    pub addition: T,
    pub deletion: T,
    pub substitution: T,
    pub highlight: T,
    pub comment: T,
}

impl<T: Clone> PerType<T> {
    pub fn uniform(value: T) -> Self {
        Self {
            addition: value.clone(),
            deletion: value.clone(),
            substitution: value.clone(),
            highlight: value.clone(),
            comment: value,
        }
    }
}

impl<T> PerType<T> {
    pub fn get(&self, kind: RangeKind) -> &T {
        match kind {
            RangeKind::Addition => &self.addition,
            RangeKind::Deletion => &self.deletion,
            RangeKind::Substitution => &self.substitution,
            RangeKind::Highlight => &self.highlight,
            RangeKind::Comment => &self.comment,
        }
    }

    pub fn set(&mut self, kind: RangeKind, value: T) {
        match kind {
            RangeKind::Addition => self.addition = value,
            RangeKind::Deletion => self.deletion = value,
            RangeKind::Substitution => self.substitution = value,
            RangeKind::Highlight => self.highlight = value,
            RangeKind::Comment => self.comment = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataMergePolicies {
    pub author: MergePolicy,
    pub time: MergePolicy,
    pub done: MergePolicy,
    pub style: MergePolicy,
    pub color: MergePolicy,
}

impl Default for MetadataMergePolicies {
    fn default() -> Self {
        Self {
            author: MergePolicy::Split,
            time: MergePolicy::KeepNew,
            done: MergePolicy::KeepOld,
            style: MergePolicy::KeepOld,
            color: MergePolicy::KeepOld,
        }
    }
}

/// Which metadata a host stamps on markup it creates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultMetadata {
    /// May reference environment variables, e.g. `"$USER"`.
    pub author: Option<String>,
    pub add_timestamp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cursor_movement: PerType<CursorMovement>,
    pub bracket_movement: PerType<BracketMovement>,
    pub metadata_merge: MetadataMergePolicies,
    pub default_metadata: DefaultMetadata,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cursor_movement: PerType::uniform(CursorMovement::IgnoreMetadata),
            bracket_movement: PerType::uniform(BracketMovement::Unchanged),
            metadata_merge: MetadataMergePolicies::default(),
            default_metadata: DefaultMetadata::default(),
        }
    }
}

impl Settings {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            log::debug!("no config at {}, using defaults", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut settings: Settings =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        settings.default_metadata.author = settings
            .default_metadata
            .author
            .map(|author| Self::expand_value(&author).unwrap_or(author));

        Ok(Some(settings))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the user's settings, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/criticmark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_value(value: &str) -> Option<String> {
        match shellexpand::full(value) {
            Ok(expanded) => Some(expanded.into_owned()),
            Err(err) => {
                log::warn!("could not expand {value:?}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Settings::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/criticmark/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        for kind in RangeKind::ALL {
            assert_eq!(
                *settings.cursor_movement.get(kind),
                CursorMovement::IgnoreMetadata
            );
            assert_eq!(
                *settings.bracket_movement.get(kind),
                BracketMovement::Unchanged
            );
        }
        assert_eq!(settings.metadata_merge.author, MergePolicy::Split);
        assert_eq!(settings.metadata_merge.time, MergePolicy::KeepNew);
        assert_eq!(settings.metadata_merge.color, MergePolicy::KeepOld);
        assert_eq!(settings.default_metadata.author, None);
    }

    #[test]
    fn test_per_type_set() {
        let mut movement = PerType::uniform(CursorMovement::Unchanged);
        movement.set(RangeKind::Comment, CursorMovement::IgnoreCompletely);

        assert_eq!(
            *movement.get(RangeKind::Comment),
            CursorMovement::IgnoreCompletely
        );
        assert_eq!(*movement.get(RangeKind::Addition), CursorMovement::Unchanged);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut original = Settings::default();
        original
            .bracket_movement
            .set(RangeKind::Substitution, BracketMovement::StayOutside);
        original.metadata_merge.style = MergePolicy::MoveOutside;
        original.default_metadata.author = Some("Ann".to_string());

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Settings = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let content = r#"
[cursor_movement]
comment = "ignore_completely"

[metadata_merge]
author = "keep_old"
"#;

        let settings: Settings = toml::from_str(content).unwrap();

        assert_eq!(
            settings.cursor_movement.comment,
            CursorMovement::IgnoreCompletely
        );
        assert_eq!(settings.cursor_movement.addition, CursorMovement::default());
        assert_eq!(settings.metadata_merge.author, MergePolicy::KeepOld);
        assert_eq!(settings.metadata_merge.time, MergePolicy::KeepNew);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Settings::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "cursor_movement = 12").unwrap();

        let err = Settings::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.default_metadata.add_timestamp = true;

        settings.save_to_path(&config_file).unwrap();
        let loaded = Settings::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_author_env_var_is_expanded_on_load() {
        unsafe {
            env::set_var("CRITICMARK_TEST_AUTHOR", "Bea");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "[default_metadata]\nauthor = \"$CRITICMARK_TEST_AUTHOR\"\n",
        )
        .unwrap();

        let loaded = Settings::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(loaded.default_metadata.author.as_deref(), Some("Bea"));

        unsafe {
            env::remove_var("CRITICMARK_TEST_AUTHOR");
        }
    }

    #[test]
    fn test_unknown_env_var_keeps_raw_author() {
        assert_eq!(Settings::expand_value("$CRITICMARK_SURELY_UNSET_VAR"), None);
    }
}
