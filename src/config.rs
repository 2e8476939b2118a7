use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::history::MAX_ITEMS;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Size bound of the selection log.
    pub max_items: usize,
    /// Revision used by "Checkout from main".
    pub default_branch: String,
    /// Command used to open an activated item; `$EDITOR` when unset.
    pub editor: Option<String>,
    pub show_hidden: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_items: MAX_ITEMS,
            default_branch: "origin/main".to_string(),
            editor: None,
            show_hidden: false,
        }
    }
}

impl Settings {
    /// Load `~/.config/sellog/sellog.toml`, then merge a `sellog.toml` from
    /// the current directory on top. Both are optional; missing files mean
    /// defaults.
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(user) = user_config_path() {
            builder = builder.add_source(File::from(user).required(false));
        }
        builder = builder.add_source(File::with_name("sellog.toml").required(false));
        builder.build()?.try_deserialize()
    }

    /// Resolved editor command, shell-expanded, with `$EDITOR` fallback.
    pub fn editor_command(&self) -> Option<String> {
        let raw = self
            .editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())?;
        Some(shellexpand::tilde(&raw).into_owned())
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("sellog");
    path.push("sellog.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.max_items, MAX_ITEMS);
        assert_eq!(s.default_branch, "origin/main");
        assert!(!s.show_hidden);
    }

    #[test]
    fn explicit_editor_wins_over_env() {
        let s = Settings {
            editor: Some("myedit".into()),
            ..Settings::default()
        };
        assert_eq!(s.editor_command().as_deref(), Some("myedit"));
    }
}
