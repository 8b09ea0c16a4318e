use dirs::config_dir;
use once_cell::sync::Lazy;
use std::path::PathBuf;

static CONFIG_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    base.join("event-scout")
});

pub fn config_root() -> PathBuf {
    CONFIG_ROOT.clone()
}

pub fn config_path() -> PathBuf {
    config_root().join("config.json")
}

/// Truncates to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
