//! Path helpers for user-supplied configuration values

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::{Path, PathBuf};

static INVALID_PATH_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["<>|\x08\x00\t*?]"#).expect("valid path regex"));
static BACKSLASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\+").expect("valid separator regex"));

/// Remove every whitespace character
pub fn strip_all_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove `" < > | * ?`, backspace, NUL and tab
pub fn strip_invalid_path_characters(text: &str) -> String {
    INVALID_PATH_CHARS.replace_all(text, "").into_owned()
}

/// Replace each run of backslashes with a single forward slash
pub fn normalize_path_separators(text: &str) -> String {
    BACKSLASH_RUNS.replace_all(text, "/").into_owned()
}

pub fn sanitize_path(path: &str) -> String {
    let path = strip_invalid_path_characters(path);
    normalize_path_separators(path.trim())
}

/// Resolve a `./`-relative path against `base_dir`; other paths are returned as-is
pub fn relative_path_to_absolute(path: &str, base_dir: Option<&Path>) -> String {
    match (path.strip_prefix("./"), base_dir) {
        (Some(rest), Some(base)) => base.join(rest).to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}

/// Sanitize then resolve a configured path
pub fn resolve_path(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let sanitized = sanitize_path(path);
    PathBuf::from(sanitize_path(&relative_path_to_absolute(&sanitized, base_dir)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_all_whitespace(" a b\tc\n"), "abc");
        assert_eq!(strip_invalid_path_characters("pl<ug>ins|*?\"dir"), "pluginsdir");
        assert_eq!(normalize_path_separators(r"C:\\bot\plugins"), "C:/bot/plugins");
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("  ./plugins\\core\t "), "./plugins/core");
    }

    #[test]
    fn test_relative_and_absolute_agree() {
        let base = Path::new("/srv/bot");
        let relative = sanitize_path(&relative_path_to_absolute("./plugins", Some(base)));
        let absolute = sanitize_path(&relative_path_to_absolute("/srv/bot/plugins", Some(base)));
        assert_eq!(relative, "/srv/bot/plugins");
        assert_eq!(relative, absolute);
    }

    #[test]
    fn test_relative_without_base_is_unchanged() {
        assert_eq!(relative_path_to_absolute("./plugins", None), "./plugins");
        assert_eq!(resolve_path(" ./plugins ", Some(Path::new("/etc/bot"))), PathBuf::from("/etc/bot/plugins"));
    }
}
