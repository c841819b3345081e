//! Theme catalogues and search-query derivation.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Themes offered by the landscape flow. Input must match one exactly.
pub const LANDSCAPE_THEMES: [&str; 5] = ["Nature", "City", "Food", "Travel", "Animals"];

/// Numbered menu offered by the reel flow.
pub const REEL_THEMES: [(&str, &str); 7] = [
    ("1", "nature"),
    ("2", "travel"),
    ("3", "music"),
    ("4", "sports"),
    ("5", "technology"),
    ("6", "art"),
    ("7", "history"),
];

/// Validate a landscape theme, returning the canonical name.
pub fn landscape_theme(input: &str) -> Option<&'static str> {
    let input = input.trim();
    LANDSCAPE_THEMES.iter().copied().find(|theme| *theme == input)
}

/// Look up a reel theme by its menu number.
pub fn reel_theme(choice: &str) -> Option<&'static str> {
    let choice = choice.trim();
    REEL_THEMES
        .iter()
        .find(|(key, _)| *key == choice)
        .map(|(_, theme)| *theme)
}

/// Menu label for a reel theme ("nature" -> "Nature").
pub fn display_name(theme: &str) -> String {
    let mut chars = theme.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build a search query from the words in an audio file name.
///
/// `/music/sunset_drive-final.mp3` yields `"sunset_drive final"`: word
/// characters include underscores, everything else separates words.
pub fn keywords_from_filename(path: &Path) -> String {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"\b\w+\b").expect("static regex"));

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    word.find_iter(&stem)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_theme_exact_match() {
        assert_eq!(landscape_theme("City"), Some("City"));
        assert_eq!(landscape_theme("  Food "), Some("Food"));
    }

    #[test]
    fn test_landscape_theme_is_case_sensitive() {
        assert_eq!(landscape_theme("city"), None);
        assert_eq!(landscape_theme("Space"), None);
    }

    #[test]
    fn test_reel_theme_by_number() {
        assert_eq!(reel_theme("1"), Some("nature"));
        assert_eq!(reel_theme("7"), Some("history"));
        assert_eq!(reel_theme(""), None);
        assert_eq!(reel_theme("8"), None);
    }

    #[test]
    fn test_display_name_capitalizes() {
        assert_eq!(display_name("technology"), "Technology");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_keywords_from_filename() {
        assert_eq!(
            keywords_from_filename(Path::new("/music/sunset_drive-final.mp3")),
            "sunset_drive final"
        );
        assert_eq!(
            keywords_from_filename(Path::new("ocean waves (remix).wav")),
            "ocean waves remix"
        );
    }

    #[test]
    fn test_keywords_from_filename_without_words() {
        assert_eq!(keywords_from_filename(Path::new("---.mp3")), "");
    }
}
