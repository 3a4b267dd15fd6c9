//! Filename sanitization for saved downloads

/// Mode for sanitizing filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeMode {
    /// Replace forbidden characters with full-width equivalents
    FullWidth,
    /// Replace forbidden characters with underscores (default for downloads)
    Underscore,
}

/// Windows reserved filenames
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters no portable filesystem accepts, with their full-width stand-ins
const FORBIDDEN_CHARS: &[(char, char)] = &[
    ('\\', '＼'),
    ('/', '／'),
    (':', '：'),
    ('*', '＊'),
    ('?', '？'),
    ('"', '＂'),
    ('<', '＜'),
    ('>', '＞'),
    ('|', '｜'),
];

/// Sanitize a filename so it can be written on every desktop platform
pub fn sanitize_filename(name: &str, mode: SanitizeMode) -> String {
    let mut result: String = name
        .trim()
        .chars()
        .map(|c| replacement(c, mode).unwrap_or(c))
        .collect();

    if is_reserved(&result) {
        result.insert(0, '_');
    }

    // Trailing dots and spaces are silently dropped by Windows
    while result.ends_with('.') || result.ends_with(' ') {
        result.pop();
    }

    if result.is_empty() {
        result = "download".to_string();
    }

    result
}

fn replacement(c: char, mode: SanitizeMode) -> Option<char> {
    if let Some((_, fullwidth)) = FORBIDDEN_CHARS.iter().find(|(f, _)| *f == c) {
        return Some(match mode {
            SanitizeMode::FullWidth => *fullwidth,
            SanitizeMode::Underscore => '_',
        });
    }

    c.is_control().then_some('_')
}

fn is_reserved(name: &str) -> bool {
    let upper = name.to_uppercase();
    let base = upper.split('.').next().unwrap_or("");
    RESERVED_NAMES.contains(&base)
}

/// Check if a filename can be written as-is
pub fn is_valid_filename(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_control() || FORBIDDEN_CHARS.iter().any(|(f, _)| *f == c))
        && !is_reserved(name)
        && !name.ends_with('.')
        && !name.ends_with(' ')
}

/// Append `ext` (without the dot) unless the name already ends with it
pub fn with_extension(name: &str, ext: &str) -> String {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        return name.to_string();
    }

    let suffix = format!(".{}", ext.to_lowercase());
    if name.to_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_colon() {
        assert_eq!(
            sanitize_filename("Shot:01.jpg", SanitizeMode::FullWidth),
            "Shot：01.jpg"
        );
        assert_eq!(
            sanitize_filename("Shot:01.jpg", SanitizeMode::Underscore),
            "Shot_01.jpg"
        );
    }

    #[test]
    fn test_sanitize_title_with_slash() {
        assert_eq!(
            sanitize_filename("Before/After", SanitizeMode::Underscore),
            "Before_After"
        );
    }

    #[test]
    fn test_sanitize_reserved_and_trailing() {
        assert_eq!(sanitize_filename("CON.mp4", SanitizeMode::Underscore), "_CON.mp4");
        assert_eq!(sanitize_filename("  The Peacock. ", SanitizeMode::Underscore), "The Peacock");
        assert_eq!(sanitize_filename("...", SanitizeMode::Underscore), "download");
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid_filename("The Heart Of Love.jpg"));
        assert!(!is_valid_filename("a|b.jpg"));
        assert!(!is_valid_filename("aux"));
        assert!(!is_valid_filename("clip."));
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("Brand Showcase", "mp4"), "Brand Showcase.mp4");
        assert_eq!(with_extension("photo.JPG", ".jpg"), "photo.JPG");
        assert_eq!(with_extension("photo", ""), "photo");
    }
}
