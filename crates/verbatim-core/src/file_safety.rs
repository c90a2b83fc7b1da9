//! Upload filename hygiene.

/// Sanitize a client-supplied filename for use on the local filesystem.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    // Replace dangerous characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Ensure not empty and not too long
    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    // Truncate if too long (preserve extension)
    if sanitized.len() > 255 {
        if let Some(dot_pos) = sanitized.rfind('.') {
            let ext = &sanitized[dot_pos..];
            let name = &sanitized[..255 - ext.len()];
            return format!("{}{}", name, ext);
        }
        return sanitized[..255].to_string();
    }

    sanitized.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\rec.m4a"), "rec.m4a");
    }

    #[test]
    fn test_replaces_dangerous_characters() {
        assert_eq!(sanitize_filename("a:b?.mp3"), "a_b_.mp3");
    }

    #[test]
    fn test_empty_becomes_placeholder() {
        assert_eq!(sanitize_filename(""), "unnamed_file");
        assert_eq!(sanitize_filename("   "), "unnamed_file");
    }

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(sanitize_filename("meeting 2024.m4a"), "meeting 2024.m4a");
    }

    #[test]
    fn test_long_name_truncated_with_extension() {
        let long = format!("{}.mp3", "x".repeat(300));
        let sanitized = sanitize_filename(&long);
        assert!(sanitized.len() <= 255);
        assert!(sanitized.ends_with(".mp3"));
    }
}
