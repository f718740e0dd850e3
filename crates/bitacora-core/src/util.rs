//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Lowercase ASCII-alphanumeric slug; other runs collapse into one dash.
pub fn sanitize_token(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}

/// Sanitize a file name while keeping its extension.
pub fn sanitize_file_name(file_name: &str) -> String {
    let trimmed = file_name.trim().trim_matches('/');
    if trimmed.is_empty() {
        return "file".to_string();
    }

    let (stem, ext) = trimmed
        .rsplit_once('.')
        .map_or((trimmed, ""), |parts| parts);
    let stem = sanitize_token(stem);
    let stem = if stem.is_empty() {
        "file".to_string()
    } else {
        stem
    };
    let ext = sanitize_token(ext);

    if ext.is_empty() {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}
