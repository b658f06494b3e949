/// Name under which bulk downloads are saved.
pub const ARCHIVE_FILENAME: &str = "papers.zip";

/// File systems cap names at 255 bytes; leaves room for `.pdf` and the
/// reserved-name suffix.
const MAX_STEM_BYTES: usize = 200;

/// `filename` query parameter for the remote PDF endpoint: whitespace runs
/// become one underscore, nothing else changes.
pub fn remote_filename(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Local, filesystem-safe name for a single PDF: `{title_with_underscores}.pdf`.
pub fn pdf_filename(title: &str) -> String {
    format!("{}.pdf", sanitize_stem(&remote_filename(title)))
}

fn sanitize_stem(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    // Collapse multiple underscores
    let mut compacted = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = compacted.trim_matches(&['_', ' ', '.'][..]);
    let mut stem = truncate_bytes(trimmed, MAX_STEM_BYTES)
        .trim_end_matches(&['_', ' ', '.'][..])
        .to_string();
    if stem.is_empty() {
        stem = "untitled".to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char boundary.
fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
