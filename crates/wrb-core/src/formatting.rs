//! Reply text helpers.

/// Uppercase the first character and lowercase the rest (`bitcoin` -> `Bitcoin`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Split `text` into chunks of at most `limit` bytes, preferring newline breaks.
///
/// Chunks always end on a char boundary. Empty input yields no chunks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(4);
    let mut out = Vec::new();
    let mut rest = text;

    while rest.len() > limit {
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        // Break after the last newline in the window when there is one.
        if let Some(nl) = rest[..cut].rfind('\n') {
            if nl > 0 {
                cut = nl + 1;
            }
        }
        out.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}
