const MAX_SLUG_LEN: usize = 50;

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, strips everything outside alphanumerics/whitespace/hyphens,
/// collapses whitespace runs into single hyphens and truncates to 50 chars.
/// The derivation is deterministic and idempotent: `slugify(slugify(s))`
/// equals `slugify(s)`.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
        // punctuation is dropped without acting as a separator
    }

    out.chars().take(MAX_SLUG_LEN).collect()
}
