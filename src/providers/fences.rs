//! Markdown code-fence stripping for LLM output.

/// Remove a surrounding markdown code fence (```` ```json ```` or ```` ``` ````)
/// from `raw`, returning the trimmed body.
///
/// Text without a fence is returned trimmed. A missing closing fence is
/// tolerated (truncated completions end mid-block).
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
