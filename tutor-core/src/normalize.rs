//! Cleanup of raw generator output before JSON parsing.
//!
//! Pure string functions, no I/O. The retry loop lives in [`crate::synth`].

/// Out-of-band answer meaning "cannot answer from the given documents".
pub const SENTINEL: &str = "no";

/// What the cleaned text is going to be parsed as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// JSON array of steps. A bare object (or object list) gets wrapped in `[...]`.
    Steps,
    /// Single JSON object. Never wrapped.
    Summary,
}

/// `true` only for the exact sentinel, checked on the untouched raw text.
pub fn is_sentinel(raw: &str) -> bool {
    raw == SENTINEL
}

/// Strips leading BOMs and surrounding whitespace, removes one code fence from
/// each end, and for [`Shape::Steps`] wraps non-array text in brackets.
pub fn normalize(raw: &str, shape: Shape) -> String {
    let text = raw.trim_start_matches('\u{feff}').trim();
    let text = strip_fence(text);

    match shape {
        Shape::Steps if !text.is_empty() && !text.starts_with('[') => format!("[{text}]"),
        _ => text.to_string(),
    }
}

/// Removes one opening fence (```` ``` ```` plus an optional alphanumeric language tag
/// and one newline) and one closing fence (an optional newline plus ```` ``` ````).
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let rest = match rest.strip_suffix("```") {
        Some(body) => body
            .strip_suffix("\r\n")
            .or_else(|| body.strip_suffix('\n'))
            .unwrap_or(body),
        None => rest,
    };
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_exact() {
        assert!(is_sentinel("no"));
        assert!(!is_sentinel("no "));
        assert!(!is_sentinel("No"));
        assert!(!is_sentinel("\u{feff}no"));
        assert!(!is_sentinel("\"no\""));
    }

    #[test]
    fn plain_array_is_untouched() {
        assert_eq!(normalize("  [1, 2]\n", Shape::Steps), "[1, 2]");
    }

    #[test]
    fn bom_is_stripped() {
        assert_eq!(normalize("\u{feff}[{\"a\":1}]", Shape::Steps), "[{\"a\":1}]");
        assert_eq!(normalize("\u{feff}\u{feff}  {\"a\":1}", Shape::Summary), "{\"a\":1}");
    }

    #[test]
    fn tagged_fence_is_stripped() {
        let raw = "```json\n[{\"index\":0}]\n```";
        assert_eq!(normalize(raw, Shape::Steps), "[{\"index\":0}]");
    }

    #[test]
    fn untagged_fence_and_crlf() {
        let raw = "```\r\n{\"a\":1}\r\n```";
        assert_eq!(normalize(raw, Shape::Summary), "{\"a\":1}");
    }

    #[test]
    fn fence_without_closing_keeps_body() {
        let raw = "```json\n[{\"index\":0}]";
        assert_eq!(normalize(raw, Shape::Steps), "[{\"index\":0}]");
    }

    #[test]
    fn only_one_fence_is_removed() {
        let raw = "```json\n```json\n[]\n```\n```";
        assert_eq!(normalize(raw, Shape::Summary), "```json\n[]\n```");
    }

    #[test]
    fn bare_object_is_wrapped_for_steps_only() {
        assert_eq!(normalize("{\"a\":1}", Shape::Steps), "[{\"a\":1}]");
        assert_eq!(normalize("{\"a\":1}, {\"a\":2}", Shape::Steps), "[{\"a\":1}, {\"a\":2}]");
        assert_eq!(normalize("{\"a\":1}", Shape::Summary), "{\"a\":1}");
    }

    #[test]
    fn fenced_bare_object_is_wrapped() {
        let raw = "```json\n{\"index\":0}\n```";
        assert_eq!(normalize(raw, Shape::Steps), "[{\"index\":0}]");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize("", Shape::Steps), "");
        assert_eq!(normalize("\u{feff}  \n", Shape::Steps), "");
        assert_eq!(normalize("```\n```", Shape::Steps), "");
    }
}
