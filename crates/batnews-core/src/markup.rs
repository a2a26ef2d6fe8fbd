//! Markup stripping for provider text.

/// Remove tag-like markup and decode the entities news feeds commonly emit.
///
/// Whitespace is left as found; callers collapse it when they need to.
#[must_use]
pub fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        assert_eq!(
            strip_markup("<b>삼성SDI</b> &quot;46파이&quot; 양산"),
            "삼성SDI \"46파이\" 양산"
        );
    }

    #[test]
    fn decodes_ampersand_last() {
        assert_eq!(strip_markup("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
    }

    #[test]
    fn keeps_whitespace_untouched() {
        assert_eq!(strip_markup("a  <br/>\n b"), "a  \n b");
    }
}
