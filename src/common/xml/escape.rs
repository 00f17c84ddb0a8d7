use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Built once, shared by every serializer in the crate
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape the five XML special characters.
///
/// Used for attribute values and text nodes written by the part serializers.
///
/// # Examples
///
/// ```
/// use slidekit::common::xml::escape_xml;
/// assert_eq!(escape_xml("Title & Content"), "Title &amp; Content");
/// assert_eq!(escape_xml("<p:ph type=\"body\"/>"), "&lt;p:ph type=&quot;body&quot;/&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Resolve a general entity reference body (the text between `&` and `;`).
///
/// Handles the predefined entities and numeric character references.
/// Returns `None` for anything else so the caller can keep it verbatim.
pub fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"Fish & "Chips" <b>"#),
            "Fish &amp; &quot;Chips&quot; &lt;b&gt;"
        );
        assert_eq!(escape_xml("it's"), "it&apos;s");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp"), Some('&'));
        assert_eq!(resolve_entity("#65"), Some('A'));
        assert_eq!(resolve_entity("#x263A"), Some('\u{263A}'));
        assert_eq!(resolve_entity("nbsp"), None);
        assert_eq!(resolve_entity("#xZZ"), None);
    }
}
