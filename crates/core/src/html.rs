//! Attribute escaping for values stored on orders.
//!
//! Pickup locations are escaped once when written and echoed into markup as
//! stored. Escaping never double-encodes an existing character reference, so
//! running stored values through [`escape_attr`] again before rendering is a
//! no-op for well-formed input.

/// Named references left as they are, sorted for binary search.
///
/// Anything else shaped like `&name;` is treated as text, so `R&D;` becomes
/// `R&amp;D;`.
const KNOWN_ENTITIES: &[&str] = &[
    "AElig", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "Ccedil", "Dagger", "ETH",
    "Eacute", "Ecirc", "Egrave", "Euml", "Iacute", "Icirc", "Igrave", "Iuml", "Ntilde",
    "OElig", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "Prime", "Scaron",
    "THORN", "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "Yuml", "aacute", "acirc", "acute",
    "aelig", "agrave", "amp", "apos", "aring", "atilde", "auml", "bdquo", "brvbar", "bull",
    "ccedil", "cedil", "cent", "circ", "copy", "curren", "dagger", "darr", "deg", "divide",
    "eacute", "ecirc", "egrave", "emsp", "ensp", "eth", "euml", "euro", "fnof", "frac12",
    "frac14", "frac34", "frasl", "gt", "harr", "hellip", "iacute", "icirc", "iexcl", "igrave",
    "iquest", "iuml", "laquo", "larr", "ldquo", "lrm", "lsaquo", "lsquo", "lt", "macr",
    "mdash", "micro", "middot", "nbsp", "ndash", "not", "ntilde", "oacute", "ocirc", "oelig",
    "ograve", "oline", "ordf", "ordm", "oslash", "otilde", "ouml", "para", "permil", "plusmn",
    "pound", "prime", "quot", "raquo", "rarr", "rdquo", "reg", "rlm", "rsaquo", "rsquo",
    "sbquo", "scaron", "sect", "shy", "sup1", "sup2", "sup3", "szlig", "thinsp", "thorn",
    "tilde", "times", "trade", "uacute", "uarr", "ucirc", "ugrave", "uml", "uuml", "yacute",
    "yen", "yuml", "zwj", "zwnj",
];

/// Escape `value` for use inside an HTML attribute or text node.
///
/// Replaces `<`, `>`, `"`, `'` and any `&` that does not begin a character
/// reference: a known entity name such as `&amp;` or `&eacute;`, or a numeric
/// reference (`&#123;`, `&#x1F;`).
///
/// ```
/// use pickup_core::html::escape_attr;
///
/// assert_eq!(escape_attr("North <script>"), "North &lt;script&gt;");
/// assert_eq!(escape_attr("North &lt;script&gt;"), "North &lt;script&gt;");
/// assert_eq!(escape_attr("Fish & Chips"), "Fish &amp; Chips");
/// ```
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        match c {
            '&' if value.get(i..).is_some_and(starts_with_reference) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether `s` (which starts with `&`) opens a character reference.
fn starts_with_reference(s: &str) -> bool {
    let Some((name, _)) = s.strip_prefix('&').and_then(|rest| rest.split_once(';')) else {
        return false;
    };

    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return (1..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(dec) = name.strip_prefix('#') {
        return (1..=7).contains(&dec.len()) && dec.chars().all(|c| c.is_ascii_digit());
    }

    KNOWN_ENTITIES.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_markup() {
        assert_eq!(
            escape_attr(r#"<a href="x">it's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;it&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_leaves_plain_text_alone() {
        assert_eq!(escape_attr("Downtown Depot #4"), "Downtown Depot #4");
        assert_eq!(escape_attr(""), "");
    }

    #[test]
    fn test_does_not_double_encode_references() {
        assert_eq!(escape_attr("&amp; &#039; &#x27; &eacute;"), "&amp; &#039; &#x27; &eacute;");
    }

    #[test]
    fn test_encodes_bare_ampersands() {
        assert_eq!(escape_attr("A&B"), "A&amp;B");
        assert_eq!(escape_attr("A & B;"), "A &amp; B;");
        assert_eq!(escape_attr("&#;"), "&amp;#;");
        assert_eq!(escape_attr("&#xZZ;"), "&amp;#xZZ;");
    }

    #[test]
    fn test_unknown_entity_names_are_text() {
        assert_eq!(escape_attr("R&D;"), "R&amp;D;");
        assert_eq!(escape_attr("Dock&Pier;"), "Dock&amp;Pier;");
        assert_eq!(escape_attr("&AMP;"), "&amp;AMP;");
        assert_eq!(escape_attr("&nbsp;&mdash;"), "&nbsp;&mdash;");
    }

    #[test]
    fn test_known_entities_are_sorted() {
        assert!(KNOWN_ENTITIES.windows(2).all(|w| w.first() < w.last()));
    }

    #[test]
    fn test_is_idempotent() {
        let once = escape_attr("Café <Nord> & \"Süd\"");
        assert_eq!(escape_attr(&once), once);
    }
}
