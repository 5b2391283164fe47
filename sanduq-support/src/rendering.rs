//! Text rendering utilities for human-friendly error messages.
//!
//! Identifiers derived from Rust types carry their full module path,
//! which is noisy in diagnostics. These helpers shorten them, render
//! resolution chains and suggest near misses.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use sanduq_support::rendering::render_chain;
///
/// let chain = vec!["Mailer", "Transport", "Mailer"];
/// assert_eq!(render_chain(&chain), "Mailer → Transport → Mailer");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| shorten_type_name(s.as_ref()))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use sanduq_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("shop::billing::InvoiceService");
/// assert_eq!(short, "InvoiceService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn shop::mail::Transport>");
/// assert_eq!(short, "Arc<dyn Transport>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    // keep only the last path segment of every type in the name
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                // everything so far was a module path
                current_segment.clear();
            }
            // type delimiters survive as-is
            '<' | '>' | ',' | ' ' | '&' | '[' | ']' | ';' | '(' | ')' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => current_segment.push(ch),
        }
    }

    result.push_str(&current_segment);
    result
}

/// Shortest name that may count as a substring or prefix hit.
const MIN_MATCH_LEN: usize = 3;

/// True when one name contains the other and the contained one is long
/// enough to mean something.
fn overlaps(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= MIN_MATCH_LEN && long.contains(short)
}

/// Picks the registered identifiers closest to `requested`.
///
/// Substring hits on the full name rank first, then hits on the
/// shortened name, then shared prefixes. Names shorter than three
/// characters never match by containment.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    if requested_short.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = shorten_type_name(name).to_lowercase();

            if overlaps(&name_lower, &requested_lower) {
                return Some((name, 100));
            }

            // `app::Mailer` vs `mail::Mailer`
            if overlaps(&name_short, &requested_short) {
                return Some((name, 80));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= MIN_MATCH_LEN).then_some((name, common * 10))
        })
        .collect();

    // stable: ties keep registration order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_simple_chain() {
        let chain = vec!["A", "B", "C", "A"];
        assert_eq!(render_chain(&chain), "A → B → C → A");
    }

    #[test]
    fn render_chain_shortens_paths() {
        let chain = vec!["app::Mailer", "app::smtp::Transport"];
        assert_eq!(render_chain(&chain), "Mailer → Transport");
    }

    #[test]
    fn render_empty_chain() {
        let chain: Vec<&str> = vec![];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn shorten_no_path() {
        assert_eq!(shorten_type_name("mailer"), "mailer");
    }

    #[test]
    fn shorten_nested_generics() {
        assert_eq!(
            shorten_type_name("core::option::Option<alloc::sync::Arc<app::Db>>"),
            "Option<Arc<Db>>"
        );
    }

    #[test]
    fn suggest_typo() {
        let available = vec![
            "app::InvoiceService",
            "app::InvoiceRepository",
            "app::Mailer",
        ];

        let suggestions = suggest_similar("app::InvoiceServise", &available, 3);
        assert!(!suggestions.is_empty());
        assert!(suggestions.iter().any(|s| s.contains("InvoiceService")));
        assert!(!suggestions.iter().any(|s| s.contains("Mailer")));
    }

    #[test]
    fn suggest_short_name_hit() {
        let available = vec!["app::mail::Mailer"];
        let suggestions = suggest_similar("Mailer", &available, 3);
        assert_eq!(suggestions, vec!["app::mail::Mailer".to_string()]);
    }

    #[test]
    fn suggest_skips_exact_match() {
        let available = vec!["Mailer"];
        assert!(suggest_similar("Mailer", &available, 3).is_empty());
    }

    #[test]
    fn suggest_ignores_tiny_names() {
        let available = vec!["a", "db", "app::Mailer"];
        let suggestions = suggest_similar("mailr", &available, 3);
        assert!(!suggestions.iter().any(|s| s == "a"));
        assert!(suggest_similar("x", &available, 3).is_empty());
    }

    #[test]
    fn shorten_reference_and_slice() {
        assert_eq!(shorten_type_name("&[app::Db]"), "&[Db]");
    }

    #[test]
    fn suggest_no_match() {
        let available = vec!["app::Database"];
        assert!(suggest_similar("XyzAbcDef", &available, 3).is_empty());
    }
}
