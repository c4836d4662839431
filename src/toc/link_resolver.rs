use super::TocTree;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

// Optional scheme followed by `//`, e.g. `https://`, `git+ssh://` or a bare `//`
static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[a-z+]+:)?//").expect("absolute URL pattern is valid"));

pub fn is_absolute_url(href: &str) -> bool {
    ABSOLUTE_URL.is_match(href)
}

/// Rewrite a book-relative href so it works from the current page.
///
/// Fragment-only and absolute hrefs are returned unchanged; everything else
/// gets the root path prepended. The root path is never validated.
pub fn resolve(href: &str, root_path: &str) -> String {
    if href.starts_with('#') || is_absolute_url(href) {
        href.to_string()
    } else {
        format!("{root_path}{href}")
    }
}

/// Cache the resolved link on every node that has an href.
///
/// Always computed from the original href, so resolving twice with the same
/// root path yields the same links. Returns the number of links resolved.
pub fn resolve_tree(tree: &mut TocTree, root_path: &str) -> usize {
    let mut resolved = 0;
    tree.for_each_mut(|item| {
        let link = item.href().map(|href| resolve(href, root_path));
        if link.is_some() {
            resolved += 1;
        }
        item.set_resolved_href(link);
    });
    debug!("Resolved {resolved} sidebar links against root path {root_path:?}");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::{TocItem, TocPath};

    #[test]
    fn test_relative_href_gets_root_prefix() {
        assert_eq!(resolve("a.html", "../"), "../a.html");
        assert_eq!(resolve("b/b1.html", "../../"), "../../b/b1.html");
        assert_eq!(resolve("a.html", ""), "a.html");
    }

    #[test]
    fn test_fragment_and_absolute_hrefs_untouched() {
        assert_eq!(resolve("#intro", "../"), "#intro");
        assert_eq!(resolve("https://example.com/x", "../"), "https://example.com/x");
        assert_eq!(resolve("//cdn.example.com/x", "../"), "//cdn.example.com/x");
        assert_eq!(resolve("git+ssh://host/repo", "../"), "git+ssh://host/repo");
    }

    #[test]
    fn test_patterns_that_are_not_absolute() {
        // Uppercase schemes and schemes without `//` do not match the pattern
        assert_eq!(resolve("mailto:me@example.com", "../"), "../mailto:me@example.com");
        assert_eq!(resolve("HTTP://example.com", "../"), "../HTTP://example.com");
        assert_eq!(resolve("/abs/path.html", "../"), "..//abs/path.html");
    }

    #[test]
    fn test_malformed_root_path_is_accepted() {
        assert_eq!(resolve("a.html", "not a path"), "not a patha.html");
    }

    #[test]
    fn test_resolve_tree_is_stable() {
        let mut tree = TocTree::new(vec![
            TocItem::link("A", "a.html"),
            TocItem::part_title("Part"),
            TocItem::section("B", None, vec![TocItem::link("B1", "b/b1.html")]),
        ]);

        assert_eq!(resolve_tree(&mut tree, "../"), 2);
        let first: Vec<Option<String>> = tree
            .iter()
            .map(|(_, item)| item.resolved_href().map(str::to_string))
            .collect();

        assert_eq!(resolve_tree(&mut tree, "../"), 2);
        let second: Vec<Option<String>> = tree
            .iter()
            .map(|(_, item)| item.resolved_href().map(str::to_string))
            .collect();

        assert_eq!(first, second);
        assert_eq!(
            tree.get(&TocPath::from(vec![2, 0])).and_then(TocItem::resolved_href),
            Some("../b/b1.html")
        );
        assert_eq!(tree.get(&TocPath::top(2)).and_then(TocItem::resolved_href), None);
    }
}
