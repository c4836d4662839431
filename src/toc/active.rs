//! Picks the table of contents entry for the page being viewed.
//!
//! Links are compared the way a browser compares an anchor's resolved `href`
//! with the page URL: the relative link is joined onto the directory of the
//! current location before testing for equality.

use super::{TocPath, TocTree};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Appended to locations that end in a directory separator
pub const INDEX_FILE: &str = "index.html";

static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("URL scheme pattern is valid"));

/// Strip fragment and query, and point directory locations at their index page.
pub fn normalize_location(location: &str) -> String {
    let without_fragment = location.split('#').next().unwrap_or(location);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);

    let mut page = without_query.to_string();
    if page.ends_with('/') {
        page.push_str(INDEX_FILE);
    }
    page
}

fn is_root_index(page: &str) -> bool {
    page == INDEX_FILE || page.ends_with("/index.html")
}

/// Select the active node: the first node in document order whose resolved
/// link points at `current_location`.
///
/// When `root_path` is empty and the location is the book's index page, the
/// first linked node is selected as well, since the index page stands in for
/// the first chapter.
pub fn select(current_location: &str, tree: &TocTree, root_path: &str) -> Option<TocPath> {
    let page = normalize_location(current_location);
    let alias = if root_path.is_empty() && is_root_index(&page) {
        first_linked_node(tree)
    } else {
        None
    };

    let selected = tree.iter().find_map(|(path, item)| {
        let by_link = item
            .resolved_href()
            .is_some_and(|href| links_match(href, &page));
        (by_link || alias.as_ref() == Some(&path)).then_some(path)
    });

    debug!(
        "Active sidebar entry for {page:?}: {}",
        selected
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.to_string())
    );
    selected
}

fn first_linked_node(tree: &TocTree) -> Option<TocPath> {
    tree.iter()
        .find(|(_, item)| item.is_navigable())
        .map(|(path, _)| path)
}

fn links_match(resolved_href: &str, page: &str) -> bool {
    resolved_href == page || join_location(page, resolved_href) == page
}

/// Resolve `href` against `base` like a browser resolves a link on that page.
pub fn join_location(base: &str, href: &str) -> String {
    if URL_SCHEME.is_match(href) {
        return href.to_string();
    }

    let (origin, base_path) = split_origin(base);

    if let Some(rest) = href.strip_prefix("//") {
        return match origin.split_once("//") {
            Some((scheme, _)) => format!("{scheme}//{rest}"),
            None => href.to_string(),
        };
    }

    let joined = if href.starts_with('/') {
        href.to_string()
    } else {
        let dir_end = base_path.rfind('/').map_or(0, |i| i + 1);
        format!("{}{href}", &base_path[..dir_end])
    };

    format!("{origin}{}", remove_dot_segments(&joined))
}

/// Split `scheme://host/path` into (`scheme://host`, `/path`).
fn split_origin(location: &str) -> (&str, &str) {
    let Some(scheme) = URL_SCHEME.find(location) else {
        return ("", location);
    };
    let after_scheme = &location[scheme.end()..];
    match after_scheme.strip_prefix("//") {
        Some(authority_and_path) => {
            let authority_end = authority_and_path
                .find('/')
                .unwrap_or(authority_and_path.len());
            let origin_end = scheme.end() + 2 + authority_end;
            (&location[..origin_end], &location[origin_end..])
        }
        None => (&location[..scheme.end()], after_scheme),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let (prefix, rest) = match path.strip_prefix('/') {
        Some(rest) => ("/", rest),
        None => ("", path),
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    let mut output: Vec<&str> = Vec::new();

    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {}
            ".." => {
                if output.last().is_some_and(|previous| *previous != "..") {
                    output.pop();
                } else if prefix.is_empty() {
                    // Relative paths keep the segments that climb above their start
                    output.push("..");
                }
            }
            other => output.push(other),
        }
        if i == last && matches!(*segment, "." | "..") {
            output.push("");
        }
    }

    format!("{prefix}{}", output.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::TocItem;
    use crate::toc::link_resolver::resolve_tree;

    fn resolved(mut tree: TocTree, root_path: &str) -> TocTree {
        resolve_tree(&mut tree, root_path);
        tree
    }

    fn book_tree(root_path: &str) -> TocTree {
        resolved(
            TocTree::new(vec![
                TocItem::link("A", "a.html"),
                TocItem::section("B", Some("b.html"), vec![TocItem::link("B1", "b/b1.html")]),
            ]),
            root_path,
        )
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(
            normalize_location("https://x.org/book/a.html?q=1#top"),
            "https://x.org/book/a.html"
        );
        assert_eq!(
            normalize_location("https://x.org/book/"),
            "https://x.org/book/index.html"
        );
        assert_eq!(
            normalize_location("https://x.org/book/#frag"),
            "https://x.org/book/index.html"
        );
        assert_eq!(normalize_location(""), "");
    }

    #[test]
    fn test_join_location() {
        let base = "https://docs.example.com/book/b/b1.html";
        assert_eq!(
            join_location(base, "../b/b1.html"),
            "https://docs.example.com/book/b/b1.html"
        );
        assert_eq!(join_location(base, "../a.html"), "https://docs.example.com/book/a.html");
        assert_eq!(join_location(base, "/root.html"), "https://docs.example.com/root.html");
        assert_eq!(join_location(base, "//cdn.org/x"), "https://cdn.org/x");
        assert_eq!(join_location(base, "mailto:a@b.c"), "mailto:a@b.c");
        assert_eq!(join_location("b/b1.html", "../b/b1.html"), "b/b1.html");
        assert_eq!(join_location("a.html", "../../x.html"), "../../x.html");
        assert_eq!(
            join_location("file:///srv/book/index.html", "a.html"),
            "file:///srv/book/a.html"
        );
    }

    #[test]
    fn test_select_nested_page() {
        let tree = book_tree("../");
        let active = select("https://docs.example.com/book/b/b1.html", &tree, "../");
        assert_eq!(active, Some(TocPath::from(vec![1, 0])));
    }

    #[test]
    fn test_select_ignores_query_and_fragment() {
        let tree = book_tree("");
        let active = select("https://docs.example.com/book/b.html?x=1#part", &tree, "");
        assert_eq!(active, Some(TocPath::top(1)));
    }

    #[test]
    fn test_select_relative_location() {
        let tree = book_tree("");
        assert_eq!(select("a.html", &tree, ""), Some(TocPath::top(0)));
    }

    #[test]
    fn test_no_match_leaves_no_active_node() {
        let tree = book_tree("");
        assert_eq!(select("https://docs.example.com/book/other.html", &tree, ""), None);
    }

    #[test]
    fn test_first_match_wins() {
        let tree = resolved(
            TocTree::new(vec![
                TocItem::link("First", "dup.html"),
                TocItem::link("Second", "dup.html"),
            ]),
            "",
        );
        assert_eq!(
            select("https://x.org/dup.html", &tree, ""),
            Some(TocPath::top(0))
        );
    }

    #[test]
    fn test_root_index_aliases_first_chapter() {
        let tree = book_tree("");
        assert_eq!(select("https://x.org/book/", &tree, ""), Some(TocPath::top(0)));
        assert_eq!(
            select("https://x.org/book/index.html", &tree, ""),
            Some(TocPath::top(0))
        );
    }

    #[test]
    fn test_alias_needs_empty_root_path() {
        let tree = book_tree("../");
        assert_eq!(select("https://x.org/book/sub/index.html", &tree, "../"), None);
    }

    #[test]
    fn test_alias_skips_unlinked_leading_nodes() {
        let tree = resolved(
            TocTree::new(vec![
                TocItem::part_title("Start"),
                TocItem::chapter("Draft", None),
                TocItem::link("Intro", "intro.html"),
            ]),
            "",
        );
        assert_eq!(select("https://x.org/", &tree, ""), Some(TocPath::top(2)));
    }

    #[test]
    fn test_alias_on_empty_tree() {
        let tree = TocTree::default();
        assert_eq!(select("https://x.org/index.html", &tree, ""), None);
    }

    #[test]
    fn test_index_link_matches_before_alias() {
        let tree = resolved(
            TocTree::new(vec![
                TocItem::link("Intro", "intro.html"),
                TocItem::link("Home", "index.html"),
            ]),
            "",
        );
        // The alias target comes first in document order
        assert_eq!(select("https://x.org/index.html", &tree, ""), Some(TocPath::top(0)));
    }
}
