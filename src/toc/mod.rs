pub mod active;
pub mod expander;
pub mod link_resolver;

use crate::parsing::toc_parser::{self, TocDataError};
use std::fmt;
use std::path::Path;

/// Address of a node in the tree: child indices from the top level down.
///
/// Every proper prefix of a path addresses one of the node's ancestors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TocPath(Vec<usize>);

impl TocPath {
    pub fn top(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth, 0 for top-level items
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn parent(&self) -> Option<TocPath> {
        if self.0.len() > 1 {
            Some(TocPath(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// Proper ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = TocPath> + '_ {
        (1..self.0.len()).rev().map(|len| TocPath(self.0[..len].to_vec()))
    }

    pub fn is_ancestor_of(&self, other: &TocPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for TocPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for TocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// A single entry of the table of contents
#[derive(Clone, Debug, PartialEq)]
pub enum TocItem {
    /// A leaf entry. Without an href it is a draft chapter and cannot be followed.
    Chapter {
        label: String,
        number: Option<String>,
        href: Option<String>,
        resolved_href: Option<String>,
    },
    /// An entry with children; the only kind that can be expanded
    Section {
        label: String,
        number: Option<String>,
        href: Option<String>,
        resolved_href: Option<String>,
        children: Vec<TocItem>,
        is_expanded: bool,
    },
    /// Non-navigable heading that groups the chapters following it
    PartTitle { label: String },
    Separator,
}

impl TocItem {
    pub fn chapter(label: impl Into<String>, href: Option<&str>) -> Self {
        TocItem::Chapter {
            label: label.into(),
            number: None,
            href: href.map(str::to_string),
            resolved_href: None,
        }
    }

    pub fn link(label: impl Into<String>, href: &str) -> Self {
        Self::chapter(label, Some(href))
    }

    /// Builds a container; with no children this degrades to a plain chapter.
    pub fn section(label: impl Into<String>, href: Option<&str>, children: Vec<TocItem>) -> Self {
        Self::chapter(label, href).with_children(children)
    }

    pub fn part_title(label: impl Into<String>) -> Self {
        TocItem::PartTitle {
            label: label.into(),
        }
    }

    pub fn with_number(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            TocItem::Chapter { number, .. } | TocItem::Section { number, .. } => {
                *number = Some(value.into());
            }
            TocItem::PartTitle { .. } | TocItem::Separator => {}
        }
        self
    }

    /// Attach children to a chapter or section. Part titles and separators
    /// cannot hold children and are returned unchanged.
    pub fn with_children(self, new_children: Vec<TocItem>) -> Self {
        if new_children.is_empty() {
            return self;
        }
        match self {
            TocItem::Chapter {
                label,
                number,
                href,
                resolved_href,
            } => TocItem::Section {
                label,
                number,
                href,
                resolved_href,
                children: new_children,
                is_expanded: false,
            },
            TocItem::Section {
                label,
                number,
                href,
                resolved_href,
                mut children,
                is_expanded,
            } => {
                children.extend(new_children);
                TocItem::Section {
                    label,
                    number,
                    href,
                    resolved_href,
                    children,
                    is_expanded,
                }
            }
            other => other,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TocItem::Chapter { label, .. }
            | TocItem::Section { label, .. }
            | TocItem::PartTitle { label } => label,
            TocItem::Separator => "",
        }
    }

    pub fn number(&self) -> Option<&str> {
        match self {
            TocItem::Chapter { number, .. } | TocItem::Section { number, .. } => number.as_deref(),
            _ => None,
        }
    }

    /// The href as written in the book data
    pub fn href(&self) -> Option<&str> {
        match self {
            TocItem::Chapter { href, .. } | TocItem::Section { href, .. } => href.as_deref(),
            _ => None,
        }
    }

    /// The href after rewriting against the root path, once mounted
    pub fn resolved_href(&self) -> Option<&str> {
        match self {
            TocItem::Chapter { resolved_href, .. } | TocItem::Section { resolved_href, .. } => {
                resolved_href.as_deref()
            }
            _ => None,
        }
    }

    pub(crate) fn set_resolved_href(&mut self, value: Option<String>) {
        if let TocItem::Chapter { resolved_href, .. } | TocItem::Section { resolved_href, .. } =
            self
        {
            *resolved_href = value;
        }
    }

    pub fn children(&self) -> &[TocItem] {
        match self {
            TocItem::Section { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, TocItem::Section { .. })
    }

    pub fn is_navigable(&self) -> bool {
        self.href().is_some()
    }

    pub fn is_expanded(&self) -> bool {
        matches!(
            self,
            TocItem::Section {
                is_expanded: true,
                ..
            }
        )
    }

    /// Toggle expansion state (only applies to sections)
    pub fn toggle_expansion(&mut self) {
        if let TocItem::Section { is_expanded, .. } = self {
            *is_expanded = !*is_expanded;
        }
    }

    pub fn collapse(&mut self) {
        if let TocItem::Section { is_expanded, .. } = self {
            *is_expanded = false;
        }
    }

    pub fn expand(&mut self) {
        if let TocItem::Section { is_expanded, .. } = self {
            *is_expanded = true;
        }
    }
}

/// One line of the sidebar as currently laid out
#[derive(Clone, Debug)]
pub struct TocRow<'a> {
    pub path: TocPath,
    pub item: &'a TocItem,
    pub depth: usize,
}

/// The table of contents. Its shape is fixed at construction; only the
/// expansion flags and the cached resolved links change afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TocTree {
    items: Vec<TocItem>,
}

impl TocTree {
    pub fn new(items: Vec<TocItem>) -> Self {
        Self { items }
    }

    pub fn from_json(text: &str) -> Result<Self, TocDataError> {
        toc_parser::parse_toc_json(text)
    }

    pub fn from_sidebar_html(html: &str) -> Result<Self, TocDataError> {
        toc_parser::parse_sidebar_html(html)
    }

    /// Load from a file, `.json` as JSON and anything else as sidebar markup
    pub fn load(path: &Path) -> Result<Self, TocDataError> {
        toc_parser::load_toc_file(path)
    }

    pub fn items(&self) -> &[TocItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn get(&self, path: &TocPath) -> Option<&TocItem> {
        let (first, rest) = path.indices().split_first()?;
        let mut item = self.items.get(*first)?;
        for index in rest {
            item = item.children().get(*index)?;
        }
        Some(item)
    }

    pub(crate) fn get_mut(&mut self, path: &TocPath) -> Option<&mut TocItem> {
        let (first, rest) = path.indices().split_first()?;
        let mut item = self.items.get_mut(*first)?;
        for index in rest {
            item = match item {
                TocItem::Section { children, .. } => children.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(item)
    }

    /// All nodes in document (pre-)order, regardless of expansion
    pub fn iter(&self) -> impl Iterator<Item = (TocPath, &TocItem)> {
        let mut nodes = Vec::new();
        Self::collect_pre_order(&self.items, &TocPath::default(), &mut nodes);
        nodes.into_iter()
    }

    fn collect_pre_order<'a>(
        items: &'a [TocItem],
        parent: &TocPath,
        output: &mut Vec<(TocPath, &'a TocItem)>,
    ) {
        for (index, item) in items.iter().enumerate() {
            let path = parent.child(index);
            output.push((path.clone(), item));
            Self::collect_pre_order(item.children(), &path, output);
        }
    }

    pub(crate) fn for_each_mut(&mut self, mut f: impl FnMut(&mut TocItem)) {
        fn walk(items: &mut [TocItem], f: &mut dyn FnMut(&mut TocItem)) {
            for item in items {
                f(&mut *item);
                if let TocItem::Section { children, .. } = item {
                    walk(children, f);
                }
            }
        }
        walk(&mut self.items, &mut f);
    }

    /// Rows as displayed: children of collapsed sections are hidden
    pub fn visible_rows(&self) -> Vec<TocRow<'_>> {
        let mut rows = Vec::new();
        Self::collect_visible(&self.items, &TocPath::default(), &mut rows);
        rows
    }

    fn collect_visible<'a>(items: &'a [TocItem], parent: &TocPath, rows: &mut Vec<TocRow<'a>>) {
        for (index, item) in items.iter().enumerate() {
            let path = parent.child(index);
            rows.push(TocRow {
                depth: path.depth(),
                path: path.clone(),
                item,
            });
            if item.is_expanded() {
                Self::collect_visible(item.children(), &path, rows);
            }
        }
    }

    /// Row index of a node, if every ancestor is expanded
    pub fn row_of(&self, path: &TocPath) -> Option<usize> {
        self.visible_rows().iter().position(|row| &row.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TocTree {
        TocTree::new(vec![
            TocItem::link("A", "a.html"),
            TocItem::section(
                "B",
                Some("b.html"),
                vec![
                    TocItem::link("B1", "b/b1.html"),
                    TocItem::section("B2", None, vec![TocItem::link("B2a", "b/b2a.html")]),
                ],
            ),
            TocItem::part_title("Appendix"),
            TocItem::link("C", "c.html"),
        ])
    }

    #[test]
    fn test_section_without_children_is_a_chapter() {
        let item = TocItem::section("Lonely", Some("lonely.html"), vec![]);
        assert!(!item.is_container());
        assert_eq!(item.href(), Some("lonely.html"));
    }

    #[test]
    fn test_pre_order_iteration() {
        let tree = sample();
        let labels: Vec<&str> = tree.iter().map(|(_, item)| item.label()).collect();
        assert_eq!(labels, vec!["A", "B", "B1", "B2", "B2a", "Appendix", "C"]);
        assert_eq!(tree.node_count(), 7);
    }

    #[test]
    fn test_get_by_path() {
        let tree = sample();
        let path = TocPath::from(vec![1, 1, 0]);
        assert_eq!(tree.get(&path).map(TocItem::label), Some("B2a"));
        assert!(tree.get(&TocPath::from(vec![0, 0])).is_none());
        assert!(tree.get(&TocPath::default()).is_none());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let path = TocPath::from(vec![1, 1, 0]);
        let ancestors: Vec<TocPath> = path.ancestors().collect();
        assert_eq!(
            ancestors,
            vec![TocPath::from(vec![1, 1]), TocPath::from(vec![1])]
        );
        assert!(TocPath::top(1).is_ancestor_of(&path));
        assert!(!path.is_ancestor_of(&path));
        assert_eq!(path.to_string(), "1.1.0");
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let mut tree = sample();
        assert_eq!(tree.visible_rows().len(), 4);

        tree.get_mut(&TocPath::top(1)).unwrap().expand();
        let rows = tree.visible_rows();
        let labels: Vec<&str> = rows.iter().map(|row| row.item.label()).collect();
        assert_eq!(labels, vec!["A", "B", "B1", "B2", "Appendix", "C"]);
        assert_eq!(rows[2].depth, 1);
        assert_eq!(tree.row_of(&TocPath::top(3)), Some(5));
        assert_eq!(tree.row_of(&TocPath::from(vec![1, 1, 0])), None);
    }

    #[test]
    fn test_expansion_only_applies_to_sections() {
        let mut chapter = TocItem::link("A", "a.html");
        chapter.toggle_expansion();
        assert!(!chapter.is_expanded());

        let mut section = TocItem::section("B", None, vec![TocItem::link("B1", "b1.html")]);
        section.toggle_expansion();
        assert!(section.is_expanded());
        section.collapse();
        assert!(!section.is_expanded());
    }
}
