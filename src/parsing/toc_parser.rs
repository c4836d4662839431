use crate::toc::{TocItem, TocTree};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use log::{debug, warn};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TocDataError {
    #[error("no <ol class=\"chapter\"> element found in the sidebar markup")]
    MissingChapterList,
    #[error("invalid table of contents JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read table of contents: {0}")]
    Io(#[from] std::io::Error),
}

pub fn load_toc_file(path: &Path) -> Result<TocTree, TocDataError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let tree = if is_json {
        parse_toc_json(&content)?
    } else {
        parse_sidebar_html(&content)?
    };
    debug!(
        "Loaded {} table of contents entries from {}",
        tree.node_count(),
        path.display()
    );
    Ok(tree)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum JsonKind {
    #[default]
    Chapter,
    PartTitle,
    Separator,
}

#[derive(Debug, Deserialize)]
struct JsonNode {
    #[serde(default)]
    label: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    children: Vec<JsonNode>,
    #[serde(default)]
    kind: JsonKind,
}

impl JsonNode {
    fn into_item(self) -> TocItem {
        match self.kind {
            JsonKind::PartTitle => TocItem::part_title(self.label),
            JsonKind::Separator => TocItem::Separator,
            JsonKind::Chapter => {
                let children = self.children.into_iter().map(JsonNode::into_item).collect();
                let mut item = TocItem::section(self.label, self.href.as_deref(), children);
                if let Some(number) = self.number {
                    item = item.with_number(number);
                }
                item
            }
        }
    }
}

/// Parse a JSON array of `{ label, href?, number?, children?, kind? }` nodes
pub fn parse_toc_json(text: &str) -> Result<TocTree, TocDataError> {
    let nodes: Vec<JsonNode> = serde_json::from_str(text)?;
    Ok(TocTree::new(
        nodes.into_iter().map(JsonNode::into_item).collect(),
    ))
}

/// Parse the sidebar fragment a book embeds in its pages.
///
/// Sub-chapters are written as a separate `<li><ol class="section">` right
/// after their parent's `li`, so a nested list attaches to the previous item.
/// The `expanded` classes in the markup are ignored: every section starts
/// collapsed until the active entry is known.
pub fn parse_sidebar_html(html: &str) -> Result<TocTree, TocDataError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;

    let chapter_list = find_element(&dom.document, &|node| {
        tag_name(node).as_deref() == Some("ol") && has_class(node, "chapter")
    })
    .ok_or(TocDataError::MissingChapterList)?;

    Ok(TocTree::new(parse_list(&chapter_list)))
}

fn parse_list(list: &Handle) -> Vec<TocItem> {
    let mut items: Vec<TocItem> = Vec::new();

    for li in element_children(list).filter(|node| tag_name(node).as_deref() == Some("li")) {
        let nested = if has_class(&li, "chapter-item") {
            None
        } else {
            element_children(&li).find(|node| tag_name(node).as_deref() == Some("ol"))
        };

        if let Some(nested) = nested {
            let children = parse_list(&nested);
            match items.pop() {
                Some(parent @ (TocItem::Chapter { .. } | TocItem::Section { .. })) => {
                    items.push(parent.with_children(children));
                }
                Some(other) => {
                    warn!("Nested list follows a non-chapter entry; keeping it at the outer level");
                    items.push(other);
                    items.extend(children);
                }
                None => {
                    warn!("Nested list without a parent chapter; keeping it at the outer level");
                    items.extend(children);
                }
            }
            continue;
        }

        if has_class(&li, "part-title") {
            items.push(TocItem::part_title(collapse_whitespace(&text_content(&li))));
        } else if has_class(&li, "spacer") {
            items.push(TocItem::Separator);
        } else if let Some(item) = parse_chapter_item(&li) {
            items.push(item);
        }
    }

    items
}

/// A chapter `li` holds an `a` (or a `div` for drafts), an optional toggle
/// anchor, and in newer markup its own nested `ol`.
fn parse_chapter_item(li: &Handle) -> Option<TocItem> {
    let mut item = None;
    let mut children = Vec::new();

    for child in element_children(li) {
        match tag_name(&child).as_deref() {
            Some("a") if has_class(&child, "toggle") => {}
            Some("a") if item.is_none() => {
                item = Some(chapter_from_label_element(&child, attr_value(&child, "href")));
            }
            Some("div") | Some("span") if item.is_none() => {
                item = Some(chapter_from_label_element(&child, None));
            }
            Some("ol") => children.extend(parse_list(&child)),
            _ => {}
        }
    }

    // Unclosed `li` tags in generated markup leave empty items behind
    item.map(|item| item.with_children(children))
}

fn chapter_from_label_element(element: &Handle, href: Option<String>) -> TocItem {
    let mut number = None;
    let mut label = String::new();

    for child in element.children.borrow().iter() {
        match &child.data {
            NodeData::Element { name, .. } if name.local.as_ref() == "strong" => {
                number = Some(collapse_whitespace(&text_content(child)));
            }
            _ => collect_text(child, &mut label),
        }
    }

    let item = TocItem::chapter(collapse_whitespace(&label), href.as_deref());
    match number {
        Some(number) if !number.is_empty() => item.with_number(number),
        _ => item,
    }
}

fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
        _ => None,
    }
}

fn attr_value(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

fn has_class(node: &Handle, class: &str) -> bool {
    attr_value(node, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

fn element_children(node: &Handle) -> impl Iterator<Item = Handle> {
    let children: Vec<Handle> = node
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect();
    children.into_iter()
}

fn find_element(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    if predicate(node) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, predicate))
}

fn text_content(node: &Handle) -> String {
    let mut output = String::new();
    collect_text(node, &mut output);
    output
}

fn collect_text(node: &Handle, output: &mut String) {
    match &node.data {
        NodeData::Text { contents } => output.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, output);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
