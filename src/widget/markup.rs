use super::sidebar::{SIDEBAR_ELEMENT_NAME, Sidebar};
use crate::session_store::SessionStore;
use crate::toc::{TocItem, TocPath};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Render the sidebar as book markup: resolved links, the `active` link and
/// `expanded` sections. Children of collapsed sections stay in the markup.
pub fn render_sidebar_html<S: SessionStore>(sidebar: &Sidebar<S>) -> String {
    let mut html = String::from(r#"<ol class="chapter">"#);
    render_items(
        sidebar,
        sidebar.tree().items(),
        &TocPath::default(),
        &mut html,
    );
    html.push_str("</ol>");
    html
}

/// The list wrapped in the sidebar element, carrying its scroll offset
pub fn render_scrollbox_html<S: SessionStore>(sidebar: &Sidebar<S>) -> String {
    format!(
        r#"<{SIDEBAR_ELEMENT_NAME} class="sidebar-scrollbox" data-scroll-top="{}">{}</{SIDEBAR_ELEMENT_NAME}>"#,
        sidebar.scroll_offset(),
        render_sidebar_html(sidebar)
    )
}

fn render_items<S: SessionStore>(
    sidebar: &Sidebar<S>,
    items: &[TocItem],
    parent: &TocPath,
    html: &mut String,
) {
    for (index, item) in items.iter().enumerate() {
        let path = parent.child(index);
        match item {
            TocItem::Separator => html.push_str(r#"<li class="spacer"></li>"#),
            TocItem::PartTitle { label } => {
                html.push_str(r#"<li class="part-title">"#);
                html.push_str(&encode_text(label));
                html.push_str("</li>");
            }
            TocItem::Chapter { .. } | TocItem::Section { .. } => {
                let class = if item.is_expanded() {
                    "chapter-item expanded"
                } else {
                    "chapter-item"
                };
                html.push_str(&format!(r#"<li class="{class}">"#));
                render_entry(sidebar, item, &path, html);
                if item.is_container() {
                    html.push_str(r#"<a class="toggle"><div>❱</div></a>"#);
                }
                html.push_str("</li>");

                if item.is_container() {
                    html.push_str(r#"<li><ol class="section">"#);
                    render_items(sidebar, item.children(), &path, html);
                    html.push_str("</ol></li>");
                }
            }
        }
    }
}

fn render_entry<S: SessionStore>(
    sidebar: &Sidebar<S>,
    item: &TocItem,
    path: &TocPath,
    html: &mut String,
) {
    let mut inner = String::new();
    if let Some(number) = item.number() {
        inner.push_str(r#"<strong aria-hidden="true">"#);
        inner.push_str(&encode_text(number));
        inner.push_str("</strong> ");
    }
    inner.push_str(&encode_text(item.label()));

    match item.resolved_href() {
        Some(href) => {
            let active = if sidebar.active_path() == Some(path) {
                r#" class="active""#
            } else {
                ""
            };
            html.push_str(&format!(
                r#"<a href="{}"{active}>{inner}</a>"#,
                encode_double_quoted_attribute(href)
            ));
        }
        None => html.push_str(&format!("<div>{inner}</div>")),
    }
}
