use std::path::Path;

use tocbar::scroll_persistence::SCROLL_STATE_KEY;
use tocbar::session_store::{FileSessionStore, MemorySessionStore, SessionStore};
use tocbar::test_utils::test_helpers::{long_tree, mount_sidebar};
use tocbar::widget::{SidebarAction, SidebarEvent, render_sidebar_html};
use tocbar::{TocItem, TocPath, TocTree};

const BOOK_SIDEBAR: &str = "tests/testdata/book_sidebar.html";

#[test]
fn test_book_sidebar_mounts_on_nested_page() {
    let tree = TocTree::load(Path::new(BOOK_SIDEBAR)).unwrap();
    assert_eq!(tree.items().len(), 7);

    let sidebar = mount_sidebar(
        tree,
        "../",
        "https://book.example/guide/installation.html#downloads",
        MemorySessionStore::new(),
    );

    assert_eq!(sidebar.active_path(), Some(&TocPath::from(vec![1, 0])));
    assert!(sidebar.is_expanded(&TocPath::top(1)));
    assert!(!sidebar.is_expanded(&TocPath::top(2)));

    let outline = sidebar.outline();
    let lines: Vec<&str> = outline.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "  Introduction -> ../index.html");
    assert_eq!(lines[1], "  ⌄ 1. Guide -> ../guide/index.html");
    assert_eq!(
        lines[2],
        "    1.1. Installation -> ../guide/installation.html  [active]"
    );
    assert_eq!(lines[5], "  › 2. Format -> ../format/index.html");
    assert_eq!(
        lines[9],
        "  Source -> https://github.com/rust-lang/mdBook"
    );
}

#[test]
fn test_only_one_entry_is_active() {
    let tree = TocTree::load(Path::new(BOOK_SIDEBAR)).unwrap();
    let sidebar = mount_sidebar(
        tree,
        "../../",
        "https://book.example/format/configuration/index.html",
        MemorySessionStore::new(),
    );

    let html = render_sidebar_html(&sidebar);
    assert_eq!(html.matches(r#"class="active""#).count(), 1);
    assert!(html.contains(
        r#"<a href="../../format/configuration/index.html" class="active">"#
    ));

    // Every container on the way to the active entry is open
    let active = sidebar.active_path().unwrap().clone();
    assert_eq!(active, TocPath::from(vec![2, 1]));
    for ancestor in active.ancestors() {
        assert!(sidebar.is_expanded(&ancestor));
    }
    assert!(!sidebar.is_expanded(&TocPath::from(vec![2, 0])));
}

#[test]
fn test_index_page_aliases_first_chapter() {
    let tree = TocTree::from_json(
        r#"[
            {"label": "Preface", "kind": "part-title"},
            {"label": "Intro", "href": "intro.html"},
            {"label": "Usage", "href": "usage.html"}
        ]"#,
    )
    .unwrap();

    let sidebar = mount_sidebar(
        tree.clone(),
        "",
        "https://book.example/",
        MemorySessionStore::new(),
    );
    assert_eq!(sidebar.active_item().map(TocItem::label), Some("Intro"));

    // Pages below the root never use the alias
    let sidebar = mount_sidebar(
        tree,
        "../",
        "https://book.example/sub/index.html",
        MemorySessionStore::new(),
    );
    assert!(sidebar.active_path().is_none());
}

#[test]
fn test_scroll_offset_survives_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let session_path = session_file.to_str().unwrap();

    // First page: scroll, then follow a link
    let store = FileSessionStore::load_or_ephemeral(Some(session_path));
    let mut sidebar = mount_sidebar(long_tree(60), "", "https://x.org/ch2.html", store);
    sidebar.scroll_to(17);
    let action = sidebar.dispatch(SidebarEvent::LinkClicked(TocPath::top(25)));
    assert_eq!(
        action,
        SidebarAction::Navigate {
            href: "ch25.html".to_string()
        }
    );
    drop(sidebar.unmount());
    assert!(session_file.exists());

    // Next page, loaded from disk
    let store = FileSessionStore::load_from_file(session_path).unwrap();
    assert_eq!(store.get(SCROLL_STATE_KEY), Some("17".to_string()));
    let mut sidebar = mount_sidebar(long_tree(60), "", "https://x.org/ch25.html", store);
    sidebar.set_viewport_height(20);
    assert_eq!(sidebar.scroll_offset(), 17);
    drop(sidebar.unmount());

    // The slot was consumed; a reload centers the active entry instead
    let store = FileSessionStore::load_from_file(session_path).unwrap();
    assert_eq!(store.get(SCROLL_STATE_KEY), None);
    let mut sidebar = mount_sidebar(long_tree(60), "", "https://x.org/ch25.html", store);
    sidebar.set_viewport_height(20);
    assert_eq!(sidebar.scroll_offset(), 16);
}

#[test]
fn test_garbage_in_session_slot_falls_back_to_centering() {
    let mut store = MemorySessionStore::new();
    store
        .set(SCROLL_STATE_KEY, "not a number".to_string())
        .unwrap();

    let mut sidebar = mount_sidebar(long_tree(40), "", "https://x.org/ch20.html", store);
    sidebar.set_viewport_height(10);
    assert_eq!(sidebar.scroll_offset(), 16);
    assert!(sidebar.unmount().is_empty());
}
