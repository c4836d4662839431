use super::subscriptions::{Reaction, SidebarEvent, Subscriptions, Trigger};
use crate::scroll_persistence::{self, InitialScroll};
use crate::session_store::SessionStore;
use crate::theme::SidebarPalette;
use crate::toc::{TocItem, TocPath, TocRow, TocTree, active, expander, link_resolver};
use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, info};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Name the sidebar element is registered under in book pages
pub const SIDEBAR_ELEMENT_NAME: &str = "mdbook-sidebar-scrollbox";

/// Everything the host page supplies when the sidebar is mounted
pub struct MountConfig<S> {
    pub root_path: String,
    pub tree: TocTree,
    pub current_location: String,
    pub store: S,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    None,
    /// A link was followed; the host should open `href`
    Navigate { href: String },
    Toggled { path: TocPath, expanded: bool },
}

pub struct Sidebar<S: SessionStore> {
    root_path: String,
    current_location: String,
    tree: TocTree,
    store: S,
    active: Option<TocPath>,
    pending_scroll: Option<InitialScroll>, // Settled once the viewport height is known
    list_state: ListState,
    cursor: Option<usize>,
    last_viewport_height: usize,
    subscriptions: Subscriptions,
}

impl<S: SessionStore> Sidebar<S> {
    /// Resolve links, pick the active entry, reveal it, and restore the
    /// scroll position handed over by the previous page.
    ///
    /// Centering the active entry needs the viewport height, so it happens on
    /// the first `render` or `set_viewport_height`. Hosts that dispatch clicks
    /// or emit markup before drawing should call `with_viewport_height` first,
    /// otherwise the offset saved on a link click is still 0.
    pub fn mount(config: MountConfig<S>) -> Self {
        let MountConfig {
            root_path,
            mut tree,
            current_location,
            store,
        } = config;

        let resolved = link_resolver::resolve_tree(&mut tree, &root_path);
        let active = active::select(&current_location, &tree, &root_path);
        if let Some(path) = &active {
            expander::expand_ancestors(&mut tree, path);
        }

        let active_row = active.as_ref().and_then(|path| tree.row_of(path));
        let mut sidebar = Self {
            root_path,
            current_location,
            tree,
            store,
            active,
            pending_scroll: None,
            list_state: ListState::default(),
            cursor: None,
            last_viewport_height: 0,
            subscriptions: Subscriptions::sidebar_defaults(),
        };

        match scroll_persistence::initial_scroll(&mut sidebar.store, active_row) {
            InitialScroll::Restore(offset) => {
                // Usable right away; trimmed to the last full page on first layout
                sidebar.scroll_to(offset);
                sidebar.pending_scroll = Some(InitialScroll::Restore(offset));
            }
            InitialScroll::CenterRow(row) => {
                sidebar.pending_scroll = Some(InitialScroll::CenterRow(row))
            }
            InitialScroll::Keep => {}
        }

        info!(
            "Mounted {SIDEBAR_ELEMENT_NAME} for {:?}: {} entries, {resolved} links, active {}",
            sidebar.current_location,
            sidebar.tree.node_count(),
            sidebar
                .active
                .as_ref()
                .map_or_else(|| "none".to_string(), |path| path.to_string()),
        );
        sidebar
    }

    /// Drop the event wiring and hand the store back for the next mount
    pub fn unmount(mut self) -> S {
        self.subscriptions.clear();
        debug!("Unmounted sidebar for {:?}", self.current_location);
        self.store
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn current_location(&self) -> &str {
        &self.current_location
    }

    pub fn tree(&self) -> &TocTree {
        &self.tree
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_path(&self) -> Option<&TocPath> {
        self.active.as_ref()
    }

    pub fn active_item(&self) -> Option<&TocItem> {
        self.active.as_ref().and_then(|path| self.tree.get(path))
    }

    pub fn is_expanded(&self, path: &TocPath) -> bool {
        self.tree.get(path).is_some_and(TocItem::is_expanded)
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn subscriptions_mut(&mut self) -> &mut Subscriptions {
        &mut self.subscriptions
    }

    pub fn scroll_offset(&self) -> usize {
        self.list_state.offset()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn row_count(&self) -> usize {
        self.tree.visible_rows().len()
    }

    /// Set the scroll offset, clamped to the last row
    pub fn scroll_to(&mut self, offset: usize) {
        let max_offset = self.row_count().saturating_sub(1);
        *self.list_state.offset_mut() = offset.min(max_offset);
        self.pending_scroll = None;
    }

    /// Settle the initial scroll for a viewport of `area_height` rows
    pub fn with_viewport_height(mut self, area_height: usize) -> Self {
        self.set_viewport_height(area_height);
        self
    }

    pub fn viewport_height(&self) -> usize {
        self.last_viewport_height
    }

    /// Record the viewport height. The first call settles the initial scroll:
    /// a handed-over offset is trimmed so the last page stays full, otherwise
    /// the active entry is centered.
    pub fn set_viewport_height(&mut self, area_height: usize) {
        self.last_viewport_height = area_height;
        let Some(pending) = self.pending_scroll.take() else {
            return;
        };

        let visible_height = area_height.saturating_sub(2); // Account for borders
        let max_offset = self.row_count().saturating_sub(visible_height);
        let offset = match pending {
            InitialScroll::Restore(offset) => offset.min(max_offset),
            InitialScroll::CenterRow(row) => {
                scroll_persistence::centered_offset(row, visible_height).min(max_offset)
            }
            InitialScroll::Keep => return,
        };
        *self.list_state.offset_mut() = offset;
        debug!("Initial sidebar offset {offset} for {pending:?}");
    }

    /// Run the reactions subscribed to the event's trigger, in registration order
    pub fn dispatch(&mut self, event: SidebarEvent) -> SidebarAction {
        let path = event.path().clone();
        let Some(item) = self.tree.get(&path) else {
            debug!("Ignoring {event:?}: no such entry");
            return SidebarAction::None;
        };
        let applies = match event.trigger() {
            Trigger::LinkClick => item.is_navigable(),
            Trigger::ToggleClick => item.is_container(),
        };
        if !applies {
            return SidebarAction::None;
        }

        let mut action = SidebarAction::None;
        for reaction in self.subscriptions.reactions_for(event.trigger()) {
            match reaction {
                Reaction::PersistScrollOffset => {
                    let offset = self.scroll_offset();
                    scroll_persistence::save_scroll_offset(&mut self.store, offset);
                }
                Reaction::FollowLink => {
                    if let Some(href) = self.tree.get(&path).and_then(TocItem::resolved_href) {
                        info!("Following sidebar link {href}");
                        action = SidebarAction::Navigate {
                            href: href.to_string(),
                        };
                    }
                }
                Reaction::FlipExpansion => {
                    if let Some(expanded) = self.flip_expansion(&path) {
                        action = SidebarAction::Toggled {
                            path: path.clone(),
                            expanded,
                        };
                    }
                }
            }
        }
        action
    }

    fn flip_expansion(&mut self, path: &TocPath) -> Option<bool> {
        let item = self.tree.get_mut(path)?;
        if !item.is_container() {
            return None;
        }
        item.toggle_expansion();
        let expanded = item.is_expanded();

        // Collapsing can hide the rows below the cursor
        let total = self.row_count();
        if let Some(cursor) = self.cursor {
            if cursor >= total {
                self.set_cursor(total.saturating_sub(1));
            }
        }
        Some(expanded)
    }

    fn set_cursor(&mut self, row: usize) {
        self.cursor = Some(row);
        self.list_state.select(Some(row));
    }

    fn cursor_path(&self) -> Option<TocPath> {
        let cursor = self.cursor?;
        self.tree
            .visible_rows()
            .get(cursor)
            .map(|row| row.path.clone())
    }

    // The cursor appears on the active entry, or at the top of the view
    fn initial_cursor_row(&self) -> usize {
        self.active
            .as_ref()
            .and_then(|path| self.tree.row_of(path))
            .unwrap_or_else(|| self.scroll_offset())
    }

    pub fn move_cursor_down(&mut self) {
        let total = self.row_count();
        if total == 0 {
            return;
        }
        let row = match self.cursor {
            Some(cursor) => (cursor + 1).min(total - 1),
            None => self.initial_cursor_row().min(total - 1),
        };
        self.set_cursor(row);
    }

    pub fn move_cursor_up(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let row = match self.cursor {
            Some(cursor) => cursor.saturating_sub(1),
            None => self.initial_cursor_row(),
        };
        self.set_cursor(row);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SidebarAction {
        let total = self.row_count();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor_up(),
            KeyCode::Char('g') | KeyCode::Home if total > 0 => self.set_cursor(0),
            KeyCode::Char('G') | KeyCode::End if total > 0 => self.set_cursor(total - 1),
            KeyCode::Char('a') => {
                if let Some(row) = self.active.as_ref().and_then(|path| self.tree.row_of(path)) {
                    self.set_cursor(row);
                }
            }
            KeyCode::Enter => {
                if let Some(path) = self.cursor_path() {
                    return self.dispatch(SidebarEvent::LinkClicked(path));
                }
            }
            KeyCode::Char(' ') | KeyCode::Tab => {
                if let Some(path) = self.cursor_path() {
                    return self.dispatch(SidebarEvent::ToggleClicked(path));
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(path) = self.cursor_path() {
                    let collapsed = self
                        .tree
                        .get(&path)
                        .is_some_and(|item| item.is_container() && !item.is_expanded());
                    if collapsed {
                        return self.dispatch(SidebarEvent::ToggleClicked(path));
                    }
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(path) = self.cursor_path() {
                    if self.is_expanded(&path) {
                        return self.dispatch(SidebarEvent::ToggleClicked(path));
                    }
                    if let Some(row) = path.parent().and_then(|parent| self.tree.row_of(&parent)) {
                        self.set_cursor(row);
                    }
                }
            }
            _ => {}
        }
        SidebarAction::None
    }

    /// Scroll the view down while keeping cursor at same screen position if possible
    pub fn scroll_down(&mut self, area_height: u16) {
        self.pending_scroll = None;
        let visible_height = area_height.saturating_sub(2) as usize; // Account for borders
        let total = self.row_count();
        let current_offset = self.list_state.offset();

        if current_offset + visible_height < total {
            let new_offset = current_offset + 1;
            if let Some(cursor) = self.cursor {
                let cursor_viewport_pos = cursor.saturating_sub(current_offset);
                self.cursor = Some((new_offset + cursor_viewport_pos).min(total - 1));
            }
            self.list_state = ListState::default()
                .with_selected(self.cursor)
                .with_offset(new_offset);
        }
    }

    /// Scroll the view up while keeping cursor at same screen position if possible
    pub fn scroll_up(&mut self, _area_height: u16) {
        self.pending_scroll = None;
        let current_offset = self.list_state.offset();

        if current_offset > 0 {
            let new_offset = current_offset - 1;
            if let Some(cursor) = self.cursor {
                let cursor_viewport_pos = cursor.saturating_sub(current_offset);
                self.cursor = Some(new_offset + cursor_viewport_pos);
            }
            self.list_state = ListState::default()
                .with_selected(self.cursor)
                .with_offset(new_offset);
        }
    }

    /// Handle mouse click at the given position.
    ///
    /// A click on a section's arrow toggles it; a click anywhere else on a
    /// linked row follows the link.
    pub fn handle_mouse_click(&mut self, x: u16, y: u16, area: Rect) -> SidebarAction {
        // Account for the border (1 line at top and bottom)
        if y <= area.y || y >= area.y + area.height.saturating_sub(1) {
            return SidebarAction::None;
        }
        let row_index = self.list_state.offset() + (y - area.y - 1) as usize;

        let rows = self.tree.visible_rows();
        let Some(row) = rows.get(row_index) else {
            return SidebarAction::None;
        };
        let path = row.path.clone();
        let is_container = row.item.is_container();
        let depth = row.depth;

        if is_container {
            // Border + indent; each level adds 2 spaces
            let arrow_x = area.x + 1 + ((depth + 1) * 2) as u16;
            if x >= arrow_x.saturating_sub(1) && x <= arrow_x + 1 {
                return self.dispatch(SidebarEvent::ToggleClicked(path));
            }
        }

        self.set_cursor(row_index);
        self.dispatch(SidebarEvent::LinkClicked(path))
    }

    /// Plain text of a row as drawn in the sidebar
    pub fn row_text(row: &TocRow) -> String {
        let indent = "  ".repeat(row.depth + 1);
        match row.item {
            TocItem::Separator => format!("{indent}{}", "─".repeat(8)),
            TocItem::PartTitle { label } => format!("{indent}{label}"),
            TocItem::Section { is_expanded, .. } => {
                let section_icon = if *is_expanded { "⌄" } else { "›" };
                format!("{indent}{section_icon} {}", Self::entry_text(row.item))
            }
            TocItem::Chapter { .. } => format!("{indent}{}", Self::entry_text(row.item)),
        }
    }

    fn entry_text(item: &TocItem) -> String {
        match item.number() {
            Some(number) => format!("{number} {}", item.label()),
            None => item.label().to_string(),
        }
    }

    /// Text dump of the visible rows with their resolved links
    pub fn outline(&self) -> String {
        self.tree
            .visible_rows()
            .iter()
            .map(|row| {
                let mut line = Self::row_text(row);
                if let Some(href) = row.item.resolved_href() {
                    line.push_str(&format!(" -> {href}"));
                }
                if self.active.as_ref() == Some(&row.path) {
                    line.push_str("  [active]");
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The active entry, or a collapsed section that hides it
    fn should_highlight(&self, row: &TocRow) -> bool {
        match &self.active {
            Some(active) => {
                &row.path == active
                    || (!row.item.is_expanded() && row.path.is_ancestor_of(active))
            }
            None => false,
        }
    }

    fn row_style(&self, row: &TocRow, palette: &SidebarPalette, text_color: Color) -> Style {
        if self.should_highlight(row) {
            return Style::default()
                .fg(palette.active)
                .add_modifier(Modifier::BOLD);
        }
        match row.item {
            TocItem::Section { .. } => Style::default().fg(palette.section),
            TocItem::PartTitle { .. } => Style::default()
                .fg(palette.part_title)
                .add_modifier(Modifier::BOLD),
            TocItem::Separator => Style::default().fg(palette.dimmed),
            TocItem::Chapter { href: None, .. } => Style::default()
                .fg(palette.dimmed)
                .add_modifier(Modifier::ITALIC),
            TocItem::Chapter { .. } => Style::default().fg(text_color),
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        is_focused: bool,
        palette: &SidebarPalette,
        title: &str,
    ) {
        self.set_viewport_height(area.height as usize);

        let (text_color, border_color) = palette.get_panel_colors(is_focused);
        let (selection_bg, selection_fg) = palette.get_selection_colors(is_focused);

        let items: Vec<ListItem> = self
            .tree
            .visible_rows()
            .iter()
            .map(|row| {
                let style = self.row_style(row, palette, text_color);
                ListItem::new(Line::from(vec![Span::styled(Self::row_text(row), style)]))
            })
            .collect();

        let mut toc_list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .border_style(Style::default().fg(border_color))
                    .style(Style::default().bg(palette.background)),
            )
            .style(Style::default().bg(palette.background));

        if is_focused {
            toc_list = toc_list.highlight_style(Style::default().bg(selection_bg).fg(selection_fg))
        }

        f.render_stateful_widget(toc_list, area, &mut self.list_state);
    }
}
