use crate::inputs::EventSource;
use crate::session_store::SessionStore;
use crate::theme::OCEANIC_NEXT;
use crate::widget::{Sidebar, SidebarAction};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use std::time::Duration;

const DEFAULT_TITLE: &str = "Contents";

pub struct App<S: SessionStore> {
    pub sidebar: Sidebar<S>,
    pub should_quit: bool,
    /// Link the user followed, if the session ended that way
    pub navigated_to: Option<String>,
    sidebar_area: Rect,
}

impl<S: SessionStore> App<S> {
    pub fn new(sidebar: Sidebar<S>) -> Self {
        Self {
            sidebar,
            should_quit: false,
            navigated_to: None,
            sidebar_area: Rect::default(),
        }
    }

    /// Hand the sidebar back, e.g. to unmount it and reuse its store
    pub fn into_sidebar(self) -> Sidebar<S> {
        self.sidebar
    }

    fn apply_action(&mut self, action: SidebarAction) {
        match action {
            SidebarAction::Navigate { href } => {
                info!("Navigating to {href}");
                self.navigated_to = Some(href);
                self.should_quit = true;
            }
            SidebarAction::Toggled { path, expanded } => {
                debug!("Entry {path} is now {}", if expanded { "expanded" } else { "collapsed" });
            }
            SidebarAction::None => {}
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {
                    let action = self.sidebar.handle_key(key);
                    self.apply_action(action);
                }
            },
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let area = self.sidebar_area;
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        if !inside {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let action = self.sidebar.handle_mouse_click(mouse.column, mouse.row, area);
                self.apply_action(action);
            }
            MouseEventKind::ScrollDown => self.sidebar.scroll_down(area.height),
            MouseEventKind::ScrollUp => self.sidebar.scroll_up(area.height),
            _ => {}
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.area());

        self.sidebar_area = chunks[0];
        let palette = &*OCEANIC_NEXT;
        self.sidebar.render(f, chunks[0], true, palette, DEFAULT_TITLE);

        let footer = Line::from(vec![
            Span::styled(
                " Enter: open  Space: toggle  q: quit  ",
                Style::default().fg(palette.dimmed),
            ),
            Span::styled(
                self.sidebar.current_location().to_string(),
                Style::default().fg(palette.text),
            ),
        ]);
        f.render_widget(Paragraph::new(footer), chunks[1]);
    }
}

/// Drive the app until it quits, reading input from `event_source`
pub fn run_app_with_event_source<B: Backend, S: SessionStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    event_source: &mut dyn EventSource,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;

        if event_source.poll(Duration::from_millis(100))? {
            let event = event_source.read()?;
            app.handle_event(event);
        }

        if app.should_quit {
            // Leave the final frame on screen for callers that inspect it
            terminal.draw(|f| app.draw(f))?;
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::SimulatedEventSource;
    use crate::session_store::MemorySessionStore;
    use crate::toc::{TocItem, TocTree};
    use crate::widget::MountConfig;
    use ratatui::backend::TestBackend;

    fn app() -> App<MemorySessionStore> {
        App::new(Sidebar::mount(MountConfig {
            root_path: "../".to_string(),
            tree: TocTree::new(vec![
                TocItem::link("A", "a.html"),
                TocItem::section("B", Some("b.html"), vec![TocItem::link("B1", "b/b1.html")]),
            ]),
            current_location: "https://docs.example.com/book/b/b1.html".to_string(),
            store: MemorySessionStore::new(),
        }))
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_event(SimulatedEventSource::key_event(
            KeyCode::Esc,
            crossterm::event::KeyModifiers::empty(),
        ));
        assert!(app.should_quit);
        assert!(app.navigated_to.is_none());
    }

    #[test]
    fn test_enter_on_cursor_navigates() {
        let mut app = app();
        app.handle_event(SimulatedEventSource::char_key('g'));
        app.handle_event(SimulatedEventSource::key_event(
            KeyCode::Enter,
            crossterm::event::KeyModifiers::empty(),
        ));
        assert!(app.should_quit);
        assert_eq!(app.navigated_to.as_deref(), Some("../a.html"));
    }

    #[test]
    fn test_clicks_outside_sidebar_are_ignored() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut app = app();
        terminal.draw(|f| app.draw(f)).unwrap();

        // Footer line
        app.handle_event(SimulatedEventSource::mouse_down(5, 9));
        assert!(!app.should_quit);

        app.handle_event(SimulatedEventSource::mouse_down(10, 1));
        assert_eq!(app.navigated_to.as_deref(), Some("../a.html"));
    }

    #[test]
    fn test_run_loop_stops_on_exhausted_script() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut app = app();
        let mut source = SimulatedEventSource::new(vec![SimulatedEventSource::char_key('j')]);

        run_app_with_event_source(&mut terminal, &mut app, &mut source).unwrap();
        assert!(app.should_quit);
        assert_eq!(app.sidebar.cursor(), Some(2));
    }
}
