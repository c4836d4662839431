pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
    use crate::main_app::App;
    use crate::session_store::{MemorySessionStore, SessionStore};
    use crate::toc::{TocItem, TocTree};
    use crate::widget::{MountConfig, Sidebar};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Press Enter (follow the link under the cursor)
        pub fn press_enter(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Enter,
                KeyModifiers::empty(),
            ));
            self
        }

        /// Press Space (toggle the section under the cursor)
        pub fn press_space(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key(' '));
            self
        }

        /// Navigate down n times (press 'j' n times)
        pub fn navigate_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        /// Navigate up n times (press 'k' n times)
        pub fn navigate_up(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('k'));
            }
            self
        }

        /// Left click at a terminal cell
        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::mouse_down(column, row));
            self
        }

        /// Scroll the wheel down n times over a terminal cell
        pub fn scroll_down(mut self, times: usize, column: u16, row: u16) -> Self {
            for _ in 0..times {
                self.events
                    .push(SimulatedEventSource::mouse_scroll_down(column, row));
            }
            self
        }

        /// Scroll the wheel up n times over a terminal cell
        pub fn scroll_up(mut self, times: usize, column: u16, row: u16) -> Self {
            for _ in 0..times {
                self.events
                    .push(SimulatedEventSource::mouse_scroll_up(column, row));
            }
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('q'));
            self
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.hide_cursor().unwrap();
        terminal
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                let cell = buffer.cell((x, y)).unwrap();
                line.push_str(cell.symbol());
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        // Remove trailing empty lines
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }

        lines.join("\n")
    }

    /// `A`, then section `B` holding `B1`
    pub fn sample_tree() -> TocTree {
        TocTree::new(vec![
            TocItem::link("A", "a.html"),
            TocItem::section("B", Some("b.html"), vec![TocItem::link("B1", "b/b1.html")]),
        ])
    }

    /// `count` flat chapters linking to `ch<i>.html`
    pub fn long_tree(count: usize) -> TocTree {
        TocTree::new(
            (0..count)
                .map(|i| TocItem::link(format!("Chapter {i}"), &format!("ch{i}.html")))
                .collect(),
        )
    }

    pub fn mount_sidebar<S: SessionStore>(
        tree: TocTree,
        root_path: &str,
        location: &str,
        store: S,
    ) -> Sidebar<S> {
        Sidebar::mount(MountConfig {
            root_path: root_path.to_string(),
            tree,
            current_location: location.to_string(),
            store,
        })
    }

    /// Create a test App over an in-memory session
    pub fn create_test_app(
        tree: TocTree,
        root_path: &str,
        location: &str,
    ) -> App<MemorySessionStore> {
        App::new(mount_sidebar(
            tree,
            root_path,
            location,
            MemorySessionStore::new(),
        ))
    }
}
