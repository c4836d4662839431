pub mod cli;
pub mod inputs;
pub mod main_app;
pub mod panic_handler;
pub mod parsing;
pub mod scroll_persistence;
pub mod session_store;
pub mod theme;
pub mod toc;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used modules
pub use inputs::event_source;
pub use toc::{TocItem, TocPath, TocTree};
pub use widget::{MountConfig, Sidebar, SidebarAction};
