pub mod markup;
pub mod sidebar;
pub mod subscriptions;

pub use markup::{render_scrollbox_html, render_sidebar_html};
pub use sidebar::{MountConfig, SIDEBAR_ELEMENT_NAME, Sidebar, SidebarAction};
pub use subscriptions::{Reaction, SidebarEvent, Subscription, Subscriptions, Trigger};
