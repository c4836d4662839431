use crate::session_store::SessionStore;
use log::{debug, error, warn};

/// Session slot holding the sidebar offset between two page views
pub const SCROLL_STATE_KEY: &str = "sidebar-scroll";

/// Where the sidebar should scroll to right after mounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialScroll {
    /// Offset handed over by the previous page
    Restore(usize),
    /// Nothing was handed over: bring this row to the middle of the viewport
    CenterRow(usize),
    Keep,
}

/// Called when a link inside the sidebar is followed
pub fn save_scroll_offset<S: SessionStore + ?Sized>(store: &mut S, offset: usize) {
    match store.set(SCROLL_STATE_KEY, offset.to_string()) {
        Ok(()) => debug!("Saved sidebar scroll offset {offset}"),
        Err(e) => error!("Failed to save sidebar scroll offset: {e}"),
    }
}

/// Consume the handed-over offset. A value that is not a row offset counts
/// as absent.
pub fn take_saved_offset<S: SessionStore + ?Sized>(store: &mut S) -> Option<usize> {
    let raw = store.take(SCROLL_STATE_KEY)?;
    match raw.trim().parse::<usize>() {
        Ok(offset) => Some(offset),
        Err(e) => {
            warn!("Ignoring stored sidebar scroll offset {raw:?}: {e}");
            None
        }
    }
}

pub fn initial_scroll<S: SessionStore + ?Sized>(
    store: &mut S,
    active_row: Option<usize>,
) -> InitialScroll {
    if let Some(offset) = take_saved_offset(store) {
        return InitialScroll::Restore(offset);
    }
    match active_row {
        Some(row) => InitialScroll::CenterRow(row),
        None => InitialScroll::Keep,
    }
}

/// Offset that puts `row` in the middle of `visible_height` rows
pub fn centered_offset(row: usize, visible_height: usize) -> usize {
    row.saturating_sub(visible_height / 2)
}
