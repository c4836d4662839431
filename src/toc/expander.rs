use super::{TocPath, TocTree};
use log::debug;

/// Expand the active entry (when it is a section) and every section above it.
///
/// Nothing outside that chain is touched and nothing is collapsed.
/// Returns how many sections were expanded.
pub fn expand_ancestors(tree: &mut TocTree, active: &TocPath) -> usize {
    let mut expanded = 0;
    for path in std::iter::once(active.clone()).chain(active.ancestors()) {
        if let Some(item) = tree.get_mut(&path) {
            if item.is_container() {
                item.expand();
                expanded += 1;
            }
        }
    }
    debug!("Expanded {expanded} sections leading to {active}");
    expanded
}
