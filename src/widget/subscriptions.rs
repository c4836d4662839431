use crate::toc::TocPath;

/// User interactions the sidebar reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    LinkClicked(TocPath),
    ToggleClicked(TocPath),
}

impl SidebarEvent {
    pub fn trigger(&self) -> Trigger {
        match self {
            SidebarEvent::LinkClicked(_) => Trigger::LinkClick,
            SidebarEvent::ToggleClicked(_) => Trigger::ToggleClick,
        }
    }

    pub fn path(&self) -> &TocPath {
        match self {
            SidebarEvent::LinkClicked(path) | SidebarEvent::ToggleClicked(path) => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    LinkClick,
    ToggleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Hand the current scroll offset to the next page view
    PersistScrollOffset,
    /// Report the clicked link as the navigation target
    FollowLink,
    /// Flip the expansion state of the clicked section
    FlipExpansion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub trigger: Trigger,
    pub reaction: Reaction,
}

/// Registered reactions, run in registration order
#[derive(Debug, Default, Clone)]
pub struct Subscriptions {
    entries: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wiring every mounted sidebar starts with: a followed link first
    /// saves the scroll offset and only then navigates.
    pub fn sidebar_defaults() -> Self {
        let mut subscriptions = Self::new();
        subscriptions.register(Trigger::LinkClick, Reaction::PersistScrollOffset);
        subscriptions.register(Trigger::LinkClick, Reaction::FollowLink);
        subscriptions.register(Trigger::ToggleClick, Reaction::FlipExpansion);
        subscriptions
    }

    pub fn register(&mut self, trigger: Trigger, reaction: Reaction) {
        self.entries.push(Subscription { trigger, reaction });
    }

    pub fn reactions_for(&self, trigger: Trigger) -> Vec<Reaction> {
        self.entries
            .iter()
            .filter(|entry| entry.trigger == trigger)
            .map(|entry| entry.reaction)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
