use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Resize,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Resize => "resize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenTarget<N> {
    Window,
    Document,
    Element(N),
}

/// Work handed to [`PageHost::set_timeout`] and given back to
/// [`PageBehaviors::run_task`] when the timer fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTask<N> {
    DismissAlert(N),
}

/// Raised by a rich dismiss controller whose `close` failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissError(pub String);

impl fmt::Display for DismissError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dismiss failed: {}", self.0)
    }
}

impl StdError for DismissError {}

/// The page surface the behaviors run against.
///
/// Implementations own the event loop: they deliver clicks and resizes for
/// every [`SubscriptionId`] handed out by [`PageHost::subscribe`], and give
/// back each [`PageTask`] when its timer fires.
pub trait PageHost {
    type Node: Clone + PartialEq + fmt::Debug;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn matches_selector(&self, node: &Self::Node, selector: &str) -> Result<bool>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn class_contains(&self, node: &Self::Node, class_name: &str) -> bool;

    fn class_add(&mut self, node: &Self::Node, class_name: &str) -> Result<()>;

    fn class_remove(&mut self, node: &Self::Node, class_name: &str) -> Result<()>;

    /// Viewport width in CSS pixels (`window.innerWidth`).
    fn inner_width(&self) -> i64;

    /// Blocking confirmation dialog. `true` when the user accepted.
    fn confirm(&mut self, message: &str) -> bool;

    fn has_rich_dismiss(&self) -> bool;

    fn rich_dismiss(&mut self, node: &Self::Node) -> std::result::Result<(), DismissError>;

    fn set_timeout(&mut self, delay_ms: i64, task: PageTask<Self::Node>) -> Result<TimerId>;

    fn clear_timeout(&mut self, timer: TimerId) -> bool;

    fn subscribe(
        &mut self,
        target: ListenTarget<Self::Node>,
        kind: EventKind,
    ) -> Result<SubscriptionId>;

    fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool;
}
