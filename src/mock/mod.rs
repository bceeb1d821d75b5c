use super::*;

mod dom;
mod html;
mod page;
mod scheduler;

pub(crate) use dom::*;
pub use page::{FormSubmission, MockPage};
pub(crate) use page::ListenKey;
pub use scheduler::PendingTimer;
pub(crate) use scheduler::SchedulerState;

/// Handle to a node of a [`MockPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockNode(pub(crate) usize);
