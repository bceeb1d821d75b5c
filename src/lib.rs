//! Client-side behaviors for server-rendered pages.
//!
//! Three independent behaviors are installed once per page load:
//!
//! - [`AlertDismisser`] hides every `.alert` banner present at install time
//!   after a fixed delay.
//! - [`ConfirmGuard`] asks for confirmation before following a click on any
//!   element carrying `data-confirm`.
//! - [`SidebarController`] collapses and expands the navigation sidebar on
//!   toggle clicks and viewport resizes.
//!
//! The behaviors only talk to a [`PageHost`]. The browser host lives behind
//! the `web` feature; [`MockPage`] and [`Harness`] give a deterministic
//! in-memory page for tests.

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt;

use tracing::{debug, trace};

mod alerts;
mod behaviors;
mod config;
mod confirm;
mod dismiss;
mod event;
mod harness;
mod host;
mod mock;
mod selector;
mod sidebar;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use alerts::AlertDismisser;
pub use behaviors::PageBehaviors;
pub use config::{
    BehaviorConfig, DEFAULT_ALERT_DISMISS_DELAY_MS, DEFAULT_CONFIRM_MESSAGE,
    DEFAULT_NARROW_VIEWPORT_THRESHOLD,
};
pub use confirm::ConfirmGuard;
pub use dismiss::DismissStrategy;
pub use event::{ClickEvent, PageEvent};
pub use harness::{ClickOutcome, Harness, HarnessBuilder};
pub use host::{DismissError, EventKind, ListenTarget, PageHost, PageTask, SubscriptionId, TimerId};
pub use mock::{FormSubmission, MockNode, MockPage, PendingTimer};
pub use sidebar::SidebarController;

use selector::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    InvalidConfig(String),
    Host(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Host(msg) => write!(f, "host error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}
