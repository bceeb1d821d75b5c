use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ListenKey {
    Window,
    Node(MockNode),
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    id: SubscriptionId,
    kind: EventKind,
}

#[derive(Debug, Default)]
struct ListenerStore {
    map: HashMap<ListenKey, Vec<Listener>>,
    keys: HashMap<SubscriptionId, ListenKey>,
    next_id: u64,
}

impl ListenerStore {
    fn add(&mut self, key: ListenKey, kind: EventKind) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.map.entry(key).or_default().push(Listener { id, kind });
        self.keys.insert(id, key);
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(key) = self.keys.remove(&id) else {
            return false;
        };
        if let Some(listeners) = self.map.get_mut(&key) {
            listeners.retain(|listener| listener.id != id);
            if listeners.is_empty() {
                self.map.remove(&key);
            }
        }
        true
    }

    fn get(&self, key: ListenKey, kind: EventKind) -> Vec<SubscriptionId> {
        self.map
            .get(&key)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.kind == kind)
                    .map(|listener| listener.id)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct PlatformMockState {
    inner_width: i64,
    confirm_responses: VecDeque<bool>,
    default_confirm_response: bool,
    confirm_messages: Vec<String>,
    rich_dismiss_available: bool,
    rich_dismiss_failure: Option<String>,
    rich_dismiss_calls: Vec<MockNode>,
    navigations: Vec<String>,
    form_submissions: Vec<FormSubmission>,
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: false,
        }
    }
}

impl TraceState {
    pub(crate) fn push(&mut self, line: String) {
        if self.to_stderr {
            eprintln!("{line}");
        }
        self.logs.push_back(line);
        while self.logs.len() > self.log_limit {
            self.logs.pop_front();
        }
    }
}

/// A form submission that was not prevented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form_id: Option<String>,
    pub action: Option<String>,
    pub submitter_id: Option<String>,
}

/// In-memory page: parsed fixture DOM, listeners, a deterministic clock and
/// scripted answers for the platform dialogs.
#[derive(Debug)]
pub struct MockPage {
    pub(crate) dom: Dom,
    listeners: ListenerStore,
    pub(crate) scheduler: SchedulerState,
    platform_mocks: PlatformMockState,
    pub(crate) trace_state: TraceState,
}

impl MockPage {
    pub const DEFAULT_INNER_WIDTH: i64 = 1280;

    pub fn from_html(html: &str) -> Result<Self> {
        Ok(Self {
            dom: html::parse_html(html)?,
            listeners: ListenerStore::default(),
            scheduler: SchedulerState::default(),
            platform_mocks: PlatformMockState {
                inner_width: Self::DEFAULT_INNER_WIDTH,
                default_confirm_response: true,
                ..PlatformMockState::default()
            },
            trace_state: TraceState::default(),
        })
    }

    pub fn document(&self) -> MockNode {
        self.dom.root
    }

    pub fn select_one(&self, selector: &str) -> Result<MockNode> {
        self.dom
            .query_selector_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<MockNode>> {
        self.dom.query_selector_all(selector)
    }

    /// Parses `html` and appends it to the first element matching `selector`.
    pub fn append_html(&mut self, selector: &str, html: &str) -> Result<Vec<MockNode>> {
        let parent = self.select_one(selector)?;
        html::parse_into(&mut self.dom, parent, html)
    }

    pub fn has_class(&self, node: MockNode, class_name: &str) -> bool {
        self.dom.class_contains(node, class_name)
    }

    pub fn attr(&self, node: MockNode, name: &str) -> Option<String> {
        self.dom.attr(node, name)
    }

    pub fn text_content(&self, node: MockNode) -> String {
        self.dom.text_content(node)
    }

    pub fn is_connected(&self, node: MockNode) -> bool {
        self.dom.is_connected(node)
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let node = self.select_one(selector)?;
        Ok(self.dom.dump_node(node))
    }

    pub fn node_label(&self, node: MockNode) -> String {
        self.dom.node_label(node)
    }

    pub fn set_inner_width(&mut self, width: i64) {
        self.platform_mocks.inner_width = width;
    }

    pub fn enqueue_confirm_response(&mut self, accepted: bool) {
        self.platform_mocks.confirm_responses.push_back(accepted);
    }

    pub fn set_default_confirm_response(&mut self, accepted: bool) {
        self.platform_mocks.default_confirm_response = accepted;
    }

    pub fn take_confirm_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.platform_mocks.confirm_messages)
    }

    /// Makes a rich dismiss controller available to the page.
    pub fn set_rich_dismiss_available(&mut self, available: bool) {
        self.platform_mocks.rich_dismiss_available = available;
    }

    /// When set, every rich `close` call fails with this message and leaves
    /// the element in place.
    pub fn set_rich_dismiss_failure(&mut self, message: Option<&str>) {
        self.platform_mocks.rich_dismiss_failure = message.map(ToOwned::to_owned);
    }

    pub fn take_rich_dismiss_calls(&mut self) -> Vec<MockNode> {
        std::mem::take(&mut self.platform_mocks.rich_dismiss_calls)
    }

    pub fn take_navigations(&mut self) -> Vec<String> {
        std::mem::take(&mut self.platform_mocks.navigations)
    }

    pub fn take_form_submissions(&mut self) -> Vec<FormSubmission> {
        std::mem::take(&mut self.platform_mocks.form_submissions)
    }

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending()
    }

    pub fn subscription_count(&self) -> usize {
        self.listeners.keys.len()
    }

    pub(crate) fn listeners_for(&self, key: ListenKey, kind: EventKind) -> Vec<SubscriptionId> {
        self.listeners.get(key, kind)
    }

    /// Bubble order for an event fired at `target`: the target, its
    /// ancestors up to the document, then the window.
    pub(crate) fn bubble_path(&self, target: MockNode) -> Vec<ListenKey> {
        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(ListenKey::Node(node));
            cursor = self.dom.parent(node);
        }
        if self.dom.is_connected(target) {
            path.push(ListenKey::Window);
        }
        path
    }

    /// Only form controls can be disabled: directly, or through a disabled
    /// `fieldset` ancestor unless the control sits in that fieldset's first
    /// `legend`.
    pub(crate) fn is_disabled(&self, node: MockNode) -> bool {
        if !matches!(
            self.dom.tag_name(node),
            Some("button" | "input" | "select" | "textarea")
        ) {
            return false;
        }
        if self.dom.attr(node, "disabled").is_some() {
            return true;
        }

        let mut child = node;
        let mut cursor = self.dom.parent(node);
        while let Some(ancestor) = cursor {
            if self.dom.tag_name(ancestor) == Some("fieldset")
                && self.dom.attr(ancestor, "disabled").is_some()
                && self.first_legend(ancestor) != Some(child)
            {
                return true;
            }
            child = ancestor;
            cursor = self.dom.parent(ancestor);
        }
        false
    }

    fn first_legend(&self, fieldset: MockNode) -> Option<MockNode> {
        self.dom.nodes[fieldset.0]
            .children
            .iter()
            .copied()
            .find(|child| self.dom.tag_name(*child) == Some("legend"))
    }

    /// Runs the browser's default click action for `target`: follow the
    /// nearest link, or submit the owning form of a submit control.
    pub(crate) fn run_click_default(&mut self, target: MockNode) -> Result<()> {
        if let Some(link) = self.dom.closest(target, "a[href]")? {
            let href = self.dom.attr(link, "href").unwrap_or_default();
            self.platform_mocks.navigations.push(href);
            return Ok(());
        }

        let Some(submitter) = self.dom.closest(target, "button, input")? else {
            return Ok(());
        };
        if !self.is_submit_control(submitter) {
            return Ok(());
        }
        let form = match self.dom.attr(submitter, "form") {
            Some(form_id) => self.dom.by_id(&form_id),
            None => self.dom.closest(submitter, "form")?,
        };
        if let Some(form) = form {
            self.platform_mocks.form_submissions.push(FormSubmission {
                form_id: self.dom.attr(form, "id"),
                action: self.dom.attr(form, "action"),
                submitter_id: self.dom.attr(submitter, "id"),
            });
        }
        Ok(())
    }

    fn is_submit_control(&self, node: MockNode) -> bool {
        let kind = self
            .dom
            .attr(node, "type")
            .unwrap_or_default()
            .to_ascii_lowercase();
        match self.dom.tag_name(node) {
            Some("button") => kind.is_empty() || kind == "submit",
            Some("input") => kind == "submit" || kind == "image",
            _ => false,
        }
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.events {
            self.trace_state.push(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.timers {
            self.trace_state.push(line);
        }
    }
}

impl PageHost for MockPage {
    type Node = MockNode;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<MockNode>> {
        self.dom.query_selector_all(selector)
    }

    fn get_element_by_id(&self, id: &str) -> Option<MockNode> {
        self.dom.by_id(id)
    }

    fn matches_selector(&self, node: &MockNode, selector: &str) -> Result<bool> {
        self.dom.matches_selector(*node, selector)
    }

    fn attribute(&self, node: &MockNode, name: &str) -> Option<String> {
        self.dom.attr(*node, name)
    }

    fn class_contains(&self, node: &MockNode, class_name: &str) -> bool {
        self.dom.class_contains(*node, class_name)
    }

    fn class_add(&mut self, node: &MockNode, class_name: &str) -> Result<()> {
        self.dom.class_add(*node, class_name)
    }

    fn class_remove(&mut self, node: &MockNode, class_name: &str) -> Result<()> {
        self.dom.class_remove(*node, class_name)
    }

    fn inner_width(&self) -> i64 {
        self.platform_mocks.inner_width
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.platform_mocks.confirm_messages.push(message.to_string());
        self.platform_mocks
            .confirm_responses
            .pop_front()
            .unwrap_or(self.platform_mocks.default_confirm_response)
    }

    fn has_rich_dismiss(&self) -> bool {
        self.platform_mocks.rich_dismiss_available
    }

    fn rich_dismiss(&mut self, node: &MockNode) -> std::result::Result<(), DismissError> {
        self.platform_mocks.rich_dismiss_calls.push(*node);
        if let Some(message) = &self.platform_mocks.rich_dismiss_failure {
            return Err(DismissError(message.clone()));
        }
        self.dom
            .remove_node(*node)
            .map_err(|err| DismissError(err.to_string()))
    }

    fn set_timeout(&mut self, delay_ms: i64, task: PageTask<MockNode>) -> Result<TimerId> {
        let id = self.scheduler.schedule(delay_ms, task);
        let now_ms = self.scheduler.now_ms;
        self.trace_timer_line(format!(
            "[timer] schedule id={} delay_ms={delay_ms} now_ms={now_ms}",
            id.0
        ));
        Ok(id)
    }

    fn clear_timeout(&mut self, timer: TimerId) -> bool {
        let cleared = self.scheduler.clear(timer);
        self.trace_timer_line(format!("[timer] clear id={} cleared={cleared}", timer.0));
        cleared
    }

    fn subscribe(&mut self, target: ListenTarget<MockNode>, kind: EventKind) -> Result<SubscriptionId> {
        let key = match target {
            ListenTarget::Window => ListenKey::Window,
            ListenTarget::Document => ListenKey::Node(self.dom.root),
            ListenTarget::Element(node) => {
                if self.dom.element(node).is_none() {
                    return Err(Error::Host(format!(
                        "cannot listen for {} on a non-element node",
                        kind.as_str()
                    )));
                }
                ListenKey::Node(node)
            }
        };
        Ok(self.listeners.add(key, kind))
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.listeners.remove(subscription)
    }
}
