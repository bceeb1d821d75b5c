use super::*;
use crate::mock::ListenKey;

/// What happened to the last click dispatched by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

/// Page setup applied before the behaviors are installed.
#[derive(Debug, Clone)]
pub struct HarnessBuilder {
    html: String,
    config: BehaviorConfig,
    inner_width: i64,
    rich_dismiss: bool,
    rich_dismiss_failure: Option<String>,
}

impl HarnessBuilder {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            config: BehaviorConfig::default(),
            inner_width: MockPage::DEFAULT_INNER_WIDTH,
            rich_dismiss: false,
            rich_dismiss_failure: None,
        }
    }

    pub fn config(mut self, config: BehaviorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn inner_width(mut self, width: i64) -> Self {
        self.inner_width = width;
        self
    }

    pub fn rich_dismiss(mut self, available: bool) -> Self {
        self.rich_dismiss = available;
        self
    }

    pub fn rich_dismiss_failure(mut self, message: &str) -> Self {
        self.rich_dismiss = true;
        self.rich_dismiss_failure = Some(message.to_string());
        self
    }

    pub fn build(self) -> Result<Harness> {
        let mut page = MockPage::from_html(&self.html)?;
        page.set_inner_width(self.inner_width);
        page.set_rich_dismiss_available(self.rich_dismiss);
        page.set_rich_dismiss_failure(self.rich_dismiss_failure.as_deref());
        let behaviors = PageBehaviors::install(&mut page, &self.config)?;
        Ok(Harness {
            page,
            behaviors,
            observers: HashMap::new(),
            observed_clicks: Vec::new(),
            last_click: None,
        })
    }
}

/// Drives a [`MockPage`] with [`PageBehaviors`] installed: user actions,
/// viewport changes and a deterministic clock.
#[derive(Debug)]
pub struct Harness {
    page: MockPage,
    behaviors: PageBehaviors<MockNode>,
    observers: HashMap<SubscriptionId, String>,
    observed_clicks: Vec<String>,
    last_click: Option<ClickOutcome>,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        HarnessBuilder::new(html).build()
    }

    pub fn from_html_with_config(html: &str, config: BehaviorConfig) -> Result<Self> {
        HarnessBuilder::new(html).config(config).build()
    }

    pub fn builder(html: &str) -> HarnessBuilder {
        HarnessBuilder::new(html)
    }

    pub fn page(&self) -> &MockPage {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut MockPage {
        &mut self.page
    }

    pub fn behaviors(&self) -> &PageBehaviors<MockNode> {
        &self.behaviors
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.page.trace_state.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.page.trace_state.logs.drain(..).collect()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.page.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.page.trace_state.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.page.trace_state.timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        let trace = &mut self.page.trace_state;
        trace.log_limit = max_entries;
        while trace.logs.len() > trace.log_limit {
            trace.logs.pop_front();
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::InvalidConfig(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.page.scheduler.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn enqueue_confirm_response(&mut self, accepted: bool) {
        self.page.enqueue_confirm_response(accepted);
    }

    pub fn set_default_confirm_response(&mut self, accepted: bool) {
        self.page.set_default_confirm_response(accepted);
    }

    pub fn take_confirm_messages(&mut self) -> Vec<String> {
        self.page.take_confirm_messages()
    }

    pub fn take_rich_dismiss_calls(&mut self) -> Vec<String> {
        self.page
            .take_rich_dismiss_calls()
            .into_iter()
            .map(|node| self.page.node_label(node))
            .collect()
    }

    pub fn take_navigations(&mut self) -> Vec<String> {
        self.page.take_navigations()
    }

    pub fn take_form_submissions(&mut self) -> Vec<FormSubmission> {
        self.page.take_form_submissions()
    }

    /// Records every click that bubbles up to the first element matching
    /// `selector`, or to the window for `"window"`.
    pub fn observe_clicks(&mut self, selector: &str) -> Result<()> {
        let target = if selector == "window" {
            ListenTarget::Window
        } else {
            ListenTarget::Element(self.page.select_one(selector)?)
        };
        let subscription = self.page.subscribe(target, EventKind::Click)?;
        self.observers.insert(subscription, selector.to_string());
        Ok(())
    }

    pub fn take_observed_clicks(&mut self) -> Vec<String> {
        std::mem::take(&mut self.observed_clicks)
    }

    pub fn last_click(&self) -> Option<ClickOutcome> {
        self.last_click
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.page.select_one(selector)?;
        if self.page.is_disabled(target) {
            return Ok(());
        }

        let outcome = self.dispatch_click(target)?;
        self.last_click = Some(outcome);
        if !outcome.default_prevented {
            self.page.run_click_default(target)?;
        }
        Ok(())
    }

    fn dispatch_click(&mut self, target: MockNode) -> Result<ClickOutcome> {
        let mut event = ClickEvent::new(target);
        for key in self.page.bubble_path(target) {
            for subscription in self.page.listeners_for(key, EventKind::Click) {
                let handled = self
                    .behaviors
                    .handle_click(&mut self.page, subscription, &mut event)?;
                if !handled {
                    if let Some(label) = self.observers.get(&subscription) {
                        self.observed_clicks.push(label.clone());
                    }
                }
            }
            // Remaining listeners on the current node still run.
            if event.propagation_stopped() {
                break;
            }
        }

        let outcome = ClickOutcome {
            default_prevented: event.default_prevented(),
            propagation_stopped: event.propagation_stopped(),
        };
        let label = self.page.node_label(target);
        self.page.trace_event_line(format!(
            "[event] click target={label} default_prevented={} propagation_stopped={}",
            outcome.default_prevented, outcome.propagation_stopped
        ));
        Ok(outcome)
    }

    /// Changes the viewport width and fires `resize` on the window.
    pub fn resize(&mut self, width: i64) -> Result<()> {
        self.page.set_inner_width(width);
        for subscription in self.page.listeners_for(ListenKey::Window, EventKind::Resize) {
            self.behaviors.handle_resize(&mut self.page, subscription)?;
        }
        self.page
            .trace_event_line(format!("[event] resize inner_width={width}"));
        Ok(())
    }

    /// Appends markup after install; the behaviors do not see it.
    pub fn append_html(&mut self, selector: &str, html: &str) -> Result<()> {
        self.page.append_html(selector, html)?;
        Ok(())
    }

    pub fn teardown(&mut self) -> usize {
        self.behaviors.teardown(&mut self.page)
    }

    pub fn now_ms(&self) -> i64 {
        self.page.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.page.pending_timers()
    }

    pub fn clear_timer(&mut self, timer: TimerId) -> bool {
        self.page.clear_timeout(timer)
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::InvalidConfig(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.page.scheduler.now_ms;
        let to = from.saturating_add(delta_ms);
        self.page.scheduler.now_ms = to;
        let ran = self.run_timer_queue(Some(to), false)?;
        self.page.trace_timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={to} ran_due={ran}"
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let now_ms = self.page.scheduler.now_ms;
        if target_ms < now_ms {
            return Err(Error::InvalidConfig(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={now_ms})"
            )));
        }
        self.advance_time(target_ms - now_ms)
    }

    /// Runs every queued timer, moving the clock forward as needed.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.page.scheduler.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        let to = self.page.scheduler.now_ms;
        self.page
            .trace_timer_line(format!("[timer] flush from={from} to={to} ran={ran}"));
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let now_ms = self.page.scheduler.now_ms;
        self.run_timer_queue(Some(now_ms), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let limit = self.page.scheduler.timer_step_limit;
        let mut steps = 0usize;
        while let Some(task) = self.page.scheduler.take_next(due_limit, advance_clock) {
            steps += 1;
            if steps > limit {
                return Err(Error::Host(format!(
                    "flush exceeded max task steps (limit={limit}, due_limit={due_limit:?})"
                )));
            }
            self.page.trace_timer_line(format!(
                "[timer] run id={} due_at={} now_ms={}",
                task.id.0, task.due_at, self.page.scheduler.now_ms
            ));
            self.behaviors.run_task(&mut self.page, task.id, task.task)?;
        }
        Ok(steps)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let node = self.page.select_one(selector)?;
        Ok(self.page.has_class(node, class_name))
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let node = self.page.select_one(selector)?;
        let actual = self.page.has_class(node, class_name);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("has_class({class_name})={expected}"),
                actual: format!("has_class({class_name})={actual}"),
                dom_snippet: self.page.dom.dump_node(node),
            });
        }
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.page.select_one(selector)?;
        let actual = self.page.text_content(node);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.page.dom.dump_node(node),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.page.select_one(selector).map(|_| ())
    }

    pub fn assert_missing(&self, selector: &str) -> Result<()> {
        let found = self.page.select_all(selector)?;
        if let Some(node) = found.first() {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "no match".into(),
                actual: format!("{} match(es)", found.len()),
                dom_snippet: self.page.dom.dump_node(*node),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        self.page.dump_dom(selector)
    }
}
