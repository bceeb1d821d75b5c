use super::*;

/// Document-level click guard for elements opting in with `data-confirm`.
///
/// Only the literal click target is checked; an ancestor carrying the
/// attribute does not trigger the prompt.
#[derive(Debug)]
pub struct ConfirmGuard {
    selector: String,
    attribute: String,
    default_message: String,
    subscription: Option<SubscriptionId>,
}

impl ConfirmGuard {
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            selector: config.confirm_selector().to_string(),
            attribute: config.confirm_attribute().to_string(),
            default_message: config.default_confirm_message().to_string(),
            subscription: None,
        }
    }

    /// Creates the guard and registers its single document click listener.
    pub fn attach<P: PageHost>(page: &mut P, config: &BehaviorConfig) -> Result<Self> {
        let mut guard = Self::new(config);
        let subscription = page.subscribe(ListenTarget::Document, EventKind::Click)?;
        guard.subscription = Some(subscription);
        debug!(selector = %guard.selector, "confirm guard attached");
        Ok(guard)
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    /// The prompt to show for a click on `target`, or `None` when the target
    /// has not opted in.
    pub fn prompt_for<P: PageHost>(&self, page: &P, target: &P::Node) -> Result<Option<String>> {
        if !page.matches_selector(target, &self.selector)? {
            return Ok(None);
        }
        let message = page
            .attribute(target, &self.attribute)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.default_message.clone());
        Ok(Some(message))
    }

    pub fn handle_click<P: PageHost>(
        &self,
        page: &mut P,
        event: &mut ClickEvent<P::Node>,
    ) -> Result<()> {
        let Some(message) = self.prompt_for(page, &event.target)? else {
            return Ok(());
        };
        let accepted = page.confirm(&message);
        trace!(accepted, message = %message, "confirm prompt answered");
        if !accepted {
            event.prevent_default();
            event.stop_propagation();
        }
        Ok(())
    }

    pub fn detach<P: PageHost>(&mut self, page: &mut P) -> bool {
        self.subscription
            .take()
            .is_some_and(|subscription| page.unsubscribe(subscription))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKS: &str = "<a id='custom' href='/x' data-confirm='Ștergi comanda?'>delete</a>\
        <a id='empty' href='/y' data-confirm>delete</a>\
        <a id='plain' href='/z'>open</a>\
        <a id='outer' href='/w' data-confirm='outer'><span id='inner'>icon</span></a>";

    #[test]
    fn attach_registers_one_document_listener() -> Result<()> {
        let mut page = MockPage::from_html(LINKS)?;
        let guard = ConfirmGuard::attach(&mut page, &BehaviorConfig::default())?;
        assert!(guard.subscription().is_some());
        assert_eq!(page.subscription_count(), 1);
        Ok(())
    }

    #[test]
    fn prompt_uses_attribute_or_falls_back_to_default() -> Result<()> {
        let page = MockPage::from_html(LINKS)?;
        let guard = ConfirmGuard::new(&BehaviorConfig::default());
        let prompt = |selector: &str| -> Result<Option<String>> {
            guard.prompt_for(&page, &page.select_one(selector)?)
        };
        assert_eq!(prompt("#custom")?.as_deref(), Some("Ștergi comanda?"));
        assert_eq!(prompt("#empty")?.as_deref(), Some(DEFAULT_CONFIRM_MESSAGE));
        assert_eq!(prompt("#plain")?, None);
        assert_eq!(prompt("#inner")?, None);
        Ok(())
    }

    #[test]
    fn declined_prompt_cancels_the_click() -> Result<()> {
        let mut page = MockPage::from_html(LINKS)?;
        let guard = ConfirmGuard::new(&BehaviorConfig::default());
        page.enqueue_confirm_response(false);
        let mut event = ClickEvent::new(page.select_one("#custom")?);
        guard.handle_click(&mut page, &mut event)?;
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
        assert_eq!(page.take_confirm_messages(), vec!["Ștergi comanda?"]);
        Ok(())
    }

    #[test]
    fn accepted_prompt_leaves_the_click_alone() -> Result<()> {
        let mut page = MockPage::from_html(LINKS)?;
        let guard = ConfirmGuard::new(&BehaviorConfig::default());
        page.enqueue_confirm_response(true);
        let mut event = ClickEvent::new(page.select_one("#empty")?);
        guard.handle_click(&mut page, &mut event)?;
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());
        Ok(())
    }

    #[test]
    fn unmarked_targets_never_prompt() -> Result<()> {
        let mut page = MockPage::from_html(LINKS)?;
        let guard = ConfirmGuard::new(&BehaviorConfig::default());
        let mut event = ClickEvent::new(page.select_one("#plain")?);
        guard.handle_click(&mut page, &mut event)?;
        assert!(page.take_confirm_messages().is_empty());
        assert!(!event.default_prevented());
        Ok(())
    }

    #[test]
    fn detach_drops_the_listener_once() -> Result<()> {
        let mut page = MockPage::from_html(LINKS)?;
        let mut guard = ConfirmGuard::attach(&mut page, &BehaviorConfig::default())?;
        assert!(guard.detach(&mut page));
        assert!(!guard.detach(&mut page));
        assert_eq!(page.subscription_count(), 0);
        Ok(())
    }
}
