use super::*;

/// The three page behaviors, installed once per page load.
///
/// Each behavior owns its subscriptions and timers; the host delivers events
/// back through [`PageBehaviors::dispatch`] and fired timers through
/// [`PageBehaviors::run_task`].
#[derive(Debug)]
pub struct PageBehaviors<N> {
    alerts: Option<AlertDismisser<N>>,
    confirm: Option<ConfirmGuard>,
    sidebar: Option<SidebarController<N>>,
}

impl<N: Clone + PartialEq + fmt::Debug> PageBehaviors<N> {
    pub fn install<P: PageHost<Node = N>>(page: &mut P, config: &BehaviorConfig) -> Result<Self> {
        config.validate()?;

        let alerts = if config.alerts_enabled() {
            Some(AlertDismisser::arm(page, config)?)
        } else {
            None
        };
        let confirm = if config.confirm_enabled() {
            Some(ConfirmGuard::attach(page, config)?)
        } else {
            None
        };
        let sidebar = if config.sidebar_enabled() {
            SidebarController::mount(page, config)?
        } else {
            None
        };

        debug!(
            alerts = alerts.as_ref().map_or(0, AlertDismisser::pending_count),
            confirm = confirm.is_some(),
            sidebar = sidebar.is_some(),
            "page behaviors installed"
        );
        Ok(Self {
            alerts,
            confirm,
            sidebar,
        })
    }

    pub fn alerts(&self) -> Option<&AlertDismisser<N>> {
        self.alerts.as_ref()
    }

    pub fn confirm_guard(&self) -> Option<&ConfirmGuard> {
        self.confirm.as_ref()
    }

    pub fn sidebar(&self) -> Option<&SidebarController<N>> {
        self.sidebar.as_ref()
    }

    /// Routes `event` to the behavior owning `subscription`.
    ///
    /// Returns `false` when no behavior owns it.
    pub fn dispatch<P: PageHost<Node = N>>(
        &mut self,
        page: &mut P,
        subscription: SubscriptionId,
        event: &mut PageEvent<N>,
    ) -> Result<bool> {
        match event {
            PageEvent::Click(click) => self.handle_click(page, subscription, click),
            PageEvent::Resize => self.handle_resize(page, subscription),
        }
    }

    pub fn handle_click<P: PageHost<Node = N>>(
        &mut self,
        page: &mut P,
        subscription: SubscriptionId,
        event: &mut ClickEvent<N>,
    ) -> Result<bool> {
        if let Some(guard) = &self.confirm {
            if guard.subscription() == Some(subscription) {
                guard.handle_click(page, event)?;
                return Ok(true);
            }
        }
        if let Some(sidebar) = &self.sidebar {
            if sidebar.toggle_subscription() == Some(subscription) {
                sidebar.toggle(page)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn handle_resize<P: PageHost<Node = N>>(
        &mut self,
        page: &mut P,
        subscription: SubscriptionId,
    ) -> Result<bool> {
        match &self.sidebar {
            Some(sidebar) if sidebar.resize_subscription() == Some(subscription) => {
                sidebar.sync_to_viewport(page)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn run_task<P: PageHost<Node = N>>(
        &mut self,
        page: &mut P,
        timer: TimerId,
        task: PageTask<N>,
    ) -> Result<bool> {
        match task {
            PageTask::DismissAlert(_) => match self.alerts.as_mut() {
                Some(alerts) => alerts.fire(page, timer),
                None => Ok(false),
            },
        }
    }

    /// Cancels pending alert timers and drops every subscription. Returns the
    /// number of timers and subscriptions released.
    pub fn teardown<P: PageHost<Node = N>>(&mut self, page: &mut P) -> usize {
        let mut released = 0;
        if let Some(alerts) = self.alerts.as_mut() {
            released += alerts.cancel_all(page);
        }
        if let Some(guard) = self.confirm.as_mut() {
            released += usize::from(guard.detach(page));
        }
        if let Some(sidebar) = self.sidebar.as_mut() {
            released += sidebar.detach(page);
        }
        debug!(released, "page behaviors torn down");
        released
    }
}
