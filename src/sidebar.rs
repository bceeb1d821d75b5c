use super::*;

/// Collapses and expands the navigation sidebar.
///
/// The collapsed marker is always set on the sidebar and the content wrapper
/// together. Below the narrow-viewport threshold the sidebar is an overlay,
/// so expanding also adds the show marker and collapsing removes it.
#[derive(Debug)]
pub struct SidebarController<N> {
    sidebar: N,
    toggle: N,
    wrapper: N,
    collapsed_class: String,
    show_class: String,
    narrow_threshold: i64,
    toggle_subscription: Option<SubscriptionId>,
    resize_subscription: Option<SubscriptionId>,
}

impl<N: Clone + PartialEq + fmt::Debug> SidebarController<N> {
    /// Finds the sidebar, its toggle and the content wrapper, applies the
    /// initial state and subscribes to toggle clicks and window resizes.
    ///
    /// Returns `Ok(None)` when any of the three elements is missing.
    pub fn mount<P: PageHost<Node = N>>(
        page: &mut P,
        config: &BehaviorConfig,
    ) -> Result<Option<Self>> {
        let sidebar = page.get_element_by_id(config.sidebar_id());
        let toggle = page.get_element_by_id(config.sidebar_toggle_id());
        let wrapper = page.query_selector(config.content_wrapper_selector())?;
        let (Some(sidebar), Some(toggle), Some(wrapper)) = (sidebar, toggle, wrapper) else {
            debug!("sidebar markup not found, sidebar controller inert");
            return Ok(None);
        };

        let mut controller = Self {
            sidebar,
            toggle,
            wrapper,
            collapsed_class: config.collapsed_class().to_string(),
            show_class: config.show_class().to_string(),
            narrow_threshold: config.narrow_viewport_threshold(),
            toggle_subscription: None,
            resize_subscription: None,
        };

        let width = page.inner_width();
        if controller.is_narrow(width) {
            controller.set_collapsed(page, true)?;
        }

        controller.toggle_subscription = Some(page.subscribe(
            ListenTarget::Element(controller.toggle.clone()),
            EventKind::Click,
        )?);
        controller.resize_subscription =
            Some(page.subscribe(ListenTarget::Window, EventKind::Resize)?);

        debug!(
            width,
            collapsed = controller.is_collapsed(page),
            "sidebar controller mounted"
        );
        Ok(Some(controller))
    }

    pub fn is_narrow(&self, width: i64) -> bool {
        width < self.narrow_threshold
    }

    pub fn is_collapsed<P: PageHost<Node = N>>(&self, page: &P) -> bool {
        page.class_contains(&self.sidebar, &self.collapsed_class)
    }

    pub fn set_collapsed<P: PageHost<Node = N>>(&self, page: &mut P, collapsed: bool) -> Result<()> {
        let narrow = self.is_narrow(page.inner_width());
        if collapsed {
            page.class_add(&self.sidebar, &self.collapsed_class)?;
            page.class_add(&self.wrapper, &self.collapsed_class)?;
            if narrow {
                page.class_remove(&self.sidebar, &self.show_class)?;
            }
        } else {
            page.class_remove(&self.sidebar, &self.collapsed_class)?;
            page.class_remove(&self.wrapper, &self.collapsed_class)?;
            if narrow {
                page.class_add(&self.sidebar, &self.show_class)?;
            }
        }
        trace!(collapsed, narrow, "sidebar state applied");
        Ok(())
    }

    /// Flips the state read from the sidebar's marker. Returns the new state.
    pub fn toggle<P: PageHost<Node = N>>(&self, page: &mut P) -> Result<bool> {
        let collapsed = !self.is_collapsed(page);
        self.set_collapsed(page, collapsed)?;
        Ok(collapsed)
    }

    /// Forces the state implied by the current viewport width, discarding any
    /// manual toggle.
    pub fn sync_to_viewport<P: PageHost<Node = N>>(&self, page: &mut P) -> Result<bool> {
        let collapsed = self.is_narrow(page.inner_width());
        self.set_collapsed(page, collapsed)?;
        Ok(collapsed)
    }

    pub fn toggle_subscription(&self) -> Option<SubscriptionId> {
        self.toggle_subscription
    }

    pub fn resize_subscription(&self) -> Option<SubscriptionId> {
        self.resize_subscription
    }

    pub fn detach<P: PageHost<Node = N>>(&mut self, page: &mut P) -> usize {
        [self.toggle_subscription.take(), self.resize_subscription.take()]
            .into_iter()
            .flatten()
            .filter(|subscription| page.unsubscribe(*subscription))
            .count()
    }
}
