use super::*;

/// Dismisses every alert present at install time after a fixed delay.
///
/// Each alert gets its own one-shot timer. Alerts inserted later are not
/// tracked.
#[derive(Debug)]
pub struct AlertDismisser<N> {
    strategy: DismissStrategy,
    delay_ms: i64,
    pending: Vec<(TimerId, N)>,
    dismissed: usize,
}

impl<N: Clone + PartialEq + fmt::Debug> AlertDismisser<N> {
    pub fn arm<P: PageHost<Node = N>>(page: &mut P, config: &BehaviorConfig) -> Result<Self> {
        let strategy = DismissStrategy::select(page, config);
        let delay_ms = config.alert_dismiss_delay_ms();
        let alerts = page.query_selector_all(config.alert_selector())?;

        let mut pending = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let timer = page.set_timeout(delay_ms, PageTask::DismissAlert(alert.clone()))?;
            pending.push((timer, alert));
        }

        debug!(
            alerts = pending.len(),
            delay_ms,
            strategy = ?strategy,
            "alert auto-dismiss armed"
        );
        Ok(Self {
            strategy,
            delay_ms,
            pending,
            dismissed: 0,
        })
    }

    /// Handles a fired timer. Returns `false` when `timer` is not one of ours.
    pub fn fire<P: PageHost<Node = N>>(&mut self, page: &mut P, timer: TimerId) -> Result<bool> {
        let Some(idx) = self.pending.iter().position(|(id, _)| *id == timer) else {
            return Ok(false);
        };
        let (_, alert) = self.pending.swap_remove(idx);
        trace!(timer = timer.0, alert = ?alert, "dismissing alert");
        self.strategy.dismiss(page, &alert)?;
        self.dismissed += 1;
        Ok(true)
    }

    /// Cancels every pending dismissal and returns how many were cleared.
    pub fn cancel_all<P: PageHost<Node = N>>(&mut self, page: &mut P) -> usize {
        self.pending
            .drain(..)
            .filter(|(timer, _)| page.clear_timeout(*timer))
            .count()
    }

    pub fn strategy(&self) -> &DismissStrategy {
        &self.strategy
    }

    pub fn delay_ms(&self) -> i64 {
        self.delay_ms
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn dismissed_count(&self) -> usize {
        self.dismissed
    }

    pub fn is_tracking(&self, alert: &N) -> bool {
        self.pending.iter().any(|(_, node)| node == alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ALERTS: &str = "<div class='alert alert-success' id='ok'>Saved</div>\
        <div class='alert alert-danger' id='err'>Failed</div><p class='note'>x</p>";

    fn fire_due(page: &mut MockPage, alerts: &mut AlertDismisser<MockNode>) -> Result<usize> {
        let mut fired = 0;
        while let Some(task) = page.scheduler.take_next(Some(page.scheduler.now_ms), false) {
            if alerts.fire(page, task.id)? {
                fired += 1;
            }
        }
        Ok(fired)
    }

    #[test]
    fn arms_one_timer_per_alert() -> Result<()> {
        let mut page = MockPage::from_html(TWO_ALERTS)?;
        let alerts = AlertDismisser::arm(&mut page, &BehaviorConfig::default())?;
        assert_eq!(alerts.pending_count(), 2);
        let due = page
            .pending_timers()
            .into_iter()
            .map(|timer| timer.due_at)
            .collect::<Vec<_>>();
        assert_eq!(due, vec![5_000, 5_000]);
        Ok(())
    }

    #[test]
    fn fired_timers_hide_alerts_with_the_marker_class() -> Result<()> {
        let mut page = MockPage::from_html(TWO_ALERTS)?;
        let mut alerts = AlertDismisser::arm(&mut page, &BehaviorConfig::default())?;
        let ok = page.select_one("#ok")?;
        let err = page.select_one("#err")?;

        page.scheduler.now_ms = 4_999;
        assert_eq!(fire_due(&mut page, &mut alerts)?, 0);
        assert!(!page.has_class(ok, "d-none"));

        page.scheduler.now_ms = 5_000;
        assert_eq!(fire_due(&mut page, &mut alerts)?, 2);
        assert!(page.has_class(ok, "d-none"));
        assert!(page.has_class(err, "d-none"));
        assert_eq!(alerts.dismissed_count(), 2);
        assert_eq!(alerts.pending_count(), 0);
        Ok(())
    }

    #[test]
    fn tracking_ends_once_an_alert_is_dismissed() -> Result<()> {
        let mut page = MockPage::from_html(TWO_ALERTS)?;
        let mut alerts = AlertDismisser::arm(&mut page, &BehaviorConfig::default())?;
        let ok = page.select_one("#ok")?;
        let note = page.select_one(".note")?;
        assert!(alerts.is_tracking(&ok));
        assert!(!alerts.is_tracking(&note));

        let timer = page.pending_timers()[0].id;
        assert!(alerts.fire(&mut page, timer)?);
        assert!(!alerts.is_tracking(&ok));
        assert!(alerts.is_tracking(&page.select_one("#err")?));
        Ok(())
    }

    #[test]
    fn foreign_timers_are_ignored() -> Result<()> {
        let mut page = MockPage::from_html(TWO_ALERTS)?;
        let mut alerts = AlertDismisser::arm(&mut page, &BehaviorConfig::default())?;
        assert!(!alerts.fire(&mut page, TimerId(999))?);
        assert_eq!(alerts.pending_count(), 2);
        Ok(())
    }

    #[test]
    fn cancel_all_clears_host_timers() -> Result<()> {
        let mut page = MockPage::from_html(TWO_ALERTS)?;
        let mut alerts = AlertDismisser::arm(&mut page, &BehaviorConfig::default())?;
        assert_eq!(alerts.cancel_all(&mut page), 2);
        assert!(page.pending_timers().is_empty());
        assert_eq!(alerts.cancel_all(&mut page), 0);
        Ok(())
    }

    #[test]
    fn page_without_alerts_arms_nothing() -> Result<()> {
        let mut page = MockPage::from_html("<p>nothing to see</p>")?;
        let alerts = AlertDismisser::arm(&mut page, &BehaviorConfig::default())?;
        assert_eq!(alerts.pending_count(), 0);
        assert!(page.pending_timers().is_empty());
        Ok(())
    }
}
