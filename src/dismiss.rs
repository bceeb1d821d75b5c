use super::*;

/// How an alert leaves the page once its timer fires.
///
/// Chosen once per install: [`DismissStrategy::Rich`] when the host offers a
/// dismiss controller (and the config allows it), otherwise the alert is
/// hidden with a marker class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissStrategy {
    Rich,
    HideClass(String),
}

impl DismissStrategy {
    pub fn select<P: PageHost>(page: &P, config: &BehaviorConfig) -> Self {
        if config.prefer_rich_dismiss() && page.has_rich_dismiss() {
            Self::Rich
        } else {
            Self::HideClass(config.hidden_class().to_string())
        }
    }

    pub fn dismiss<P: PageHost>(&self, page: &mut P, alert: &P::Node) -> Result<()> {
        match self {
            Self::Rich => {
                // A failing close still counts as dismissed.
                let _ = page.rich_dismiss(alert);
                Ok(())
            }
            Self::HideClass(class_name) => page.class_add(alert, class_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_follows_capability_and_preference() -> Result<()> {
        let mut page = MockPage::from_html("<div class='alert'></div>")?;
        let mut config = BehaviorConfig::default();

        assert_eq!(
            DismissStrategy::select(&page, &config),
            DismissStrategy::HideClass("d-none".into())
        );

        page.set_rich_dismiss_available(true);
        assert_eq!(DismissStrategy::select(&page, &config), DismissStrategy::Rich);

        config.set_prefer_rich_dismiss(false);
        assert_eq!(
            DismissStrategy::select(&page, &config),
            DismissStrategy::HideClass("d-none".into())
        );
        Ok(())
    }

    #[test]
    fn rich_failure_is_swallowed() -> Result<()> {
        let mut page = MockPage::from_html("<div class='alert' id='a'></div>")?;
        page.set_rich_dismiss_available(true);
        page.set_rich_dismiss_failure(Some("boom"));
        let alert = page.select_one("#a")?;

        DismissStrategy::Rich.dismiss(&mut page, &alert)?;
        assert_eq!(page.take_rich_dismiss_calls(), vec![alert]);
        assert!(!page.has_class(alert, "d-none"));
        Ok(())
    }

    #[test]
    fn hide_class_adds_the_marker() -> Result<()> {
        let mut page = MockPage::from_html("<div class='alert' id='a'></div>")?;
        let alert = page.select_one("#a")?;
        DismissStrategy::HideClass("hidden".into()).dismiss(&mut page, &alert)?;
        assert!(page.has_class(alert, "hidden"));
        assert!(page.is_connected(alert));
        Ok(())
    }
}
