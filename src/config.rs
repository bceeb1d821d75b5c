use super::*;

pub const DEFAULT_ALERT_DISMISS_DELAY_MS: i64 = 5_000;
pub const DEFAULT_NARROW_VIEWPORT_THRESHOLD: i64 = 992;
pub const DEFAULT_CONFIRM_MESSAGE: &str = "Ești sigur?";

/// Selectors, marker classes and constants consumed by the behaviors.
///
/// `Default` matches the markup rendered by the application templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorConfig {
    pub(crate) alerts_enabled: bool,
    pub(crate) confirm_enabled: bool,
    pub(crate) sidebar_enabled: bool,
    pub(crate) alert_selector: String,
    pub(crate) alert_dismiss_delay_ms: i64,
    pub(crate) hidden_class: String,
    pub(crate) prefer_rich_dismiss: bool,
    pub(crate) confirm_selector: String,
    pub(crate) confirm_attribute: String,
    pub(crate) default_confirm_message: String,
    pub(crate) sidebar_id: String,
    pub(crate) sidebar_toggle_id: String,
    pub(crate) content_wrapper_selector: String,
    pub(crate) collapsed_class: String,
    pub(crate) show_class: String,
    pub(crate) narrow_viewport_threshold: i64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            confirm_enabled: true,
            sidebar_enabled: true,
            alert_selector: ".alert".to_string(),
            alert_dismiss_delay_ms: DEFAULT_ALERT_DISMISS_DELAY_MS,
            hidden_class: "d-none".to_string(),
            prefer_rich_dismiss: true,
            confirm_selector: "[data-confirm]".to_string(),
            confirm_attribute: "data-confirm".to_string(),
            default_confirm_message: DEFAULT_CONFIRM_MESSAGE.to_string(),
            sidebar_id: "sidebar".to_string(),
            sidebar_toggle_id: "sidebarToggle".to_string(),
            content_wrapper_selector: ".content-wrapper".to_string(),
            collapsed_class: "collapsed".to_string(),
            show_class: "show".to_string(),
            narrow_viewport_threshold: DEFAULT_NARROW_VIEWPORT_THRESHOLD,
        }
    }
}

impl BehaviorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts_enabled(&self) -> bool {
        self.alerts_enabled
    }

    pub fn confirm_enabled(&self) -> bool {
        self.confirm_enabled
    }

    pub fn sidebar_enabled(&self) -> bool {
        self.sidebar_enabled
    }

    pub fn alert_selector(&self) -> &str {
        &self.alert_selector
    }

    pub fn alert_dismiss_delay_ms(&self) -> i64 {
        self.alert_dismiss_delay_ms
    }

    pub fn hidden_class(&self) -> &str {
        &self.hidden_class
    }

    pub fn prefer_rich_dismiss(&self) -> bool {
        self.prefer_rich_dismiss
    }

    pub fn confirm_selector(&self) -> &str {
        &self.confirm_selector
    }

    pub fn confirm_attribute(&self) -> &str {
        &self.confirm_attribute
    }

    pub fn default_confirm_message(&self) -> &str {
        &self.default_confirm_message
    }

    pub fn sidebar_id(&self) -> &str {
        &self.sidebar_id
    }

    pub fn sidebar_toggle_id(&self) -> &str {
        &self.sidebar_toggle_id
    }

    pub fn content_wrapper_selector(&self) -> &str {
        &self.content_wrapper_selector
    }

    pub fn collapsed_class(&self) -> &str {
        &self.collapsed_class
    }

    pub fn show_class(&self) -> &str {
        &self.show_class
    }

    pub fn narrow_viewport_threshold(&self) -> i64 {
        self.narrow_viewport_threshold
    }

    pub fn set_alerts_enabled(&mut self, enabled: bool) -> &mut Self {
        self.alerts_enabled = enabled;
        self
    }

    pub fn set_confirm_enabled(&mut self, enabled: bool) -> &mut Self {
        self.confirm_enabled = enabled;
        self
    }

    pub fn set_sidebar_enabled(&mut self, enabled: bool) -> &mut Self {
        self.sidebar_enabled = enabled;
        self
    }

    pub fn set_prefer_rich_dismiss(&mut self, prefer: bool) -> &mut Self {
        self.prefer_rich_dismiss = prefer;
        self
    }

    pub fn set_alert_selector(&mut self, selector: &str) -> Result<&mut Self> {
        self.alert_selector = checked_selector("alert_selector", selector)?;
        Ok(self)
    }

    pub fn set_alert_dismiss_delay_ms(&mut self, delay_ms: i64) -> Result<&mut Self> {
        if delay_ms < 0 {
            return Err(Error::InvalidConfig(
                "alert_dismiss_delay_ms requires non-negative milliseconds".into(),
            ));
        }
        self.alert_dismiss_delay_ms = delay_ms;
        Ok(self)
    }

    pub fn set_hidden_class(&mut self, class_name: &str) -> Result<&mut Self> {
        self.hidden_class = checked_class_name("hidden_class", class_name)?;
        Ok(self)
    }

    pub fn set_confirm_selector(&mut self, selector: &str) -> Result<&mut Self> {
        self.confirm_selector = checked_selector("confirm_selector", selector)?;
        Ok(self)
    }

    pub fn set_confirm_attribute(&mut self, name: &str) -> Result<&mut Self> {
        self.confirm_attribute = checked_class_name("confirm_attribute", name)?;
        Ok(self)
    }

    pub fn set_default_confirm_message(&mut self, message: &str) -> Result<&mut Self> {
        if message.is_empty() {
            return Err(Error::InvalidConfig(
                "default_confirm_message must not be empty".into(),
            ));
        }
        self.default_confirm_message = message.to_string();
        Ok(self)
    }

    pub fn set_sidebar_id(&mut self, id: &str) -> Result<&mut Self> {
        self.sidebar_id = checked_class_name("sidebar_id", id)?;
        Ok(self)
    }

    pub fn set_sidebar_toggle_id(&mut self, id: &str) -> Result<&mut Self> {
        self.sidebar_toggle_id = checked_class_name("sidebar_toggle_id", id)?;
        Ok(self)
    }

    pub fn set_content_wrapper_selector(&mut self, selector: &str) -> Result<&mut Self> {
        self.content_wrapper_selector = checked_selector("content_wrapper_selector", selector)?;
        Ok(self)
    }

    pub fn set_collapsed_class(&mut self, class_name: &str) -> Result<&mut Self> {
        self.collapsed_class = checked_class_name("collapsed_class", class_name)?;
        Ok(self)
    }

    pub fn set_show_class(&mut self, class_name: &str) -> Result<&mut Self> {
        self.show_class = checked_class_name("show_class", class_name)?;
        Ok(self)
    }

    pub fn set_narrow_viewport_threshold(&mut self, width: i64) -> Result<&mut Self> {
        if width <= 0 {
            return Err(Error::InvalidConfig(
                "narrow_viewport_threshold requires a positive width".into(),
            ));
        }
        self.narrow_viewport_threshold = width;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        checked_selector("alert_selector", &self.alert_selector)?;
        checked_selector("confirm_selector", &self.confirm_selector)?;
        checked_selector("content_wrapper_selector", &self.content_wrapper_selector)?;
        checked_class_name("hidden_class", &self.hidden_class)?;
        checked_class_name("confirm_attribute", &self.confirm_attribute)?;
        checked_class_name("sidebar_id", &self.sidebar_id)?;
        checked_class_name("sidebar_toggle_id", &self.sidebar_toggle_id)?;
        checked_class_name("collapsed_class", &self.collapsed_class)?;
        checked_class_name("show_class", &self.show_class)?;
        if self.alert_dismiss_delay_ms < 0 {
            return Err(Error::InvalidConfig(
                "alert_dismiss_delay_ms requires non-negative milliseconds".into(),
            ));
        }
        if self.narrow_viewport_threshold <= 0 {
            return Err(Error::InvalidConfig(
                "narrow_viewport_threshold requires a positive width".into(),
            ));
        }
        if self.default_confirm_message.is_empty() {
            return Err(Error::InvalidConfig(
                "default_confirm_message must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn checked_selector(field: &str, selector: &str) -> Result<String> {
    parse_selector_groups(selector).map_err(|err| match err {
        Error::UnsupportedSelector(selector) => {
            Error::InvalidConfig(format!("{field}: unsupported selector `{selector}`"))
        }
        other => other,
    })?;
    Ok(selector.to_string())
}

fn checked_class_name(field: &str, token: &str) -> Result<String> {
    if token.is_empty() || token.chars().any(|ch| ch.is_ascii_whitespace()) {
        return Err(Error::InvalidConfig(format!(
            "{field} must be a single non-empty token, got `{token}`"
        )));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_rendered_markup() {
        let config = BehaviorConfig::default();
        assert_eq!(config.alert_selector(), ".alert");
        assert_eq!(config.alert_dismiss_delay_ms(), 5_000);
        assert_eq!(config.confirm_attribute(), "data-confirm");
        assert_eq!(config.default_confirm_message(), "Ești sigur?");
        assert_eq!(config.narrow_viewport_threshold(), 992);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters_reject_invalid_values() {
        let mut config = BehaviorConfig::default();
        assert!(matches!(
            config.set_alert_dismiss_delay_ms(-1),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            config.set_narrow_viewport_threshold(0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            config.set_collapsed_class("is collapsed"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            config.set_alert_selector(""),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            config.set_default_confirm_message(""),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(config, BehaviorConfig::default());
    }

    #[test]
    fn selector_setters_reject_unsupported_syntax() {
        let setters: [(&str, for<'a, 'b> fn(&'a mut BehaviorConfig, &'b str) -> Result<&'a mut BehaviorConfig>); 3] = [
            ("alert_selector", BehaviorConfig::set_alert_selector),
            ("confirm_selector", BehaviorConfig::set_confirm_selector),
            ("content_wrapper_selector", BehaviorConfig::set_content_wrapper_selector),
        ];
        for (field, setter) in setters {
            for selector in ["", "a:hover", "a + b", "[data-x"] {
                let mut config = BehaviorConfig::new();
                match setter(&mut config, selector) {
                    Err(Error::InvalidConfig(message)) => {
                        assert!(message.starts_with(field), "{message}")
                    }
                    other => panic!("{field} accepted {selector:?}: {other:?}"),
                }
                assert_eq!(config, BehaviorConfig::default());
            }
        }
    }

    #[test]
    fn token_setters_reject_empty_or_spaced_names() {
        let setters: [(&str, for<'a, 'b> fn(&'a mut BehaviorConfig, &'b str) -> Result<&'a mut BehaviorConfig>); 6] = [
            ("confirm_attribute", BehaviorConfig::set_confirm_attribute),
            ("sidebar_id", BehaviorConfig::set_sidebar_id),
            ("sidebar_toggle_id", BehaviorConfig::set_sidebar_toggle_id),
            ("show_class", BehaviorConfig::set_show_class),
            ("hidden_class", BehaviorConfig::set_hidden_class),
            ("collapsed_class", BehaviorConfig::set_collapsed_class),
        ];
        for (field, setter) in setters {
            for token in ["", "two words", "tab\there"] {
                let mut config = BehaviorConfig::new();
                match setter(&mut config, token) {
                    Err(Error::InvalidConfig(message)) => {
                        assert!(message.starts_with(field), "{message}")
                    }
                    other => panic!("{field} accepted {token:?}: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn markup_setters_store_their_values() -> Result<()> {
        let mut config = BehaviorConfig::new();
        config
            .set_confirm_selector("[data-ask]")?
            .set_confirm_attribute("data-ask")?
            .set_sidebar_id("nav")?
            .set_sidebar_toggle_id("burger")?
            .set_content_wrapper_selector("main.page")?
            .set_show_class("open")?;
        assert_eq!(config.confirm_selector(), "[data-ask]");
        assert_eq!(config.confirm_attribute(), "data-ask");
        assert_eq!(config.sidebar_id(), "nav");
        assert_eq!(config.sidebar_toggle_id(), "burger");
        assert_eq!(config.content_wrapper_selector(), "main.page");
        assert_eq!(config.show_class(), "open");
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn setters_chain() -> Result<()> {
        let mut config = BehaviorConfig::default();
        config
            .set_alert_dismiss_delay_ms(250)?
            .set_hidden_class("hidden")?
            .set_prefer_rich_dismiss(false);
        assert_eq!(config.alert_dismiss_delay_ms(), 250);
        assert_eq!(config.hidden_class(), "hidden");
        assert!(!config.prefer_rich_dismiss());
        Ok(())
    }

    #[test]
    fn validate_catches_fields_set_inside_the_crate() {
        let config = BehaviorConfig {
            show_class: String::new(),
            ..BehaviorConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
