use crate::behaviors::Action;
use crate::page::Page;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig {
    pub display_ms: i64,
    pub fade_ms: i64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            display_ms: 3_000,
            fade_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Notifier {
    config: NotifierConfig,
}

impl Notifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> NotifierConfig {
        self.config
    }

    pub fn show(&self, page: &mut Page, message: &str, severity: Severity) -> Result<()> {
        page.show_notification_with(self.config, message, severity)
    }

    pub fn dismiss_all(&self, page: &mut Page) -> Result<usize> {
        page.dismiss_notifications()
    }
}

impl Page {
    pub fn set_notifier_config(&mut self, config: NotifierConfig) {
        self.notifier = config;
    }

    pub fn show_notification(&mut self, message: &str, severity: Severity) -> Result<()> {
        let config = self.notifier;
        self.show_notification_with(config, message, severity)
    }

    pub(crate) fn show_notification_with(
        &mut self,
        config: NotifierConfig,
        message: &str,
        severity: Severity,
    ) -> Result<()> {
        self.dismiss_notifications()?;

        let body = self.dom.body();
        let node = self.dom.create_detached_element("div");
        self.dom.append_child(body, node)?;
        self.dom.set_attr(
            node,
            "class",
            &format!("notification notification-{}", severity.as_str()),
        )?;
        let span = self.dom.create_detached_element("span");
        self.dom.append_child(node, span)?;
        self.dom.set_text_content(span, message)?;

        self.schedule_action(
            config.display_ms,
            Action::FadeNotification {
                node,
                fade_ms: config.fade_ms,
            },
        );
        self.trace_line(format!(
            "[notify] show severity={} message={message}",
            severity.as_str()
        ));
        Ok(())
    }

    pub fn dismiss_notifications(&mut self) -> Result<usize> {
        let existing = self.dom.query_selector_all(".notification")?;
        let count = existing.len();
        for node in existing {
            self.dom.remove_node(node)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_builds_severity_tagged_markup() -> Result<()> {
        let mut page = Page::from_html("<body></body>")?;
        page.show_notification("Saved!", Severity::Success)?;
        page.assert_exists(".notification.notification-success")?;
        page.assert_text(".notification span", "Saved!")?;
        Ok(())
    }

    #[test]
    fn new_notification_evicts_the_previous_one_immediately() -> Result<()> {
        let mut page = Page::from_html("<body></body>")?;
        page.show_notification("first", Severity::Info)?;
        page.show_notification("second", Severity::Error)?;
        assert_eq!(page.count(".notification")?, 1);
        page.assert_text(".notification span", "second")?;
        Ok(())
    }

    #[test]
    fn notification_fades_then_is_removed() -> Result<()> {
        let mut page = Page::from_html("<body></body>")?;
        page.show_notification("bye", Severity::Success)?;

        page.advance_time(3_000)?;
        assert_eq!(page.count(".notification")?, 1);
        assert_eq!(page.style(".notification", "opacity")?, "0");
        assert_eq!(page.style(".notification", "transform")?, "translateX(100%)");

        page.advance_time(300)?;
        assert_eq!(page.count(".notification")?, 0);
        Ok(())
    }

    #[test]
    fn custom_config_controls_the_display_window() -> Result<()> {
        let mut page = Page::from_html("<body></body>")?;
        let notifier = Notifier::new(NotifierConfig {
            display_ms: 100,
            fade_ms: 10,
        });
        notifier.show(&mut page, "quick", Severity::Warning)?;
        page.advance_time(99)?;
        assert_eq!(page.style(".notification", "opacity")?, "");
        page.advance_time(11)?;
        assert_eq!(page.count(".notification")?, 1);
        page.advance_time(10)?;
        assert_eq!(page.count(".notification")?, 0);
        Ok(())
    }
}
