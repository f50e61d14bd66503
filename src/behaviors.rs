use crate::dom::NodeId;
use crate::notify::Severity;
use crate::page::{EventState, Listener, Page};
use crate::{Error, Result};

const NAVBAR_DEBOUNCE_KEY: &str = "navbar-scroll";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MenuToggle {
        menu: NodeId,
    },
    MenuDismiss {
        menu: NodeId,
        button: NodeId,
    },
    DropdownToggle {
        container_selector: String,
        breakpoint: i64,
    },
    FormBusy {
        busy_label: String,
        restore_ms: i64,
    },
    RestoreSubmit {
        button: NodeId,
        label: String,
    },
    AutosizeTextarea,
    AnchorScroll,
    DebouncedNavbarStyle {
        key: String,
        wait_ms: i64,
        threshold: i64,
        navbar_selector: String,
    },
    NavbarStyle {
        threshold: i64,
        navbar_selector: String,
    },
    DismissFlash {
        node: NodeId,
        fade_ms: i64,
    },
    FadeNotification {
        node: NodeId,
        fade_ms: i64,
    },
    RemoveNode {
        node: NodeId,
    },
    ShowNotification {
        message: String,
        severity: Severity,
    },
    AppendText {
        node: NodeId,
        text: String,
    },
}

impl Page {
    pub(crate) fn run_action(&mut self, action: Action, event: &mut EventState) -> Result<()> {
        match action {
            Action::MenuToggle { menu } => {
                if self.dom.is_connected(menu) {
                    self.dom.class_toggle(menu, "active")?;
                }
                Ok(())
            }
            Action::MenuDismiss { menu, button } => {
                if !self.dom.is_connected(menu) {
                    return Ok(());
                }
                let inside_menu = self.dom.is_descendant_of(event.target, menu);
                let inside_button = self.dom.is_descendant_of(event.target, button);
                if !inside_menu && !inside_button {
                    self.dom.class_remove(menu, "active")?;
                }
                Ok(())
            }
            Action::DropdownToggle {
                container_selector,
                breakpoint,
            } => {
                if self.viewport_width() > breakpoint {
                    return Ok(());
                }
                event.default_prevented = true;
                if let Some(container) =
                    self.dom.closest(event.current_target, &container_selector)?
                {
                    self.dom.class_toggle(container, "open")?;
                }
                Ok(())
            }
            Action::FormBusy {
                busy_label,
                restore_ms,
            } => {
                let form = event.current_target;
                let Some(button) = self
                    .dom
                    .query_selector_from(form, r#"button[type="submit"]"#)?
                else {
                    return Ok(());
                };
                let label = self.dom.text_content(button);
                self.dom.set_text_content(button, &busy_label)?;
                self.dom.set_disabled(button, true)?;
                self.schedule_action(restore_ms, Action::RestoreSubmit { button, label });
                Ok(())
            }
            Action::RestoreSubmit { button, label } => {
                if self.dom.is_connected(button) {
                    self.dom.set_text_content(button, &label)?;
                    self.dom.set_disabled(button, false)?;
                }
                Ok(())
            }
            Action::AutosizeTextarea => {
                let target = event.target;
                self.dom.style_set(target, "height", "auto")?;
                let height = self.scroll_heights.get(&target).copied().unwrap_or(0);
                self.dom.style_set(target, "height", &format!("{height}px"))?;
                Ok(())
            }
            Action::AnchorScroll => {
                event.default_prevented = true;
                let Some(href) = self.dom.attr(event.current_target, "href") else {
                    return Ok(());
                };
                if !href.starts_with('#') || href.len() < 2 {
                    return Ok(());
                }
                if let Some(target) = self.dom.query_selector(&href)? {
                    let top = self.rects.get(&target).map(|r| r.top).unwrap_or(0);
                    self.scroll_to(top)?;
                }
                Ok(())
            }
            Action::DebouncedNavbarStyle {
                key,
                wait_ms,
                threshold,
                navbar_selector,
            } => {
                self.debounce(
                    &key,
                    wait_ms,
                    Action::NavbarStyle {
                        threshold,
                        navbar_selector,
                    },
                );
                Ok(())
            }
            Action::NavbarStyle {
                threshold,
                navbar_selector,
            } => {
                if let Some(navbar) = self.dom.query_selector(&navbar_selector)? {
                    if self.scroll_y() > threshold {
                        self.dom.class_add(navbar, "scrolled")?;
                    } else {
                        self.dom.class_remove(navbar, "scrolled")?;
                    }
                }
                Ok(())
            }
            Action::DismissFlash { node, fade_ms } => {
                if self.dom.is_connected(node) {
                    self.dom.style_set(node, "opacity", "0")?;
                    self.dom.style_set(node, "transform", "translateY(-10px)")?;
                    self.schedule_action(fade_ms, Action::RemoveNode { node });
                }
                Ok(())
            }
            Action::FadeNotification { node, fade_ms } => {
                if self.dom.is_connected(node) {
                    self.dom.style_set(node, "opacity", "0")?;
                    self.dom.style_set(node, "transform", "translateX(100%)")?;
                    self.schedule_action(fade_ms, Action::RemoveNode { node });
                }
                Ok(())
            }
            Action::RemoveNode { node } => {
                if self.dom.is_connected(node) {
                    self.dom.remove_node(node)?;
                }
                Ok(())
            }
            Action::ShowNotification { message, severity } => {
                self.show_notification(&message, severity)
            }
            Action::AppendText { node, text } => {
                let current = self.dom.text_content(node);
                self.dom.set_text_content(node, &format!("{current}{text}"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    pub menu_button_id: String,
    pub menu_id: String,
    pub flash_selector: String,
    pub flash_display_ms: i64,
    pub flash_fade_ms: i64,
    pub dropdown_toggle_selector: String,
    pub dropdown_selector: String,
    pub mobile_breakpoint: i64,
    pub form_selector: String,
    pub busy_label: String,
    pub busy_restore_ms: i64,
    pub navbar_selector: String,
    pub scroll_threshold: i64,
    pub scroll_debounce_ms: i64,
    pub anchor_selector: String,
    pub reveal_selector: String,
    pub reveal_threshold: f64,
    pub reveal_class: String,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            menu_button_id: "mobileMenuBtn".into(),
            menu_id: "navMenu".into(),
            flash_selector: ".flash-message".into(),
            flash_display_ms: 5_000,
            flash_fade_ms: 300,
            dropdown_toggle_selector: ".dropdown-toggle".into(),
            dropdown_selector: ".nav-dropdown".into(),
            mobile_breakpoint: 768,
            form_selector: ".tool-form".into(),
            busy_label: "Generating...".into(),
            busy_restore_ms: 30_000,
            navbar_selector: ".navbar".into(),
            scroll_threshold: 50,
            scroll_debounce_ms: 10,
            anchor_selector: r##"a[href^="#"]"##.into(),
            reveal_selector: ".feature-card, .action-card, .result-card".into(),
            reveal_threshold: 0.1,
            reveal_class: "visible".into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Registration {
    node: NodeId,
    event: String,
    action: Action,
}

#[derive(Debug)]
pub struct Enhancer {
    config: EnhancerConfig,
    registrations: Vec<Registration>,
    attach_timers: Vec<i64>,
    watch_id: Option<i64>,
    attached: bool,
}

impl Enhancer {
    pub fn new(config: EnhancerConfig) -> Self {
        Self {
            config,
            registrations: Vec::new(),
            attach_timers: Vec::new(),
            watch_id: None,
            attached: false,
        }
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach(&mut self, page: &mut Page) -> Result<()> {
        if self.attached {
            return Err(Error::Runtime("enhancer is already attached".into()));
        }

        let menu_button = page.dom.by_id(&self.config.menu_button_id);
        let menu = page.dom.by_id(&self.config.menu_id);
        if let (Some(button), Some(menu)) = (menu_button, menu) {
            self.listen(page, button, "click", Action::MenuToggle { menu });
            let root = page.dom.root;
            self.listen(page, root, "click", Action::MenuDismiss { menu, button });
        }

        for node in page.dom.query_selector_all(&self.config.flash_selector)? {
            let timer = page.schedule_action(
                self.config.flash_display_ms,
                Action::DismissFlash {
                    node,
                    fade_ms: self.config.flash_fade_ms,
                },
            );
            self.attach_timers.push(timer);
        }

        for node in page
            .dom
            .query_selector_all(&self.config.dropdown_toggle_selector)?
        {
            self.listen(
                page,
                node,
                "click",
                Action::DropdownToggle {
                    container_selector: self.config.dropdown_selector.clone(),
                    breakpoint: self.config.mobile_breakpoint,
                },
            );
        }

        for form in page.dom.query_selector_all(&self.config.form_selector)? {
            self.listen(
                page,
                form,
                "submit",
                Action::FormBusy {
                    busy_label: self.config.busy_label.clone(),
                    restore_ms: self.config.busy_restore_ms,
                },
            );
        }

        for node in page.dom.query_selector_all("textarea")? {
            self.listen(page, node, "input", Action::AutosizeTextarea);
        }

        for node in page.dom.query_selector_all(&self.config.anchor_selector)? {
            self.listen(page, node, "click", Action::AnchorScroll);
        }

        let root = page.dom.root;
        self.listen(
            page,
            root,
            "scroll",
            Action::DebouncedNavbarStyle {
                key: NAVBAR_DEBOUNCE_KEY.into(),
                wait_ms: self.config.scroll_debounce_ms,
                threshold: self.config.scroll_threshold,
                navbar_selector: self.config.navbar_selector.clone(),
            },
        );

        let targets = page.dom.query_selector_all(&self.config.reveal_selector)?;
        if !targets.is_empty() {
            self.watch_id = Some(page.add_watch(
                targets,
                self.config.reveal_threshold,
                &self.config.reveal_class,
            )?);
        }

        self.attached = true;
        Ok(())
    }

    pub fn detach(&mut self, page: &mut Page) {
        if !self.attached {
            return;
        }
        for registration in self.registrations.drain(..) {
            page.listeners.remove(
                registration.node,
                &registration.event,
                false,
                &registration.action,
            );
        }
        for timer in self.attach_timers.drain(..) {
            page.clear_timer(timer);
        }
        page.cancel_debounce(NAVBAR_DEBOUNCE_KEY);
        if let Some(watch) = self.watch_id.take() {
            page.remove_watch(watch);
        }
        self.attached = false;
    }

    fn listen(&mut self, page: &mut Page, node: NodeId, event: &str, action: Action) {
        page.listeners.add(
            node,
            event.to_string(),
            Listener {
                capture: false,
                action: action.clone(),
            },
        );
        self.registrations.push(Registration {
            node,
            event: event.to_string(),
            action,
        });
    }
}

pub fn enhance(page: &mut Page) -> Result<Enhancer> {
    let mut enhancer = Enhancer::new(EnhancerConfig::default());
    enhancer.attach(page)?;
    Ok(enhancer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV_FIXTURE: &str = r#"
        <nav class='navbar'>
          <button id='mobileMenuBtn'>menu</button>
          <ul id='navMenu'><li><a href='/'>Home</a></li></ul>
        </nav>
        <main id='content'><p>hello</p></main>
        "#;

    #[test]
    fn menu_button_toggles_and_outside_click_dismisses() -> Result<()> {
        let mut page = Page::from_html(NAV_FIXTURE)?;
        enhance(&mut page)?;

        page.click("#mobileMenuBtn")?;
        page.assert_class("#navMenu", "active", true)?;
        page.click("#mobileMenuBtn")?;
        page.assert_class("#navMenu", "active", false)?;

        page.click("#mobileMenuBtn")?;
        page.assert_class("#navMenu", "active", true)?;
        page.click("#content")?;
        page.assert_class("#navMenu", "active", false)?;
        Ok(())
    }

    #[test]
    fn click_inside_open_menu_keeps_it_open() -> Result<()> {
        let mut page = Page::from_html(NAV_FIXTURE)?;
        enhance(&mut page)?;

        page.click("#mobileMenuBtn")?;
        page.click("#navMenu li")?;
        page.assert_class("#navMenu", "active", true)?;
        Ok(())
    }

    #[test]
    fn enhancing_a_bare_page_is_a_no_op() -> Result<()> {
        let mut page = Page::from_html("<p>nothing to wire</p>")?;
        let enhancer = enhance(&mut page)?;
        assert!(enhancer.is_attached());
        assert!(page.pending_timers().is_empty());
        Ok(())
    }

    #[test]
    fn double_attach_is_rejected() -> Result<()> {
        let mut page = Page::from_html(NAV_FIXTURE)?;
        let mut enhancer = Enhancer::new(EnhancerConfig::default());
        enhancer.attach(&mut page)?;
        let err = enhancer.attach(&mut page).expect_err("second attach");
        assert!(matches!(err, Error::Runtime(_)));
        Ok(())
    }

    #[test]
    fn detached_enhancer_stops_reacting() -> Result<()> {
        let mut page = Page::from_html(NAV_FIXTURE)?;
        let mut enhancer = enhance(&mut page)?;
        enhancer.detach(&mut page);

        page.click("#mobileMenuBtn")?;
        page.assert_class("#navMenu", "active", false)?;
        Ok(())
    }
}
