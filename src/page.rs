use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::behaviors::Action;
use crate::counter::CounterStep;
use crate::dom::{Dom, NodeId};
use crate::html::parse_html;
use crate::notify::{NotifierConfig, Severity};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) action: Action,
}

#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: String, listener: Listener) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(listener);
    }

    pub(crate) fn remove(
        &mut self,
        node_id: NodeId,
        event: &str,
        capture: bool,
        action: &Action,
    ) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        if let Some(pos) = listeners
            .iter()
            .position(|listener| listener.capture == capture && listener.action == *action)
        {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(event);
            }
            if events.is_empty() {
                self.map.remove(&node_id);
            }
            return true;
        }

        false
    }

    fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
}

impl EventState {
    fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: i64,
    due_at: i64,
    order: i64,
    action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FrameAction {
    Counter(CounterStep),
}

#[derive(Debug, Clone)]
struct FrameTask {
    id: i64,
    order: i64,
    action: FrameAction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub top: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Async,
    Fallback,
}

#[derive(Debug, Clone)]
struct Watch {
    id: i64,
    targets: Vec<NodeId>,
    threshold: f64,
    class: String,
}

pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    task_queue: Vec<ScheduledTask>,
    frame_queue: Vec<FrameTask>,
    now_ms: i64,
    timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
    next_frame_id: i64,
    next_watch_id: i64,
    pub(crate) debounce_pending: HashMap<String, i64>,
    watches: Vec<Watch>,
    pub(crate) viewport_width: i64,
    viewport_height: i64,
    scroll_y: i64,
    pub(crate) rects: HashMap<NodeId, Rect>,
    pub(crate) scroll_heights: HashMap<NodeId, i64>,
    clipboard_mode: ClipboardMode,
    clipboard_text: Option<String>,
    last_copy_path: Option<CopyPath>,
    pub(crate) notifier: NotifierConfig,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            task_queue: Vec::new(),
            frame_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
            next_frame_id: 1,
            next_watch_id: 1,
            debounce_pending: HashMap::new(),
            watches: Vec::new(),
            viewport_width: 1280,
            viewport_height: 800,
            scroll_y: 0,
            rects: HashMap::new(),
            scroll_heights: HashMap::new(),
            clipboard_mode: ClipboardMode::Granted,
            clipboard_text: None,
            last_copy_path: None,
            notifier: NotifierConfig::default(),
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        })
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Runtime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let click_outcome = self.dispatch_event(target, "click")?;
        if click_outcome.default_prevented {
            return Ok(());
        }

        if self.is_submit_control(target) {
            if let Some(form) = self.form_owner(target) {
                self.dispatch_event(form, "submit")?;
            }
        }

        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.form_owner(target)
        };

        if let Some(form_id) = form {
            self.dispatch_event(form_id, "submit")?;
        }

        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn schedule_action(&mut self, delay_ms: i64, action: Action) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            action,
        });
        self.trace_timer_line(format!("[timer] schedule id={id} due_at={due_at}"));
        id
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        let existed = self.task_queue.len() != before;
        if existed {
            self.trace_timer_line(format!("[timer] clear id={timer_id}"));
        }
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers()?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        self.now_ms = target_ms;
        let ran = self.run_due_timers()?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.now_ms, ran
        ));
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.now_ms, ran
        ));
        Ok(())
    }

    fn run_due_timers(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.now_ms), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.timer_step_limit {
                return Err(self.timer_step_limit_error(self.timer_step_limit, steps, due_limit));
            }
            let task = self.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn timer_step_limit_error(
        &self,
        max_steps: usize,
        steps: usize,
        due_limit: Option<i64>,
    ) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        Error::Runtime(format!(
            "flush exceeded max task steps (possible self-rescheduling action): limit={max_steps}, steps={steps}, now_ms={}, due_limit={}, pending_tasks={}",
            self.now_ms,
            due_limit_desc,
            self.task_queue.len()
        ))
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                if let Some(limit) = due_limit {
                    task.due_at <= limit
                } else {
                    true
                }
            })
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} now_ms={}",
            task.id, task.due_at, self.now_ms
        ));
        let mut event = EventState::new("timeout", self.dom.root);
        self.run_action(task.action, &mut event)
    }

    pub(crate) fn request_frame(&mut self, action: FrameAction) -> i64 {
        let id = self.next_frame_id;
        self.next_frame_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.frame_queue.push(FrameTask { id, order, action });
        self.trace_timer_line(format!("[frame] schedule id={id}"));
        id
    }

    pub fn cancel_frame(&mut self, frame_id: i64) -> bool {
        let before = self.frame_queue.len();
        self.frame_queue.retain(|task| task.id != frame_id);
        before != self.frame_queue.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frame_queue.len()
    }

    pub fn run_frame(&mut self, delta_ms: i64) -> Result<()> {
        self.advance_time(delta_ms)?;
        let mut batch = std::mem::take(&mut self.frame_queue);
        batch.sort_by_key(|task| task.order);
        let timestamp = self.now_ms;
        for task in batch {
            self.trace_timer_line(format!("[frame] run id={} ts={timestamp}", task.id));
            self.run_frame_action(task.action, timestamp)?;
        }
        Ok(())
    }

    pub fn run_frames(&mut self, count: usize, delta_ms: i64) -> Result<()> {
        for _ in 0..count {
            self.run_frame(delta_ms)?;
        }
        Ok(())
    }

    pub fn viewport_width(&self) -> i64 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> i64 {
        self.viewport_height
    }

    pub fn set_viewport(&mut self, width: i64, height: i64) -> Result<()> {
        self.viewport_width = width;
        self.viewport_height = height;
        let root = self.dom.root;
        self.dispatch_event(root, "resize")?;
        self.evaluate_watches()
    }

    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: i64) -> Result<()> {
        self.scroll_y = y.max(0);
        self.trace_event_line(format!("[event] scroll y={}", self.scroll_y));
        let root = self.dom.root;
        self.dispatch_event(root, "scroll")?;
        self.evaluate_watches()
    }

    pub fn set_rect(&mut self, selector: &str, rect: Rect) -> Result<()> {
        let target = self.select_one(selector)?;
        self.rects.insert(target, rect);
        Ok(())
    }

    pub fn set_scroll_height(&mut self, selector: &str, height: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        self.scroll_heights.insert(target, height);
        Ok(())
    }

    pub fn set_clipboard_mode(&mut self, mode: ClipboardMode) {
        self.clipboard_mode = mode;
    }

    pub fn clipboard_text(&self) -> Option<&str> {
        self.clipboard_text.as_deref()
    }

    pub fn last_copy_path(&self) -> Option<CopyPath> {
        self.last_copy_path
    }

    pub fn copy_text(&mut self, text: &str) -> Result<()> {
        let normalized: String = text.nfc().collect();
        match self.clipboard_mode {
            ClipboardMode::Granted => {
                self.clipboard_text = Some(normalized);
                self.last_copy_path = Some(CopyPath::Async);
                self.trace_line("[clipboard] write path=async".to_string());
            }
            ClipboardMode::Denied => {
                // Async write rejected: stage the text in a scratch textarea,
                // select-and-copy, then drop the scratch node.
                let body = self.dom.body();
                let scratch = self.dom.create_detached_element("textarea");
                self.dom.append_child(body, scratch)?;
                self.dom.set_value(scratch, &normalized)?;
                self.clipboard_text = Some(self.dom.value(scratch)?);
                self.dom.remove_node(scratch)?;
                self.last_copy_path = Some(CopyPath::Fallback);
                self.trace_line("[clipboard] write path=fallback".to_string());
            }
        }
        self.show_notification("Copied to clipboard!", Severity::Success)
    }

    pub fn copy_from_element(&mut self, element_id: &str) -> Result<()> {
        let Some(target) = self.dom.by_id(element_id) else {
            return Ok(());
        };
        let text = visible_text(&self.dom.text_content(target));
        self.copy_text(&text)
    }

    pub(crate) fn add_watch(
        &mut self,
        targets: Vec<NodeId>,
        threshold: f64,
        class: &str,
    ) -> Result<i64> {
        let id = self.next_watch_id;
        self.next_watch_id += 1;
        self.watches.push(Watch {
            id,
            targets,
            threshold,
            class: class.to_string(),
        });
        self.evaluate_watches()?;
        Ok(id)
    }

    pub(crate) fn remove_watch(&mut self, watch_id: i64) -> bool {
        let before = self.watches.len();
        self.watches.retain(|watch| watch.id != watch_id);
        before != self.watches.len()
    }

    fn evaluate_watches(&mut self) -> Result<()> {
        let watches = self.watches.clone();
        for watch in watches {
            for target in watch.targets {
                if !self.dom.is_connected(target) {
                    continue;
                }
                let fraction = self.visible_fraction(target);
                if fraction >= watch.threshold {
                    if !self.dom.class_contains(target, &watch.class)? {
                        self.trace_line(format!(
                            "[watch] id={} reveal node={} fraction={fraction:.2}",
                            watch.id,
                            self.node_label(target)
                        ));
                    }
                    self.dom.class_add(target, &watch.class)?;
                }
            }
        }
        Ok(())
    }

    fn visible_fraction(&self, target: NodeId) -> f64 {
        let rect = self.rects.get(&target).copied().unwrap_or_default();
        if rect.height <= 0 {
            return 0.0;
        }
        let top = rect.top.max(self.scroll_y);
        let bottom = (rect.top + rect.height).min(self.scroll_y + self.viewport_height);
        let overlap = (bottom - top).max(0);
        overlap as f64 / rect.height as f64
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_class(&self, selector: &str, class: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class '{class}' present={expected}"),
                actual: format!("class '{class}' present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn exists(&self, selector: &str) -> bool {
        matches!(self.dom.query_selector(selector), Ok(Some(_)))
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn has_class(&self, selector: &str, class: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.class_contains(target, class)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn is_disabled(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.disabled(target))
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 160)
    }

    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        let Some(tag) = self.dom.tag_name(node_id) else {
            return "#document".to_string();
        };
        if let Some(id) = self.dom.attr(node_id, "id") {
            return format!("{tag}#{id}");
        }
        if let Some(class) = self.dom.attr(node_id, "class") {
            if let Some(first) = class.split_whitespace().next() {
                return format!("{tag}.{first}");
            }
        }
        tag.to_string()
    }

    fn is_submit_control(&self, node_id: NodeId) -> bool {
        let Some(tag) = self.dom.tag_name(node_id) else {
            return false;
        };
        let type_attr = self.dom.attr(node_id, "type");
        match tag {
            "button" => type_attr
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(true),
            "input" => type_attr
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(false),
            _ => false,
        }
    }

    fn form_owner(&self, node_id: NodeId) -> Option<NodeId> {
        let mut cursor = self.dom.parent(node_id);
        while let Some(current) = cursor {
            if self
                .dom
                .tag_name(current)
                .map(|t| t.eq_ignore_ascii_case("form"))
                .unwrap_or(false)
            {
                return Some(current);
            }
            cursor = self.dom.parent(current);
        }
        None
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        if path.is_empty() {
            return Ok(event);
        }

        // Capture phase.
        if path.len() >= 2 {
            for node in &path[..path.len() - 1] {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, true)?;
                if event.propagation_stopped {
                    return Ok(event);
                }
            }
        }

        // Target phase: capture listeners first.
        event.current_target = target;
        self.invoke_listeners(target, &mut event, true)?;
        if event.propagation_stopped {
            return Ok(event);
        }

        self.invoke_listeners(target, &mut event, false)?;
        if event.propagation_stopped {
            return Ok(event);
        }

        // Bubble phase.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev() {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, false)?;
                if event.propagation_stopped {
                    return Ok(event);
                }
            }
        }

        Ok(event)
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace && self.trace_events {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.node_label(event.target);
                let current_label = self.node_label(event.current_target);
                self.trace_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            self.run_action(listener.action, event)?;
            if event.propagation_stopped {
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace {
            return;
        }
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace_timers {
            self.trace_line(line);
        }
    }
}

pub(crate) fn visible_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
