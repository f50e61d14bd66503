use crate::dom::NodeId;
use crate::page::{FrameAction, Page};
use crate::Result;

pub fn format_number(value: i64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CounterStep {
    node: NodeId,
    from: i64,
    to: i64,
    duration_ms: i64,
    started_at: Option<i64>,
}

impl Page {
    pub fn animate_value(
        &mut self,
        selector: &str,
        from: i64,
        to: i64,
        duration_ms: i64,
    ) -> Result<i64> {
        let node = self.select_one(selector)?;
        Ok(self.request_frame(FrameAction::Counter(CounterStep {
            node,
            from,
            to,
            duration_ms,
            started_at: None,
        })))
    }

    pub(crate) fn run_frame_action(&mut self, action: FrameAction, timestamp: i64) -> Result<()> {
        match action {
            FrameAction::Counter(step) => self.run_counter_step(step, timestamp),
        }
    }

    // First frame only records the origin timestamp, so the value starts at
    // `from` and reaches `to` exactly when duration_ms has elapsed since then.
    fn run_counter_step(&mut self, step: CounterStep, timestamp: i64) -> Result<()> {
        if !self.dom.is_connected(step.node) {
            return Ok(());
        }
        let started_at = step.started_at.unwrap_or(timestamp);
        let progress = if step.duration_ms <= 0 {
            1.0
        } else {
            ((timestamp - started_at) as f64 / step.duration_ms as f64).min(1.0)
        };
        let current = (progress * (step.to - step.from) as f64 + step.from as f64).floor() as i64;
        self.dom.set_text_content(step.node, &format_number(current))?;
        if progress < 1.0 {
            self.request_frame(FrameAction::Counter(CounterStep {
                started_at: Some(started_at),
                ..step
            }));
        }
        Ok(())
    }
}
