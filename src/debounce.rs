use crate::behaviors::Action;
use crate::page::Page;

impl Page {
    // Each call supersedes the previous pending execution for the key; only
    // the payload of the last call within a quiet window ever runs.
    pub fn debounce(&mut self, key: &str, wait_ms: i64, action: Action) -> i64 {
        if let Some(previous) = self.debounce_pending.remove(key) {
            self.clear_timer(previous);
        }
        let id = self.schedule_action(wait_ms, action);
        self.debounce_pending.insert(key.to_string(), id);
        id
    }

    pub fn cancel_debounce(&mut self, key: &str) -> bool {
        match self.debounce_pending.remove(key) {
            Some(id) => self.clear_timer(id),
            None => false,
        }
    }

    pub fn has_pending_debounce(&self, key: &str) -> bool {
        self.debounce_pending
            .get(key)
            .map(|id| self.pending_timers().iter().any(|timer| timer.id == *id))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    key: String,
    wait_ms: i64,
}

impl Debouncer {
    pub fn new(key: impl Into<String>, wait_ms: i64) -> Self {
        Self {
            key: key.into(),
            wait_ms,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn wait_ms(&self) -> i64 {
        self.wait_ms
    }

    pub fn call(&self, page: &mut Page, action: Action) -> i64 {
        page.debounce(&self.key, self.wait_ms, action)
    }

    pub fn cancel(&self, page: &mut Page) -> bool {
        page.cancel_debounce(&self.key)
    }

    pub fn is_pending(&self, page: &Page) -> bool {
        page.has_pending_debounce(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    fn append(page: &Page, text: &str) -> Result<Action> {
        Ok(Action::AppendText {
            node: page.select_one("#out")?,
            text: text.to_string(),
        })
    }

    #[test]
    fn burst_of_calls_runs_once_with_the_last_payload() -> Result<()> {
        let mut page = Page::from_html("<p id='out'></p>")?;
        let debouncer = Debouncer::new("test", 10);

        for text in ["a", "b", "c"] {
            let action = append(&page, text)?;
            debouncer.call(&mut page, action);
            page.advance_time(5)?;
        }
        page.advance_time(10)?;
        page.assert_text("#out", "c")?;
        Ok(())
    }

    #[test]
    fn spaced_calls_each_run() -> Result<()> {
        let mut page = Page::from_html("<p id='out'></p>")?;
        let debouncer = Debouncer::new("test", 10);

        let action = append(&page, "a")?;
        debouncer.call(&mut page, action);
        page.advance_time(10)?;
        let action = append(&page, "b")?;
        debouncer.call(&mut page, action);
        page.advance_time(10)?;

        page.assert_text("#out", "ab")?;
        Ok(())
    }

    #[test]
    fn cancel_drops_the_pending_execution() -> Result<()> {
        let mut page = Page::from_html("<p id='out'></p>")?;
        let debouncer = Debouncer::new("test", 10);

        let action = append(&page, "a")?;
        debouncer.call(&mut page, action);
        assert!(debouncer.is_pending(&page));
        assert!(debouncer.cancel(&mut page));
        assert!(!debouncer.is_pending(&page));

        page.advance_time(20)?;
        page.assert_text("#out", "")?;
        Ok(())
    }

    #[test]
    fn distinct_keys_do_not_supersede_each_other() -> Result<()> {
        let mut page = Page::from_html("<p id='out'></p>")?;
        let first = Debouncer::new("first", 10);
        let second = Debouncer::new("second", 10);

        let action = append(&page, "a")?;
        first.call(&mut page, action);
        let action = append(&page, "b")?;
        second.call(&mut page, action);
        page.advance_time(10)?;

        page.assert_text("#out", "ab")?;
        Ok(())
    }
}
