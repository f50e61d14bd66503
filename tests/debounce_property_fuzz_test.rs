use page_enhancer::{Action, Debouncer, Page};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};

fn marker_action(page: &Page, index: usize) -> Action {
    Action::AppendText {
        node: page.select_one("#out").expect("fixture has #out"),
        text: format!("[{index}]"),
    }
}

proptest! {
    // Calls spaced closer than the wait collapse into exactly one execution
    // carrying the payload of the last call.
    #[test]
    fn burst_executes_once_with_last_arguments(
        wait_ms in 2i64..50,
        gaps in vec(0i64..50, 1..20),
    ) {
        let mut page = Page::from_html("<p id='out'></p>").expect("fixture parses");
        let debouncer = Debouncer::new("prop", wait_ms);

        let mut last_index = 0usize;
        for (index, gap) in gaps.iter().enumerate() {
            let action = marker_action(&page, index);
            debouncer.call(&mut page, action);
            last_index = index;
            let gap = gap % wait_ms;
            advance(&mut page, gap)?;
        }
        advance(&mut page, wait_ms)?;

        let text = page.text("#out").expect("fixture has #out");
        prop_assert_eq!(text, format!("[{last_index}]"));
        prop_assert!(!debouncer.is_pending(&page));
    }

    // Calls separated by at least the wait each fire in order.
    #[test]
    fn quiescent_calls_all_execute_in_order(
        wait_ms in 1i64..50,
        extra_gaps in vec(0i64..20, 1..12),
    ) {
        let mut page = Page::from_html("<p id='out'></p>").expect("fixture parses");
        let debouncer = Debouncer::new("prop", wait_ms);

        let mut expected = String::new();
        for (index, extra) in extra_gaps.iter().enumerate() {
            let action = marker_action(&page, index);
            debouncer.call(&mut page, action);
            expected.push_str(&format!("[{index}]"));
            advance(&mut page, wait_ms + extra)?;
        }

        let text = page.text("#out").expect("fixture has #out");
        prop_assert_eq!(text, expected);
    }
}

fn advance(page: &mut Page, delta_ms: i64) -> TestCaseResult {
    page.advance_time(delta_ms)
        .map_err(|err| TestCaseError::fail(err.to_string()))
}
