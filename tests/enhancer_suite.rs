use page_enhancer::{enhance, ClipboardMode, Page, Rect, Result};

const PAGE_FIXTURE: &str = r#"
    <body>
      <nav class='navbar'>
        <button id='mobileMenuBtn'>menu</button>
        <ul id='navMenu'>
          <li class='nav-dropdown'>
            <a class='dropdown-toggle' href='#tools-menu'>Tools</a>
            <ul><li><a href='/palette'>Palette</a></li></ul>
          </li>
        </ul>
      </nav>
      <div class='flash-message'>Saved.</div>
      <div class='flash-message'>Logged in.</div>
      <main id='content'>
        <a id='jump' href='#results'>See results</a>
        <form id='palette-form' class='tool-form'>
          <textarea id='prompt'>warm sunset</textarea>
          <button id='go' type='submit'>Generate</button>
        </form>
        <section id='results'>
          <div class='result-card' id='card-a'>#ff7043</div>
          <div class='result-card' id='card-b'>#ffab91</div>
        </section>
      </main>
    </body>
    "#;

#[test]
fn flash_messages_fade_then_disappear() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    assert_eq!(page.count(".flash-message")?, 2);
    page.advance_time(4_999)?;
    assert_eq!(page.style(".flash-message", "opacity")?, "");

    page.advance_time(1)?;
    assert_eq!(page.count(".flash-message")?, 2);
    assert_eq!(page.style(".flash-message", "opacity")?, "0");
    assert_eq!(
        page.style(".flash-message", "transform")?,
        "translateY(-10px)"
    );

    page.advance_time(300)?;
    assert_eq!(page.count(".flash-message")?, 0);
    Ok(())
}

#[test]
fn dropdown_toggles_only_under_the_mobile_breakpoint() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    page.set_viewport(375, 700)?;
    page.click(".dropdown-toggle")?;
    page.assert_class(".nav-dropdown", "open", true)?;
    page.click(".dropdown-toggle")?;
    page.assert_class(".nav-dropdown", "open", false)?;

    page.set_viewport(1024, 768)?;
    page.click(".dropdown-toggle")?;
    page.assert_class(".nav-dropdown", "open", false)?;
    Ok(())
}

#[test]
fn submitting_a_tool_form_enters_and_leaves_the_busy_state() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    page.click("#go")?;
    page.assert_text("#go", "Generating...")?;
    assert!(page.is_disabled("#go")?);

    page.advance_time(29_999)?;
    assert!(page.is_disabled("#go")?);

    page.advance_time(1)?;
    page.assert_text("#go", "Generate")?;
    assert!(!page.is_disabled("#go")?);
    Ok(())
}

#[test]
fn textarea_grows_to_its_scroll_height_on_input() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    page.set_scroll_height("#prompt", 120)?;
    page.type_text("#prompt", "warm sunset over a harbor\nwith sails")?;
    assert_eq!(page.style("#prompt", "height")?, "120px");
    assert_eq!(page.value("#prompt")?, "warm sunset over a harbor\nwith sails");
    Ok(())
}

#[test]
fn anchor_click_scrolls_to_the_target_section() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    page.set_rect("#results", Rect {
        top: 1_200,
        height: 600,
    })?;
    page.click("#jump")?;
    assert_eq!(page.scroll_y(), 1_200);
    Ok(())
}

#[test]
fn anchor_to_a_missing_target_leaves_scroll_alone() -> Result<()> {
    let mut page = Page::from_html(
        "<body><a id='jump' href='#nowhere'>go</a><div class='navbar'></div></body>",
    )?;
    enhance(&mut page)?;

    page.click("#jump")?;
    assert_eq!(page.scroll_y(), 0);
    Ok(())
}

#[test]
fn navbar_picks_up_the_scrolled_class_past_the_threshold() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    page.scroll_to(100)?;
    page.assert_class(".navbar", "scrolled", false)?;
    page.advance_time(10)?;
    page.assert_class(".navbar", "scrolled", true)?;

    // Idempotent on repeated deep scrolls.
    page.scroll_to(300)?;
    page.advance_time(10)?;
    page.assert_class(".navbar", "scrolled", true)?;

    page.scroll_to(50)?;
    page.advance_time(10)?;
    page.assert_class(".navbar", "scrolled", false)?;
    Ok(())
}

#[test]
fn rapid_scrolls_collapse_into_one_style_update() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    // Let the flash dismissal timers drain first so the queue only holds
    // the debounced style update.
    page.advance_time(5_300)?;

    page.scroll_to(60)?;
    page.advance_time(3)?;
    page.scroll_to(70)?;
    page.advance_time(3)?;
    page.scroll_to(80)?;
    assert_eq!(page.pending_timers().len(), 1);

    page.advance_time(10)?;
    page.assert_class(".navbar", "scrolled", true)?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn result_cards_reveal_as_they_scroll_into_view() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    page.set_rect("#card-a", Rect {
        top: 1_300,
        height: 200,
    })?;
    page.set_rect("#card-b", Rect {
        top: 2_600,
        height: 200,
    })?;
    enhance(&mut page)?;

    page.assert_class("#card-a", "visible", false)?;
    page.assert_class("#card-b", "visible", false)?;

    page.scroll_to(700)?;
    page.assert_class("#card-a", "visible", true)?;
    page.assert_class("#card-b", "visible", false)?;

    page.scroll_to(2_000)?;
    page.assert_class("#card-b", "visible", true)?;

    // Scrolling back up never takes the class away.
    page.scroll_to(0)?;
    page.assert_class("#card-a", "visible", true)?;
    page.assert_class("#card-b", "visible", true)?;
    Ok(())
}

#[test]
fn cards_already_in_view_reveal_at_attach_time() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    page.set_rect("#card-a", Rect {
        top: 100,
        height: 200,
    })?;
    enhance(&mut page)?;
    page.assert_class("#card-a", "visible", true)?;
    Ok(())
}

#[test]
fn detach_cancels_flash_timers_and_listeners() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    let mut enhancer = enhance(&mut page)?;
    enhancer.detach(&mut page);

    page.advance_time(10_000)?;
    assert_eq!(page.count(".flash-message")?, 2);

    page.scroll_to(100)?;
    page.advance_time(10)?;
    page.assert_class(".navbar", "scrolled", false)?;
    Ok(())
}

#[test]
fn copy_entry_points_work_against_an_enhanced_page() -> Result<()> {
    let mut page = Page::from_html(PAGE_FIXTURE)?;
    enhance(&mut page)?;

    page.copy_from_element("card-a")?;
    assert_eq!(page.clipboard_text(), Some("#ff7043"));
    assert_eq!(page.count(".notification")?, 1);

    page.set_clipboard_mode(ClipboardMode::Denied);
    page.copy_text("#ffab91")?;
    assert_eq!(page.clipboard_text(), Some("#ffab91"));
    assert_eq!(page.count(".notification")?, 1);
    Ok(())
}
