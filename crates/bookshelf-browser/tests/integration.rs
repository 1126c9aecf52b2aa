//! Integration tests for bookshelf-browser
//!
//! These tests require Chrome/Chromium to be installed and are marked #[ignore]
//! by default. Run with: cargo test --package bookshelf-browser -- --ignored

use bookshelf_browser::{
    expect, expect_page, BrowserError, Role, TestBrowser, TestBrowserConfig, WaitConfig,
};
use regex::Regex;
use std::time::Duration;

/// A page with every kind of element the locator strategies target.
fn test_html_page() -> String {
    r##"
    <!DOCTYPE html>
    <html>
    <head><title>Locator Page</title></head>
    <body>
        <input id="search" aria-label="Search books" placeholder="Type to search" />
        <select aria-label="rows per page" id="rows">
            <option value="5">5 rows</option>
            <option value="10" selected>10 rows</option>
        </select>
        <div class="-previous"><button disabled>Previous</button></div>
        <div class="-next"><button id="next">Next</button></div>
        <button style="display: none">Next</button>
        <span aria-hidden="true"><button>Next</button></span>
        <a id="more" href="#details">More details</a>
        <ul id="items"><li>one</li><li>two</li></ul>
        <p id="echo"></p>
        <p id="hidden" style="visibility: hidden">hidden</p>
        <script>
            document.getElementById('search').addEventListener('input', (e) => {
                document.getElementById('echo').textContent = 'search:' + e.target.value;
            });
            document.getElementById('rows').addEventListener('change', (e) => {
                document.getElementById('echo').textContent = 'rows:' + e.target.value;
            });
            document.getElementById('next').addEventListener('click', () => {
                setTimeout(() => {
                    document.getElementById('items').innerHTML = '<li>three</li><li>four</li>';
                }, 300);
            });
        </script>
    </body>
    </html>
    "##
    .to_string()
}

fn data_url() -> String {
    format!("data:text/html,{}", urlencoding::encode(&test_html_page()))
}

async fn launch() -> TestBrowser {
    TestBrowser::launch(TestBrowserConfig::default())
        .await
        .expect("failed to launch")
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_page_navigation_data_url() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url()).await.expect("failed to navigate");

    let title = page.title().await.expect("failed to get title");
    assert_eq!(title, "Locator Page");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_placeholder_fill_fires_input_event() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    page.get_by_placeholder("type to SEARCH")
        .fill("Git")
        .await
        .expect("fill failed");

    expect(&page.locator("#echo"))
        .to_have_texts(&["search:Git"])
        .await
        .expect("input event should have updated the echo");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_select_option_by_role_and_name() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let rows = page.get_by_role(Role::Combobox, "rows per page");
    rows.select_option("5").await.expect("select by value failed");
    expect(&page.locator("#echo"))
        .to_have_texts(&["rows:5"])
        .await
        .expect("change event should have fired");

    rows.select_option("10 rows")
        .await
        .expect("select by label failed");

    let missing = rows.select_option("7").await;
    assert!(matches!(missing, Err(BrowserError::NoMatchingOption { .. })));

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_visibility_enabled_and_strictness() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let next = page.get_by_role(Role::Button, "Next");
    assert!(next.is_visible().await.unwrap());
    assert!(next.is_enabled().await.unwrap());

    let previous = page.locator("div.-previous").locator("button");
    assert!(previous.is_visible().await.unwrap());
    assert!(!previous.is_enabled().await.unwrap());

    assert!(!page.locator("#hidden").is_visible().await.unwrap());
    assert!(!page.locator("#absent").is_visible().await.unwrap());

    let items = page.locator("#items li");
    assert!(matches!(
        items.is_visible().await,
        Err(BrowserError::StrictModeViolation { count: 2, .. })
    ));
    assert_eq!(items.count().await.unwrap(), 2);

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_expect_waits_for_text_change() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let items = page.locator("#items li");
    let before = items.all_text_contents().await.unwrap();
    assert_eq!(before, vec!["one", "two"]);

    page.get_by_role(Role::Button, "Next")
        .click()
        .await
        .expect("click failed");

    expect(&items)
        .not()
        .to_have_texts(before.as_slice())
        .await
        .expect("texts should change after the delayed update");
    expect(&items)
        .to_have_texts(&["three", "four"])
        .await
        .expect("new texts");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_expect_reports_last_observed_value() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let result = expect(&page.locator("#items li"))
        .with_timeout(Duration::from_millis(300))
        .to_have_texts(&["never"])
        .await;

    match result {
        Err(BrowserError::ExpectationFailed { last_observed, .. }) => {
            assert!(last_observed.contains("one"), "got {last_observed}");
        }
        other => panic!("expected ExpectationFailed, got {other:?}"),
    }

    let url = expect_page(&page)
        .with_timeout(Duration::from_millis(300))
        .to_have_url(&Regex::new(r"^data:text/html").unwrap())
        .await;
    assert!(url.is_ok());

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_click_on_missing_element_times_out() {
    let browser = TestBrowser::launch(
        TestBrowserConfig::default().with_action_timeout(Duration::from_millis(300)),
    )
    .await
    .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let result = page.locator("#non-existent").click().await;
    assert!(matches!(result, Err(BrowserError::ElementNotFound { .. })));

    let wait = page
        .wait_for_url(
            &Regex::new(r"never-there").unwrap(),
            WaitConfig::new(Duration::from_millis(200), Duration::from_millis(20)),
        )
        .await;
    assert!(matches!(wait, Err(BrowserError::WaitTimeout { .. })));

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_role_lookup_skips_hidden_duplicates() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    assert_eq!(page.locator("button").count().await.unwrap(), 4);

    let next = page.get_by_role(Role::Button, "Next");
    assert_eq!(next.count().await.unwrap(), 1);
    assert_eq!(next.get_attribute("id").await.unwrap().as_deref(), Some("next"));

    let link = page.get_by_role(Role::Link, "more details");
    assert_eq!(
        link.get_attribute("href").await.unwrap().as_deref(),
        Some("#details")
    );

    page.get_by_role(Role::Textbox, "search books")
        .fill("Git")
        .await
        .expect("fill by role failed");
    expect(&page.locator("#echo"))
        .to_have_texts(&["search:Git"])
        .await
        .expect("input event should have fired");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_positional_locators_and_counts() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let items = page.locator("#items li");
    expect(&items).to_have_count(2).await.expect("two items");
    expect(&items)
        .not()
        .to_have_count(3)
        .await
        .expect("not three items");

    let text = |locator: bookshelf_browser::Locator| async move {
        locator.text_content().await.expect("text content")
    };
    assert_eq!(text(items.first()).await.as_deref(), Some("one"));
    assert_eq!(text(items.last()).await.as_deref(), Some("two"));
    assert_eq!(text(items.nth(1)).await.as_deref(), Some("two"));
    assert_eq!(text(items.nth_from_end(1)).await.as_deref(), Some("one"));
    assert_eq!(items.nth(5).count().await.unwrap(), 0);

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_visibility_assertion_reports_strict_mode_violation() {
    let browser = launch().await;
    let page = browser.new_page().await.expect("failed to create page");
    page.navigate(&data_url()).await.expect("failed to navigate");

    let result = expect(&page.locator("#items li"))
        .with_timeout(Duration::from_secs(5))
        .to_be_visible()
        .await;

    assert!(
        matches!(result, Err(BrowserError::StrictModeViolation { count: 2, .. })),
        "{result:?}"
    );

    browser.close().await.expect("failed to close");
}
