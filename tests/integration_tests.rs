use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use formsync::browser::navigation::{self, NavigateParams, Surface};
use formsync::browser::TabPool;
use formsync::panel::{Edit, Panel};
use formsync::questionnaire::{AnswerType, AnswerValue, Question};
use formsync::relay::{Coordinator, Request, Response};
use formsync::sheets::{parse_range, CellRef};
use formsync::{AdapterConfig, PageAdapter};
use futures::StreamExt;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

async fn launch_test_browser() -> (Browser, tokio::task::JoinHandle<()>, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = BrowserConfig::builder()
        .arg("--headless=new")
        .arg("--no-sandbox")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--allow-file-access-from-files")
        .user_data_dir(tmp_dir.path())
        .window_size(1280, 720)
        .build()
        .expect("Failed to build browser config");

    let (browser, mut handler) = Browser::launch(config)
        .await
        .expect("Failed to launch browser");

    let handle = tokio::spawn(async move { while let Some(_) = handler.next().await {} });

    // Keep tmp_dir alive; it is cleaned up on drop
    (browser, handle, tmp_dir)
}

fn fixture_url(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = PathBuf::from(manifest_dir).join("fixtures").join(name);
    format!("file://{}", path.display())
}

async fn open_fixture(browser: &Browser, name: &str) -> Page {
    let page = browser.new_page(fixture_url(name).as_str()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    page
}

fn adapter(page: &Page) -> PageAdapter {
    PageAdapter::new(page.clone(), Arc::new(AdapterConfig::default()))
}

async fn js<T: serde::de::DeserializeOwned>(page: &Page, expr: &str) -> T {
    page.evaluate(expr).await.unwrap().into_value().unwrap()
}

// ── Navigation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_navigate_reports_surface() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = browser.new_page("about:blank").await.unwrap();

    let result = navigation::navigate(
        &page,
        &NavigateParams {
            url: fixture_url("sheet.html"),
        },
    )
    .await
    .unwrap();
    assert_eq!(result.title, "Mock Spreadsheet");
    assert!(result.url.contains("sheet.html"));
    assert_eq!(result.surface, Surface::Other);
}

// ── Spreadsheet ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cell_write_then_read() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;
    let sheet = adapter(&page);

    assert_eq!(sheet.current_cell_reference().await.unwrap(), "A1");
    assert_eq!(sheet.current_cell_value().await.unwrap(), "Control");

    sheet
        .write_cell_value(&CellRef::from("D4"), "Quarterly", true)
        .await
        .unwrap();
    assert_eq!(sheet.current_cell_reference().await.unwrap(), "D4");
    let stored: String = js(&page, "sheet.cells['Controls!D4']").await;
    assert_eq!(stored, "Quarterly");

    // Move away, then read it back with the selection restored.
    sheet.set_current_cell_reference(&CellRef::from("A1")).await.unwrap();
    let value = sheet
        .read_cell_value(Some(&CellRef::from("D4")), true)
        .await
        .unwrap();
    assert_eq!(value, "Quarterly");
    assert_eq!(sheet.current_cell_reference().await.unwrap(), "A1");
}

#[tokio::test]
async fn test_cell_address_object_form() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;
    let sheet = adapter(&page);

    let cell: CellRef = serde_json::from_value(json!({ "column": "B", "row": 2 })).unwrap();
    let value = sheet.read_cell_value(Some(&cell), false).await.unwrap();
    assert_eq!(value, "MFA");
    assert_eq!(sheet.current_cell_reference().await.unwrap(), "B2");
}

#[tokio::test]
async fn test_dropdown_options() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;
    let sheet = adapter(&page);

    let options = sheet.dropdown_options(&CellRef::from("E2")).await.unwrap();
    assert_eq!(options, vec!["Yes", "No", "Partial"]);

    // Escape closed the dropdown again.
    let chips: usize = js(&page, "document.querySelectorAll('.waffle-dropdown-chip').length").await;
    assert_eq!(chips, 0);

    let none = sheet.dropdown_options(&CellRef::from("A1")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_select_sheet_tab() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;
    let sheet = adapter(&page);

    assert_eq!(sheet.sheet_names().await.unwrap(), vec!["Controls", "Vendors"]);

    assert!(sheet.select_sheet_tab("Vendors").await.unwrap());
    let active: String = js(&page, "sheet.active").await;
    assert_eq!(active, "Vendors");
    let events: Vec<String> = js(&page, "sheet.tabEvents").await;
    assert_eq!(
        events,
        vec!["mousemove", "mouseover", "mousedown", "mouseup", "click", "mouseout"]
    );

    assert!(!sheet.select_sheet_tab("Archive").await.unwrap());
    let active: String = js(&page, "sheet.active").await;
    assert_eq!(active, "Vendors");
}

#[tokio::test]
async fn test_range_values_round_trip() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;
    let sheet = adapter(&page);
    let range = parse_range("F1:G2").unwrap();

    let values = vec![
        vec!["id".to_string(), "owner".to_string()],
        vec!["7".to_string(), "Ops".to_string()],
    ];
    let written = sheet.set_range_values(&range, &values).await.unwrap();
    assert_eq!(written, 4);

    sheet.set_current_cell_reference(&CellRef::from("B2")).await.unwrap();
    assert_eq!(sheet.range_values(&range).await.unwrap(), values);
    assert_eq!(sheet.current_cell_reference().await.unwrap(), "B2");

    sheet.select_range(&range).await.unwrap();
    assert_eq!(sheet.selected_range().await.unwrap().as_deref(), Some("F1:G2"));
}

#[tokio::test]
async fn test_set_cell_without_selection_fails() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;

    let tabs = Arc::new(Mutex::new(TabPool::new()));
    tabs.lock().await.add_page(page.clone());
    let relay = Coordinator::new(tabs, Arc::new(AdapterConfig::default())).spawn();

    let _: bool = js(&page, "(document.querySelector('.waffle-name-box').value = '', true)").await;
    let response = relay
        .send_message(json!({ "action": "setCellValue", "cellValue": "stray" }))
        .await;
    assert_eq!(response, Response::failed("No cell selected"));

    let untouched: bool = js(&page, "Object.values(sheet.cells).every(v => v !== 'stray')").await;
    assert!(untouched);

    let response = relay
        .send_message(json!({ "action": "setCurrentCellIndex", "cellIndex": "" }))
        .await;
    assert!(response.error().unwrap().contains("Empty cell reference"));
}

#[tokio::test]
async fn test_relay_routes_to_active_tab() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "sheet.html").await;

    let tabs = Arc::new(Mutex::new(TabPool::new()));
    tabs.lock().await.add_page(page.clone());
    let relay = Coordinator::new(tabs, Arc::new(AdapterConfig::default())).spawn();

    let response = relay
        .send_message(json!({ "action": "setCellValue", "cellIndex": "C9", "cellValue": "done" }))
        .await;
    assert_eq!(response, Response::ok());

    let response = relay
        .send_message(json!({ "action": "getCellValue", "cellIndex": "C9" }))
        .await;
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({ "cellValue": "done" }));

    let response = relay.send(Request::GetSheetNames).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "sheetNames": ["Controls", "Vendors"] })
    );

    let response = relay
        .send_message(json!({ "action": "sheetSelected", "sheetName": "Nope" }))
        .await;
    assert_eq!(response.error(), Some("Tab with name \"Nope\" not found"));

    let response = relay
        .send_message(json!({ "action": "getRangeValues", "range": "C9:C9" }))
        .await;
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({ "values": [["done"]] }));
}

// ── Questionnaire ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_scrape_with_answers() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire.html").await;

    let sections = adapter(&page).scrape(true).await.unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].section_name, "General");
    assert_eq!(sections[1].section_id, 1);

    let program = &sections[0].questions[0];
    assert_eq!(program.question_text, "Describe your security program.");
    assert_eq!(program.question_number, "1.1");
    assert_eq!(program.answer_type, AnswerType::Text);
    assert_eq!(program.answer, Some(AnswerValue::Text(String::new())));

    let regions = &sections[1].questions[0];
    assert_eq!(regions.answer_type, AnswerType::Multichoice);
    assert_eq!(regions.options, vec!["A", "B", "C"]);
    assert_eq!(regions.answer, Some(AnswerValue::Choices(vec!["B".into()])));
}

#[tokio::test]
async fn test_scrape_without_answers() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire.html").await;

    let sections = adapter(&page).scrape(false).await.unwrap();
    assert!(sections
        .iter()
        .flat_map(|s| &s.questions)
        .all(|q| q.answer.is_none()));
}

#[tokio::test]
async fn test_scrape_questions_rendered_outside_sections() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire_pane.html").await;
    let form = adapter(&page);

    let sections = form.scrape(true).await.unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].section_name, "Access");
    let access: Vec<&str> = sections[0].questions.iter().map(|q| q.question_text.as_str()).collect();
    assert_eq!(access, vec!["Is MFA enforced for all staff?"]);
    assert_eq!(sections[0].questions[0].answer, Some(AnswerValue::Text("Yes, via SSO".into())));

    let vendors = &sections[1].questions;
    assert_eq!(vendors.len(), 2);
    assert_eq!(vendors[0].question_number, "2.1");
    assert_eq!(vendors[1].answer_type, AnswerType::Multichoice);
    assert_eq!(vendors[1].answer, Some(AnswerValue::Choices(vec!["Tier 1".into()])));
    assert!(vendors.iter().all(|q| q.section_index == 1));

    // A second pass finds the same questions again.
    let again = form.scrape(false).await.unwrap();
    assert_eq!(again[0].questions.len(), 1);
    assert_eq!(again[1].questions.len(), 2);
}

#[tokio::test]
async fn test_panel_push_multichoice_then_grab() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire.html").await;

    let tabs = Arc::new(Mutex::new(TabPool::new()));
    tabs.lock().await.add_page(page.clone());
    let relay = Coordinator::new(tabs, Arc::new(AdapterConfig::default())).spawn();
    let mut panel = Panel::new(relay);

    panel.scrape(true).await.unwrap();
    let id = panel
        .session()
        .unwrap()
        .find_by_text("Which regions do you host data in?")
        .unwrap()
        .id
        .clone();

    panel
        .edit(
            &id,
            &Edit::SetChoices {
                options: vec!["A".into(), "C".into()],
            },
        )
        .unwrap();
    panel.push(&id).await.unwrap();

    let answer = panel.grab(&id).await.unwrap();
    assert_eq!(answer.answer, AnswerValue::Choices(vec!["A".into(), "C".into()]));
    assert_eq!(answer.options, vec!["A", "B", "C"]);

    // Locked options were waited out, never clicked.
    let locked: u32 = js(&page, "log.lockedClicks").await;
    assert_eq!(locked, 0);
}

#[tokio::test]
async fn test_push_text_fires_input_and_change() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire.html").await;
    let form = adapter(&page);
    form.scrape(false).await.unwrap();

    let mut question = Question::new("Describe your security program.", AnswerType::Text);
    question.user_answer = Some(AnswerValue::Text("Annual audits".into()));
    form.push_answer(&question).await.unwrap();

    let answer = form.grab_answer(&question).await.unwrap();
    assert_eq!(answer.answer, AnswerValue::Text("Annual audits".into()));
    let (inputs, changes): (u32, u32) = js(&page, "[log.inputs, log.changes]").await;
    assert_eq!((inputs, changes), (1, 1));
}

#[tokio::test]
async fn test_grab_missing_question_reads_empty() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire.html").await;
    let form = adapter(&page);

    let question = Question::new("Not on this page", AnswerType::Multichoice);
    let answer = form.grab_answer(&question).await.unwrap();
    assert_eq!(
        serde_json::to_value(&answer).unwrap(),
        json!({ "answer": [] })
    );

    let question = Question::new("Not on this page", AnswerType::Text);
    let answer = form.grab_answer(&question).await.unwrap();
    assert_eq!(serde_json::to_value(&answer).unwrap(), json!({ "answer": "" }));
}

#[tokio::test]
async fn test_scroll_to_question() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire.html").await;
    let form = adapter(&page);

    let mut question = Question::new("Which regions do you host data in?", AnswerType::Multichoice);
    question.section_index = 1;
    let outcome = form.scroll_to_question(&question).await.unwrap();
    assert!(outcome.success);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let scrolled: f64 = js(&page, "window.scrollY").await;
    assert!(scrolled > 0.0);

    let missing = Question::new("No such question", AnswerType::Text);
    let outcome = form.scroll_to_question(&missing).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Question not found"));
}

#[tokio::test]
async fn test_mixed_widget_classification() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire_mixed.html").await;
    let mut config = AdapterConfig::default();
    config.timing.loading_timeout_ms = 500;
    config.timing.loading_poll_ms = 100;
    let form = PageAdapter::new(page.clone(), Arc::new(config));

    let sections = form.scrape(true).await.unwrap();
    let questions: Vec<&Question> = sections.iter().flat_map(|s| &s.questions).collect();
    let by_text = |text: &str| *questions.iter().find(|q| q.question_text == text).unwrap();

    let stored = by_text("Where is customer data stored?");
    assert_eq!(stored.answer_type, AnswerType::Composed);
    let kinds: Vec<AnswerType> = stored.parts.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![AnswerType::Multichoice, AnswerType::Button]);
    let parts = stored.answer.as_ref().unwrap().as_parts().unwrap();
    assert_eq!(parts[0].answer, AnswerValue::Choices(vec!["EU".into()]));
    assert_eq!(parts[1].answer, AnswerValue::Text(String::new()));

    let certs = by_text("Which certifications apply?");
    assert_eq!(certs.answer_type, AnswerType::Multichoice);
    assert_eq!(certs.answer, Some(AnswerValue::Choices(vec!["SOC 2".into()])));

    let plan = by_text("Summarize your incident response plan.");
    assert_eq!(plan.answer_type, AnswerType::RichText);
    assert_eq!(plan.answer, Some(AnswerValue::Text("<p>Initial draft</p>".into())));

    let encrypt = by_text("Do you encrypt data at rest?");
    assert_eq!(encrypt.answer_type, AnswerType::Button);
    assert_eq!(encrypt.options, vec!["Yes", "No", "N/A"]);
    assert_eq!(encrypt.answer, Some(AnswerValue::Text("No".into())));

    let notes = by_text("Additional notes");
    assert_eq!(notes.answer_type, AnswerType::Text);
    assert_eq!(notes.answer, Some(AnswerValue::Text("none".into())));

    assert_eq!(by_text("Acknowledge the policy above.").answer_type, AnswerType::Unknown);

    let dpo = by_text("Who is the data protection officer?");
    assert_eq!(dpo.answer_type, AnswerType::Text);
    assert_eq!(dpo.answer, Some(AnswerValue::Text("J. Doe".into())));

    // Duplicate texts resolve to the first occurrence on the page.
    let comments = Question::new("Comments", AnswerType::Text);
    let answer = form.grab_answer(&comments).await.unwrap();
    assert_eq!(answer.answer, AnswerValue::Text("first comment".into()));
}

#[tokio::test]
async fn test_push_button_and_composed_parts() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire_mixed.html").await;
    let form = adapter(&page);

    let mut encrypt = Question::new("Do you encrypt data at rest?", AnswerType::Button);
    encrypt.user_answer = Some(AnswerValue::Text("Yes".into()));
    form.push_answer(&encrypt).await.unwrap();
    assert_eq!(
        form.grab_answer(&encrypt).await.unwrap().answer,
        AnswerValue::Text("Yes".into())
    );

    let mut plan = Question::new("Summarize your incident response plan.", AnswerType::RichText);
    plan.user_answer = Some(AnswerValue::Text("<p>Page the on-call</p>".into()));
    form.push_answer(&plan).await.unwrap();
    assert_eq!(
        form.grab_answer(&plan).await.unwrap().answer,
        AnswerValue::Text("<p>Page the on-call</p>".into())
    );

    let mut stored = Question::new("Where is customer data stored?", AnswerType::Composed);
    stored.user_answer = Some(serde_json::from_value(json!([
        { "type": "multichoice", "answer": ["EU", "US"] },
        { "type": "button", "answer": "Not applicable" }
    ])).unwrap());
    form.push_answer(&stored).await.unwrap();

    let answer = form.grab_answer(&stored).await.unwrap();
    let parts = answer.answer.as_parts().unwrap();
    assert_eq!(parts[0].answer, AnswerValue::Choices(vec!["EU".into(), "US".into()]));
    assert_eq!(parts[1].answer, AnswerValue::Text("Not applicable".into()));
}

#[tokio::test]
async fn test_loading_timeout_is_bounded() {
    let (browser, _handle, _tmp) = launch_test_browser().await;
    let page = open_fixture(&browser, "questionnaire_mixed.html").await;
    let mut config = AdapterConfig::default();
    config.timing.loading_timeout_ms = 1000;
    config.timing.loading_poll_ms = 100;
    let form = PageAdapter::new(page.clone(), Arc::new(config));

    let started = Instant::now();
    let sections = form.scrape(false).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));

    // The stuck section still comes back with what had rendered.
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1].section_name, "Stuck");
    assert_eq!(sections[1].questions.len(), 1);

    let err = form.wait_for_loading().await.unwrap_err();
    assert!(err.to_string().starts_with("Timed out after"), "{}", err);
}
