//! JS helpers shared by every questionnaire snippet, and the shapes they
//! report back.

use serde::Deserialize;

use super::classify::Markers;
use crate::config::QuestionnaireSelectors;
use crate::interaction::eval::js_str;

/// Helper definitions spliced at the top of each snippet. `locate(text)`
/// returns the container of the first question whose trimmed name equals
/// `text`; `probe(nameEl, container)` reports its markers and current values.
fn prelude(selectors: &QuestionnaireSelectors) -> String {
    let json = serde_json::to_string(selectors).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"
        const S = {json};
        const text = el => (el.textContent || '').trim();
        const markerSel = [S.multichoice, S.buttonRow, S.textInput, S.richText].join(', ');
        const containerOf = nameEl => {{
            const direct = nameEl.closest(S.questionContainer);
            if (direct) return direct;
            let el = nameEl;
            for (let d = 0; d < S.containerDepth && el.parentElement; d++) {{
                el = el.parentElement;
                if (el.querySelector(markerSel)) return el;
            }}
            return nameEl.parentElement || nameEl;
        }};
        const locate = wanted => {{
            for (const nameEl of document.querySelectorAll(S.questionName)) {{
                if (text(nameEl) === wanted) return containerOf(nameEl);
            }}
            return null;
        }};
        const isEnabled = el => !el.disabled && el.getAttribute('aria-disabled') !== 'true';
        const optionState = (el, selectedSel) => ({{
            label: text(el),
            selected: el.matches(selectedSel),
            enabled: isEnabled(el),
        }});
        const multiWidget = c => c.querySelector(S.multichoice);
        const multiOptions = c => {{
            const w = multiWidget(c);
            return w ? Array.from(w.querySelectorAll(S.multichoiceOption)) : [];
        }};
        const buttonRows = c => {{
            const w = multiWidget(c);
            return Array.from(c.querySelectorAll(S.buttonRow)).filter(r => !(w && w.contains(r)));
        }};
        const buttons = c => buttonRows(c).flatMap(r => Array.from(r.querySelectorAll(S.button)));
        const probe = (nameEl, c) => {{
            const w = multiWidget(c);
            const rows = Array.from(c.querySelectorAll(S.buttonRow));
            const t = c.querySelector(S.textInput);
            const r = c.querySelector(S.richText);
            const num = c.querySelector(S.questionNumber);
            return {{
                text: text(nameEl),
                number: num ? text(num) : '',
                markers: {{
                    multichoiceWidget: !!w,
                    multichoiceOptions: multiOptions(c).length,
                    buttonRows: rows.length,
                    nestedButtonRows: rows.filter(row => w && w.contains(row)).length,
                    textInput: !!t,
                    richText: !!r,
                }},
                multichoice: multiOptions(c).map(el => optionState(el, S.multichoiceSelected)),
                buttons: buttons(c).map(el => optionState(el, S.buttonSelected)),
                textValue: t ? String(t.value || '') : null,
                richValue: r ? r.innerHTML : null,
            }};
        }};
        "#,
        json = json
    )
}

/// Wrap `body` (which must `return` a JSON value) with the helpers.
pub(crate) fn script(selectors: &QuestionnaireSelectors, body: &str) -> String {
    format!("(() => {{\n{}\n{}\n}})()", prelude(selectors), body)
}

/// `const c = locate(text); if (!c) return <missing>;` followed by `body`.
pub(crate) fn script_for_question(
    selectors: &QuestionnaireSelectors,
    question_text: &str,
    missing: &str,
    body: &str,
) -> String {
    script(
        selectors,
        &format!(
            "const c = locate({text});\nif (!c) return {missing};\n{body}",
            text = js_str(question_text.trim()),
            missing = missing,
            body = body
        ),
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct OptionState {
    pub label: String,
    pub selected: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionProbe {
    pub text: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub markers: Markers,
    #[serde(default)]
    pub multichoice: Vec<OptionState>,
    #[serde(default)]
    pub buttons: Vec<OptionState>,
    pub text_value: Option<String>,
    pub rich_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SectionProbe {
    pub name: String,
    pub questions: Vec<QuestionProbe>,
}
