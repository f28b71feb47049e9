use anyhow::Result;

use crate::adapter::PageAdapter;
use crate::interaction::eval::js_str;
use crate::interaction::events::{mouse_events_js, POINTER_SEQUENCE};

impl PageAdapter {
    pub async fn sheet_names(&self) -> Result<Vec<String>> {
        let js = format!(
            r#"Array.from(document.querySelectorAll({sel})).map(el => (el.textContent || '').trim())"#,
            sel = js_str(&self.config().sheets.sheet_tab_name)
        );
        self.eval(js, "sheet tab names").await
    }

    /// Activate the first tab whose trimmed name equals `name`. The tab strip
    /// listens for the full pointer sequence, not just `click`.
    pub async fn select_sheet_tab(&self, name: &str) -> Result<bool> {
        let sheets = &self.config().sheets;
        let js = format!(
            r#"(() => {{
                const wanted = {name}.trim();
                for (const nameEl of document.querySelectorAll({names})) {{
                    if ((nameEl.textContent || '').trim() !== wanted) continue;
                    const tab = nameEl.closest({tab});
                    if (!tab) continue;
                    {pointer}
                    return true;
                }}
                return false;
            }})()"#,
            name = js_str(name),
            names = js_str(&sheets.sheet_tab_name),
            tab = js_str(&sheets.sheet_tab),
            pointer = mouse_events_js("tab", &POINTER_SEQUENCE),
        );
        let clicked: bool = self.eval(js, "sheet tab click").await?;
        if clicked {
            tracing::info!("Clicked tab: {}", name);
        } else {
            tracing::error!("Tab with name {:?} not found", name);
        }
        Ok(clicked)
    }
}
