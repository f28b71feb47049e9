use std::time::Duration;

use anyhow::Result;

use super::cell::CellRef;
use crate::adapter::PageAdapter;
use crate::interaction::eval::js_str;
use crate::interaction::events::{key_events_js, KeyPhase};

impl PageAdapter {
    /// Press `key` on the focused element, holding it for `hold` before the
    /// keyup.
    pub async fn press_key(&self, key: &str, hold: Duration) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.activeElement;
                if (!el) return false;
                {down}
                return true;
            }})()"#,
            down = key_events_js("el", key, &[KeyPhase::Down, KeyPhase::Press]),
        );
        let focused: bool = self.eval(js, "key press").await?;
        if !focused {
            return Ok(());
        }

        if !hold.is_zero() {
            tokio::time::sleep(hold).await;
        }

        let js = format!(
            r#"(() => {{
                const el = document.activeElement;
                if (!el) return false;
                {up}
                return true;
            }})()"#,
            up = key_events_js("el", key, &[KeyPhase::Up]),
        );
        self.run(js, "key release").await
    }

    /// Open the validation dropdown on `cell`, collect its option labels and
    /// close it again. Labels can come back empty if the host is slow to open
    /// the editor.
    pub async fn dropdown_options(&self, cell: &CellRef) -> Result<Vec<String>> {
        let hold = self.config().timing.key_hold();
        self.set_current_cell_reference(cell).await?;
        self.press_key("Enter", hold).await?;

        let js = format!(
            r#"Array.from(document.querySelectorAll({sel})).map(el => (el.textContent || '').trim())"#,
            sel = js_str(&self.config().sheets.dropdown_chip)
        );
        let options: Vec<String> = self.eval(js, "dropdown options").await?;
        tracing::debug!("Dropdown at {}: {:?}", cell, options);

        self.press_key("Escape", hold).await?;
        Ok(options)
    }
}
