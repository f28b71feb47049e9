use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::adapter::PageAdapter;
use crate::interaction::eval::js_str;
use crate::interaction::events::{input_events_js, key_events_js, mouse_events_js, KeyPhase, MouseKind};

/// A cell address, either `"B7"` or `{ "column": "B", "row": 7 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum CellRef {
    A1(String),
    Coords { column: String, row: RowLabel },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum RowLabel {
    Number(u32),
    Text(String),
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Number(n) => write!(f, "{}", n),
            RowLabel::Text(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRef::A1(s) => f.write_str(s),
            CellRef::Coords { column, row } => write!(f, "{}{}", column, row),
        }
    }
}

impl From<&str> for CellRef {
    fn from(s: &str) -> Self {
        CellRef::A1(s.to_string())
    }
}

impl PageAdapter {
    /// The name box's current text, or empty when it is not on the page.
    pub async fn current_cell_reference(&self) -> Result<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? String(el.value || '') : '';
            }})()"#,
            sel = js_str(&self.config().sheets.name_box)
        );
        self.eval(js, "name box").await
    }

    /// Type `cell` into the name box and commit it with Enter. The host
    /// navigates asynchronously; re-read to confirm.
    pub async fn set_current_cell_reference(&self, cell: &CellRef) -> Result<()> {
        let reference = cell.to_string();
        if reference.trim().is_empty() {
            bail!("Empty cell reference");
        }
        let js = format!(
            r#"(() => {{
                const box = document.querySelector({sel});
                if (!box) return false;
                box.value = {value};
                {click}
                return true;
            }})()"#,
            sel = js_str(&self.config().sheets.name_box),
            value = js_str(&reference),
            click = mouse_events_js("box", &[MouseKind::Click]),
        );
        let found: bool = self.eval(js, "name box write").await?;
        if !found {
            tracing::warn!("Name box not found; cannot navigate to {}", reference);
            return Ok(());
        }

        tokio::time::sleep(self.config().timing.settle()).await;

        let js = format!(
            r#"(() => {{
                const box = document.querySelector({sel});
                if (!box) return false;
                {enter}
                return true;
            }})()"#,
            sel = js_str(&self.config().sheets.name_box),
            enter = key_events_js("box", "Enter", &[KeyPhase::Down]),
        );
        self.run(js, "name box commit").await?;
        tracing::debug!("Navigated to {}", reference);
        Ok(())
    }

    /// Trimmed text of the active cell editor.
    pub async fn current_cell_value(&self) -> Result<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? (el.innerText || '').trim() : '';
            }})()"#,
            sel = js_str(&self.config().sheets.cell_input)
        );
        self.eval(js, "cell editor").await
    }

    /// Read a cell's value. With `cell` set, navigates there first and, when
    /// `restore_selection` is true, returns to the previously selected cell.
    pub async fn read_cell_value(
        &self,
        cell: Option<&CellRef>,
        restore_selection: bool,
    ) -> Result<String> {
        let Some(cell) = cell else {
            return self.current_cell_value().await;
        };

        let previous = if restore_selection {
            Some(self.current_cell_reference().await?)
        } else {
            None
        };

        self.set_current_cell_reference(cell).await?;
        let value = self.current_cell_value().await?;

        if let Some(previous) = previous.filter(|p| !p.is_empty()) {
            self.set_current_cell_reference(&CellRef::A1(previous)).await?;
        }
        Ok(value)
    }

    /// Write `value` into `cell`. The host may reformat or reject the value
    /// without telling us.
    pub async fn write_cell_value(
        &self,
        cell: &CellRef,
        value: &str,
        preserve_selection: bool,
    ) -> Result<()> {
        self.set_current_cell_reference(cell).await?;

        // The host re-renders the editor after the first commit; the second
        // pass lands on the settled editor.
        self.simulate_value_set(value).await?;
        self.simulate_value_set(value).await?;

        if preserve_selection {
            self.set_current_cell_reference(cell).await?;
        }
        Ok(())
    }

    async fn simulate_value_set(&self, value: &str) -> Result<()> {
        let sel = js_str(&self.config().sheets.cell_input);
        let js = format!(
            r#"(() => {{
                const input = document.querySelector({sel});
                if (!input) return false;
                {click}
                return true;
            }})()"#,
            sel = sel,
            click = mouse_events_js("input", &[MouseKind::Click]),
        );
        let found: bool = self.eval(js, "cell editor click").await?;
        if !found {
            tracing::warn!("Cell editor not found; value not written");
            return Ok(());
        }

        tokio::time::sleep(self.config().timing.settle()).await;

        let js = format!(
            r#"(() => {{
                const input = document.querySelector({sel});
                if (!input) return false;
                {keydown}
                input.innerText = {value};
                {input_event}
                {keypress}
                return true;
            }})()"#,
            sel = sel,
            keydown = key_events_js("input", "Enter", &[KeyPhase::Down]),
            value = js_str(value),
            input_event = input_events_js("input", false),
            keypress = key_events_js("input", "Enter", &[KeyPhase::Press]),
        );
        self.run(js, "cell editor write").await
    }
}
