use anyhow::Result;

use super::cell::CellRef;
use super::range::CellRange;
use crate::adapter::PageAdapter;

impl PageAdapter {
    /// Put the range into the name box so the host highlights it.
    pub async fn select_range(&self, range: &CellRange) -> Result<()> {
        self.set_current_cell_reference(&CellRef::A1(range.to_string()))
            .await
    }

    /// Whatever the name box shows, or `None` if nothing is selected.
    pub async fn selected_range(&self) -> Result<Option<String>> {
        let current = self.current_cell_reference().await?;
        let current = current.trim();
        Ok((!current.is_empty()).then(|| current.to_string()))
    }

    /// Read every cell in the range, row by row, then return to the cell that
    /// was selected before.
    pub async fn range_values(&self, range: &CellRange) -> Result<Vec<Vec<String>>> {
        let previous = self.current_cell_reference().await?;

        let mut rows = Vec::new();
        for row in range.rows() {
            let mut values = Vec::new();
            for cell in row {
                let cell = CellRef::A1(cell);
                values.push(self.read_cell_value(Some(&cell), false).await?);
            }
            rows.push(values);
        }

        if !previous.is_empty() {
            self.set_current_cell_reference(&CellRef::A1(previous)).await?;
        }
        Ok(rows)
    }

    /// Write `values` row by row into the range. Values beyond the range and
    /// cells without a value are left alone.
    pub async fn set_range_values(&self, range: &CellRange, values: &[Vec<String>]) -> Result<usize> {
        let mut written = 0;
        for (cells, row_values) in range.rows().zip(values) {
            for (cell, value) in cells.zip(row_values) {
                self.write_cell_value(&CellRef::A1(cell), value, false).await?;
                written += 1;
            }
        }
        tracing::debug!("Wrote {} cells into {}", written, range);
        Ok(written)
    }
}
