use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::RangeError;

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z]+)([0-9]+):([A-Z]+)([0-9]+)$").expect("range pattern is valid")
    })
}

/// Bounds of an `A1:B10` style range. Rows are zero-based, columns are
/// one-based (`A` = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
}

pub fn parse_range(range: &str) -> Result<CellRange, RangeError> {
    let caps = range_pattern()
        .captures(range)
        .ok_or(RangeError::InvalidFormat)?;

    let row = |i: usize| -> Result<u32, RangeError> {
        caps[i]
            .parse::<u32>()
            .ok()
            .and_then(|r| r.checked_sub(1))
            .ok_or(RangeError::InvalidFormat)
    };
    let col = |i: usize| column_number(&caps[i]).ok_or(RangeError::InvalidFormat);

    Ok(CellRange {
        start_row: row(2)?,
        end_row: row(4)?,
        start_col: col(1)?,
        end_col: col(3)?,
    })
}

/// `A` → 1, `Z` → 26, `AA` → 27.
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0u32, |acc, b| {
        if !b.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)
    })
}

/// Inverse of [`column_number`]; 0 has no letters.
pub fn column_letters(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        let rem = (number - 1) % 26;
        letters.push(b'A' + rem as u8);
        number = (number - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

impl CellRange {
    /// Number of cells the range covers, saturating at `u64::MAX`.
    pub fn cell_count(&self) -> u64 {
        let span = |a: u32, b: u32| u64::from(a.abs_diff(b)) + 1;
        span(self.start_row, self.end_row).saturating_mul(span(self.start_col, self.end_col))
    }

    /// Reject ranges covering more than `max_cells` cells.
    pub fn check_size(&self, max_cells: u64) -> Result<(), RangeError> {
        let cells = self.cell_count();
        if cells > max_cells {
            return Err(RangeError::TooLarge {
                cells,
                max: max_cells,
            });
        }
        Ok(())
    }

    /// Cell references row by row, top-left first, built as they are walked.
    /// Reversed bounds are walked in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = String>> {
        let (r0, r1) = ordered(self.start_row, self.end_row);
        let (c0, c1) = ordered(self.start_col, self.end_col);
        (r0..=r1).map(move |row| {
            (c0..=c1).map(move |col| format!("{}{}", column_letters(col), row + 1))
        })
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letters(self.start_col),
            self.start_row + 1,
            column_letters(self.end_col),
            self.end_row + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1_b10() {
        let range = parse_range("A1:B10").unwrap();
        assert_eq!(range.start_row, 0);
        assert_eq!(range.end_row, 9);
        assert_eq!(range.start_col, 1);
        assert_eq!(range.end_col, 2);
    }

    #[test]
    fn test_rejects_bad_formats() {
        for bad in ["", "A1", "A1:B", "1A:B2", "a1:b2", "A1-B2", " A1:B2", "A1:B2 ", "A0:B2", "A1:B2:C3"] {
            assert_eq!(parse_range(bad), Err(RangeError::InvalidFormat), "{:?}", bad);
        }
    }

    #[test]
    fn test_column_numbers() {
        assert_eq!(column_number("A"), Some(1));
        assert_eq!(column_number("Z"), Some(26));
        assert_eq!(column_number("AA"), Some(27));
        assert_eq!(column_number("AZ"), Some(52));
        assert_eq!(column_number(""), None);
        assert_eq!(column_number("a"), None);
        assert_eq!(column_letters(28), "AB");
        assert_eq!(column_letters(0), "");
    }

    fn collect(range: &CellRange) -> Vec<Vec<String>> {
        range.rows().map(|row| row.collect()).collect()
    }

    #[test]
    fn test_rows_row_major() {
        let range = parse_range("B2:C3").unwrap();
        assert_eq!(collect(&range), vec![vec!["B2", "C2"], vec!["B3", "C3"]]);
        assert_eq!(range.to_string(), "B2:C3");
        assert_eq!(range.cell_count(), 4);
    }

    #[test]
    fn test_reversed_bounds_walk_ascending() {
        let range = parse_range("C3:B2").unwrap();
        let rows = collect(&range);
        assert_eq!(rows[0][0], "B2");
        assert_eq!(rows.len(), 2);
        assert_eq!(range.cell_count(), 4);
    }

    #[test]
    fn test_whole_sheet_range_is_counted_not_built() {
        let range = parse_range("A1:XFD1048576").unwrap();
        assert_eq!(range.cell_count(), 16_384 * 1_048_576);
        let first: Vec<String> = range.rows().next().unwrap().take(2).collect();
        assert_eq!(first, vec!["A1", "B1"]);

        let tall = parse_range("A1:A4294967295").unwrap();
        assert_eq!(tall.cell_count(), 4_294_967_295);
    }

    #[test]
    fn test_size_cap() {
        let range = parse_range("A1:J10").unwrap();
        assert!(range.check_size(100).is_ok());
        assert_eq!(
            range.check_size(99),
            Err(RangeError::TooLarge { cells: 100, max: 99 })
        );
        assert_eq!(
            parse_range("A1:XFD1048576").unwrap().check_size(10_000).unwrap_err().to_string(),
            "Range covers 17179869184 cells; the limit is 10000"
        );
    }
}
