//! Spreadsheet side of the page adapter: the name box drives navigation and
//! the floating cell editor carries the value of the selected cell.

pub mod cell;
pub mod dropdown;
pub mod range;
pub mod tabs;
pub mod values;

pub use cell::{CellRef, RowLabel};
pub use range::{parse_range, CellRange};
