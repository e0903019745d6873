//! 访客记录存储
//!
//! 当前只有 CSV 表格一种后端。

pub mod sheet;

pub use sheet::{SHEET_HEADERS, SheetRow, VisitorSheet, VisitorStats};
