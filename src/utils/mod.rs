//! Utility modules

pub mod a1;
pub mod csv_workbook;
pub mod currency;
pub mod formula;
pub mod memory_sheet;
pub mod stdin_form;

pub use a1::*;
pub use csv_workbook::*;
pub use currency::*;
pub use memory_sheet::*;
pub use stdin_form::*;
