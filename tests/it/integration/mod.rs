//! Multi-component workflow tests.

mod format_tests;
mod sheet_switch_tests;
