pub mod detail;
pub mod table;
