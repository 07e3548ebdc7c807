pub mod column;
pub mod join_table;
pub mod table;
