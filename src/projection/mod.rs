
pub mod index_table;
pub mod item_changes;
pub mod filter_list;
