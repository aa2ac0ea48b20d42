pub mod metadata_table;
pub mod object_store;
pub mod queue;
