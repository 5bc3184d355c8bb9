pub mod collection;
pub mod document;
pub mod query_result;
