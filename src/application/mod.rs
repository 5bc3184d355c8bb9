pub mod document_store;
pub mod engine;
pub mod query;
