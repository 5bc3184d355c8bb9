pub mod embedding_port;
pub mod process_runner;
pub mod vector_engine;
