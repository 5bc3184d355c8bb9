use crate::application::query::DEFAULT_N_RESULTS;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "docvec", about = "Text document store backed by vector similarity search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show collection name, document count and metadata
    Info,
    /// List stored documents
    List {
        /// Only these ids (unknown ids are skipped)
        #[arg(long, num_args = 1..)]
        ids: Option<Vec<String>>,
    },
    /// Embed and add documents
    Add {
        /// Document texts
        #[arg(required = true)]
        texts: Vec<String>,
        /// Explicit ids, one per text
        #[arg(long, num_args = 1..)]
        ids: Option<Vec<String>>,
        /// JSON array of metadata objects, one per text
        #[arg(long)]
        metadatas: Option<String>,
    },
    /// Delete documents by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Find the documents closest to a query text
    Query {
        query: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_N_RESULTS)]
        n_results: usize,
        /// JSON metadata filter passed to the engine
        #[arg(long = "where")]
        filter: Option<String>,
    },
    /// Remove every document from the collection
    Clear,
    /// Manage the vector engine process
    Engine {
        #[command(subcommand)]
        action: EngineAction,
    },
}

#[derive(Subcommand)]
pub enum EngineAction {
    /// Make sure the engine is reachable, launching it if needed
    Start,
    /// Stop the engine process or container
    Stop,
    /// Probe the engine heartbeat
    Status,
}
