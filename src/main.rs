use clap::Parser;
use docvec::cli::commands::{Cli, Commands, EngineAction};
use docvec::cli::response::ApiResponse;
use docvec::domain::error::DomainError;
use docvec::domain::values::metadata::Metadata;
use docvec::DocVec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docvec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let response = match DocVec::from_env() {
        Ok(dv) => match run_command(&dv, cli.command).await {
            Ok(response) => response,
            Err(e) => ApiResponse::error(e.to_string()),
        },
        Err(e) => ApiResponse::error(format!("Error initializing docvec: {e}")),
    };

    println!("{}", response.to_json());
    if !response.success {
        std::process::exit(1);
    }
}

async fn run_command(dv: &DocVec, cmd: Commands) -> Result<ApiResponse, DomainError> {
    let response = match cmd {
        Commands::Info => ApiResponse::data(&dv.info().await?),
        Commands::List { ids } => ApiResponse::data(&dv.get(ids).await?),
        Commands::Add {
            texts,
            ids,
            metadatas,
        } => {
            let metadatas = metadatas
                .map(|raw| serde_json::from_str::<Vec<Metadata>>(&raw))
                .transpose()
                .map_err(|e| DomainError::InvalidInput(format!("--metadatas must be a JSON array of objects: {e}")))?;
            let ids = dv.add(texts, ids, metadatas).await?;
            ApiResponse::message(format!("Added {} documents: {}", ids.len(), ids.join(", ")))
        }
        Commands::Delete { ids } => {
            let deleted = dv.delete(ids).await?;
            ApiResponse::message(format!("Deleted {deleted} documents"))
        }
        Commands::Query {
            query,
            n_results,
            filter,
        } => {
            let filter = filter
                .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
                .transpose()
                .map_err(|e| DomainError::InvalidInput(format!("--where must be JSON: {e}")))?;
            ApiResponse::data(&dv.query(&query, n_results, filter).await?)
        }
        Commands::Clear => {
            let removed = dv.clear().await?;
            ApiResponse::message(format!("Collection cleared ({removed} documents removed)"))
        }
        Commands::Engine { action } => match action {
            EngineAction::Start => {
                dv.ensure_engine().await?;
                ApiResponse::data(&dv.engine_status().await)
            }
            EngineAction::Stop => {
                dv.stop_engine().await;
                ApiResponse::message("Engine stop requested")
            }
            EngineAction::Status => ApiResponse::data(&dv.engine_status().await),
        },
    };
    Ok(response)
}
