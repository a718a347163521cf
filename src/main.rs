use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anirec::cli::{self, EmbedderOptions};

#[derive(Parser)]
#[command(name = "anirec")]
#[command(about = "Retrieval-augmented anime recommender", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the catalog, chunk it, and build the embedding index
    Build {
        /// Raw catalog CSV (columns: Name, Genres, sypnopsis)
        #[arg(short, long)]
        input: PathBuf,

        /// Path for the normalized corpus CSV
        #[arg(short, long, default_value = "data/catalog_processed.csv")]
        corpus: PathBuf,

        /// Directory for the persisted index
        #[arg(long, default_value = "index")]
        index: PathBuf,

        /// Chunk window in characters
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,

        /// Chunk overlap in characters
        #[arg(long, default_value_t = 40)]
        chunk_overlap: usize,

        /// Embedding backend: token, mock, or openai
        #[arg(short, long, default_value = "token")]
        backend: String,

        /// Embedding model name
        #[arg(short, long, default_value = "all-MiniLM-L6-v2")]
        model: String,

        /// Embedding dimensionality
        #[arg(long, default_value_t = 384)]
        dimension: usize,

        /// API key for the openai embedding backend
        #[arg(long, env = "OPENAI_API_KEY")]
        embed_api_key: Option<String>,

        /// Base URL for the openai embedding backend
        #[arg(long)]
        embed_base_url: Option<String>,
    },

    /// Ask for recommendations against a built index
    Recommend {
        /// Directory of the persisted index
        #[arg(long, default_value = "index")]
        index: PathBuf,

        /// Free-text preference query
        #[arg(short, long)]
        query: String,

        /// Number of chunks to retrieve
        #[arg(long, default_value_t = 4)]
        top_k: usize,

        /// Embedding backend: token, mock, or openai (must match the build)
        #[arg(short, long, default_value = "token")]
        backend: String,

        /// Embedding model name (must match the build)
        #[arg(short, long, default_value = "all-MiniLM-L6-v2")]
        model: String,

        /// Embedding dimensionality (must match the build)
        #[arg(long, default_value_t = 384)]
        dimension: usize,

        /// API key for the openai embedding backend
        #[arg(long, env = "OPENAI_API_KEY")]
        embed_api_key: Option<String>,

        /// Base URL for the openai embedding backend
        #[arg(long)]
        embed_base_url: Option<String>,

        /// Language-model API key
        #[arg(long, env = "GROQ_API_KEY")]
        api_key: Option<String>,

        /// Language-model identifier
        #[arg(long, env = "MODEL_NAME", default_value = "llama-3.3-70b-versatile")]
        llm_model: String,

        /// OpenAI-compatible base URL for the language model
        #[arg(long, default_value = "https://api.groq.com/openai/v1")]
        llm_base_url: String,

        /// Only print the retrieved context (skip the language-model call)
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // .env is optional; absence is not an error.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anirec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            corpus,
            index,
            chunk_size,
            chunk_overlap,
            backend,
            model,
            dimension,
            embed_api_key,
            embed_base_url,
        } => {
            let embedder_opts = EmbedderOptions {
                backend,
                model,
                dimension,
                api_key: embed_api_key,
                base_url: embed_base_url,
            };
            cli::build(&input, &corpus, &index, chunk_size, chunk_overlap, &embedder_opts)?;
        }

        Commands::Recommend {
            index,
            query,
            top_k,
            backend,
            model,
            dimension,
            embed_api_key,
            embed_base_url,
            api_key,
            llm_model,
            llm_base_url,
            dry_run,
        } => {
            let embedder_opts = EmbedderOptions {
                backend,
                model,
                dimension,
                api_key: embed_api_key,
                base_url: embed_base_url,
            };
            cli::recommend(
                &index,
                &query,
                top_k,
                &embedder_opts,
                api_key.as_deref(),
                &llm_model,
                &llm_base_url,
                dry_run,
            )?;
        }
    }

    Ok(())
}
