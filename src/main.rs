mod app_state;
mod config;
mod handlers;
mod listing;
mod server;
mod storage;
mod types;

use app_state::AppState;
use config::{BackendConfig, Config};
use storage::{InMemoryStore, ObjectStore, S3Backend};

use clap::Parser;
use std::sync::Arc;

// Server configuration
const HOST: &str = "0.0.0.0";
const PORT: u16 = 3000;

/// s3-autoindex: on-demand HTML directory listings for an S3-backed static origin
#[derive(Parser, Debug)]
#[command(name = "s3-autoindex")]
#[command(about = "Synthesizes index.html directory listings over an S3-compatible bucket", long_about = None)]
struct Cli {
    /// Path to the configuration file (required)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: String,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load backend configuration from file
    let config = match Config::from_file(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", cli.config);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load config file '{}': {}", cli.config, e);
            tracing::error!(
                "Configuration file is required. Use --config <path> or set CONFIG_PATH environment variable."
            );
            std::process::exit(1);
        }
    };

    // Initialize the store backend from configuration
    let storage: Arc<dyn ObjectStore> = match config.backend {
        BackendConfig::S3(s3_config) => {
            tracing::info!("Initializing S3 backend for bucket {}", s3_config.bucket);
            match S3Backend::new(
                s3_config.bucket.clone(),
                s3_config.region,
                s3_config.endpoint,
                s3_config.force_path_style,
                s3_config.access_key_id,
                s3_config.secret_access_key,
            )
            .await
            {
                Ok(backend) => {
                    tracing::info!("S3 backend for '{}' initialized", s3_config.bucket);
                    Arc::new(backend)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to initialize S3 backend for '{}': {}",
                        s3_config.bucket,
                        e
                    );
                    std::process::exit(1);
                }
            }
        }
        BackendConfig::Memory(mem_config) => {
            tracing::info!("Initializing in-memory backend: {}", mem_config.name);
            Arc::new(InMemoryStore::new())
        }
    };

    // Create shared app state and router
    let app_state = AppState::new(storage);
    let app = server::create_app(app_state);

    // Start server
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!(
        "Directory listing server listening on {}",
        listener.local_addr().unwrap()
    );

    axum::serve(listener, app).await.unwrap();
}
