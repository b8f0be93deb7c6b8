use anyhow::{Context, Result};
use clap::Parser;
use fridge_server::{
    cache::new_cache,
    config::{CacheConfig, Config, DatabaseConfig, ServerConfig, TLSConfig},
    database::Database,
    routes::{app, AllStates},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// The address and optionally port to bind to
    #[clap(long, default_value = "0.0.0.0:3000")]
    address: String,

    /// Whether to use HTTPS / TLS
    #[clap(long, requires_all = ["cert_path", "key_path"])]
    tls: bool,

    /// PEM certificate chain, used with --tls
    #[clap(long)]
    cert_path: Option<String>,

    /// PEM private key, used with --tls
    #[clap(long)]
    key_path: Option<String>,

    /// SQLite database file
    #[clap(long, env = "FRIDGE_DATABASE", default_value = "data/fridge.db")]
    database: String,

    /// Directory for access logs. Defaults to the working directory.
    #[clap(long, env = "FRIDGE_LOG_DIR")]
    log_dir: Option<String>,

    /// YAML configuration file. When given, it replaces the other options.
    #[clap(long)]
    config: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        if let Some(path) = &self.config {
            return Config::load(path).with_context(|| format!("Loading config from {path}"));
        }
        let tls = match (self.tls, self.cert_path, self.key_path) {
            (true, Some(cert_path), Some(key_path)) => Some(TLSConfig {
                cert_path,
                key_path,
            }),
            _ => None,
        };
        Ok(Config {
            server: ServerConfig {
                address: self.address,
                tls,
                log_dir: self.log_dir,
            },
            database: DatabaseConfig {
                path: self.database,
            },
            cache: CacheConfig::default(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // Parse command line arguments
    let config = Args::parse().into_config()?;

    // initialize tracing
    let log_dir = match &config.server.log_dir {
        Some(dir) => dir.into(),
        None => std::env::current_dir()?,
    };
    let file_appender = tracing_appender::rolling::daily(log_dir, "access.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // connect to the database
    let db = Database::connect(&config.database.path)
        .await
        .context("Connecting to database")?;

    let app = app(AllStates {
        db,
        cache: new_cache(config.cache.capacity_bytes),
    });

    // In development, use HTTP. In production, use HTTPS.
    if let Some(tls) = &config.server.tls {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Loading TLS certificate")?;

        let addr = config.server.address.parse()?;
        tracing::info!("Listening on {}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .context("Starting TLS server")?;
    } else {
        let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
        tracing::info!("Listening on {}", config.server.address);
        axum::serve(listener, app).await?;
    }
    Ok(())
}
