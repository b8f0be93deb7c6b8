use anyhow::Result;
use clap::Parser;
use fridge::phrases::{t, Phrase};
use fridge::Language;
use fridge_client::ingestion::llm::{GenerateRequest, Part};
use fridge_client::ingestion::{GeminiClient, GenerativeModel};
use fridge_client::{GatewayConfig, GatewayError};

/// Check that the Gemini API key works
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// API base URL to check against
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = fridge_client::config::DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Model to send the probe to
    #[arg(long, default_value = "gemini-3-flash-preview")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    if dotenvy::dotenv().is_err() {
        eprintln!("Warning: Failed to load .env file");
    }
    let args = Args::parse();

    let config = GatewayConfig::from_env().with_endpoint(&args.endpoint);
    if !config.has_credential() {
        eprintln!("Error: GEMINI_API_KEY not found in environment");
        eprintln!("Please set GEMINI_API_KEY (or API_KEY) in your .env file or environment");
        std::process::exit(1);
    }

    println!("Testing credential against {}...", args.endpoint);

    let client = GeminiClient::new(&config);
    let probe = GenerateRequest::single(vec![Part::text("Reply with the single word: ok")]);
    match client.generate_content(args.model.clone(), probe).await {
        Ok(response) => {
            println!("\nCredential accepted by {}!", args.model);
            println!("{}", response.text().unwrap_or_default().trim());
        }
        Err(e) if e.is_unauthorized() => {
            println!("\nCredential rejected!");
            println!("{e}");
            println!("{}", t(Language::En, Phrase::BillingDoc));
            std::process::exit(1);
        }
        Err(GatewayError::Transport(e)) => {
            eprintln!("\nError connecting to the API!");
            eprintln!("URL: {}", args.endpoint);
            if args.endpoint.starts_with("https://localhost")
                || args.endpoint.starts_with("https://127.0.0.1")
            {
                eprintln!("\nHint: Local mock servers typically use HTTP, not HTTPS.");
                eprintln!("Try: cargo run --bin fridge-key-check -- --endpoint http://localhost:8080");
            }
            return Err(e.into());
        }
        Err(e) => {
            println!("\nRequest failed!");
            println!("{e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
