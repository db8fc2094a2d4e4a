use std::env;

use dotenv::dotenv;
use textgen::{OobaboogaClient, OobaboogaConfig, TextCompletion};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("textgen=debug")),
        )
        .init();

    let base_url = env::var("TEXTGEN_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".into());
    let model_name = env::var("TEXTGEN_MODEL").unwrap_or_else(|_| "local-model".into());

    let client = OobaboogaClient::new(
        OobaboogaConfig::new(base_url, model_name)
            .with_temperature(0.5)
            .with_max_tokens(120),
    );

    println!("Backend: {}", client.llm_type());
    println!(
        "Parameters: {}",
        serde_json::to_string_pretty(&client.identifying_params())?
    );

    let answer = client
        .complete("Explain in two sentences what a hash map is.", None)
        .await?;
    println!("\n{answer}");

    Ok(())
}
