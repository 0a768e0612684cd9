//! Model discovery command
//!
//! Lists the models installed on the Ollama server, either as aligned
//! text or as JSON for scripting.

use crate::client::OllamaClient;
use crate::config::Config;
use crate::error::Result;

use colored::Colorize;

/// List models installed on the Ollama server
///
/// # Arguments
///
/// * `config` - Configuration containing the server settings
/// * `host` - Optional host override from the CLI
/// * `json` - Emit JSON instead of the text listing
///
/// # Returns
///
/// Returns Ok(()) on success, error if the server is unreachable
pub async fn list_models(config: &Config, host: Option<String>, json: bool) -> Result<()> {
    let mut ollama = config.ollama.clone();
    if let Some(host) = host {
        ollama.host = host;
    }

    tracing::info!("Listing models installed on {}", ollama.host);

    let client = OllamaClient::new(ollama.clone())?;
    let models = client.list_models().await?;

    if models.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No models installed on {}", ollama.host);
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("Models installed on {}:\n", ollama.host);
    for model in &models {
        let marker = if model.name == ollama.model { "*" } else { " " };
        println!(
            "{} {:<40} {:>10}  {}",
            marker.green().bold(),
            model.name,
            model.display_size(),
            model.modified_at
        );
    }
    println!("\n* configured model");

    Ok(())
}
