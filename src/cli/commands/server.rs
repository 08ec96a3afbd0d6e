use anyhow::Context;
use clap::Subcommand;
use serde_json::Value;

use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Health check a server (defaults to DEVCONNECT_URL or localhost)")]
    Ping {
        #[arg(long, help = "Server base URL")]
        url: Option<String>,
    },

    #[command(about = "Show server information from the API root endpoint")]
    Info {
        #[arg(long, help = "Server base URL")]
        url: Option<String>,
    },
}

fn resolve_url(url: Option<String>) -> String {
    url.or_else(|| std::env::var("DEVCONNECT_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string())
}

pub async fn run(cmd: ServerCommands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Ping { url } => {
            let base = resolve_url(url);
            let response = reqwest::get(format!("{}/health", base))
                .await
                .with_context(|| format!("could not reach {}", base))?;
            let status = response.status();
            let body: Value = response.json().await.context("health response was not JSON")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    let state = body["data"]["status"].as_str().unwrap_or("unknown");
                    println!("{} -> {} ({})", base, state, status);
                }
            }
        }
        ServerCommands::Info { url } => {
            let base = resolve_url(url);
            let body: Value = reqwest::get(&base)
                .await
                .with_context(|| format!("could not reach {}", base))?
                .json()
                .await
                .context("root response was not JSON")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    let data = &body["data"];
                    println!(
                        "{} {}",
                        data["name"].as_str().unwrap_or("unknown"),
                        data["version"].as_str().unwrap_or("?")
                    );
                    if let Some(desc) = data["description"].as_str() {
                        println!("{}", desc);
                    }
                }
            }
        }
    }

    Ok(())
}
