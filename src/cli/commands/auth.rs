use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Mint a development JWT for a user id using the configured secret")]
    Token {
        #[arg(help = "User id (uuid) the token should authenticate")]
        user_id: String,

        #[arg(long, help = "Override token expiry in hours")]
        expiry_hours: Option<u64>,
    },
}

pub fn run(cmd: AuthCommands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Token { user_id, expiry_hours } => {
            let user_id: Uuid = user_id.parse().context("user id must be a uuid")?;

            let security = &config::config().security;
            let expiry = expiry_hours.unwrap_or(security.jwt_expiry_hours);
            let token = generate_jwt(Claims::new(user_id, expiry), security)
                .context("failed to mint token (is DEVCONNECT_JWT_SECRET set?)")?;

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "token": token, "user_id": user_id }))?
                ),
                OutputFormat::Text => println!("{}", token),
            }
        }
    }

    Ok(())
}
