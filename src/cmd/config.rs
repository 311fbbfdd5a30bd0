use std::env;

use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the configuration read from the environment (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let read = |key: &str| env::var(key).ok();

    println!("DATABASE_URL: {}", display_value(&read("DATABASE_URL")));
    println!("ANALYSIS_MODE: {}", display_value(&read("ANALYSIS_MODE")));
    println!("GEMINI_API_KEY: {}", mask_secret(&read("GEMINI_API_KEY")));
    println!(
        "GEMINI_MODEL_NAME: {}",
        display_value(&read("GEMINI_MODEL_NAME"))
    );
    println!("TRIAGE_BIND: {}", display_value(&read("TRIAGE_BIND")));

    match AppConfig::from_env() {
        Ok(config) => {
            println!();
            println!("Effective analysis mode: {}", config.effective_mode().as_str());
            println!("Database: {}", config.database.display());
            println!("Gemini model: {}", config.gemini_model);
            println!("Listen address: {}", config.bind_address);
        }
        Err(err) => println!("\nConfiguration is incomplete: {err}"),
    }

    Ok(())
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix = token.chars().take(3).collect::<String>();
            let mut suffix = token.chars().rev().take(3).collect::<Vec<_>>();
            suffix.reverse();
            let suffix = suffix.into_iter().collect::<String>();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_long_secrets() {
        let secret = Some("AIzaSyExample123".to_string());
        assert_eq!(mask_secret(&secret), "AIz***123");
    }

    #[test]
    fn masks_non_ascii_secrets_on_char_boundaries() {
        let secret = Some("ключ-секрет".to_string());
        assert_eq!(mask_secret(&secret), "клю***рет");
        assert_eq!(mask_secret(&Some("ключ".to_string())), "***");
    }

    #[test]
    fn masks_short_and_missing_secrets() {
        assert_eq!(mask_secret(&Some("abc".to_string())), "***");
        assert_eq!(mask_secret(&Some(String::new())), "<not set>");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn displays_unset_values() {
        assert_eq!(display_value(&None), "<not set>");
        assert_eq!(display_value(&Some("llm".to_string())), "llm");
    }
}
