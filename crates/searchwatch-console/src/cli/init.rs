/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When ConsoleConfig schema changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use searchwatch_console::config::{ApiConfig, ConsoleConfig, LoggingConfig, PreviewConfig};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub fn run_init(output: Option<PathBuf>) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => ConsoleConfig::default_path()
            .context("no config directory on this system; pass --output")?,
    };

    println!("{}", style("Searchwatch console setup").bold().cyan());
    println!(
        "{}",
        style("This writes the API connection and polling settings used by every command.").dim()
    );

    let theme = ColorfulTheme::default();
    let defaults = ConsoleConfig::default();

    println!("\n{}", style("--- API ---").bold());
    let base_url: String = Input::with_theme(&theme)
        .with_prompt("API base URL")
        .default(defaults.api.base_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            match url::Url::parse(input) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
                _ => Err("enter an absolute http(s) URL".to_string()),
            }
        })
        .interact_text()?;

    let api_key = Password::with_theme(&theme)
        .with_prompt("API key (blank to use SEARCHWATCH__API__API_KEY)")
        .allow_empty_password(true)
        .interact()?;

    let timeout_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Request timeout (seconds)")
        .default(defaults.api.timeout_secs)
        .interact_text()?;

    println!("\n{}", style("--- Run Now ---").bold());
    let poll_interval_ms: u64 = Input::with_theme(&theme)
        .with_prompt("Poll interval (ms)")
        .default(defaults.preview.poll_interval_ms)
        .interact_text()?;
    let max_attempts: u32 = Input::with_theme(&theme)
        .with_prompt("Max poll attempts")
        .default(defaults.preview.max_attempts)
        .interact_text()?;

    println!("\n{}", style("--- Logging ---").bold());
    let level_index = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(&LOG_LEVELS)
        .default(LOG_LEVELS.iter().position(|level| *level == defaults.logging.level).unwrap_or(2))
        .interact()?;

    let config = ConsoleConfig {
        api: ApiConfig {
            base_url,
            api_key: Some(api_key.trim().to_string()).filter(|key| !key.is_empty()),
            timeout_secs,
            ..defaults.api
        },
        preview: PreviewConfig {
            poll_interval_ms,
            max_attempts,
        },
        logging: LoggingConfig {
            level: LOG_LEVELS[level_index].to_string(),
            directory: None,
        },
    };
    config.validate()?;
    config.write_to(&output)?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}
