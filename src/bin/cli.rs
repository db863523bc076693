//! covid-dash CLI
//!
//! Command-line client for a running covid-dash server:
//! - Check status
//! - Describe the loaded data
//! - Fetch chart specifications and the latest-day snapshot
//! - Export the derived table

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "covid-dash-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the covid-dash COVID-19 testing dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8050", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// Describe the loaded data
    Meta,

    /// Fetch a chart specification
    Chart {
        /// State codes (comma-separated or multiple args)
        states: Vec<String>,
        /// Metric (positive, totalTestResults, perc_increase, perc_five_increase, perc_death, perc_hosp)
        #[arg(short, long, default_value = "positive")]
        metric: String,
        /// Y axis scale (linear, log)
        #[arg(short, long, default_value = "linear")]
        scale: String,
        /// Fetch the latest-day map instead of the line chart
        #[arg(long)]
        map: bool,
    },

    /// Show latest-day positive counts per state
    Snapshot,

    /// Export the derived table as CSV
    Export {
        /// State codes to export (empty = all)
        #[arg(short, long)]
        states: Vec<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(&health)?);
                        return Ok(());
                    }

                    println!(
                        "covid-dash v{}",
                        health["version"].as_str().unwrap_or(env!("CARGO_PKG_VERSION"))
                    );
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!();
                    println!("Data:");
                    println!("  Records: {}", health["records"].as_u64().unwrap_or(0));
                    println!(
                        "  As of: {}",
                        health["as_of"].as_str().unwrap_or("no data loaded")
                    );
                    println!();
                    println!("Sessions: {}", health["sessions"].as_u64().unwrap_or(0));
                    if let Some(tabs) = health.get("sessions_by_tab") {
                        println!(
                            "  state-positive: {}",
                            tabs["state_positive"].as_u64().unwrap_or(0)
                        );
                        println!(
                            "  us-state-map: {}",
                            tabs["us_state_map"].as_u64().unwrap_or(0)
                        );
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    bail!("API returned error: {}", resp.status());
                }
                Err(e) => {
                    eprintln!("Cannot connect to covid-dash at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin covid-dash");
                    return Err(e.into());
                }
            }
        }

        Commands::Meta => {
            let meta = get_json(&client, &format!("{}/api/v1/meta", cli.api_url)).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&meta)?);
                return Ok(());
            }

            println!("Feed: {}", meta["feed"].as_str().unwrap_or("-"));
            println!("Loaded at: {}", meta["loaded_at"].as_str().unwrap_or("-"));
            println!("As of: {}", meta["as_of"].as_str().unwrap_or("no data loaded"));
            println!("Records: {}", meta["records"].as_u64().unwrap_or(0));

            let states: Vec<&str> = meta["states"]
                .as_array()
                .map(|a| a.iter().filter_map(|s| s.as_str()).collect())
                .unwrap_or_default();
            println!("States ({}): {}", states.len(), states.join(" "));

            let report = &meta["report"];
            println!();
            println!("Load report:");
            println!("  Rows read: {}", report["rows_read"].as_u64().unwrap_or(0));
            println!("  Rows kept: {}", report["rows_kept"].as_u64().unwrap_or(0));
            println!("  Rows dropped: {}", report["rows_dropped"].as_u64().unwrap_or(0));
            println!("  Fields nulled: {}", report["fields_nulled"].as_u64().unwrap_or(0));
            if let Some(warnings) = report["warnings"].as_array() {
                for warning in warnings {
                    println!("  ! {}", warning.as_str().unwrap_or_default());
                }
            }

            println!();
            println!("{:<20} {}", "Metric", "Label");
            println!("{}", "-".repeat(50));
            for metric in meta["metrics"].as_array().into_iter().flatten() {
                println!(
                    "{:<20} {}",
                    metric["key"].as_str().unwrap_or("-"),
                    metric["label"].as_str().unwrap_or("-")
                );
            }
        }

        Commands::Chart {
            states,
            metric,
            scale,
            map,
        } => {
            let url = if map {
                format!("{}/api/v1/charts/map", cli.api_url)
            } else {
                let states = flatten_states(&states);
                let mut url = format!(
                    "{}/api/v1/charts/line?metric={}&scale={}",
                    cli.api_url,
                    urlencoding::encode(&metric),
                    urlencoding::encode(&scale)
                );
                if !states.is_empty() {
                    url.push_str(&format!("&states={}", urlencoding::encode(&states.join(","))));
                }
                url
            };

            let chart = get_json(&client, &url).await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&chart)?),
                _ => print_chart(&chart),
            }
        }

        Commands::Snapshot => {
            let snapshot = get_json(&client, &format!("{}/api/v1/snapshot", cli.api_url)).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            let entries = snapshot["entries"].as_array().cloned().unwrap_or_default();
            if entries.is_empty() {
                println!("No data loaded");
                return Ok(());
            }

            println!("As of {}", snapshot["as_of"].as_str().unwrap_or("-"));
            println!();
            println!("{:<6} {:>12}", "State", "Positive");
            println!("{}", "-".repeat(19));
            for entry in entries {
                println!(
                    "{:<6} {:>12}",
                    entry["state"].as_str().unwrap_or("-"),
                    entry["positive"].as_i64().unwrap_or(0)
                );
            }
        }

        Commands::Export { states, output } => {
            let states = flatten_states(&states);
            let mut url = format!("{}/api/v1/export", cli.api_url);
            if !states.is_empty() {
                url.push_str(&format!("?states={}", urlencoding::encode(&states.join(","))));
            }

            let response = client.get(&url).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Export failed ({}): {}", status, text);
            }

            let data = response.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    print!("{}", data);
                }
            }
        }

        Commands::Config { output } => {
            let config = covid_dash::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// GET a JSON document, turning error bodies into a readable failure
async fn get_json(client: &reqwest::Client, url: &str) -> anyhow::Result<serde_json::Value> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("Request failed ({}): {}", status, error_message(&text));
    }

    response
        .json()
        .await
        .with_context(|| format!("invalid JSON from {}", url))
}

/// Message of an error body: the API's `error.message`, else the raw text
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json["error"]["message"].as_str() {
            return message.to_string();
        }
    }

    match body.trim() {
        "" => "unknown error".to_string(),
        text => text.to_string(),
    }
}

/// Support both `MD VA` and `MD,VA`
fn flatten_states(states: &[String]) -> Vec<String> {
    states
        .iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

/// Print a chart spec as one table per trace
fn print_chart(chart: &serde_json::Value) {
    let layout = &chart["layout"];
    println!("{}", layout["title"].as_str().unwrap_or("Chart"));

    let traces = chart["data"].as_array().cloned().unwrap_or_default();
    if traces.is_empty() {
        println!("No traces for the selected states");
        return;
    }

    for trace in traces {
        println!();
        match trace["type"].as_str() {
            Some("choropleth") => {
                println!("{:<6} | {:<10}", "State", "log10(pos)");
                println!("{}", "-".repeat(19));
                let locations = trace["locations"].as_array().cloned().unwrap_or_default();
                let z = trace["z"].as_array().cloned().unwrap_or_default();
                for (location, value) in locations.iter().zip(z.iter()) {
                    println!(
                        "{:<6} | {:<10}",
                        location.as_str().unwrap_or("-"),
                        format_value(value)
                    );
                }
            }
            _ => {
                println!("{}", trace["name"].as_str().unwrap_or("-"));
                println!("{:<12} | {:<10}", "Date", "Value");
                println!("{}", "-".repeat(25));
                let x = trace["x"].as_array().cloned().unwrap_or_default();
                let y = trace["y"].as_array().cloned().unwrap_or_default();
                for (date, value) in x.iter().zip(y.iter()) {
                    println!(
                        "{:<12} | {:<10}",
                        date.as_str().unwrap_or("-"),
                        format_value(value)
                    );
                }
            }
        }
    }

    for annotation in layout["annotations"].as_array().into_iter().flatten() {
        println!();
        println!("{}", annotation["text"].as_str().unwrap_or_default());
    }
}

fn format_value(value: &serde_json::Value) -> String {
    value
        .as_f64()
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_api_body() {
        let body = r#"{"error":{"code":"INVALID_SCALE","message":"Invalid scale: sqrt"},"request_id":"x"}"#;
        assert_eq!(error_message(body), "Invalid scale: sqrt");
    }

    #[test]
    fn test_error_message_from_plain_body() {
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message("{\"detail\":1}"), "{\"detail\":1}");
        assert_eq!(error_message("  "), "unknown error");
    }

    #[test]
    fn test_flatten_states() {
        let states = vec!["md,va".to_string(), " ny ".to_string(), ",".to_string()];
        assert_eq!(flatten_states(&states), vec!["MD", "VA", "NY"]);
    }
}
