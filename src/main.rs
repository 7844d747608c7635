//! Algolia CLI - command-line client for the Algolia APIs.
//!
//! Run `algolia --help` for usage information.

use algolia_client::{
    AnalyticsClient, AnalyticsParams, Args, ClientConfig, Command, ImportOptions, Importer,
    SearchClient, SearchParams,
};
use algolia_client::models::analytics::{Direction, OrderBy};
use anyhow::{Context, Result};
use console::style;
use serde_json::Value;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse_args();

    // Setup logging
    setup_logging(&args);

    // Print banner
    if !args.json_logs {
        print_banner();
    }

    // Load configuration
    let mut config = match ClientConfig::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    if args.verbose && !args.json_logs {
        print_config_summary(&config);
    }

    match args.command.clone() {
        Command::Search {
            index,
            query,
            hits_per_page,
        } => {
            let client = SearchClient::with_config(config)?;
            let response = client
                .init_index(&index)
                .search::<Value>(&query, SearchParams::new().hits_per_page(hits_per_page))
                .await?;

            if args.json_logs {
                println!("{}", serde_json::to_string(&response)?);
            } else {
                println!(
                    "{} {} hits in {}ms",
                    style("✓").green().bold(),
                    response.nb_hits,
                    response.processing_time_ms
                );
                for hit in &response.hits {
                    println!("{}", serde_json::to_string(hit)?);
                }
            }
        }

        Command::Import {
            index,
            input,
            batch_size,
            auto_generate_object_ids,
            object_id_key,
            replace,
            wait,
            no_progress,
        } => {
            // Validate input file exists
            if !input.exists() {
                error!("Input file not found: {:?}", input);
                eprintln!(
                    "{} Input file not found: {}",
                    style("Error:").red().bold(),
                    input.display()
                );
                std::process::exit(1);
            }

            if let Some(size) = batch_size {
                config.batch_size = size;
            }
            let batch_size = config.batch_size;
            let client = SearchClient::with_config(config)?;
            let importer = Importer::new(client.init_index(&index), batch_size)?;

            info!(index = %index, input = %input.display(), batch_size, "Starting import");

            let options = ImportOptions {
                auto_generate_object_ids,
                object_id_key,
                replace,
                wait,
                show_progress: !no_progress && !args.json_logs,
            };
            let result = importer
                .import_file(&input, &options)
                .await
                .with_context(|| format!("import into '{index}' failed"))?;

            if args.json_logs {
                println!("{}", serde_json::to_string(&result.to_json())?);
            } else {
                result.print_summary();
            }
        }

        Command::Export { index, output } => {
            let client = SearchClient::with_config(config)?;
            let importer = Importer::new(client.init_index(&index), 1)?;
            let result = importer.export_file(&output, !args.json_logs).await?;

            if args.json_logs {
                let summary = serde_json::json!({
                    "status": "complete",
                    "records": result.records,
                    "elapsed_seconds": result.elapsed.as_secs_f64(),
                });
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                println!(
                    "\n{} {} records saved to: {}",
                    style("✓").green().bold(),
                    result.records,
                    output.display()
                );
            }
        }

        Command::Settings { index } => {
            let client = SearchClient::with_config(config)?;
            let settings = client.init_index(&index).get_settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }

        Command::WaitTask { index, task_id } => {
            let client = SearchClient::with_config(config)?;
            client.init_index(&index).wait_task(task_id).await?;

            if args.json_logs {
                println!("{}", serde_json::json!({"task_id": task_id, "status": "published"}));
            } else {
                println!(
                    "{} Task {} published",
                    style("✓").green().bold(),
                    task_id
                );
            }
        }

        Command::TopSearches {
            index,
            region,
            limit,
        } => {
            if region.is_some() {
                config.region = region;
            }
            let client = AnalyticsClient::with_config(config)?;
            let params = AnalyticsParams::new(&index)
                .order(OrderBy::SearchCount, Direction::Desc)
                .page(limit, 0);
            let response = client.get_top_searches(&params).await?;

            if args.json_logs {
                println!("{}", serde_json::to_string(&response)?);
            } else {
                println!("{}", style(format!("Top searches of '{index}':")).bold());
                for (i, search) in response.searches.iter().enumerate() {
                    println!("  {:>3}. {} ({})", i + 1, search.search, search.count);
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("algolia_client={level},algolia={level}")));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .init();
    }
}

fn print_banner() {
    let banner = r"
    _    _             _ _
   / \  | | __ _  ___ | (_) __ _
  / _ \ | |/ _` |/ _ \| | |/ _` |
 / ___ \| | (_| | (_) | | | (_| |
/_/   \_\_|\__, |\___/|_|_|\__,_|
           |___/
    ";

    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Search, Analytics & Insights API Client").white().dim()
    );
    println!(
        "    {}",
        style(format!("v{}", algolia_client::VERSION)).white().dim()
    );
    println!();
}

fn print_config_summary(config: &ClientConfig) {
    println!("{}", style("Configuration:").bold());
    println!("  App ID:        {}", config.app_id);
    println!("  Read Timeout:  {:?}", config.timeouts.read);
    println!("  Write Timeout: {:?}", config.timeouts.write);
    println!("  Batch Size:    {}", config.batch_size);
    if let Some(rate) = config.rate_limit {
        println!("  Rate Limit:    {rate} req/sec");
    }
    if let Some(region) = config.region {
        println!("  Region:        {region}");
    }
    if config.hosts.is_empty() {
        println!("  Hosts:         default cluster");
    } else {
        println!("  Hosts:         {}", config.hosts.len());
        for (i, host) in config.hosts.iter().enumerate() {
            println!("    {}. {} ({:?})", i + 1, host.base_url(), host.accept);
        }
    }
    println!();
}
