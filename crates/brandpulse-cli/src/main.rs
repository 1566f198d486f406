mod analyze;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "brandpulse")]
#[command(about = "Brand mention monitoring command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one mention pipeline and emit the run report as JSON
    Analyze {
        /// Brand or product name; `site:` restricts the search to one domain
        #[arg(long)]
        brand: Option<String>,
        /// Only keep mentions published within this many days
        #[arg(long)]
        window_days: Option<u32>,
        /// Search only the brand spelling variants, without topic expansion
        #[arg(long)]
        no_expand: bool,
        /// Run identifier for log correlation (defaults to a timestamp)
        #[arg(long)]
        run_id: Option<String>,
        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective analysis profile as YAML
    Profile,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = brandpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze {
            brand,
            window_days,
            no_expand,
            run_id,
            output,
        }) => {
            let args = analyze::AnalyzeArgs {
                brand: brand.unwrap_or_else(|| config.default_brand.clone()),
                window_days: window_days.unwrap_or(config.window_days),
                expand_keywords: config.expand_keywords && !no_expand,
                run_id: run_id.unwrap_or_else(analyze::time_run_id),
                output,
            };
            analyze::run_analyze(&config, args).await?;
        }
        Some(Commands::Profile) => {
            let profile = analyze::load_effective_profile(&config)?;
            print!("{}", serde_yaml::to_string(&profile)?);
        }
        None => println!("brandpulse: use `analyze` or `profile` (see --help)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
