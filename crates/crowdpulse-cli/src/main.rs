mod collect;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use crowdpulse_core::SourceType;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crowdpulse-cli")]
#[command(about = "Crawl, score and rank retail-investor community posts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the pipeline and print the ranked posts
    Collect {
        /// Which community to crawl
        #[arg(long, value_enum, default_value_t = SourceArg::All)]
        source: SourceArg,

        /// Cache scope for this run; defaults to the current time (UTC+8)
        #[arg(long)]
        trigger_time: Option<String>,

        /// Override `CROWDPULSE_MAX_POSTS` for this run
        #[arg(long)]
        max_posts: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the targets a collect run would fetch
    Targets {
        #[arg(long, value_enum, default_value_t = SourceArg::All)]
        source: SourceArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    All,
    Eastmoney,
    Xueqiu,
}

impl SourceArg {
    fn sources(self) -> Vec<SourceType> {
        match self {
            SourceArg::All => SourceType::ALL.to_vec(),
            SourceArg::Eastmoney => vec![SourceType::EastmoneyCommunity],
            SourceArg::Xueqiu => vec![SourceType::XueqiuCommunity],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = crowdpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(config = ?config, "configuration loaded");

    match cli.command {
        Commands::Collect {
            source,
            trigger_time,
            max_posts,
            format,
        } => {
            let trigger_time = trigger_time.unwrap_or_else(collect::default_trigger_time);
            collect::run_collect(&config, &source.sources(), &trigger_time, max_posts, format)
                .await?;
        }
        Commands::Targets { source } => collect::print_targets(&config, &source.sources())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
