use anyhow::{Context, Result};
use clap::Parser;
use futures_util::StreamExt;
use jobmarket::{
    ClientConfig, JobCategory, JobKind, JobMarketClient, JobStatus, build_job_url,
};
use std::time::Duration;

/// jobmarket - query the job marketplace API
///
/// Examples:
///   jobmarket list --category designer --volunteer false
///   jobmarket list --all --max-pages 3
///   jobmarket get 5f8d0d55b54764421b7156c9
#[derive(Parser, Debug)]
#[command(author, version = env!("JOBMARKET_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long = "api-url", env = "JOBMARKET_BASE_URL", value_name = "URL", global = true)]
    api_url: Option<String>,

    /// User-Agent sent with every request
    #[arg(long, env = "JOBMARKET_USER_AGENT", value_name = "AGENT", global = true)]
    user_agent: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "JOBMARKET_TIMEOUT_MS", value_name = "MS", global = true)]
    timeout_ms: Option<u64>,

    /// Retries after the first attempt
    #[arg(long, env = "JOBMARKET_MAX_RETRIES", value_name = "N", global = true)]
    max_retries: Option<u32>,

    /// Backoff base between retries, in milliseconds
    #[arg(long, env = "JOBMARKET_RETRY_DELAY_MS", value_name = "MS", global = true)]
    retry_delay_ms: Option<u64>,

    /// Minimum delay between two requests, in milliseconds
    #[arg(long, env = "JOBMARKET_MIN_REQUEST_DELAY_MS", value_name = "MS", global = true)]
    min_delay_ms: Option<u64>,

    /// Log every request and response
    #[arg(
        long,
        short = 'd',
        env = "JOBMARKET_DEBUG",
        value_parser = clap::builder::BoolishValueParser::new(),
        global = true
    )]
    debug: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List offers
    List(ListArgs),

    /// Show one offer by id
    Get(GetArgs),

    /// List the tags usable as filters
    Tags,

    /// Count matching offers
    Count(FilterArgs),

    /// Print the public URL of an offer slug
    Url(UrlArgs),
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Only volunteer offers (true) or only paid ones (false)
    #[arg(long)]
    volunteer: Option<bool>,

    /// Tag id; repeat for several
    #[arg(long = "tag", value_name = "ID")]
    tags: Vec<String>,

    #[arg(long)]
    kind: Option<JobKind>,

    #[arg(long)]
    status: Option<JobStatus>,

    #[arg(long)]
    category: Option<JobCategory>,
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    filters: FilterArgs,

    /// Page to fetch (0-based)
    #[arg(long, allow_negative_numbers = true)]
    page: Option<i64>,

    /// Walk every page instead of fetching one
    #[arg(long)]
    all: bool,

    /// Stop after this many pages (with --all)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Delay between pages in milliseconds (with --all)
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    delay_ms: u64,
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    /// 24-character offer id
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(clap::Args, Debug)]
struct UrlArgs {
    #[arg(value_name = "SLUG")]
    slug: String,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.api_url {
            config = config.with_base_url(url.as_str());
        }
        if let Some(agent) = &self.user_agent {
            config = config.with_user_agent(agent.as_str());
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(n) = self.max_retries {
            config = config.with_max_retries(n);
        }
        if let Some(ms) = self.retry_delay_ms {
            config = config.with_retry_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.min_delay_ms {
            config = config.with_min_request_delay(Duration::from_millis(ms));
        }
        if self.debug {
            config = config.with_debug(true);
        }
        Ok(config)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "jobmarket=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Commands::Url(args) = &cli.command {
        println!("{}", build_job_url(args.slug.as_str()));
        return Ok(());
    }

    let client = JobMarketClient::new(cli.client_config()?)?;
    let mut query = client.query();

    match &cli.command {
        Commands::List(args) => {
            apply_filters(&mut query, &args.filters);
            if args.all {
                let delay = Duration::from_millis(args.delay_ms);
                let mut jobs = Box::pin(query.stream(delay, args.max_pages));
                while let Some(job) = jobs.next().await {
                    println!("{}", serde_json::to_string(&job?)?);
                }
            } else {
                if let Some(page) = args.page {
                    query.page(page);
                }
                let page = query.execute().await?;
                print_json(&serde_json::json!({
                    "results": page.jobs,
                    "pagination": page.pagination,
                }))?;
            }
        }
        Commands::Get(args) => match client.get_job(&args.id).await? {
            Some(job) => print_json(&job)?,
            None => anyhow::bail!("Job {} not found", args.id),
        },
        Commands::Tags => print_json(&client.list_tags().await?)?,
        Commands::Count(filters) => {
            apply_filters(&mut query, filters);
            println!("{}", query.count().await?);
        }
        Commands::Url(_) => unreachable!("handled before the client is built"),
    }

    Ok(())
}

fn apply_filters(query: &mut jobmarket::QueryBuilder<'_>, args: &FilterArgs) {
    if let Some(volunteer) = args.volunteer {
        query.volunteer(volunteer);
    }
    if !args.tags.is_empty() {
        query.tags(args.tags.iter().cloned());
    }
    if let Some(kind) = args.kind {
        query.kind(kind);
    }
    if let Some(status) = args.status {
        query.status(status);
    }
    if let Some(category) = args.category {
        query.category(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_list_parsing() {
        let cli = Cli::try_parse_from([
            "jobmarket",
            "list",
            "--category",
            "designer",
            "--volunteer",
            "true",
            "--tag",
            "a",
            "--tag",
            "b",
        ])
        .unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.filters.category, Some(JobCategory::Designer));
                assert_eq!(args.filters.volunteer, Some(true));
                assert_eq!(args.filters.tags, vec!["a", "b"]);
                assert!(!args.all);
                assert_eq!(args.delay_ms, 1000);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_list_all_parsing() {
        let cli =
            Cli::try_parse_from(["jobmarket", "list", "--all", "--max-pages", "2"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert!(args.all);
                assert_eq!(args.max_pages, Some(2));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "jobmarket",
            "tags",
            "--api-url",
            "http://localhost:9999",
            "--max-retries",
            "0",
            "-d",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(cli.max_retries, Some(0));
        assert!(cli.debug);

        let config = cli.client_config().unwrap();
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.max_retries, 0);
        assert!(config.debug);
    }

    #[test]
    fn test_cli_client_knobs() {
        let cli = Cli::try_parse_from([
            "jobmarket",
            "count",
            "--user-agent",
            "my-agent/1.0",
            "--retry-delay-ms",
            "250",
            "--timeout-ms",
            "1500",
            "--min-delay-ms",
            "0",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.user_agent, "my-agent/1.0");
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.min_request_delay, Duration::ZERO);
    }

    #[test]
    fn test_cli_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["jobmarket", "count", "--category", "astronaut"]).is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["jobmarket"]).is_err());
    }
}
