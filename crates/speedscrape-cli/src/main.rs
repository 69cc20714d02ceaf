//! CLI entry point - the composition root.
//!
//! Command dispatch routes to handlers which delegate to the crawler via
//! `CliContext`. No adapter is constructed outside of bootstrap.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use speedscrape_browser::BrowserKind;
use speedscrape_cli::{Cli, CliConfig, CliCrawlEmitter, Commands, CrawlArgs, bootstrap, handlers};
use speedscrape_core::NoopCrawlEmitter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Dispatch to appropriate handler
    let Some(command) = cli.command else {
        // No command provided - show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Crawl(args) => {
            let config = crawl_config(&cli.output_dir, &args)?;
            let ctx = bootstrap(config, Arc::new(CliCrawlEmitter::new()))?;
            handlers::crawl::execute(&ctx).await?;
        }
        Commands::Status => {
            let ctx = bootstrap(CliConfig::new(&cli.output_dir), Arc::new(NoopCrawlEmitter))?;
            handlers::status::execute(&ctx).await?;
        }
        Commands::Reset { force } => {
            let ctx = bootstrap(CliConfig::new(&cli.output_dir), Arc::new(NoopCrawlEmitter))?;
            handlers::reset::execute(&ctx, force).await?;
        }
        Commands::Paths => {
            let ctx = bootstrap(CliConfig::new(&cli.output_dir), Arc::new(NoopCrawlEmitter))?;
            handlers::paths::execute(&ctx)?;
        }
    }

    Ok(())
}

/// Initialize logging. `RUST_LOG` wins over the verbose flag.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "debug,thirtyfour=warn,hyper=warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Translate crawl command-line arguments into a bootstrap config.
fn crawl_config(output_dir: &str, args: &CrawlArgs) -> anyhow::Result<CliConfig> {
    if !args.delay.is_finite() || args.delay < 0.0 {
        anyhow::bail!("delay must be a non-negative number of seconds");
    }
    let kind = BrowserKind::parse(&args.browser).with_context(|| {
        format!(
            "unknown browser '{}', expected edge, chrome or firefox",
            args.browser
        )
    })?;

    let mut config = CliConfig::new(output_dir);

    config.crawl = config
        .crawl
        .with_concurrency(args.concurrency)
        .with_delay(Duration::from_secs_f64(args.delay));
    if let Some(pages) = args.pages {
        config.crawl = config.crawl.with_max_pages(pages);
    }
    if args.no_resume {
        config.crawl = config.crawl.without_resume();
    }

    config.browser = config
        .browser
        .with_webdriver_url(&args.webdriver_url)
        .with_kind(kind)
        .with_headless(!args.headful);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CrawlArgs {
        let mut argv = vec!["speedscrape", "crawl"];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        let Some(Commands::Crawl(args)) = cli.command else {
            panic!("expected crawl command");
        };
        args
    }

    #[test]
    fn flags_reach_the_crawl_config() {
        let args = args(&["--pages", "3", "--concurrency", "8", "--delay", "2", "--no-resume"]);
        let config = crawl_config("out", &args).unwrap();

        assert_eq!(config.crawl.max_pages, Some(3));
        assert_eq!(config.crawl.concurrency, 8);
        assert_eq!(config.crawl.delay, Duration::from_secs(2));
        assert!(!config.crawl.resume);
        assert_eq!(config.crawl.output_dir, std::path::PathBuf::from("out"));
    }

    #[test]
    fn headful_and_browser_reach_the_browser_config() {
        let args = args(&["--headful", "--browser", "chromium"]);
        let config = crawl_config("out", &args).unwrap();

        assert!(!config.browser.headless);
        assert_eq!(config.browser.kind, BrowserKind::Chrome);
    }

    #[test]
    fn unknown_browser_is_rejected() {
        let args = args(&["--browser", "safari"]);
        assert!(crawl_config("out", &args).is_err());
    }

    #[test]
    fn negative_delay_is_rejected() {
        let args = args(&["--delay=-1"]);
        assert!(crawl_config("out", &args).is_err());
    }
}
