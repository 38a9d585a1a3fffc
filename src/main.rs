use anyhow::{Context, Result};
use clap::Parser;
use headlines::config::{Config, API_KEY_ENV};
use headlines::news::{Article, Category, CategoryArticles, NewsClient, RequestBuilder};
use headlines::util::{sanitize_line, truncate_to_width};
use serde::Serialize;
use std::path::PathBuf;

/// Terminal columns used for article titles in text output
const TITLE_WIDTH: usize = 100;

/// Get the default config file path (~/.config/headlines/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("headlines")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "headlines",
    about = "Top headlines for every news category, fetched concurrently"
)]
struct Args {
    /// Fetch a single category (general, business, technology, entertainment, sports, science, health)
    #[arg(short, long, conflicts_with = "search")]
    category: Option<Category>,

    /// Search all articles instead of fetching headlines
    #[arg(short, long, value_name = "QUERY")]
    search: Option<String>,

    /// Articles shown per section (0 = all)
    #[arg(short, long, default_value_t = 5)]
    limit: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Config file (defaults to ~/.config/headlines/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only results
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let Some(api_key) = config.resolve_api_key(std::env::var(API_KEY_ENV).ok()) else {
        eprintln!("Error: No API key configured.");
        eprintln!();
        eprintln!("Set {API_KEY_ENV}, or add to {}:", config_path.display());
        eprintln!("  api_key = \"<your key>\"");
        std::process::exit(1);
    };

    let requests = RequestBuilder::new(&config.base_url, api_key, config.language.clone())
        .context("Invalid base_url in config")?;
    let http = reqwest::Client::builder()
        .user_agent(concat!("headlines/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let client = NewsClient::new(http, requests).with_auth_policy(config.auth_policy);

    if let Some(query) = &args.search {
        let articles = client
            .search(query)
            .await
            .with_context(|| format!("Search for '{query}' failed"))?;
        if args.json {
            print_json(&articles)?;
        } else {
            print_section(&format!("Search: {query}"), &articles, args.limit);
        }
        return Ok(());
    }

    if let Some(category) = args.category {
        let articles = client
            .fetch_category(category)
            .await
            .with_context(|| format!("Failed to fetch {category} headlines"))?;
        let section = CategoryArticles { category, articles };
        if args.json {
            print_json(&section)?;
        } else {
            print_section(category.display_name(), &section.articles, args.limit);
        }
        return Ok(());
    }

    let sections = client
        .fetch_all_categories()
        .await
        .context("Failed to fetch headlines")?;

    if args.json {
        print_json(&sections)?;
    } else if sections.is_empty() {
        eprintln!("No categories could be fetched. Run with RUST_LOG=headlines=warn for details.");
    } else {
        for section in &sections {
            print_section(section.category.display_name(), &section.articles, args.limit);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize results")?;
    println!("{json}");
    Ok(())
}

fn print_section(heading: &str, articles: &[Article], limit: usize) {
    println!("== {} ==", heading);
    if articles.is_empty() {
        println!("  (no articles)");
    }

    let shown = if limit == 0 { articles.len() } else { limit };
    for (i, article) in articles.iter().take(shown).enumerate() {
        let title = sanitize_line(&article.title);
        println!("{:>3}. {}", i + 1, truncate_to_width(&title, TITLE_WIDTH));
        println!("     {}", sanitize_line(&article.caption()));
        println!("     {}", sanitize_line(&article.url));
    }

    if articles.len() > shown {
        println!("     … {} more", articles.len() - shown);
    }
    println!();
}
