use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "federation-cli")]
#[command(about = "Query a trace federation server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3200")]
    url: String,

    /// Use the v2 API where one exists.
    #[arg(long, global = true)]
    v2: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a trace by ID
    Trace { id: String },
    /// Search traces, e.g. `search -q tags=service.name=api -q limit=5`
    Search {
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
    /// List tag names
    Tags,
    /// List values of a tag
    TagValues { tag: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let client = reqwest::Client::builder().default_headers(headers).build()?;

    let version: &[&str] = if cli.v2 { &["api", "v2"] } else { &["api"] };

    let mut url = Url::parse(&cli.url)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("cannot use '{}' as a base URL", cli.url))?;
        segments.pop_if_empty();
        match &cli.command {
            Commands::Trace { id } => {
                segments.extend(version).extend(["traces", id.as_str()]);
            }
            Commands::Search { .. } => {
                segments.extend(["api", "search"]);
            }
            Commands::Tags => {
                segments.extend(version).extend(["search", "tags"]);
            }
            Commands::TagValues { tag } => {
                segments
                    .extend(version)
                    .extend(["search", "tag", tag.as_str(), "values"]);
            }
        }
    }

    if let Commands::Search { query } = &cli.command {
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for pair in query {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))?;
                pairs.append_pair(key, value);
            }
        }
    }

    let res = client.get(url).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: federation API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
