use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wealth_advisor::api::{AppState, run_http_server};
use wealth_advisor::clients::{GeminiClient, Summarizer, http_client};
use wealth_advisor::config::AppConfig;
use wealth_advisor::core::{Advisor, ProfileRequest, ask, recommend};

#[derive(Parser, Debug)]
#[command(
    name = "wealth-advisor",
    about = "Equity/debt/gold allocation advice by goal or age bracket"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard and JSON API
    Serve {
        #[arg(long, env = "ADVISOR_PORT")]
        port: Option<u16>,
    },
    /// Print an allocation for a profile
    Recommend {
        #[arg(long)]
        age: u32,
        #[arg(long, help = "Monthly income in rupees")]
        income: f64,
        #[arg(long, default_value = "Salaried")]
        profession: String,
        #[arg(long, default_value = "Metro")]
        region: String,
        #[arg(long, help = "Goal label; omit to allocate by age bracket")]
        goal: Option<String>,
        #[arg(long, help = "Append fund NAVs and stock quotes")]
        enrich: bool,
    },
    /// Search mutual fund schemes by name
    Funds {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Ask the language model a question
    Ask { question: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wealth_advisor=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let advisor = Advisor::from_config(&config)?;

    match cli.command {
        Command::Serve { port } => {
            let summarizer = summarizer(&config)?;
            if summarizer.is_none() {
                tracing::warn!("GEMINI_API_KEY not set; AI summary endpoints are disabled");
            }
            let state = AppState {
                advisor,
                summarizer,
            };
            run_http_server(state, port.unwrap_or(config.port)).await?;
        }
        Command::Recommend {
            age,
            income,
            profession,
            region,
            goal,
            enrich,
        } => {
            let profile = ProfileRequest {
                age: Some(age),
                monthly_income: Some(income),
                profession: Some(profession),
                region: Some(region),
                goal,
            }
            .validate()?;

            let allocation = recommend(&profile);
            let advice = if enrich {
                advisor.enrich(allocation).await.allocation.advice_text
            } else {
                allocation.advice_text
            };
            print!("{advice}");
        }
        Command::Funds { query, limit } => {
            for fund in advisor.search_funds(&query).await.into_iter().take(limit) {
                match fund.scheme_code {
                    Some(code) => println!("{code}\t{}", fund.scheme_name),
                    None => println!("{}", fund.scheme_name),
                }
            }
        }
        Command::Ask { question } => {
            let summarizer = summarizer(&config)?
                .ok_or("GEMINI_API_KEY is not configured")?;
            println!("{}", ask(summarizer.as_ref(), &question).await?);
        }
    }

    Ok(())
}

fn summarizer(config: &AppConfig) -> wealth_advisor::Result<Option<Arc<dyn Summarizer>>> {
    let Some(api_key) = config.gemini_api_key.clone() else {
        return Ok(None);
    };
    let client = GeminiClient::new(
        http_client(config)?,
        &config.gemini_base_url,
        api_key,
        &config.gemini_model,
    );
    Ok(Some(Arc::new(client)))
}
