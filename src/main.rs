//! agentflow - LLM workflow patterns and market data agents
//!
//! Command-line entry point wiring configuration, a provider backend, and the
//! workflow or agent selected by the subcommand.

use agentflow::agents::email::{EmailAgent, MailIdentity, MailjetClient};
use agentflow::agents::price::{CoinGeckoClient, PriceAgent};
use agentflow::agents::search::{BraveSearchClient, SearchAgent};
use agentflow::agents::store::MemoryStore;
use agentflow::config::AppConfig;
use agentflow::llm::completion::{Completer, ModelSelection};
use agentflow::llm::provider::LlmProvider;
use agentflow::llm::providers::{AnthropicConfig, AnthropicProvider, OpenAiConfig, OpenAiProvider};
use agentflow::observability::init_default_logging;
use agentflow::workflow::evaluator::EvaluatorOptimizer;
use agentflow::workflow::orchestrator::Orchestrator;
use agentflow::workflow::router::Router;
use agentflow::workflow::sectioning::Sectioning;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

/// LLM workflow patterns and market data agents
#[derive(Parser)]
#[command(name = "agentflow")]
#[command(about = "LLM workflow patterns and market data agents")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a prompt and answer it on the matching branch
    Route {
        /// The prompt to route
        prompt: String,
    },
    /// Answer a prompt by fanning out to parallel section agents
    Section {
        /// The prompt to decompose into sections
        prompt: String,
    },
    /// Break a task into subtasks, run workers, and synthesize an answer
    Orchestrate {
        /// The task to orchestrate
        prompt: String,
    },
    /// Iteratively refine an artifact against evaluation criteria
    Refine {
        /// The generation task
        task: String,
        /// Criteria the artifact must satisfy
        #[arg(long)]
        criteria: String,
        /// Iteration budget
        #[arg(long, default_value_t = 3)]
        max_iterations: u32,
        /// Start from this artifact instead of generating one
        #[arg(long)]
        seed: Option<String>,
    },
    /// Fetch and record the current Bitcoin price
    Price,
    /// Search for market news and store the results
    News,
    /// Send the daily market update email
    Email,
    /// Run the full pipeline: fetch price, gather news, send the email
    Digest,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("Starting agentflow v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Route { prompt } => run_route(&config, &prompt).await,
        Commands::Section { prompt } => run_section(&config, &prompt).await,
        Commands::Orchestrate { prompt } => run_orchestrate(&config, &prompt).await,
        Commands::Refine {
            task,
            criteria,
            max_iterations,
            seed,
        } => run_refine(&config, &task, &criteria, max_iterations, seed).await,
        Commands::Price => run_price().await,
        Commands::News => run_news(&config).await,
        Commands::Email => run_email(&config).await,
        Commands::Digest => run_digest(&config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(AppConfig::load_from_file(path)?)
        }
        None => {
            let default_paths = vec!["agentflow.toml", "config/agentflow.toml"];

            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(AppConfig::load_from_file(&path)?);
                }
            }

            error!(
                "No configuration file found. Please provide one with -c/--config or create agentflow.toml"
            );
            process::exit(1);
        }
    }
}

/// Provider factory for creating LLM providers from configuration
fn create_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, Box<dyn std::error::Error>> {
    match config.llm.provider.as_str() {
        "openai" => {
            let api_key = config.get_llm_api_key()?;
            let provider = OpenAiProvider::new(OpenAiConfig {
                api_key,
                ..Default::default()
            })?;
            Ok(Arc::new(provider))
        }
        "anthropic" => {
            let api_key = config.get_llm_api_key()?;
            let provider = AnthropicProvider::new(AnthropicConfig {
                api_key,
                ..Default::default()
            })?;
            Ok(Arc::new(provider))
        }
        provider => Err(format!("Unsupported LLM provider: {provider}").into()),
    }
}

fn create_completer(config: &AppConfig) -> Result<Completer, Box<dyn std::error::Error>> {
    let provider = create_provider(config)?;
    let models = ModelSelection {
        fast: config.llm.fast_model.clone(),
        capable: config.llm.capable_model.clone(),
    };

    let mut completer = Completer::with_models(provider, models);
    if let Some(max_tokens) = config.llm.max_tokens {
        completer = completer.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = config.llm.temperature {
        completer = completer.with_temperature(temperature);
    }
    Ok(completer)
}

async fn run_route(config: &AppConfig, prompt: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::new(create_completer(config)?);
    match router.handle(prompt).await {
        Some(answer) => {
            println!("{answer}");
            Ok(())
        }
        None => Err("No response from routed branch".into()),
    }
}

async fn run_section(config: &AppConfig, prompt: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sectioning = Sectioning::new(create_completer(config)?);
    match sectioning.run(prompt).await {
        Some(answer) => {
            println!("{answer}");
            Ok(())
        }
        None => Err("No aggregated response produced".into()),
    }
}

async fn run_orchestrate(
    config: &AppConfig,
    prompt: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::new(create_completer(config)?);
    let answer = orchestrator.orchestrate(prompt).await;
    println!("{answer}");
    Ok(())
}

async fn run_refine(
    config: &AppConfig,
    task: &str,
    criteria: &str,
    max_iterations: u32,
    seed: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let workflow = EvaluatorOptimizer::new(create_completer(config)?);
    let result = workflow.run(task, criteria, max_iterations, seed).await;

    info!(
        iterations = result.iterations,
        passed = result.passed,
        "refinement finished"
    );
    println!("{}", result.final_result);
    Ok(())
}

async fn run_price() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let agent = PriceAgent::new(Arc::new(CoinGeckoClient::new()), store);

    let price = agent.fetch_and_store().await?;
    println!("The current BTC price is ${price}");
    Ok(())
}

async fn run_news(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let search_section = config
        .search
        .as_ref()
        .ok_or("Missing [search] section in configuration")?;
    let api_key = config.get_search_api_key()?;

    let provider = create_provider(config)?;
    let search = Arc::new(BraveSearchClient::new(api_key, search_section.result_count));
    let store = Arc::new(MemoryStore::new());

    let agent = SearchAgent::new(provider, search, store, config.llm.capable_model.clone());
    let articles = agent.find_and_store_news().await?;
    println!("Stored {} news articles", articles.len());
    Ok(())
}

async fn run_email(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let email_section = config
        .email
        .as_ref()
        .ok_or("Missing [email] section in configuration")?;
    let (api_key, api_secret) = config.get_mail_credentials()?;

    let identity = MailIdentity {
        sender_email: email_section.sender_email.clone(),
        sender_name: email_section.sender_name.clone(),
        recipient_email: email_section.recipient_email.clone(),
        recipient_name: email_section.recipient_name.clone(),
    };
    let mailer = Arc::new(MailjetClient::new(api_key, api_secret, identity));

    let provider = create_provider(config)?;
    let store = Arc::new(MemoryStore::new());

    let agent = EmailAgent::new(
        provider,
        store.clone(),
        store,
        mailer,
        config.llm.capable_model.clone(),
        email_section.recipient_name.clone(),
    );
    agent.send_market_update().await?;
    println!("Market update email sent");
    Ok(())
}

async fn run_digest(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let search_section = config
        .search
        .as_ref()
        .ok_or("Missing [search] section in configuration")?;
    let email_section = config
        .email
        .as_ref()
        .ok_or("Missing [email] section in configuration")?;
    let search_key = config.get_search_api_key()?;
    let (mail_key, mail_secret) = config.get_mail_credentials()?;

    let provider = create_provider(config)?;
    // One store backs all three stages so the email analyzes the data
    // gathered earlier in the same run
    let store = Arc::new(MemoryStore::new());

    let price_agent = PriceAgent::new(Arc::new(CoinGeckoClient::new()), store.clone());
    let price = price_agent.fetch_and_store().await?;
    println!("The current BTC price is ${price}");

    let search = Arc::new(BraveSearchClient::new(search_key, search_section.result_count));
    let search_agent = SearchAgent::new(
        provider.clone(),
        search,
        store.clone(),
        config.llm.capable_model.clone(),
    );
    let articles = search_agent.find_and_store_news().await?;
    println!("Stored {} news articles", articles.len());

    let identity = MailIdentity {
        sender_email: email_section.sender_email.clone(),
        sender_name: email_section.sender_name.clone(),
        recipient_email: email_section.recipient_email.clone(),
        recipient_name: email_section.recipient_name.clone(),
    };
    let mailer = Arc::new(MailjetClient::new(mail_key, mail_secret, identity));

    let email_agent = EmailAgent::new(
        provider,
        store.clone(),
        store,
        mailer,
        config.llm.capable_model.clone(),
        email_section.recipient_name.clone(),
    );
    email_agent.send_market_update().await?;
    println!("Market update email sent");
    Ok(())
}

fn handle_config_command(config: &AppConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
