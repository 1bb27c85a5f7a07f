mod workflow;

use clap::{Parser, Subcommand};
use mony_channels::telegram::{InteractiveSelectionEngine, RateGate};
use mony_core::config::{self, Config};
use mony_memory::Store;
use mony_providers::openai::OpenAiProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use workflow::{Workflow, WorkflowOutcome, WorkflowSettings};

#[derive(Parser)]
#[command(
    name = "mony",
    version,
    about = "Mony: bank alerts from your inbox, categorized over Telegram"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the next unseen email for one user.
    Run {
        user_id: String,
    },
    /// Process every connected user on an interval until interrupted.
    Watch,
    /// Ask a Telegram chat a question and print the answer as JSON.
    Ask {
        chat_id: String,
        /// The question to show.
        prompt: String,
        /// Button label; repeat for more. Without any, waits for free text.
        #[arg(short, long = "option")]
        options: Vec<String>,
        /// Seconds to wait for an answer.
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
    /// Link a user to the Telegram chat category prompts are sent to.
    LinkTelegram { user_id: String, chat_id: String },
    /// Store a user's Google OAuth tokens.
    LinkGoogle {
        user_id: String,
        access_token: String,
        refresh_token: String,
    },
    /// Add (or with --remove, deactivate) a spending category.
    AddCategory {
        user_id: String,
        name: String,
        #[arg(long)]
        remove: bool,
    },
    /// Show configuration and, for a user, their links and recent runs.
    Status { user_id: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.mony.log_level)),
        )
        .init();

    match cli.command {
        Commands::Run { user_id } => {
            cfg.require_pipeline()?;
            let store = Store::new(&cfg.memory).await?;
            let workflow = build_workflow(&cfg, store);
            let outcome = workflow.run_gmail(&user_id, &cfg.gmail).await?;
            println!("{outcome:?}");
            if let WorkflowOutcome::Failed { error, .. } = outcome {
                anyhow::bail!("workflow failed: {error}");
            }
        }
        Commands::Watch => {
            cfg.require_pipeline()?;
            let store = Store::new(&cfg.memory).await?;
            let workflow = Arc::new(build_workflow(&cfg, store.clone()));
            watch(&cfg, workflow, store).await?;
        }
        Commands::Ask {
            chat_id,
            prompt,
            options,
            timeout,
        } => {
            cfg.require_telegram()?;
            let engine = build_engine(&cfg);
            let timeout = Duration::from_secs(timeout);

            let answer = if options.is_empty() {
                engine
                    .ask_free_text(&chat_id, Some(prompt.as_str()), timeout)
                    .await
                    .map(serde_json::Value::String)
            } else {
                engine
                    .ask_selection_or_custom(
                        &chat_id,
                        &prompt,
                        &options,
                        timeout,
                        cfg.telegram.buttons_per_row,
                        cfg.telegram.parse_mode,
                    )
                    .await?
                    .map(serde_json::to_value)
                    .transpose()?
            };

            match answer {
                Some(value) => println!("{value}"),
                None => anyhow::bail!("no answer within {}s", timeout.as_secs()),
            }
        }
        Commands::LinkTelegram { user_id, chat_id } => {
            let store = Store::new(&cfg.memory).await?;
            store.link_telegram(&user_id, &chat_id).await?;
            seed_categories(&store, &user_id).await?;
            println!("Linked {user_id} to Telegram chat {chat_id}");
        }
        Commands::LinkGoogle {
            user_id,
            access_token,
            refresh_token,
        } => {
            let store = Store::new(&cfg.memory).await?;
            store
                .save_google_tokens(&user_id, &access_token, &refresh_token)
                .await?;
            seed_categories(&store, &user_id).await?;
            println!("Stored Google tokens for {user_id}");
        }
        Commands::AddCategory {
            user_id,
            name,
            remove,
        } => {
            let store = Store::new(&cfg.memory).await?;
            if remove {
                if !store.deactivate_category(&user_id, &name).await? {
                    anyhow::bail!("{user_id} has no active category named '{name}'");
                }
                println!("Deactivated '{name}' for {user_id}");
            } else {
                store.add_category(&user_id, &name).await?;
                println!("Added '{name}' for {user_id}");
            }
        }
        Commands::Status { user_id } => {
            status(&cli.config, &cfg, user_id.as_deref()).await?;
        }
    }

    Ok(())
}

async fn seed_categories(store: &Store, user_id: &str) -> anyhow::Result<()> {
    let added = store.add_default_categories(user_id).await?;
    if added > 0 {
        println!("Added {added} default categories for {user_id}");
    }
    Ok(())
}

/// One engine per process: every interaction shares the same rate gate.
fn build_engine(cfg: &Config) -> Arc<InteractiveSelectionEngine> {
    let gate = Arc::new(RateGate::new(cfg.telegram.min_request_interval()));
    Arc::new(InteractiveSelectionEngine::from_config(&cfg.telegram, gate))
}

fn build_workflow(cfg: &Config, store: Store) -> Workflow {
    let provider = Arc::new(OpenAiProvider::new(&cfg.openai));
    let engine = if cfg.telegram.bot_token.is_empty() {
        warn!("telegram.bot_token is empty, categories will come from the model");
        None
    } else {
        Some(build_engine(cfg))
    };
    Workflow::new(provider, store, engine, WorkflowSettings::from(cfg))
}

/// Run every connected user each `interval_secs`, one task per user, until
/// Ctrl-C. A round finishes before the next one starts. The tasks share one
/// engine, so their Telegram prompts go out one at a time.
async fn watch(cfg: &Config, workflow: Arc<Workflow>, store: Store) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(cfg.watch.interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!("watching every {}s", cfg.watch.interval_secs);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }

        let users = match store.users_with_google().await {
            Ok(users) => users,
            Err(e) => {
                error!("failed to list users: {e}");
                continue;
            }
        };

        let mut round = JoinSet::new();
        for user_id in users {
            let workflow = workflow.clone();
            let gmail = cfg.gmail.clone();
            round.spawn(async move {
                if let Err(e) = workflow.run_gmail(&user_id, &gmail).await {
                    error!("[{user_id}] run aborted: {e}");
                }
            });
        }
        while let Some(joined) = round.join_next().await {
            if let Err(e) = joined {
                error!("workflow task panicked: {e}");
            }
        }
    }
    Ok(())
}

async fn status(config_path: &str, cfg: &Config, user_id: Option<&str>) -> anyhow::Result<()> {
    let configured = |s: &str| if s.is_empty() { "missing" } else { "configured" };

    println!("Mony Status Check\n");
    println!("Config: {config_path}");
    println!("Database: {}", cfg.memory.db_path);
    println!("  telegram bot token: {}", configured(&cfg.telegram.bot_token));
    println!("  openai api key: {}", configured(&cfg.openai.api_key));
    println!("  google client: {}", configured(&cfg.gmail.client_id));
    println!("  openai model: {}", cfg.openai.model);

    let Some(user_id) = user_id else {
        return Ok(());
    };
    let store = Store::new(&cfg.memory).await?;

    println!("\nUser {user_id}");
    println!(
        "  telegram chat: {}",
        store
            .telegram_chat_id(user_id)
            .await?
            .unwrap_or_else(|| "not linked".into())
    );
    println!(
        "  google: {}",
        if store.google_tokens(user_id).await?.is_some() {
            "linked"
        } else {
            "not linked"
        }
    );
    println!(
        "  categories: {}",
        store.active_categories(user_id).await?.join(", ")
    );
    println!(
        "  transactions: {}",
        store.transaction_count(user_id).await?
    );

    for run in store.recent_runs(user_id, 5).await? {
        println!(
            "  run {} {} {} {}",
            run.run_start,
            run.run_status.as_str(),
            run.email_message_id,
            run.error_message.as_deref().unwrap_or(&run.email_subject)
        );
    }
    Ok(())
}
