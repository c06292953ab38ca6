//! agri - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use agri_advisor::{
    cli::{Args, Commands, ThemeChoice},
    config::Config,
    execution::Advisor,
    repl::{self, display, ReplSession},
    session::{SessionIdentity, Theme},
    store::{FileStore, KeyValueStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), msg);
        std::process::exit(2);
    }

    telemetry::init_logging(args.verbosity());

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    args.apply_overrides(&mut config);

    let store = match &args.store {
        Some(path) => FileStore::new(path),
        None => FileStore::default_location()?,
    };
    tracing::debug!(store = %store.path().display(), config = %config_path.display(), "Loaded settings");
    let store: Arc<dyn KeyValueStore> = Arc::new(store);

    match &args.command {
        Some(Commands::Start) => {
            let mut advisor = Advisor::new(config, store, args.verbosity())?;
            ReplSession::new(&mut advisor, repl::default_history_path())?
                .run()
                .await?;
        }
        Some(Commands::Clear { forget }) => {
            let advisor = Advisor::new(config, store, args.verbosity())?;
            clear_history(&advisor, *forget).await?;
        }
        Some(Commands::Session) => {
            println!("{}", SessionIdentity::resolve(store.as_ref())?);
        }
        Some(Commands::Theme { choice }) => {
            set_theme(store.as_ref(), *choice)?;
        }
        Some(Commands::Config) => {
            show_config(&config, &config_path)?;
        }
        Some(Commands::Doctor) => {
            let advisor = Advisor::new(config, store, args.verbosity())?;
            run_doctor(&advisor).await?;
        }
        None => {
            if let Some(question) = &args.question {
                let mut advisor = Advisor::new(config, store, args.verbosity())?;
                ask_once(&mut advisor, question, args.crop.as_deref()).await?;
            } else {
                println!("agri - Agricultural advisor in your terminal");
                println!("\nUsage:");
                println!("  agri <question> [-l <location>]   Ask one question");
                println!("  agri start                        Interactive mode");
                println!("  agri clear [--forget]             Clear conversation history");
                println!("  agri session                      Show session id");
                println!("  agri theme [dark|light|toggle]    Show or set theme");
                println!("  agri config                       Show configuration");
                println!("  agri doctor                       Check API reachability");
                println!("\nExample:");
                println!("  agri -l \"Karnal, Haryana\" \"How do I control stem borer in paddy organically?\"");
                println!();
            }
        }
    }

    Ok(())
}

async fn ask_once(advisor: &mut Advisor, question: &str, crop: Option<&str>) -> Result<()> {
    match advisor.ask(question, crop).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            eprintln!("Nothing to ask: the question is empty.");
            std::process::exit(2);
        }
        // Already rendered by the reply renderer
        Err(e) if e.is_transport() => std::process::exit(1),
        Err(e) => Err(e.into()),
    }
}

async fn clear_history(advisor: &Advisor, forget: bool) -> Result<()> {
    let theme = advisor.theme();

    match advisor.clear_history(forget).await? {
        Some(session_id) => {
            display::show_info(&format!("Cleared conversation history for {}", session_id), theme);
            if forget {
                display::show_info("Local session id removed; the next question starts a new session", theme);
            }
        }
        None => display::show_info("No session yet, nothing to clear.", theme),
    }

    Ok(())
}

fn set_theme(store: &dyn KeyValueStore, choice: Option<ThemeChoice>) -> Result<()> {
    let current = Theme::load(store)?;

    let next = match choice {
        None => {
            println!("{}", current);
            return Ok(());
        }
        Some(ThemeChoice::Dark) => Theme::Dark,
        Some(ThemeChoice::Light) => Theme::Light,
        Some(ThemeChoice::Toggle) => current.toggled(),
    };

    next.save(store).context("Failed to save theme")?;
    println!("{}", next);
    Ok(())
}

fn show_config(config: &Config, config_path: &std::path::Path) -> Result<()> {
    println!("Configuration ({})\n", config_path.display());

    println!("API:");
    println!("  Base URL:        {}", config.api.base_url);
    println!("  Connect timeout: {}s", config.api.connect_timeout_secs);
    println!();

    println!("Defaults:");
    println!("  Location:        {}", config.defaults.location);
    println!();

    Ok(())
}

async fn run_doctor(advisor: &Advisor) -> Result<()> {
    let base = &advisor.config().api.base_url;
    println!("Checking {} ...", base);

    if advisor.health_check().await? {
        println!("{} Advisory API is reachable", "✓".green());
        Ok(())
    } else {
        println!("{} Advisory API is not reachable", "✗".red());
        std::process::exit(1);
    }
}
