use chrono::Local;
use clap::{Parser, Subcommand};
use colored::*;
use eyre::{Context, Result};
use hwtrack::{Config, Element, ElementState, ElementType, Lesson, NewElement, Store};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hwtrack")]
#[command(about = "Homework tracker - token-scoped tasks ordered by deadline")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema if missing
    Init,

    /// Register a new account and print its token
    Register { username: String, password: String },

    /// Print the token for an account
    Login { username: String, password: String },

    /// Check whether a token is valid
    Valid {
        #[arg(long)]
        token: Option<String>,
    },

    /// Add an element
    Add {
        #[arg(long)]
        token: String,

        /// homework, kartk (quiz) or sprawdz (test)
        #[arg(long = "type")]
        kind: ElementType,

        #[arg(long)]
        lesson: Lesson,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        #[arg(long)]
        comment: Option<String>,

        #[arg(long, default_value = "work")]
        state: ElementState,
    },

    /// List elements in display order
    List {
        #[arg(long)]
        token: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Mark an element as work or done
    SetState {
        #[arg(long)]
        token: String,
        id: i64,
        state: ElementState,
    },

    /// Delete an element
    Delete {
        #[arg(long)]
        token: String,
        id: i64,
    },

    /// Delete an account and all of its elements
    DeleteAccount {
        username: String,
        password: String,
        #[arg(long)]
        token: String,
    },
}

fn setup_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.log_level()?
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_element(element: &Element) {
    let kind = match element.kind {
        ElementType::Test => element.kind.as_str().red().bold(),
        ElementType::Quiz => element.kind.as_str().yellow(),
        ElementType::Homework => element.kind.as_str().normal(),
    };
    let line = format!(
        "#{:<5} {}  {:<9} {:<22} {}",
        element.id,
        element.date,
        kind,
        element.lesson.as_str(),
        element.comment.as_deref().unwrap_or("")
    );

    match element.state {
        ElementState::Work => println!("{}", line),
        ElementState::Done => println!("{}", line.dimmed()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(&cli, &config)?;

    let db_path = cli.db.clone().unwrap_or_else(|| config.database.clone());
    let store = Store::open(&db_path).context(format!("Failed to open store at {}", db_path.display()))?;

    match cli.command {
        Commands::Init => {
            store.initialize()?;
            println!("Database ready at {}", db_path.display());
        }
        Commands::Register { username, password } => {
            let token = store.register_user(&username, &password)?;
            println!("{}", token);
        }
        Commands::Login { username, password } => {
            let token = store.token_for_credentials(&username, &password)?;
            println!("{}", token);
        }
        Commands::Valid { token } => {
            if store.is_token_valid(token.as_deref())? {
                println!("{}", "valid".green());
            } else {
                println!("{}", "invalid".red());
                std::process::exit(1);
            }
        }
        Commands::Add {
            token,
            kind,
            lesson,
            date,
            comment,
            state,
        } => {
            let element = NewElement {
                kind,
                lesson,
                date,
                comment,
                state,
            };
            element.validate_date()?;
            let id = store.add_element(&element, &token)?;
            println!("Added element #{}", id);
        }
        Commands::List { token, json } => {
            let today = Local::now().date_naive();
            let elements = store.sorted_elements_for_token(&token, today, config.urgency_window_days)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&elements)?);
            } else if elements.is_empty() {
                println!("{}", "Nothing to do".green());
            } else {
                for element in &elements {
                    print_element(element);
                }
            }
        }
        Commands::SetState { token, id, state } => {
            store.change_element_state(state, id, &token)?;
            println!("Element #{} is now {}", id, state);
        }
        Commands::Delete { token, id } => {
            store.delete_element(&token, id)?;
            println!("Deleted element #{}", id);
        }
        Commands::DeleteAccount {
            username,
            password,
            token,
        } => {
            store.delete_account(&username, &password, &token)?;
            println!("Account {} deleted", username);
        }
    }

    Ok(())
}
