//! Vitrine CLI - the storefront in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! vitrine products --search shirt --max-price 200
//! vitrine product 12
//! vitrine featured
//! vitrine categories
//! vitrine category 1
//!
//! # Cart and favorites (persisted in $VITRINE_DATA_DIR)
//! vitrine cart add 12 --quantity 2
//! vitrine cart dec 12
//! vitrine cart show
//! vitrine favorites toggle 12
//! vitrine favorites list
//!
//! # Account
//! vitrine register --name "Jane Doe" --email jane@example.com --password secret1
//! vitrine login --email jane@example.com --password secret1
//! vitrine account
//! vitrine logout
//! ```
//!
//! Configuration comes from the environment (and `.env`); see
//! `vitrine_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_core::{CategoryId, ProductId};
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::error::AppError;
use vitrine_storefront::notify::SharedNotifier;
use vitrine_storefront::state::AppState;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront")]
struct Cli {
    /// Directory holding the cart, favorites and session token
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered
    Products {
        /// Only products of this category
        #[arg(short, long)]
        category: Option<i32>,

        /// Case-insensitive text to look for in titles and descriptions
        #[arg(short, long)]
        search: Option<String>,

        /// Lowest price to include
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Highest price to include
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Show one product
    Product {
        id: i32,
    },
    /// Show the featured products
    Featured,
    /// List categories
    Categories,
    /// List the products of a category
    Category {
        id: i32,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// At least 6 characters
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user's dashboard
    Account,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its order summary
    Show,
    /// Add a product
    Add {
        id: i32,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove {
        id: i32,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        id: i32,
        quantity: u32,
    },
    /// Add one unit to a line
    Inc {
        id: i32,
    },
    /// Take one unit off a line (removes it at 1)
    Dec {
        id: i32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite products
    List,
    /// Flip a product's favorite flag
    Toggle {
        id: i32,
    },
    /// Mark a product as favorite
    Add {
        id: i32,
    },
    /// Unmark a product
    Remove {
        id: i32,
    },
    /// Remove every favorite
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Logs go to stderr; stdout is reserved for command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_storefront=warn,vitrine_cli=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::failure(&AppError::from(e).user_message());
            return ExitCode::FAILURE;
        }
    };
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let notifier: SharedNotifier = Arc::new(output::ConsoleNotifier);
    let result = match AppState::new(config, notifier) {
        Ok(mut state) => run(cli.command, &mut state).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::failure(&e.report());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, state: &mut AppState) -> Result<(), AppError> {
    match command {
        Commands::Products {
            category,
            search,
            min_price,
            max_price,
        } => {
            commands::catalog::products(
                state,
                category.map(CategoryId::new),
                search,
                min_price,
                max_price,
            )
            .await?;
        }
        Commands::Product { id } => commands::catalog::product(state, ProductId::new(id)).await?,
        Commands::Featured => commands::catalog::featured(state).await?,
        Commands::Categories => commands::catalog::categories(state).await?,
        Commands::Category { id } => {
            commands::catalog::category(state, CategoryId::new(id)).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state),
            CartAction::Add { id, quantity } => {
                commands::cart::add(state, ProductId::new(id), quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(state, ProductId::new(id))?,
            CartAction::Set { id, quantity } => {
                commands::cart::set(state, ProductId::new(id), quantity)?;
            }
            CartAction::Inc { id } => commands::cart::increment(state, ProductId::new(id))?,
            CartAction::Dec { id } => commands::cart::decrement(state, ProductId::new(id))?,
            CartAction::Clear => commands::cart::clear(state)?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(state).await?,
            FavoritesAction::Toggle { id } => {
                commands::favorites::toggle(state, ProductId::new(id)).await?;
            }
            FavoritesAction::Add { id } => commands::favorites::add(state, ProductId::new(id))?,
            FavoritesAction::Remove { id } => {
                commands::favorites::remove(state, ProductId::new(id))?;
            }
            FavoritesAction::Clear => commands::favorites::clear(state)?,
        },
        Commands::Login { email, password } => {
            commands::account::login(state, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(state, &name, &email, password).await?,
        Commands::Logout => commands::account::logout(state)?,
        Commands::Account => commands::account::dashboard(state).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_cart_add_with_default_quantity() {
        let cli = Cli::try_parse_from(["vitrine", "cart", "add", "7"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Add { id: 7, quantity: 1 }
            }
        ));
    }

    #[test]
    fn test_parses_price_filters() {
        let cli = Cli::try_parse_from([
            "vitrine",
            "products",
            "--search",
            "shirt",
            "--max-price",
            "199.90",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Products {
            search, max_price, ..
        } = cli.command
        else {
            panic!("expected products command");
        };
        assert_eq!(search.as_deref(), Some("shirt"));
        assert_eq!(max_price, Some(Decimal::new(19_990, 2)));
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["vitrine", "cart", "show", "--data-dir", "/tmp/v"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/v")));
    }
}
