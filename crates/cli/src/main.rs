//! Pickup storefront CLI - Database migrations and location maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! pickup-cli migrate
//!
//! # List recorded pickup locations with order counts
//! pickup-cli locations list
//!
//! # Correct the pickup location on one order
//! pickup-cli locations set 42 "Harbor Depot"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use pickup_core::OrderId;

mod commands;

#[derive(Parser)]
#[command(name = "pickup-cli")]
#[command(author, version, about = "Pickup storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect or correct pickup locations
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },
}

#[derive(Subcommand)]
enum LocationsAction {
    /// List recorded pickup locations, most used first
    List,
    /// Set the pickup location on an order
    Set {
        /// Order number
        order_id: OrderId,

        /// New pickup location
        location: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Locations { action } => match action {
            LocationsAction::List => commands::locations::list().await,
            LocationsAction::Set { order_id, location } => {
                commands::locations::set(order_id, &location).await
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_locations_set() {
        let cli = Cli::try_parse_from(["pickup-cli", "locations", "set", "42", "Harbor Depot"])
            .unwrap();

        match cli.command {
            Commands::Locations {
                action: LocationsAction::Set { order_id, location },
            } => {
                assert_eq!(order_id, OrderId::new(42));
                assert_eq!(location, "Harbor Depot");
            }
            _ => panic!("expected locations set"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_order_id() {
        assert!(Cli::try_parse_from(["pickup-cli", "locations", "set", "abc", "X"]).is_err());
    }
}
