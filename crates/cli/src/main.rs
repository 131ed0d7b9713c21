//! GoMarket cart CLI - inspect and edit the device-local cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart list
//!
//! # Add a product (merges with an existing line of the same id)
//! gm-cart add --id 1 --title "Camiseta" --image-url https://cdn.example/1.png --price 29.90
//!
//! # Change quantities
//! gm-cart increment 1
//! gm-cart decrement 1
//! ```
//!
//! # Environment Variables
//!
//! - `GOMARKET_STORAGE_KEY` - Key the cart is stored under
//! - `GOMARKET_DATA_DIR` - Directory holding the stored cart
//! - `RUST_LOG` - Log filter (default: `gm_cart=info,gomarket_cart=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use gomarket_core::{Price, ProductId};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "GoMarket cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart as JSON
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Display title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (e.g. 29.90)
        #[arg(long)]
        price: Price,
    },
    /// Add one unit to an existing line
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from an existing line (never below 1)
    Decrement {
        /// Product ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gm_cart=info,gomarket_cart=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::cart::CartCommandError> {
    let mut store = commands::cart::open_store().await?;

    match cli.command {
        Commands::List => {}
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&mut store, id, title, image_url, price).await?,
        Commands::Increment { id } => {
            commands::cart::increment(&mut store, &ProductId::new(id)).await?;
        }
        Commands::Decrement { id } => {
            commands::cart::decrement(&mut store, &ProductId::new(id)).await?;
        }
    }

    commands::cart::print(&store)
}
