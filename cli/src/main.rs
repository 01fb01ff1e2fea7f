mod client;
mod commands;
mod config;
mod logging;
mod server;
mod views;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use crate::client::RecipeClient;
use crate::commands::{
    cmd_add, cmd_categories, cmd_delete, cmd_edit, cmd_favorite_add, cmd_favorite_list,
    cmd_favorite_remove, cmd_list, cmd_show,
};
use crate::config::Config;
use crate::views::FormInput;
use recipebox_core::listing::ListCriteria;
use recipebox_core::service::RecipeService;

#[derive(Parser)]
#[command(
    name = "recipebox",
    version,
    about = "Manage recipes: a small REST service and a client for it"
)]
struct Cli {
    /// Base URL of the recipe service
    #[arg(
        long,
        global = true,
        env = "RECIPEBOX_URL",
        default_value = "http://localhost:5000"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ListFilters {
    /// Keep recipes whose name or an ingredient contains this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    search: String,
    /// Keep recipes in exactly this category
    #[arg(short, long, default_value = "")]
    category: String,
    /// Newest first
    #[arg(long)]
    sort_by_date: bool,
}

impl From<ListFilters> for ListCriteria {
    fn from(f: ListFilters) -> Self {
        ListCriteria::new(f.search, f.category, f.sort_by_date)
    }
}

#[derive(Args)]
struct FormFields {
    /// Recipe name
    #[arg(short, long)]
    name: Option<String>,
    /// Comma-separated ingredients (e.g. "tomato, basil")
    #[arg(short, long)]
    ingredients: Option<String>,
    /// Preparation instructions
    #[arg(long)]
    instructions: Option<String>,
    /// Category (e.g. Dinner)
    #[arg(short, long)]
    category: Option<String>,
}

impl From<FormFields> for FormInput {
    fn from(f: FormFields) -> Self {
        FormInput {
            name: f.name,
            ingredients: f.ingredients,
            instructions: f.instructions,
            category: f.category,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "5000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Database file (default: recipebox.db in the data directory)
        #[arg(long, env = "RECIPEBOX_DB", value_name = "PATH")]
        db: Option<PathBuf>,
    },
    #[command(flatten)]
    Client(ClientCommands),
}

/// Commands that talk to a running server and the local favorites store.
#[derive(Subcommand)]
enum ClientCommands {
    /// List recipes
    List {
        #[command(flatten)]
        filters: ListFilters,
        /// List favorites instead of the live recipes
        #[arg(long)]
        favorites_only: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the categories available for filtering
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one recipe
    Show {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a recipe
    Add {
        #[command(flatten)]
        fields: FormFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a recipe; fields not given keep their current value
    Edit {
        /// Recipe ID
        id: String,
        #[command(flatten)]
        fields: FormFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe
    Delete {
        /// Recipe ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage favorite recipes (kept locally)
    Favorite {
        #[command(subcommand)]
        command: FavoriteCommands,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// Save a snapshot of a recipe to favorites
    Add {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from favorites
    Remove {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List favorite recipes
    List {
        #[command(flatten)]
        filters: ListFilters,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let level = if matches!(cli.command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    };
    logging::init(level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, bind, db } => {
            let db_path = db.unwrap_or(config.db_path);
            tracing::info!("Using database {}", db_path.display());
            let service = RecipeService::new(&db_path)?;
            server::start_server(service, port, &bind).await
        }
        Commands::Client(command) => run_client(command, &cli.server, &config).await,
    }
}

async fn run_client(command: ClientCommands, server: &str, config: &Config) -> Result<()> {
    let client = RecipeClient::new(server)?;
    let mut favorites = config.favorites()?;

    match command {
        ClientCommands::List {
            filters,
            favorites_only,
            json,
        } => cmd_list(&client, &favorites, filters.into(), favorites_only, json).await,
        ClientCommands::Categories { json } => cmd_categories(&client, json).await,
        ClientCommands::Show { id, json } => cmd_show(&client, &favorites, &id, json).await,
        ClientCommands::Add { fields, json } => cmd_add(&client, fields.into(), json).await,
        ClientCommands::Edit { id, fields, json } => cmd_edit(&client, &id, fields.into(), json).await,
        ClientCommands::Delete { id, yes, json } => {
            cmd_delete(&client, &id, yes, json, io::stdin().lock()).await
        }
        ClientCommands::Favorite { command } => match command {
            FavoriteCommands::Add { id, json } => {
                cmd_favorite_add(&client, &mut favorites, &id, json)
                    .await
                    .map(|_| ())
            }
            FavoriteCommands::Remove { id, json } => cmd_favorite_remove(&mut favorites, &id, json),
            FavoriteCommands::List { filters, json } => {
                cmd_favorite_list(&favorites, filters.into(), json)
            }
        },
    }
}
