use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::AppContext;

#[derive(Parser)]
#[command(name = "datahub")]
#[command(about = "DataHub CLI - browse the open-data catalog and manage your session", long_about = None)]
struct Cli {
    /// Directory holding config.toml and tokens.toml (defaults to ~/.config/datahub)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the token pair
    Login { username: String, password: String },
    /// Forget the stored tokens
    Logout,
    /// Create an account (does not log in)
    Register {
        username: String,
        password: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the current user's profile
    Whoami,
    /// Update email and/or phone number
    UpdateProfile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change the account password
    Passwd { old: String, new: String },
    /// Exchange the refresh token for a new access token
    Refresh,
    /// List datasets
    Datasets {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        license: Option<String>,
        /// Repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show one dataset
    Dataset { id: String },
    /// List resources
    Resources {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Statistics over one page of datasets
    Stats {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Interactive search: each input line is a query, debounced
    Search,
    /// Run a raw GraphQL query
    Graphql { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datahub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::build(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, &username, &password).await?
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Register {
            username,
            password,
            email,
            phone,
        } => {
            commands::auth::register(&ctx, &username, &password, email.as_deref(), phone.as_deref())
                .await?
        }
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::UpdateProfile { email, phone } => {
            commands::auth::update_profile(&ctx, email.as_deref(), phone.as_deref()).await?
        }
        Commands::Passwd { old, new } => commands::auth::change_password(&ctx, &old, &new).await?,
        Commands::Refresh => commands::auth::refresh(&ctx).await?,
        Commands::Datasets {
            page,
            search,
            org,
            license,
            tags,
        } => {
            let filters = commands::catalog::filters(org, license, tags);
            commands::catalog::datasets(&ctx, page, search.as_deref(), &filters).await?
        }
        Commands::Dataset { id } => commands::catalog::dataset(&ctx, &id).await?,
        Commands::Resources { page } => commands::catalog::resources(&ctx, page).await?,
        Commands::Stats { page } => commands::catalog::stats(&ctx, page).await?,
        Commands::Search => commands::catalog::search(&ctx).await?,
        Commands::Graphql { query } => commands::catalog::graphql(&ctx, &query).await?,
    }

    Ok(())
}
