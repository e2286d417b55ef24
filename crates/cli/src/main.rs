use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use vitrine_app::modules::products::{
    commands::{CreateProductCommand, RemoveProductCommand, UpdateProductCommand},
    handlers::ProductHandlers,
    models::ProductView,
    repository::{product_repository, title_index},
};
use vitrine_db::{Filter, Repository};
use vitrine_kernel::{dispatch, settings::Settings};

/// Operate the vitrine product catalog.
#[derive(Debug, Parser)]
#[command(name = "vitrine-cli", version)]
struct Cli {
    /// Snapshot file to use instead of the configured `database.path`
    #[arg(long, global = true, env = "VITRINE_DATABASE__PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Print the resolved settings
    Settings,
    /// Run product commands directly against the store
    #[command(subcommand)]
    Products(ProductCommand),
}

#[derive(Debug, Subcommand)]
enum ProductCommand {
    Create(CreateArgs),
    Remove {
        #[arg(long)]
        title: String,
    },
    Update(UpdateArgs),
    List,
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, allow_negative_numbers = true)]
    price: f64,
    #[arg(long)]
    active: bool,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    price: Option<f64>,
    #[arg(long)]
    active: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load vitrine settings")?;
    if let Some(db) = cli.db {
        settings.database.path = Some(db);
    }
    vitrine_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => vitrine_app::run(settings).await,
        Command::Settings => {
            println!("{:#?}", settings);
            Ok(())
        }
        Command::Products(command) => run_product_command(&settings, command).await,
    }
}

async fn run_product_command(settings: &Settings, command: ProductCommand) -> anyhow::Result<()> {
    let store = vitrine_app::open_store(&settings.database).await?;
    store
        .ensure_index(title_index())
        .await
        .context("failed to ensure product title index")?;
    let handlers = ProductHandlers::new(
        product_repository(store),
        settings.products.update_mode,
    );

    let output = match command {
        ProductCommand::Create(args) => {
            let command = CreateProductCommand {
                title: args.title,
                description: args.description,
                price: args.price,
                active: args.active,
            };
            serde_json::to_value(dispatch(handlers.create.as_ref(), command).await)?
        }
        ProductCommand::Remove { title } => {
            let command = RemoveProductCommand { title };
            serde_json::to_value(dispatch(handlers.remove.as_ref(), command).await)?
        }
        ProductCommand::Update(args) => {
            let command = UpdateProductCommand {
                id: args.id,
                title: args.title,
                description: args.description,
                price: args.price,
                active: args.active,
            };
            serde_json::to_value(dispatch(handlers.update.as_ref(), command).await)?
        }
        ProductCommand::List => {
            let products = handlers.repository.filter_by(&Filter::All).await?;
            let views: Vec<ProductView> = products.iter().map(ProductView::from).collect();
            serde_json::to_value(views)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
