use anyhow::Result;
use clap::Parser;
use log::{ debug, info };

use landreg::errors::{ RecoverableError, RegistryError };
use landreg::implementations::route_guard::Navigation;
use landreg::{ ClientConfig, RegistryClient };

mod cli;
use cli::{ Commands, LandregCli };

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command line arguments
    let cli = LandregCli::parse();

    // Setup logging
    setup_logging(&cli.log_level);

    if dotenv::dotenv().is_ok() {
        debug!("Loaded environment from .env");
    }

    let config = ClientConfig::load(cli.config.as_deref())?;
    let client = RegistryClient::from_config(config)?;

    let route = cli.command.route();
    if let Navigation::Redirect { from, .. } = client.guard().resolve(route.clone()) {
        cli::ui::print_warning(&format!("Sign in with `landreg login` to open {}", from));
        return Ok(());
    }

    if let Err(err) = run(&client, &cli.command).await {
        if let Some(registry_err) = err.downcast_ref::<RegistryError>() {
            if let Some(Navigation::Redirect { .. }) = client.guard().after_failure(route, registry_err) {
                cli::ui::print_error(&registry_err.to_string());
                cli::ui::print_info("Sign in again with `landreg login`");
                return Ok(());
            }
            if let Some(hint) = registry_err.recovery_strategy() {
                cli::ui::print_info(&hint);
            }
        }
        return Err(err);
    }
    Ok(())
}

async fn run(client: &RegistryClient, command: &Commands) -> Result<()> {
    match command {
        Commands::Login { demo, email } => {
            cli::commands::auth::login(client, *demo, email.as_deref()).await?;
        }
        Commands::Register => {
            cli::commands::auth::register(client).await?;
        }
        Commands::Logout => cli::commands::auth::logout(client),
        Commands::Whoami => cli::commands::auth::whoami(client),
        Commands::ForgotPassword { email } => {
            cli::commands::auth::forgot_password(client, email.as_deref()).await?;
        }
        Commands::Properties { status, property_type } => {
            cli::commands::properties::list(client, status.as_deref(), property_type.as_deref()).await?;
        }
        Commands::Show { id, verification } => {
            cli::commands::properties::show(client, id, *verification).await?;
        }
        Commands::Search { property_type, status, price, text, interactive } => {
            cli::commands::properties::search(
                client,
                property_type.as_deref(),
                status.as_deref(),
                price.as_deref(),
                text.as_deref(),
                *interactive
            ).await?;
        }
        Commands::RegisterProperty => {
            cli::commands::registration::execute(client).await?;
        }
        Commands::Transfer { property_id, signature } => {
            cli::commands::transfer::execute(client, property_id, signature.clone()).await?;
        }
        Commands::Transfers { id } => {
            cli::commands::properties::transfers(client, id.as_deref()).await?;
        }
        Commands::Verify { property_id, signature } => {
            cli::commands::verification::execute(client, property_id, signature.clone()).await?;
        }
        Commands::Dashboard => {
            cli::commands::dashboard::execute(client).await?;
        }
        Commands::Profile { edit } => {
            cli::commands::auth::profile(client, *edit).await?;
        }
        Commands::ChangePassword => {
            cli::commands::auth::change_password(client).await?;
        }
    }
    Ok(())
}

fn setup_logging(log_level: &str) {
    // Set up the logger based on the log level
    let level = match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::new().filter_level(level).init();

    info!("Logger initialized with level: {}", log_level);
}
