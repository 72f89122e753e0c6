use clap::{ Parser, Subcommand };
use std::path::PathBuf;

use landreg::implementations::route_guard::Route;

pub mod capture;
pub mod commands;
pub mod ui;

#[derive(Parser)]
#[command(
    name = "landreg",
    about = "Land registry client: properties, registrations, transfers and verification",
    version,
    author,
    long_about = None
)]
pub struct LandregCli {
    /// Sets the log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Use the shared demo account
        #[arg(long, default_value = "false")]
        demo: bool,

        /// Email address (prompted when missing)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account and sign in
    Register,

    /// Clear the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Request a password reset email
    ForgotPassword {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List properties, filtered locally
    Properties {
        /// Verification status (unverified, pending, verified)
        #[arg(short, long)]
        status: Option<String>,

        /// Property type (residential, commercial, agricultural)
        #[arg(short = 't', long = "type")]
        property_type: Option<String>,
    },

    /// Show one property
    Show {
        id: String,

        /// Also fetch its verification record
        #[arg(long, default_value = "false")]
        verification: bool,
    },

    /// Search properties on the server
    Search {
        #[arg(short = 't', long = "type")]
        property_type: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        /// Price range (under-100k, 100k-500k, above-500k)
        #[arg(short, long)]
        price: Option<String>,

        /// Text matched against title, area and city
        #[arg(long)]
        text: Option<String>,

        /// Prompt for refinements after the first results
        #[arg(short, long, default_value = "false")]
        interactive: bool,
    },

    /// Register a new property
    RegisterProperty,

    /// Transfer ownership of a property
    Transfer {
        property_id: String,

        /// Signature image used at confirmation
        #[arg(short, long)]
        signature: Option<PathBuf>,
    },

    /// List your transfers, or show one
    Transfers {
        id: Option<String>,
    },

    /// Verify a property's survey records
    Verify {
        property_id: String,

        /// Signature image used for approval
        #[arg(short, long)]
        signature: Option<PathBuf>,
    },

    /// Registry statistics and recent activity
    Dashboard,

    /// Show or edit your profile
    Profile {
        #[arg(short, long, default_value = "false")]
        edit: bool,
    },

    /// Change your password
    ChangePassword,
}

impl Commands {
    /// The view this command opens, for the route guard
    pub fn route(&self) -> Route {
        match self {
            Commands::Login { .. } | Commands::Logout => Route::Login,
            Commands::Register => Route::Register,
            Commands::ForgotPassword { .. } => Route::ForgotPassword,
            Commands::Whoami | Commands::Profile { .. } => Route::Profile,
            Commands::Properties { .. } | Commands::Transfers { .. } => Route::Properties,
            Commands::Show { id, .. } => Route::PropertyDetail(id.clone()),
            Commands::Search { .. } => Route::Search,
            Commands::RegisterProperty => Route::RegisterProperty,
            Commands::Transfer { property_id, .. } => Route::Transfer(property_id.clone()),
            Commands::Verify { property_id, .. } => Route::Verification(property_id.clone()),
            Commands::Dashboard => Route::Dashboard,
            Commands::ChangePassword => Route::Settings,
        }
    }
}
