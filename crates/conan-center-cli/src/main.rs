//! conan-center CLI - Inspect Conan packages stored in Artifactory

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod exit_codes;
mod logging;

use commands::ServerArgs;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "conan-center")]
#[command(version)]
#[command(about = "Inspect Conan packages stored in a JFrog Artifactory repository", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configured server to use (default server if not set)
    #[arg(long, global = true, env = "CONAN_CENTER_SERVER_ID")]
    server_id: Option<String>,

    /// Artifactory base URL, bypasses the configured servers
    #[arg(long, global = true, env = "CONAN_CENTER_URL")]
    url: Option<String>,

    /// Access token sent as a bearer token
    #[arg(long, global = true, env = "CONAN_CENTER_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of packages of every reference in a repository
    #[command(alias = "st")]
    Stats {
        /// Artifactory repository name
        repo: String,

        /// Only references with this name
        #[arg(long)]
        ref_name: Option<String>,
    },

    /// List references (or packages) found in a repository
    #[command(alias = "s")]
    Search {
        /// Artifactory repository name
        repo: String,

        /// Only references with this name
        #[arg(long)]
        ref_name: Option<String>,

        /// List packages instead of references
        #[arg(long)]
        packages: bool,

        /// Keep only the latest revisions
        #[arg(long)]
        only_latest: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the properties of a reference
    #[command(alias = "p")]
    Properties {
        /// Artifactory repository name
        repo: String,

        /// Conan reference; the latest revision is used if none is given
        reference: String,

        /// Also print the properties of every package
        #[arg(long)]
        packages: bool,
    },

    /// Build the ConanCenter indexer document of a reference
    #[command(alias = "i")]
    IndexReference {
        /// Artifactory repository name
        repo: String,

        /// Conan reference; the latest revision is used if none is given
        reference: String,

        /// Set the force flags of the document
        #[arg(long)]
        force: bool,
    },

    /// Manage configured Artifactory servers
    Server {
        #[command(subcommand)]
        command: ServerCommands,
    },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// Add a server
    Add {
        /// Server identifier
        #[arg(value_name = "SERVER_ID")]
        id: String,

        /// Artifactory base URL
        #[arg(value_name = "URL")]
        base_url: String,

        /// Username for basic authentication
        #[arg(long, requires = "password")]
        user: Option<String>,

        /// Password for basic authentication
        #[arg(long, requires = "user")]
        password: Option<String>,

        /// Access token
        #[arg(long, conflicts_with_all = ["user", "api_key"])]
        token: Option<String>,

        /// Artifactory API key
        #[arg(long, conflicts_with = "user")]
        api_key: Option<String>,

        /// Make this the default server
        #[arg(long)]
        default: bool,
    },

    /// List configured servers
    List,

    /// Remove a server and its credentials
    Remove {
        /// Server identifier
        #[arg(value_name = "SERVER_ID")]
        id: String,
    },
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: no other thread exists yet, the runtime is built below
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    let verbose = if cli.debug { cli.verbose.max(1) } else { cli.verbose };
    logging::init(verbose, cli.quiet);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("Failed to create runtime: {}", e)))?;

    let server = ServerArgs {
        server_id: cli.server_id,
        url: cli.url,
        access_token: cli.access_token,
    };

    rt.block_on(async {
        match cli.command {
            Commands::Stats { repo, ref_name } => {
                commands::stats::run(&server, &repo, ref_name.as_deref()).await
            }

            Commands::Search {
                repo,
                ref_name,
                packages,
                only_latest,
                json,
            } => {
                commands::search::run(
                    &server,
                    &repo,
                    ref_name.as_deref(),
                    packages,
                    only_latest,
                    json,
                )
                .await
            }

            Commands::Properties {
                repo,
                reference,
                packages,
            } => commands::properties::run(&server, &repo, &reference, packages).await,

            Commands::IndexReference {
                repo,
                reference,
                force,
            } => commands::index_reference::run(&server, &repo, &reference, force).await,

            Commands::Server { command } => match command {
                ServerCommands::Add {
                    id,
                    base_url,
                    user,
                    password,
                    token,
                    api_key,
                    default,
                } => commands::server::add(
                    &id,
                    &base_url,
                    user.as_deref(),
                    password.as_deref(),
                    token.as_deref(),
                    api_key.as_deref(),
                    default,
                ),
                ServerCommands::List => commands::server::list(),
                ServerCommands::Remove { id } => commands::server::remove(&id),
            },
        }
    })
}
