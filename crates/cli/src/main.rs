//! Lab site CLI - public listings and admin tools.
//!
//! Each invocation is one page load: the lists are read fresh from the
//! backend, shown, and (for admin commands) changed once.
//!
//! # Usage
//!
//! ```bash
//! # Public view
//! labsite news
//! labsite members --status "in progress" --tag AI --search Kim
//! labsite tags
//!
//! # Admin view (signs in first)
//! labsite admin news add --title "Seminar" --category seminar --image poster.png
//! labsite admin news delete 12
//! labsite admin members add --name "Kim" --role "Ph.D. Student" --tags "AI, Web3"
//! labsite admin members delete 7
//! labsite admin whoami
//! ```
//!
//! Configuration comes from the environment (see `labsite_client::config`).
//! Logs go to stderr; set `RUST_LOG` to change verbosity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use labsite_client::gateway::Table;
use labsite_client::{AppError, SiteConfig};
use labsite_core::{Category, FilterState, MemberId, PostId, Selection};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::admin::{Action, NewMemberInput, NewPostInput};

#[derive(Parser)]
#[command(name = "labsite")]
#[command(author, version, about = "Lab website news and members")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List news posts, newest first
    News,
    /// List lab members, optionally filtered
    Members(MemberFilterArgs),
    /// List the tags available to the member filter
    Tags,
    /// Create or delete records (requires sign-in)
    Admin(AdminArgs),
}

#[derive(Args)]
struct MemberFilterArgs {
    /// Exact status (e.g. "in progress", "completed", "graduated", "faculty")
    #[arg(long)]
    status: Option<String>,

    /// Tag to filter by
    #[arg(long)]
    tag: Option<String>,

    /// Search name or role (case-sensitive)
    #[arg(short, long)]
    search: Option<String>,
}

impl MemberFilterArgs {
    fn into_filter(self) -> FilterState {
        FilterState {
            status: Selection::from_input(self.status.as_deref()),
            tag: Selection::from_input(self.tag.as_deref()),
            name_query: self.search.unwrap_or_default(),
        }
    }
}

#[derive(Args)]
struct AdminArgs {
    /// Skip delete confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    action: AdminAction,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage news posts
    News {
        #[command(subcommand)]
        action: NewsAction,
    },
    /// Manage lab members
    Members {
        #[command(subcommand)]
        action: MembersAction,
    },
    /// Show who is signed in
    Whoami,
}

#[derive(Subcommand)]
enum NewsAction {
    /// Publish a news post
    Add {
        /// Post title (required)
        #[arg(short, long, default_value = "")]
        title: String,

        /// News, Seminar, Conference, "Paper Accepted" or Award
        #[arg(short, long)]
        category: Option<Category>,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Author (default: configured lab name)
        #[arg(short, long)]
        author: Option<String>,

        /// Post body
        #[arg(long)]
        description: Option<String>,

        /// Image file to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a news post
    Delete {
        /// Post id
        id: PostId,
    },
}

#[derive(Subcommand)]
enum MembersAction {
    /// Add a lab member
    Add {
        /// Member name (required)
        #[arg(short, long, default_value = "")]
        name: String,

        /// Role (default: "Ph.D. Student")
        #[arg(short, long)]
        role: Option<String>,

        /// Status (default: "in progress")
        #[arg(short, long)]
        status: Option<String>,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Image file to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a lab member
    Delete {
        /// Member id
        id: MemberId,
    },
}

impl AdminAction {
    fn into_action(self) -> Action {
        match self {
            Self::News { action } => match action {
                NewsAction::Add {
                    title,
                    category,
                    date,
                    author,
                    description,
                    image,
                } => Action::AddPost(NewPostInput {
                    title,
                    category,
                    date,
                    author,
                    description,
                    image,
                }),
                NewsAction::Delete { id } => Action::Delete {
                    table: Table::Posts,
                    id: id.as_i64(),
                },
            },
            Self::Members { action } => match action {
                MembersAction::Add {
                    name,
                    role,
                    status,
                    tags,
                    image,
                } => Action::AddMember(NewMemberInput {
                    name,
                    role,
                    status,
                    tags,
                    image,
                }),
                MembersAction::Delete { id } => Action::Delete {
                    table: Table::Members,
                    id: id.as_i64(),
                },
            },
            Self::Whoami => Action::Whoami,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "labsite=info,labsite_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration first: it carries the Sentry DSN
    let config = SiteConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        e.report();
        let _ = writeln!(std::io::stderr(), "{}", e.notice());
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &SiteConfig) -> Result<(), AppError> {
    match cli.command {
        Commands::News => commands::public::news(config).await,
        Commands::Members(args) => commands::public::members(config, &args.into_filter()).await,
        Commands::Tags => commands::public::tags(config).await,
        Commands::Admin(args) => {
            commands::admin::run(config, args.action.into_action(), args.yes).await
        }
    }
}
