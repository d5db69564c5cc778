mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tracker", about = "Decision tracker with context hub sync", version)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// State file (falls back to TRACKER_DATA_FILE, then decisions.json)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Context hub base URL (falls back to CONTEXT_HUB_URL)
    #[arg(long, global = true)]
    hub_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List decisions grouped by block
    List {
        /// Only this block (structure, sales, coo, finance, ops, open)
        #[arg(long)]
        block: Option<String>,

        /// Only this status (overdue, active, done, deferred, no_deadline)
        #[arg(long)]
        status: Option<String>,
    },

    /// Record a new decision
    Add {
        /// Decision text
        #[arg(short, long)]
        decision: String,

        /// Block (structure, sales, coo, finance, ops, open)
        #[arg(long, default_value = "ops")]
        block: String,

        /// Explicit id; generated from the block when omitted
        #[arg(long)]
        id: Option<String>,

        /// Who owns the decision
        #[arg(long, default_value = "")]
        responsible: String,

        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Next check date (YYYY-MM-DD)
        #[arg(long)]
        check_date: Option<String>,

        /// Initial status
        #[arg(long, default_value = "active")]
        status: String,

        #[arg(long, default_value = "")]
        comment: String,

        /// Where the decision was made (meeting, chat, ...)
        #[arg(long, default_value = "")]
        source: String,
    },

    /// Change status, comment, deadline or responsible of a decision
    Update {
        /// Decision id
        id: String,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        comment: Option<String>,

        /// New deadline; an empty value clears it
        #[arg(long)]
        deadline: Option<String>,

        #[arg(long)]
        responsible: Option<String>,
    },

    /// Show the audit log, newest first
    History {
        /// Maximum number of entries
        #[arg(short = 'n', long, default_value = "20")]
        max_count: usize,
    },

    /// Pull new decisions from the context hub
    Pull,

    /// Push local-only decisions to the context hub
    Push,

    /// Pull, then push
    Sync,

    /// Show hub availability and link counts
    Status,
}

fn main() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        json: cli.json,
        data_file: cli.data_file,
        hub_url: cli.hub_url,
    };

    let result = match cli.command {
        Commands::List { block, status } => commands::list::run(&ctx, block, status),
        Commands::Add {
            decision,
            block,
            id,
            responsible,
            deadline,
            check_date,
            status,
            comment,
            source,
        } => commands::add::run(
            &ctx,
            commands::add::AddArgs {
                decision,
                block,
                id,
                responsible,
                deadline,
                check_date,
                status,
                comment,
                source,
            },
        ),
        Commands::Update {
            id,
            status,
            comment,
            deadline,
            responsible,
        } => commands::update::run(&ctx, id, status, comment, deadline, responsible),
        Commands::History { max_count } => commands::history::run(&ctx, max_count),
        Commands::Pull => commands::sync::pull(&ctx),
        Commands::Push => commands::sync::push(&ctx),
        Commands::Sync => commands::sync::full(&ctx),
        Commands::Status => commands::status::run(&ctx),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
