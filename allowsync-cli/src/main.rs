use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use allowsync_core::config::Config;
use allowsync_core::local::LocalStore;
use allowsync_core::logging::init_logging;
use allowsync_core::model::PlayerProfile;
use allowsync_core::store::RemoteStore;
use allowsync_core::sync::SyncService;

mod host;

use host::{ensure_list_files, JsonPlayerList};

#[derive(Parser, Debug)]
#[command(name = "allowsync")]
#[command(author, version, about = "Sync a server's whitelist and op lists with a shared store", long_about = None)]
struct Args {
    /// Configuration file (TOML); defaults + environment are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the shared database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Override the server directory holding whitelist.json / ops.json
    #[arg(long)]
    server_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Enable op-list syncing for this invocation
    #[arg(long)]
    sync_op_list: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push the local list into the shared store
    Push {
        /// Operate on the op list instead of the whitelist
        #[arg(long)]
        ops: bool,
    },
    /// Pull the shared store into the local list
    Pull {
        /// Operate on the op list instead of the whitelist
        #[arg(long)]
        ops: bool,
    },
    /// Print the active players in the shared store
    List {
        /// Operate on the op list instead of the whitelist
        #[arg(long)]
        ops: bool,
        /// Print display names instead of uuids
        #[arg(long)]
        names: bool,
    },
    /// Add one player to the shared store
    Add {
        uuid: Uuid,
        name: String,
        /// Add to the op list instead of the whitelist
        #[arg(long)]
        op: bool,
    },
    /// Remove one player from the shared store
    Remove {
        uuid: Uuid,
        name: String,
        /// Remove from the op list instead of the whitelist
        #[arg(long)]
        op: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(database) = args.database {
        config.database.path = database;
    }
    if let Some(server_dir) = args.server_dir {
        config.server.server_dir = server_dir;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    if args.sync_op_list {
        config.sync.sync_op_list = true;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;

    let store = RemoteStore::open(&config.database.path).with_context(|| {
        format!(
            "failed to open shared database at {}",
            config.database.path.display()
        )
    })?;
    ensure_list_files(&config.server.server_dir).with_context(|| {
        format!(
            "failed to prepare list files under {}",
            config.server.server_dir.display()
        )
    })?;

    let host = Arc::new(JsonPlayerList::new(&config.server.server_dir));
    let local = LocalStore::new(&config.server.server_dir, host);
    let service = SyncService::new(store, local, &config.sync);

    // Every operation is fire-and-forget inside the service; the binary
    // awaits the handle so it does not exit with the task still queued.
    match args.command {
        Command::Push { ops } => {
            let handle = if ops {
                service.push_op_list()
            } else {
                service.push_whitelist()
            };
            handle.await?;
            info!("push complete");
        }
        Command::Pull { ops } => {
            let handle = if ops {
                service.pull_op_list()
            } else {
                service.pull_whitelist()
            };
            handle.await?;
            info!("pull complete");
        }
        Command::List { ops, names } => {
            let players = match (ops, names) {
                (false, false) => service.whitelisted_uuids(),
                (false, true) => service.whitelisted_names(),
                (true, false) => service.opped_uuids(),
                (true, true) => service.opped_names(),
            };
            for player in players {
                println!("{player}");
            }
        }
        Command::Add { uuid, name, op } => {
            let profile = PlayerProfile::new(uuid, name);
            let handle = if op {
                service.add_op_player(profile)
            } else {
                service.add_whitelist_player(profile)
            };
            handle.await?;
            info!("add complete");
        }
        Command::Remove { uuid, name, op } => {
            let profile = PlayerProfile::new(uuid, name);
            let handle = if op {
                service.remove_op_player(profile)
            } else {
                service.remove_whitelist_player(profile)
            };
            handle.await?;
            info!("remove complete");
        }
    }

    Ok(())
}
