//! Command definitions and dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use cloudflare_manager_app::adapters::SqliteStore;
use cloudflare_manager_app::{AppState, AppStateBuilder};
use cloudflare_manager_core::types::{
    Account, CreateAccountRequest, RemoteConfig, UpdateAccountRequest,
};

#[derive(Parser, Debug)]
#[command(name = "cfm")]
#[command(author, version, about = "Cloudflare account manager with WebDAV snapshot backups", long_about = None)]
pub struct Cli {
    /// SQLite database file. Default: `<data dir>/cloudflare-manager/cloudflare-manager.db`
    #[arg(long, env = "CFM_DB", global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage accounts
    Accounts(AccountsArgs),

    /// Inspect and select zones
    Zones(ZonesArgs),

    /// Manage the remote archive configuration
    Remote(RemoteArgs),

    /// Upload a snapshot of all accounts now
    Backup,

    /// List archived snapshots, newest first
    Snapshots,

    /// Replace all local data with an archived snapshot
    Restore {
        /// Snapshot file name, as printed by `snapshots`
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Delete an archived snapshot
    DeleteSnapshot {
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Write a snapshot of all accounts to a local file
    Export {
        /// Target file or directory. Omit to print to stdout.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Replace all local data with a snapshot file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only describe what the import would do
        #[arg(long)]
        preview: bool,
    },
}

#[derive(Args, Debug)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountCommands,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// List accounts
    List,

    /// Add an account
    Add {
        #[arg(long)]
        name: String,

        /// Cloudflare account id
        #[arg(long = "account-id")]
        account_id: String,

        /// API token
        #[arg(long, env = "CFM_API_TOKEN", hide_env_values = true)]
        token: String,

        #[arg(long = "default-zone", value_name = "ZONE_ID")]
        default_zone_id: Option<String>,

        #[arg(long = "r2-access-key-id")]
        r2_access_key_id: Option<String>,

        #[arg(long = "r2-secret-access-key")]
        r2_secret_access_key: Option<String>,

        /// Make this the default account
        #[arg(long = "default")]
        is_default: bool,
    },

    /// Change the name or token of an account
    Update {
        #[arg(value_name = "LOCAL_ID")]
        local_id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        token: Option<String>,
    },

    /// Remove an account and its zones
    Remove {
        #[arg(value_name = "LOCAL_ID")]
        local_id: i64,
    },

    /// Make an account the default one
    Default {
        #[arg(value_name = "LOCAL_ID")]
        local_id: i64,
    },
}

#[derive(Args, Debug)]
pub struct ZonesArgs {
    #[command(subcommand)]
    pub command: ZoneCommands,
}

#[derive(Subcommand, Debug)]
pub enum ZoneCommands {
    /// List the zones of an account
    List {
        #[arg(value_name = "LOCAL_ID")]
        account: i64,
    },

    /// Select the zone an account opens with
    Select {
        #[arg(value_name = "LOCAL_ID")]
        account: i64,

        #[arg(value_name = "ZONE_ID")]
        zone: String,
    },
}

#[derive(Args, Debug)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub command: RemoteCommands,
}

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Show the saved configuration (password hidden)
    Show,

    /// Save the WebDAV archive configuration
    Set {
        /// WebDAV base URL
        #[arg(long)]
        url: String,

        #[arg(long)]
        username: String,

        #[arg(long, env = "CFM_REMOTE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Directory on the server that holds snapshots
        #[arg(long, value_name = "DIR")]
        path: Option<String>,

        /// Upload a snapshot after every account change
        #[arg(long)]
        auto_backup: bool,
    },

    /// Remove the saved configuration
    Clear,

    /// Check that the saved configuration can reach the server
    Test,
}

/// Open the store, run one command and wait for queued backups.
pub async fn run(cli: Cli) -> Result<()> {
    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    tracing::debug!("Using database {}", db_path.display());

    let store = Arc::new(
        SqliteStore::new(&db_path)
            .await
            .with_context(|| format!("failed to open {}", db_path.display()))?,
    );
    let (state, worker) = AppStateBuilder::new()
        .local_store(store.clone())
        .remote_config_repository(store)
        .build()?;
    let worker = tokio::spawn(worker.run());

    let result = execute(&state, cli.command).await;

    // The worker stops once every sender is gone.
    drop(state);
    if let Err(e) = worker.await {
        tracing::warn!("Backup worker stopped abnormally: {e}");
    }
    result
}

fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("cannot determine the user data directory")?;
    Ok(data_dir
        .join("cloudflare-manager")
        .join("cloudflare-manager.db"))
}

async fn execute(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Accounts(args) => accounts(state, args.command).await,
        Commands::Zones(args) => zones(state, args.command).await,
        Commands::Remote(args) => remote(state, args.command).await,
        Commands::Backup => {
            let file_name = state.backup_service.backup_now().await?;
            println!("{file_name}");
            Ok(())
        }
        Commands::Snapshots => {
            for name in state.restore_service.list_available_snapshots().await? {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Restore { file } => {
            let report = state.restore_service.restore(&file).await?;
            print_json(&report)
        }
        Commands::DeleteSnapshot { file } => {
            state.backup_service.delete_snapshot(&file).await?;
            Ok(())
        }
        Commands::Export { output } => export(state, output.as_deref()).await,
        Commands::Import { file, preview } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            if preview {
                print_json(&state.import_export_service.preview_import(&content).await?)
            } else {
                print_json(&state.import_export_service.import_snapshot(&content).await?)
            }
        }
    }
}

async fn accounts(state: &AppState, command: AccountCommands) -> Result<()> {
    let service = &state.account_service;
    match command {
        AccountCommands::List => {
            let accounts = service.list_accounts().await?;
            print_json(&accounts.iter().map(AccountView::from).collect::<Vec<_>>())
        }
        AccountCommands::Add {
            name,
            account_id,
            token,
            default_zone_id,
            r2_access_key_id,
            r2_secret_access_key,
            is_default,
        } => {
            let account = service
                .create_account(CreateAccountRequest {
                    name,
                    account_id,
                    api_token: token,
                    default_zone_id,
                    r2_access_key_id,
                    r2_secret_access_key,
                    is_default,
                })
                .await?;
            println!("{}", account.local_id);
            Ok(())
        }
        AccountCommands::Update {
            local_id,
            name,
            token,
        } => {
            service
                .update_account(UpdateAccountRequest {
                    local_id,
                    name,
                    api_token: token,
                    ..Default::default()
                })
                .await?;
            Ok(())
        }
        AccountCommands::Remove { local_id } => Ok(service.delete_account(local_id).await?),
        AccountCommands::Default { local_id } => {
            Ok(service.set_default_account(local_id).await?)
        }
    }
}

async fn zones(state: &AppState, command: ZoneCommands) -> Result<()> {
    let service = &state.account_service;
    match command {
        ZoneCommands::List { account } => print_json(&service.list_zones(account).await?),
        ZoneCommands::Select { account, zone } => Ok(service.select_zone(account, &zone).await?),
    }
}

async fn remote(state: &AppState, command: RemoteCommands) -> Result<()> {
    let service = &state.remote_config_service;
    match command {
        RemoteCommands::Show => match service.get_config().await? {
            Some(config) => print_json(&json!({
                "url": config.url,
                "username": config.username,
                "backupPath": config.backup_path,
                "autoBackup": config.auto_backup,
            })),
            None => {
                println!("No remote archive configured");
                Ok(())
            }
        },
        RemoteCommands::Set {
            url,
            username,
            password,
            path,
            auto_backup,
        } => {
            let mut config =
                RemoteConfig::new(url, username, password).with_auto_backup(auto_backup);
            if let Some(path) = path {
                config = config.with_backup_path(&path);
            }
            let saved = service.save_config(config).await?;
            println!("Saved; snapshots go to {}", saved.backup_path);
            Ok(())
        }
        RemoteCommands::Clear => Ok(service.clear_config().await?),
        RemoteCommands::Test => {
            service.test_connection(None).await?;
            println!("Connection OK");
            Ok(())
        }
    }
}

async fn export(state: &AppState, output: Option<&Path>) -> Result<()> {
    let exported = state.import_export_service.export_snapshot().await?;
    let Some(output) = output else {
        println!("{}", exported.content);
        return Ok(());
    };

    let target = if output.is_dir() {
        output.join(&exported.suggested_filename)
    } else {
        output.to_path_buf()
    };
    std::fs::write(&target, exported.content)
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!("{}", target.display());
    Ok(())
}

/// Account as printed by `accounts list`, without its secrets.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountView<'a> {
    local_id: i64,
    account_id: &'a str,
    name: &'a str,
    default_zone_id: Option<&'a str>,
    r2_access_key_id: Option<&'a str>,
    has_r2_secret: bool,
    is_default: bool,
}

impl<'a> From<&'a Account> for AccountView<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            local_id: account.local_id,
            account_id: &account.account_id,
            name: &account.name,
            default_zone_id: account.default_zone_id.as_deref(),
            r2_access_key_id: account.r2_access_key_id.as_deref(),
            has_r2_secret: account.r2_secret_access_key.is_some(),
            is_default: account.is_default,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
