use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use watchlog_server::catalog_store::SqliteCatalogStore;
use watchlog_server::tracking::{render_markdown, TrackingManager};
use watchlog_server::user::{SqliteUserStore, UserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding catalog.db and user.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a user with the given handle.
    AddUser { user_handle: String },

    /// Shows all user handles.
    ListUsers,

    /// Prints the notes of a user, as Markdown unless --json is given.
    ExportNotes {
        user_handle: String,
        #[clap(long)]
        json: bool,
    },

    /// Writes timestamped copies of both databases into the given directory.
    Backup {
        #[clap(value_parser = parse_path)]
        dest_dir: PathBuf,
    },
}

fn open_stores(db_dir: &Path) -> Result<(Arc<SqliteCatalogStore>, Arc<SqliteUserStore>)> {
    if !db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", db_dir);
    }
    let catalog = SqliteCatalogStore::new(db_dir.join("catalog.db"))?;
    let users = SqliteUserStore::new(db_dir.join("user.db"))?;
    Ok((Arc::new(catalog), Arc::new(users)))
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let (catalog, users) = open_stores(&cli_args.db_dir)?;

    match cli_args.command {
        Command::AddUser { user_handle } => {
            if users.get_user_id(&user_handle)?.is_some() {
                bail!("User {} already exists", user_handle);
            }
            let id = users.create_user(&user_handle)?;
            println!("Created user {} with id {}", user_handle, id);
        }
        Command::ListUsers => {
            for handle in users.get_all_user_handles()? {
                println!("{}", handle);
            }
        }
        Command::ExportNotes { user_handle, json } => {
            let user_id = users
                .get_user_id(&user_handle)?
                .with_context(|| format!("No user with handle {}", user_handle))?;
            let tracking = TrackingManager::new(catalog, users);
            let export = tracking.export_notes(user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&export)?);
            } else {
                print!("{}", render_markdown(&export));
            }
        }
        Command::Backup { dest_dir } => {
            std::fs::create_dir_all(&dest_dir)
                .with_context(|| format!("Could not create {:?}", dest_dir))?;
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let catalog_dest = dest_dir.join(format!("catalog-{}.db", stamp));
            let user_dest = dest_dir.join(format!("user-{}.db", stamp));
            catalog.backup_to(&catalog_dest)?;
            users.backup_to(&user_dest)?;
            println!("Backed up to {:?} and {:?}", catalog_dest, user_dest);
        }
    }
    Ok(())
}
