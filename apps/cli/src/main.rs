//! `checkhub` - query and edit checks from the command line

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use checkhub::{Check, Config, Resolver, User};

#[derive(Parser)]
#[command(name = "checkhub", bin_name = "checkhub", version, about = "Aggregated view of checks, results and notifications")]
struct Cli {
    /// path to the config file (defaults to $XDG_CONFIG_HOME/checkhub/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    tenant: TenantArgs,

    #[command(subcommand)]
    cmd: Cmds,
}

#[derive(Args)]
struct TenantArgs {
    /// tenant the request is made for
    #[arg(long, env = "CHECKHUB_CUSTOMER_ID", global = true, default_value = "")]
    customer_id: String,

    /// email of the requesting user
    #[arg(long, env = "CHECKHUB_EMAIL", global = true, default_value = "")]
    email: String,
}

#[derive(Subcommand)]
enum Cmds {
    /// list checks with their results and notifications
    List {
        /// only this check
        #[arg(long)]
        check_id: Option<String>,
    },
    /// run a check once on an executor
    Test(FileArgs),
    /// create or update checks from a JSON object or array
    Upsert(FileArgs),
    /// delete checks by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// list notifications
    Notifications {
        /// tenant defaults only
        #[arg(long)]
        default_only: bool,
    },
    /// create tenant default notifications from a JSON array
    SetDefaults(FileArgs),
    /// print the effective configuration
    Config,
}

#[derive(Args)]
struct FileArgs {
    /// JSON input file
    #[arg(long)]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref()).context("couldn't load configuration")?;

    if let Cmds::Config = cli.cmd {
        print!("{config}");
        return Ok(());
    }

    let user = User::new(cli.tenant.customer_id, cli.tenant.email);
    let resolver = Resolver::from_config(&config)?;

    match cli.cmd {
        Cmds::List { check_id } => print_json(&resolver.list_checks(&user, check_id.as_deref()).await?),
        Cmds::Test(args) => {
            let check: Check = serde_json::from_value(read_json(&args.file)?).context("input is not a check")?;
            print_json(&resolver.test_check(&user, &check).await?)
        }
        Cmds::Upsert(args) => print_json(&resolver.upsert_checks(&user, read_json_list(&args.file)?).await?),
        Cmds::Delete { ids } => print_json(&resolver.delete_checks(&user, &ids).await?),
        Cmds::Notifications { default_only } => {
            print_json(&resolver.get_notifications(&user, default_only).await?)
        }
        Cmds::SetDefaults(args) => {
            print_json(&resolver.put_default_notifications(&user, read_json_list(&args.file)?).await?)
        }
        Cmds::Config => Ok(()),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    debug!("Reading input from {}", path.display());
    let raw = fs::read_to_string(path).with_context(|| format!("couldn't read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// A single object is treated as a one-element list
fn read_json_list(path: &Path) -> Result<Vec<Value>> {
    match read_json(path)? {
        Value::Array(items) => Ok(items),
        item => Ok(vec![item]),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
