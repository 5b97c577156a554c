//! meta-get - read values out of scanner meta-data documents
//!
//! Usage:
//!   meta-get get -p meta.json -q 00291020.0.MrPhoenixProtocol.0.alTR.0
//!   meta-get protocol -m meta.json --path sTXSPEC.asNucleusInfo[0].tNucleus

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use mrmeta_csa::{ascconv, read_protocol, CsaOptions, PrivateGroupAddress, CSA_GROUP};
use mrmeta_path::Resolver;
use mrmeta_value::{MetaData, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "meta-get",
    version,
    about = "Resolve dotted paths in scanner meta-data",
    after_help = "EXAMPLES:\n  \
                  meta-get get -p meta.json -q EchoTime.0\n  \
                  meta-get get -p meta.json -q 00291020.0.MrPhoenixProtocol.0.alTR.0\n  \
                  meta-get protocol -m meta.json --path sKSpace.lBaseResolution"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    csa: CsaArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct CsaArgs {
    /// Private creator string of the CSA block
    #[arg(long, global = true)]
    creator: Option<String>,

    /// Private group of the CSA block, in hex
    #[arg(long, global = true, value_parser = parse_group)]
    group: Option<u16>,

    /// Fail instead of assuming the default block when no creator is found
    #[arg(long, global = true)]
    no_fallback: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a dotted path against a meta-data document
    Get {
        /// Meta-data JSON document
        #[arg(short, long)]
        path: PathBuf,

        /// Dotted path, e.g. EchoTime.0
        #[arg(short, long)]
        query: String,

        /// Print the value as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read one parameter of the embedded MrPhoenixProtocol
    Protocol {
        /// Meta-data JSON document
        #[arg(short, long)]
        meta: PathBuf,

        /// Protocol parameter, e.g. alTR[0]; the whole tree when omitted
        #[arg(long)]
        path: Option<String>,

        /// Print the value as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_group(text: &str) -> Result<u16, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex group {text:?}: {e}"))
}

impl CsaArgs {
    fn options(&self) -> CsaOptions {
        let mut options = CsaOptions::default();
        if let Some(creator) = &self.creator {
            options.creator = creator.clone();
        }
        if let Some(group) = self.group {
            options.group = group;
            if group != CSA_GROUP {
                options.fallback = Some(PrivateGroupAddress::new(group, 0x10));
            }
        }
        if self.no_fallback {
            options.fallback = None;
        }
        options
    }
}

fn load(path: &Path) -> Result<MetaData> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let meta = MetaData::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load meta-data from {}", path.display()))?;
    debug!(entries = meta.len(), path = %path.display(), "loaded meta-data");
    Ok(meta)
}

fn render(value: &Value, json: bool) -> Result<String> {
    if json || matches!(value, Value::Array(_) | Value::Struct(_)) {
        serde_json::to_string_pretty(&value.to_json()).context("Failed to render JSON")
    } else {
        Ok(value.to_string())
    }
}

fn run(cli: Cli) -> Result<String> {
    let options = cli.csa.options();
    match cli.command {
        Commands::Get { path, query, json } => {
            let meta = load(&path)?;
            let value = Resolver::new(options).resolve(&meta, &query)?;
            render(&value, json)
        }
        Commands::Protocol { meta, path, json } => {
            let meta = load(&meta)?;
            let tree = read_protocol(&meta, &options)?;
            let value = match path.as_deref() {
                Some(path) => ascconv::lookup(&tree, path)
                    .ok_or_else(|| anyhow!("no protocol parameter {path:?}"))?,
                None => &tree,
            };
            info!(parameter = path.as_deref().unwrap_or("<root>"), "read protocol");
            render(value, json)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    println!("{}", run(cli)?);
    Ok(())
}
