use anyhow::{Context, Result};
use clap::Parser;
use hypercert_allowlist::config::Config;
use hypercert_allowlist::{proof_for_account, StandardMerkleTree, TreeDump};
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tree dump JSON produced by build-tree
    #[arg(short, long)]
    tree: PathBuf,

    /// Claimant account address
    #[arg(short, long)]
    account: String,

    /// Output file for the claim proof JSON (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args
        .config
        .as_ref()
        .map(Config::load_from_file_or_default)
        .unwrap_or_default();

    let metadata = fs::metadata(&args.tree).context("Failed to read tree dump metadata")?;
    if metadata.len() > config.tree.max_dump_size {
        anyhow::bail!(
            "Tree dump too large: {} bytes (max {} bytes)",
            metadata.len(),
            config.tree.max_dump_size
        );
    }

    info!("Loading tree dump from {}", args.tree.display());
    let dump_json = fs::read_to_string(&args.tree).context("Failed to read tree dump")?;
    let dump: TreeDump =
        serde_json::from_str(&dump_json).context("Failed to parse tree dump JSON")?;
    let tree = StandardMerkleTree::load(dump).context("Failed to load tree dump")?;

    let claim = proof_for_account(&tree, &args.account)
        .with_context(|| format!("No claim available for {}", args.account))?;

    let json = serde_json::to_string_pretty(&claim).context("Failed to serialize claim proof")?;
    match &args.output {
        Some(output) => {
            fs::write(output, json)
                .with_context(|| format!("Failed to write claim proof to {}", output.display()))?;
            println!("Claim proof written to {}", output.display());
        }
        None => println!("{json}"),
    }

    println!("Account:      {}", args.account);
    println!("Units:        {}", claim.units);
    println!("Proof length: {} nodes", claim.proof.len());
    println!("Merkle root:  {}", tree.root_hex());

    Ok(())
}
