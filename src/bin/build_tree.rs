use anyhow::{Context, Result};
use clap::Parser;
use hypercert_allowlist::config::Config;
use hypercert_allowlist::{
    parse_allowlist_csv, total_units, validate_allowlist, AdditionalAllocation,
    StandardMerkleTree,
};
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Allowlist CSV with `address` and `fractions` columns
    #[arg(short, long)]
    csv: PathBuf,

    /// Keep duplicate addresses as separate leaves instead of merging them
    #[arg(long)]
    no_dedup: bool,

    /// Extra allocation as `address:percentage`, may repeat
    #[arg(long = "add", value_name = "ADDRESS:PERCENTAGE")]
    additions: Vec<String>,

    /// Cross-check the allowlist against this total unit count
    #[arg(long)]
    expected_total_units: Option<String>,

    /// Output file for the tree dump (default from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_addition(raw: &str) -> Result<AdditionalAllocation> {
    let (address, percentage) = raw
        .rsplit_once(':')
        .with_context(|| format!("Invalid addition '{raw}': expected `address:percentage`"))?;
    let percentage: f64 = percentage
        .parse()
        .with_context(|| format!("Invalid percentage in addition '{raw}'"))?;
    Ok(AdditionalAllocation {
        address: address.to_string(),
        percentage,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args
        .config
        .as_ref()
        .map(Config::load_from_file_or_default)
        .unwrap_or_default();

    let metadata = fs::metadata(&args.csv).context("Failed to read allowlist CSV metadata")?;
    if metadata.len() > config.allowlist.max_file_size {
        anyhow::bail!(
            "Allowlist CSV too large: {} bytes (max {} bytes)",
            metadata.len(),
            config.allowlist.max_file_size
        );
    }

    info!("Reading allowlist from {}", args.csv.display());
    let csv_text = fs::read_to_string(&args.csv).context("Failed to read allowlist CSV")?;

    let additions = args
        .additions
        .iter()
        .map(|raw| parse_addition(raw))
        .collect::<Result<Vec<_>>>()?;
    debug!("{} additional allocations", additions.len());

    let deduplicate = if args.no_dedup {
        false
    } else {
        config.allowlist.deduplicate
    };
    let entries = parse_allowlist_csv(&csv_text, deduplicate, &additions)
        .context("Failed to parse allowlist")?;

    let computed_total = total_units(&entries)?;
    let expected_total = match &args.expected_total_units {
        Some(raw) => alloy_primitives::U256::from_str_radix(raw.trim(), 10)
            .with_context(|| format!("Invalid expected total units '{raw}'"))?,
        None => computed_total,
    };

    let validation = validate_allowlist(&entries, expected_total);
    if !validation.valid {
        anyhow::bail!(
            "Allowlist validation failed: {}",
            serde_json::to_string(&validation.errors)?
        );
    }

    info!("Building Merkle commitment over {} entries", entries.len());
    let tree = StandardMerkleTree::of(&entries)?;

    let output = args.output.unwrap_or_else(|| config.tree.output_file.clone());
    let json = serde_json::to_string_pretty(&tree.dump())
        .context("Failed to serialize tree dump")?;
    fs::write(&output, json)
        .with_context(|| format!("Failed to write tree dump to {}", output.display()))?;

    println!("Entries:     {}", entries.len());
    println!("Total units: {computed_total}");
    println!("Merkle root: {}", tree.root_hex());
    println!("Tree dump:   {}", output.display());

    Ok(())
}
