use anyhow::{Context, Result};
use clap::Parser;
use hypercert_allowlist::utils::decode_hash_hex;
use hypercert_allowlist::{verify_claim_proof, ClaimProof};
use log::{error, info};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Claim proof JSON produced by claim-proof
    #[arg(short, long)]
    proof: PathBuf,

    /// Claimant account address
    #[arg(short, long)]
    account: String,

    /// Verify against this root instead of the one embedded in the proof
    /// (use the on-chain root when available)
    #[arg(short, long)]
    root: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Loading claim proof from {}", args.proof.display());
    let proof_json = fs::read_to_string(&args.proof).context("Failed to read claim proof")?;
    let claim: ClaimProof =
        serde_json::from_str(&proof_json).context("Failed to parse claim proof JSON")?;

    let root = match &args.root {
        Some(raw) => decode_hash_hex(raw).context("Invalid Merkle root")?,
        None => claim.root,
    };

    match verify_claim_proof(&root, &args.account, claim.units, &claim.proof) {
        Ok(()) => {
            println!("Proof verification PASSED");
            println!("Account: {}", args.account);
            println!("Units:   {}", claim.units);
            Ok(())
        }
        Err(e) => {
            error!("Proof verification FAILED: {e}");
            println!("Proof verification FAILED");
            println!("Error: {e}");
            Err(anyhow::anyhow!("Proof verification failed"))
        }
    }
}
