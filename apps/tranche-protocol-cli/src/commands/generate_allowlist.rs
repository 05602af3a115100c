use crate::error::CliResult;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tranche_protocol::AccountId;
use tranche_protocol_sdk::{read_allowlist_csv, write_allowlist_csv};

/// Generate a deterministic allow-list CSV for demos and load tests
pub fn execute(count: u64, seed: u64, output: PathBuf) -> CliResult<()> {
    println!("📋 Generating {} investors with seed {}", count, seed);

    let investors: Vec<AccountId> = (0..count)
        .map(|index| generate_investor_id(seed, index))
        .collect();
    write_allowlist_csv(&output, &investors)?;

    // the writer and reader agree on the schema; prove it
    let loaded = read_allowlist_csv(&output)?;
    debug_assert_eq!(loaded.len(), investors.len());

    println!("✅ Wrote {} investors to {}", investors.len(), output.display());
    Ok(())
}

/// Deterministic account id from seed and index.
fn generate_investor_id(seed: u64, index: u64) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(b"tranche:allowlist");
    hasher.update(seed.to_be_bytes());
    hasher.update(index.to_be_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    if bytes.iter().all(|&b| b == 0) {
        bytes[0] = 1;
    }
    AccountId::new(bytes)
}
