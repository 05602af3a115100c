/*!
# Tranche Protocol SDK

Operator-side tooling around [`tranche_protocol`]: the YAML sale
configuration, human-friendly amount parsing, allow-list CSV files,
and deterministic deployment of a wired ledger/campaign pair.

## Usage

```rust
use tranche_protocol_sdk::{deploy_sale, SaleConfig, SdkResult};

fn example(yaml: &str) -> SdkResult<()> {
    let config = SaleConfig::from_yaml_str(yaml)?;
    let deployment = deploy_sale(&config, 1_700_000_000)?;
    assert!(deployment.ledger.conservation_holds());
    Ok(())
}
```
*/

pub mod allowlist;
pub mod amounts;
pub mod config;
pub mod deploy;
pub mod errors;

// Re-export main types for convenience
pub use allowlist::{read_allowlist_csv, write_allowlist_csv, AllowlistRow};
pub use amounts::{parse_amount, ParseAmountError};
pub use config::{ResolvedSale, SaleConfig};
pub use deploy::{campaign_address, deploy_sale, derive_address, ledger_address, Deployment};
pub use errors::{SdkError, SdkResult};
