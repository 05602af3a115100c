/*!
Allow-list CSV files.

One `investor` column of `0x`-prefixed hex account ids, header
included. Reading validates as it goes: malformed ids, the zero
account, and duplicates are rejected with the offending row number.
*/

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tranche_protocol::AccountId;

use crate::errors::{SdkError, SdkResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistRow {
    pub investor: String,
}

pub fn read_allowlist_csv(path: impl AsRef<Path>) -> SdkResult<Vec<AccountId>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut seen = BTreeSet::new();
    let mut investors = Vec::new();

    for (idx, row) in reader.deserialize::<AllowlistRow>().enumerate() {
        let row_no = idx + 2; // header occupies row 1
        let row = row?;
        let investor: AccountId =
            row.investor
                .trim()
                .parse()
                .map_err(|e| SdkError::InvalidAllowlistRow {
                    row: row_no,
                    reason: format!("{e}"),
                })?;
        if investor.is_zero() {
            return Err(SdkError::InvalidAllowlistRow {
                row: row_no,
                reason: "zero account".to_string(),
            });
        }
        if !seen.insert(investor) {
            return Err(SdkError::InvalidAllowlistRow {
                row: row_no,
                reason: format!("duplicate investor {investor}"),
            });
        }
        investors.push(investor);
    }

    debug!(count = investors.len(), "allow-list loaded");
    Ok(investors)
}

pub fn write_allowlist_csv(path: impl AsRef<Path>, investors: &[AccountId]) -> SdkResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for investor in investors {
        writer.serialize(AllowlistRow {
            investor: investor.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn addr(byte: u8) -> AccountId {
        AccountId::new([byte; 20])
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowlist.csv");
        let investors = vec![addr(0x20), addr(0x21), addr(0x22)];

        write_allowlist_csv(&path, &investors).unwrap();
        let loaded = read_allowlist_csv(&path).unwrap();
        assert_eq!(loaded, investors);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("investor\n"), "{text}");
    }

    #[test]
    fn rejects_duplicates_with_row_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowlist.csv");
        let dupe = addr(0x20);
        fs::write(
            &path,
            format!("investor\n{}\n{}\n{}\n", addr(0x21), dupe, dupe),
        )
        .unwrap();

        let err = read_allowlist_csv(&path).unwrap_err();
        match err {
            SdkError::InvalidAllowlistRow { row, reason } => {
                assert_eq!(row, 4);
                assert!(reason.contains("duplicate"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowlist.csv");
        fs::write(&path, "investor\nnot-an-address\n").unwrap();

        let err = read_allowlist_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            SdkError::InvalidAllowlistRow { row: 2, .. }
        ));
    }

    #[test]
    fn rejects_the_zero_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowlist.csv");
        fs::write(&path, format!("investor\n{}\n", AccountId::ZERO)).unwrap();

        let err = read_allowlist_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            SdkError::InvalidAllowlistRow { row: 2, .. }
        ));
    }

    #[test]
    fn empty_file_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allowlist.csv");
        fs::write(&path, "investor\n").unwrap();
        assert!(read_allowlist_csv(&path).unwrap().is_empty());
    }
}
