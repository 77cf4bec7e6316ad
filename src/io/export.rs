use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Cents, ExpenseRecord, Ledger, format_amount};

/// File name offered for CSV exports.
pub const DEFAULT_CSV_FILE_NAME: &str = "budget-expenses.csv";

pub const CSV_HEADER: [&str; 5] = ["Date", "Category", "Type", "Amount", "Notes"];

/// Full ledger snapshot for JSON backups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub budget_cents: Cents,
    pub categories: Vec<String>,
    pub records: Vec<ExpenseRecord>,
}

impl LedgerSnapshot {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            budget_cents: ledger.budget(),
            categories: ledger.categories().iter().map(str::to_string).collect(),
            records: ledger.records().to_vec(),
        }
    }
}

/// Render records (stored most recent first) as CSV text, oldest first.
///
/// Category and notes are always quoted; date, type and amount are written
/// bare. Lines are separated by `\n` with no trailing newline.
pub fn to_csv(records: &[ExpenseRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for record in records.iter().rev() {
        lines.push(
            [
                record.date.format("%Y-%m-%d").to_string(),
                quote(&record.category),
                record.spend_type.as_str().to_string(),
                format_amount(record.amount_cents),
                quote(&record.notes),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write the CSV rendering of `records`. Returns the number of data rows.
pub fn write_csv<W: Write>(records: &[ExpenseRecord], mut writer: W) -> Result<usize> {
    writer.write_all(to_csv(records).as_bytes())?;
    writer.flush()?;
    Ok(records.len())
}

/// Write the full ledger as a pretty-printed JSON snapshot.
pub fn write_snapshot_json<W: Write>(ledger: &Ledger, mut writer: W) -> Result<LedgerSnapshot> {
    let snapshot = LedgerSnapshot::from_ledger(ledger);
    let json = serde_json::to_string_pretty(&snapshot)?;
    writer.write_all(json.as_bytes())?;
    writer.flush()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{CategoryList, NewRecord, SpendType};

    fn record(
        date: &str,
        category: &str,
        st: SpendType,
        cents: Cents,
        notes: &str,
    ) -> ExpenseRecord {
        NewRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category,
            st,
        )
        .with_amount(cents)
        .with_notes(notes)
        .validate()
        .unwrap()
    }

    #[test]
    fn test_header_only_for_empty_ledger() {
        assert_eq!(to_csv(&[]), "Date,Category,Type,Amount,Notes");
    }

    #[test]
    fn test_rows_are_oldest_first() {
        // Storage order is most recent first
        let records = vec![
            record("2024-01-02", "Transport", SpendType::Needs, 1250, "tricycle"),
            record("2024-01-01", "Food", SpendType::Needs, 10000, ""),
        ];

        let csv = to_csv(&records);

        assert_eq!(
            csv,
            "Date,Category,Type,Amount,Notes\n\
             2024-01-01,\"Food\",Needs,100,\"\"\n\
             2024-01-02,\"Transport\",Needs,12.5,\"tricycle\""
        );
    }

    #[test]
    fn test_quotes_are_doubled() {
        let records = vec![record(
            "2024-03-01",
            "Gifts \"misc\"",
            SpendType::Wants,
            99,
            "said \"thanks\", twice",
        )];

        let csv = to_csv(&records);
        let row = csv.lines().nth(1).unwrap();

        assert_eq!(
            row,
            "2024-03-01,\"Gifts \"\"misc\"\"\",Wants,0.99,\"said \"\"thanks\"\", twice\""
        );
    }

    #[test]
    fn test_write_csv_counts_rows() {
        let records = vec![record("2024-01-01", "Food", SpendType::Needs, 500, "")];
        let mut out = Vec::new();

        let count = write_csv(&records, &mut out).unwrap();

        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(out).unwrap(), to_csv(&records));
    }

    #[test]
    fn test_snapshot_contains_everything() {
        let mut ledger = Ledger::new(Vec::new(), CategoryList::default(), 50000);
        ledger
            .add_record(
                NewRecord::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    "Food",
                    SpendType::Needs,
                )
                .with_amount(100),
            )
            .unwrap();

        let mut out = Vec::new();
        let snapshot = write_snapshot_json(&ledger, &mut out).unwrap();
        let parsed: LedgerSnapshot = serde_json::from_slice(&out).unwrap();

        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(parsed.budget_cents, 50000);
        assert_eq!(parsed.categories.len(), CategoryList::default().len());
        assert_eq!(parsed.records[0].category, "Food");
    }
}
