use anyhow::Result;
use chrono::NaiveDate;
use std::io::Read;
use tracing::info;

use crate::application::LedgerService;
use crate::domain::{NewRecord, SpendType, parse_cents};

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// A row that could not be imported
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate every row without touching the ledger
    pub dry_run: bool,
}

/// Loads a previously exported CSV file back into the ledger.
pub struct Importer<'a> {
    service: &'a mut LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a mut LedgerService) -> Self {
        Self { service }
    }

    /// Import records from CSV in the export layout
    /// (`Date,Category,Type,Amount,Notes`, oldest first).
    ///
    /// Rows get fresh ids. Because each row is inserted at the head, the
    /// ledger ends up most recent first, matching the order before export.
    pub async fn import_csv<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut errors = Vec::new();
        let mut lines = Vec::new();
        let mut inputs = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let input = match result {
                Ok(row) => parse_row(&row),
                Err(e) => Err(format!("CSV parse error: {}", e)),
            };
            match input {
                Ok(input) => {
                    lines.push(line);
                    inputs.push(input);
                }
                Err(error) => errors.push(ImportError { line, error }),
            }
        }

        // One batch, so the records slot is written once
        let outcomes: Vec<Result<(), String>> = if options.dry_run {
            inputs
                .into_iter()
                .map(|input| input.validate().map(|_| ()).map_err(|e| e.to_string()))
                .collect()
        } else {
            self.service
                .add_records(inputs)
                .await
                .into_iter()
                .map(|outcome| outcome.map(|_| ()).map_err(|e| e.to_string()))
                .collect()
        };

        let mut imported = 0;
        for (line, outcome) in lines.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => imported += 1,
                Err(error) => errors.push(ImportError { line, error }),
            }
        }
        errors.sort_by_key(|e| e.line);

        info!(
            imported,
            failed = errors.len(),
            dry_run = options.dry_run,
            "csv import finished"
        );
        Ok(ImportResult { imported, errors })
    }
}

fn parse_row(row: &csv::StringRecord) -> Result<NewRecord, String> {
    let field = |i: usize| row.get(i).unwrap_or("").trim();

    let date = match field(0) {
        "" => None,
        s => Some(
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", s))?,
        ),
    };
    let spend_type = match field(2) {
        "" => None,
        s => Some(SpendType::from_str(s).ok_or_else(|| format!("Unknown type '{}'", s))?),
    };
    let amount_cents =
        parse_cents(field(3)).map_err(|e| format!("Invalid amount '{}': {}", field(3), e))?;

    Ok(NewRecord {
        date,
        category: field(1).to_string(),
        spend_type,
        amount_cents,
        notes: field(4).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_row() {
        let input = parse_row(&row(&["2024-01-05", "Food", "wants", "12.5", "snacks"])).unwrap();

        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(input.category, "Food");
        assert_eq!(input.spend_type, Some(SpendType::Wants));
        assert_eq!(input.amount_cents, 1250);
        assert_eq!(input.notes, "snacks");
    }

    #[test]
    fn test_parse_row_missing_notes_column() {
        let input = parse_row(&row(&["2024-01-05", "Food", "Needs", "1"])).unwrap();
        assert_eq!(input.notes, "");
    }

    #[test]
    fn test_parse_row_errors() {
        assert!(parse_row(&row(&["05/01/2024", "Food", "Needs", "1", ""])).is_err());
        assert!(parse_row(&row(&["2024-01-05", "Food", "Luxury", "1", ""])).is_err());
        assert!(parse_row(&row(&["2024-01-05", "Food", "Needs", "abc", ""])).is_err());
    }

    #[test]
    fn test_blank_required_fields_fail_validation() {
        let input = parse_row(&row(&["", "Food", "", "1", ""])).unwrap();
        assert!(input.date.is_none());
        assert!(input.spend_type.is_none());
        assert!(input.validate().is_err());
    }
}
