// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use pitaka::application::LedgerService;
use pitaka::domain::{Cents, ExpenseRecord, NewRecord, SpendType};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(&db_path(&temp_dir)).await?;
    Ok((service, temp_dir))
}

/// Reopen the database inside `temp_dir`, as a fresh process would.
pub async fn reopen(temp_dir: &TempDir) -> Result<LedgerService> {
    Ok(LedgerService::open(&db_path(temp_dir)).await?)
}

pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir
        .path()
        .join("test.db")
        .to_str()
        .unwrap()
        .to_string()
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Record an expense through the service
pub async fn spend(
    service: &mut LedgerService,
    date: &str,
    category: &str,
    spend_type: SpendType,
    amount: Cents,
    notes: &str,
) -> Result<ExpenseRecord> {
    let input = NewRecord::new(parse_date(date), category, spend_type)
        .with_amount(amount)
        .with_notes(notes);
    Ok(service.add_record(input).await?)
}

/// Test fixture: a month of typical spending
pub struct SampleMonth;

impl SampleMonth {
    /// January 2024: 10 records across three weeks, total ₱5,336.50
    pub async fn create(service: &mut LedgerService) -> Result<()> {
        let rows = [
            ("2024-01-01", "Food", SpendType::Needs, 25000, "New year lunch"),
            ("2024-01-02", "Transport", SpendType::Needs, 4500, "jeep, \"aircon\" bus"),
            ("2024-01-03", "Load/Data", SpendType::Needs, 9900, "prepaid load"),
            ("2024-01-05", "Shopping", SpendType::Wants, 129900, "headphones"),
            ("2024-01-08", "Bills", SpendType::Needs, 185000, "electricity"),
            ("2024-01-09", "Food", SpendType::Wants, 35050, "milk tea, pizza"),
            ("2024-01-10", "Savings", SpendType::Savings, 100000, ""),
            ("2024-01-15", "Groceries", SpendType::Needs, 42000, "weekly market"),
            ("2024-01-16", "Health", SpendType::Needs, 1200, "vitamins"),
            ("2024-01-17", "Food", SpendType::Needs, 1100, "pandesal"),
        ];
        for (date, category, spend_type, amount, notes) in rows {
            spend(service, date, category, spend_type, amount, notes).await?;
        }
        Ok(())
    }
}
