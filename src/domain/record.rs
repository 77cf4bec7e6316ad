use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Cents;

pub type RecordId = Uuid;

/// Budgeting bucket a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpendType {
    Needs,
    Wants,
    Savings,
    Income,
}

impl SpendType {
    pub const ALL: [SpendType; 4] = [
        SpendType::Needs,
        SpendType::Wants,
        SpendType::Savings,
        SpendType::Income,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpendType::Needs => "Needs",
            SpendType::Wants => "Wants",
            SpendType::Savings => "Savings",
            SpendType::Income => "Income",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "needs" => Some(SpendType::Needs),
            "wants" => Some(SpendType::Wants),
            "savings" => Some(SpendType::Savings),
            "income" => Some(SpendType::Income),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dated expense (or income) entry.
/// Records are never edited; they are only created and deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    /// Calendar day the money moved, without a time component
    pub date: NaiveDate,
    pub category: String,
    #[serde(rename = "type")]
    pub spend_type: SpendType,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    #[serde(default)]
    pub notes: String,
}

/// Unvalidated input for a new record, as collected from a form or an import row.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub date: Option<NaiveDate>,
    pub category: String,
    pub spend_type: Option<SpendType>,
    pub amount_cents: Cents,
    pub notes: String,
}

impl NewRecord {
    pub fn new(date: NaiveDate, category: impl Into<String>, spend_type: SpendType) -> Self {
        Self {
            date: Some(date),
            category: category.into(),
            spend_type: Some(spend_type),
            ..Self::default()
        }
    }

    pub fn with_amount(mut self, amount_cents: Cents) -> Self {
        self.amount_cents = amount_cents;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Check presence and positivity, then build the record under a fresh id.
    pub fn validate(self) -> Result<ExpenseRecord, ValidationError> {
        let date = self.date.ok_or(ValidationError::MissingDate)?;
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        let spend_type = self.spend_type.ok_or(ValidationError::MissingType)?;
        if self.amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount(self.amount_cents));
        }

        Ok(ExpenseRecord {
            id: Uuid::new_v4(),
            date,
            category: category.to_string(),
            spend_type,
            amount_cents: self.amount_cents,
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a date is required")]
    MissingDate,

    #[error("a category is required")]
    MissingCategory,

    #[error("a type is required")]
    MissingType,

    #[error("amount must be greater than zero (got {0} cents)")]
    NonPositiveAmount(Cents),
}
