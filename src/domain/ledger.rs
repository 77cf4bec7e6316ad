use chrono::NaiveDate;
use std::collections::HashSet;

use super::{
    CategoryList, Cents, ExpenseRecord, NewRecord, RecordId, SpendType, ValidationError, Window,
};

/// Criteria for narrowing the ledger. Every present criterion must match;
/// blank strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Case-insensitive substring of the notes or the category
    pub text: Option<String>,
    pub spend_type: Option<SpendType>,
    /// Exact category name
    pub category: Option<String>,
}

impl RecordQuery {
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        let matches_text = match non_blank(&self.text) {
            Some(q) => {
                let q = q.to_lowercase();
                record.notes.to_lowercase().contains(&q)
                    || record.category.to_lowercase().contains(&q)
            }
            None => true,
        };
        let matches_type = self.spend_type.is_none_or(|t| record.spend_type == t);
        let matches_category = non_blank(&self.category).is_none_or(|c| record.category == c);

        matches_text && matches_type && matches_category
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Rolling spend totals for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub today: Cents,
    pub week: Cents,
    pub month: Cents,
    pub budget: Cents,
    pub remaining: Cents,
}

/// Sum the amounts of records dated inside `window`. Saturates at `Cents::MAX`.
pub fn window_sum<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
    window: Window,
) -> Cents {
    records.into_iter().fold(0, |total: Cents, record| {
        if window.contains(record.date) {
            total.saturating_add(record.amount_cents)
        } else {
            total
        }
    })
}

/// Remaining monthly budget, floored at zero. An unset (zero) budget
/// always reports zero remaining.
pub fn remaining_budget(budget: Cents, month_total: Cents) -> Cents {
    if budget > 0 {
        (budget - month_total).max(0)
    } else {
        0
    }
}

/// Drop stored records that break the record invariants: non-positive
/// amounts, blank categories, or an id already seen earlier in the list.
/// Returns the kept records and how many were dropped.
pub fn retain_valid(records: Vec<ExpenseRecord>) -> (Vec<ExpenseRecord>, usize) {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<_> = records
        .into_iter()
        .filter(|r| r.amount_cents > 0 && !r.category.trim().is_empty() && seen.insert(r.id))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// In-memory ledger state: records (most recent first), the monthly budget
/// and the category list.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<ExpenseRecord>,
    budget: Cents,
    categories: CategoryList,
}

impl Ledger {
    pub fn new(records: Vec<ExpenseRecord>, categories: CategoryList, budget: Cents) -> Self {
        Self {
            records,
            budget: budget.max(0),
            categories,
        }
    }

    /// Validate `input` and insert the resulting record at the head.
    pub fn add_record(&mut self, input: NewRecord) -> Result<ExpenseRecord, ValidationError> {
        let record = input.validate()?;
        self.records.insert(0, record.clone());
        Ok(record)
    }

    /// Remove the record with `id`. Unknown ids are ignored.
    pub fn remove_record(&mut self, id: RecordId) -> Option<ExpenseRecord> {
        let position = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(position))
    }

    /// Drop every record. Returns how many were removed.
    pub fn wipe(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    pub fn get(&self, id: RecordId) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All records, most recent first.
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filter(&self, query: &RecordQuery) -> Vec<&ExpenseRecord> {
        self.records.iter().filter(|r| query.matches(r)).collect()
    }

    /// Total of records dated in `[start, end_exclusive)`.
    pub fn window_sum(&self, start: NaiveDate, end_exclusive: NaiveDate) -> Cents {
        window_sum(&self.records, Window::new(start, end_exclusive))
    }

    pub fn budget(&self) -> Cents {
        self.budget
    }

    /// Set the monthly budget. Negative values are stored as zero.
    pub fn set_budget(&mut self, budget: Cents) {
        self.budget = budget.max(0);
    }

    pub fn remaining_budget(&self, month_total: Cents) -> Cents {
        remaining_budget(self.budget, month_total)
    }

    /// Today, this week and this month totals relative to `today`.
    pub fn summary(&self, today: NaiveDate) -> Summary {
        let month = window_sum(&self.records, Window::month(today));
        Summary {
            today: window_sum(&self.records, Window::day(today)),
            week: window_sum(&self.records, Window::week(today)),
            month,
            budget: self.budget,
            remaining: self.remaining_budget(month),
        }
    }

    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategoryList {
        &mut self.categories
    }
}
