use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{
    CategoryList, Cents, ExpenseRecord, Ledger, NewRecord, RecordId, RecordQuery, Summary,
    ValidationError, retain_valid,
};
use crate::storage::{Repository, Slot, SlotValue};

use super::AppError;

/// How each slot was found when the service was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Absent,
    Corrupt,
    Loaded,
    /// Decoded, but some entries broke the record invariants and were dropped
    Repaired,
}

impl<T> From<&SlotValue<T>> for SlotStatus {
    fn from(value: &SlotValue<T>) -> Self {
        match value {
            SlotValue::Absent => SlotStatus::Absent,
            SlotValue::Corrupt(_) => SlotStatus::Corrupt,
            SlotValue::Present(_) => SlotStatus::Loaded,
        }
    }
}

/// Per-slot outcome of the startup load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub records: SlotStatus,
    pub categories: SlotStatus,
    pub budget: SlotStatus,
}

/// Application service owning the ledger state and its persistence.
/// This is the primary interface for any client (CLI, TUI, etc.).
///
/// Every mutation is applied to the in-memory ledger first and then written
/// back to its slot. Writes are best-effort: a failed write is logged and
/// the in-memory state stays authoritative for the rest of the session.
pub struct LedgerService {
    repo: Repository,
    ledger: Ledger,
    load_report: LoadReport,
}

impl LedgerService {
    /// Open the database at `database_path`, creating it if needed, and load
    /// all three slots. Missing or corrupt slots fall back to defaults.
    pub async fn open(database_path: &str) -> Result<Self, AppError> {
        let repo = Repository::open(database_path).await?;
        Self::load(repo).await
    }

    /// Load ledger state from an already migrated repository.
    pub async fn load(repo: Repository) -> Result<Self, AppError> {
        let records: SlotValue<Vec<ExpenseRecord>> = repo.load_slot(Slot::Records).await?;
        let categories: SlotValue<CategoryList> = repo.load_slot(Slot::Categories).await?;
        let budget: SlotValue<Cents> = repo.load_slot(Slot::Budget).await?;

        let mut load_report = LoadReport {
            records: SlotStatus::from(&records),
            categories: SlotStatus::from(&categories),
            budget: SlotStatus::from(&budget),
        };

        let (records, dropped) = retain_valid(fallback(Slot::Records, records));
        if dropped > 0 {
            warn!(dropped, "stored records broke invariants and were skipped");
            load_report.records = SlotStatus::Repaired;
        }

        let ledger = Ledger::new(
            records,
            fallback(Slot::Categories, categories),
            fallback(Slot::Budget, budget),
        );
        info!(records = ledger.len(), budget = ledger.budget(), "ledger loaded");

        Ok(Self {
            repo,
            ledger,
            load_report,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    // ========================
    // Record operations
    // ========================

    /// Validate and store a new record at the head of the ledger.
    pub async fn add_record(&mut self, input: NewRecord) -> Result<ExpenseRecord, AppError> {
        let record = self.ledger.add_record(input)?;
        info!(
            id = %record.id,
            amount = record.amount_cents,
            category = %record.category,
            "record added"
        );
        self.persist_records().await;
        Ok(record)
    }

    /// Add several records in order, each at the head, writing the records
    /// slot once at the end. Invalid inputs are skipped and reported in place.
    pub async fn add_records(
        &mut self,
        inputs: impl IntoIterator<Item = NewRecord>,
    ) -> Vec<Result<ExpenseRecord, ValidationError>> {
        let results: Vec<_> = inputs
            .into_iter()
            .map(|input| self.ledger.add_record(input))
            .collect();

        let added = results.iter().filter(|r| r.is_ok()).count();
        if added > 0 {
            info!(added, "records added");
            self.persist_records().await;
        }
        results
    }

    /// Delete a record by id. Unknown ids are not an error.
    pub async fn remove_record(&mut self, id: RecordId) -> Option<ExpenseRecord> {
        let removed = self.ledger.remove_record(id)?;
        info!(id = %id, "record removed");
        self.persist_records().await;
        Some(removed)
    }

    /// Resolve a full id or a unique id prefix, as shown in listings.
    pub fn find_record_id(&self, prefix: &str) -> Result<Option<RecordId>, AppError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }
        let mut matches = self
            .ledger
            .records()
            .iter()
            .filter(|r| r.id.to_string().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(record), None) => Ok(Some(record.id)),
            (Some(_), Some(_)) => Err(AppError::AmbiguousId(prefix.clone())),
        }
    }

    pub fn list_records(&self, query: &RecordQuery) -> Vec<&ExpenseRecord> {
        self.ledger.filter(query)
    }

    /// Remove every record. Requires `confirmed` to be true.
    pub async fn wipe(&mut self, confirmed: bool) -> Result<usize, AppError> {
        if !confirmed {
            return Err(AppError::WipeNotConfirmed);
        }
        let count = self.ledger.wipe();
        info!(count, "all records wiped");
        self.persist_records().await;
        Ok(count)
    }

    // ========================
    // Budget and summaries
    // ========================

    /// Set the monthly budget. Zero clears it.
    pub async fn set_budget(&mut self, budget: Cents) -> Result<(), AppError> {
        if budget < 0 {
            return Err(AppError::InvalidAmount(
                "Budget cannot be negative".to_string(),
            ));
        }
        self.ledger.set_budget(budget);
        info!(budget, "budget updated");
        self.persist(Slot::Budget, &budget).await;
        Ok(())
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        self.ledger.summary(today)
    }

    // ========================
    // Categories
    // ========================

    pub fn categories(&self) -> &CategoryList {
        self.ledger.categories()
    }

    /// Add a category. Returns false if it was blank or already present.
    pub async fn add_category(&mut self, name: &str) -> bool {
        let added = self.ledger.categories_mut().add(name);
        if added {
            info!(category = name.trim(), "category added");
            self.persist_categories().await;
        }
        added
    }

    /// Remove a category. Existing records keep their category text.
    pub async fn remove_category(&mut self, name: &str) -> bool {
        let removed = self.ledger.categories_mut().remove(name);
        if removed {
            info!(category = name.trim(), "category removed");
            self.persist_categories().await;
        }
        removed
    }

    // ========================
    // Persistence
    // ========================

    async fn persist_records(&self) {
        self.persist(Slot::Records, self.ledger.records()).await;
    }

    async fn persist_categories(&self) {
        self.persist(Slot::Categories, self.ledger.categories()).await;
    }

    async fn persist<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) {
        if let Err(e) = self.repo.save_slot(slot, value).await {
            warn!(slot = %slot, error = %e, "failed to persist slot, keeping in-memory state");
        }
    }
}

fn fallback<T: Default>(slot: Slot, value: SlotValue<T>) -> T {
    if let SlotValue::Corrupt(reason) = &value {
        warn!(slot = %slot, reason = %reason, "stored data is corrupt, using defaults");
    }
    value.or_default()
}
