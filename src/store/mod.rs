use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Client, Expense, Firm, Invoice, User};

/// Demo records used when no data file exists yet, mirroring the dataset
/// the application ships with.
const SEED: &str = include_str!("seed.json");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read data file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write data file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("data file {path} is not valid: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
    #[error("failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// The whole data file: one list of records per entity type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    firms: Vec<Firm>,
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    invoices: Vec<Invoice>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    users: Vec<User>,
}

/// JSON-document-backed record store.
///
/// All records live in one document keyed by entity type. Every mutation
/// rewrites the file through a temp-file rename; when the write fails the
/// in-memory records are left untouched, so a failed save never shows up
/// in the lists.
pub struct Store {
    path: PathBuf,
    doc: Document,
}

impl Store {
    /// Open the data file, seeding the demo records on first run.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if fs::try_exists(&path).await.map_err(|source| StoreError::Read {
            path: path.display().to_string(),
            source,
        })? {
            let raw = fs::read_to_string(&path)
                .await
                .map_err(|source| StoreError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
            let doc = serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                path: path.display().to_string(),
                source,
            })?;
            debug!(path = %path.display(), "loaded data file");
            Ok(Self { path, doc })
        } else {
            let doc = serde_json::from_str(SEED).map_err(|source| StoreError::Decode {
                path: "seed".to_string(),
                source,
            })?;
            let mut store = Self {
                path: path.clone(),
                doc: Document::default(),
            };
            store.commit(doc).await?;
            info!(path = %path.display(), "created data file with demo records");
            Ok(store)
        }
    }

    /// Write a modified document to disk, then adopt it. The temp-file
    /// rename keeps a crash from truncating the previous contents.
    async fn commit(&mut self, doc: Document) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&doc)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|source| StoreError::Write {
                path: tmp.display().to_string(),
                source,
            })?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })?;

        self.doc = doc;
        Ok(())
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    // Firm operations
    pub async fn load_firms(&self) -> Result<Vec<Firm>, StoreError> {
        let mut firms = self.doc.firms.clone();
        firms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(firms)
    }

    pub async fn get_firm(&self, id: &str) -> Result<Firm, StoreError> {
        self.doc
            .firms
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "firm",
                id: id.to_string(),
            })
    }

    pub async fn create_firm(&mut self, mut firm: Firm) -> Result<String, StoreError> {
        let now = Utc::now();
        firm.id = Self::new_id();
        firm.created_at = now;
        firm.updated_at = now;
        let id = firm.id.clone();

        let mut doc = self.doc.clone();
        doc.firms.push(firm);
        self.commit(doc).await?;

        Ok(id)
    }

    pub async fn update_firm(&mut self, firm: &Firm) -> Result<(), StoreError> {
        let existing = self.get_firm(&firm.id).await?;

        let mut updated = firm.clone();
        updated.created_at = existing.created_at;
        updated.updated_at = Utc::now();

        let mut doc = self.doc.clone();
        if let Some(slot) = doc.firms.iter_mut().find(|f| f.id == firm.id) {
            *slot = updated;
        }
        self.commit(doc).await
    }

    /// Deleting a firm takes its invoices and expenses with it in the same
    /// write.
    pub async fn delete_firm(&mut self, id: &str) -> Result<(), StoreError> {
        self.get_firm(id).await?;

        let mut doc = self.doc.clone();
        doc.invoices.retain(|inv| inv.firm_id != id);
        doc.expenses.retain(|exp| exp.firm_id != id);
        doc.firms.retain(|f| f.id != id);
        self.commit(doc).await
    }

    // Client operations
    pub async fn load_clients(&self) -> Result<Vec<Client>, StoreError> {
        let mut clients = self.doc.clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    pub async fn get_client(&self, id: &str) -> Result<Client, StoreError> {
        self.doc
            .clients
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "client",
                id: id.to_string(),
            })
    }

    pub async fn create_client(&mut self, mut client: Client) -> Result<String, StoreError> {
        client.id = Self::new_id();
        client.created_at = Utc::now();
        let id = client.id.clone();

        let mut doc = self.doc.clone();
        doc.clients.push(client);
        self.commit(doc).await?;

        Ok(id)
    }

    pub async fn update_client(&mut self, client: &Client) -> Result<(), StoreError> {
        let existing = self.get_client(&client.id).await?;

        let mut updated = client.clone();
        updated.created_at = existing.created_at;

        let mut doc = self.doc.clone();
        if let Some(slot) = doc.clients.iter_mut().find(|c| c.id == client.id) {
            *slot = updated;
        }
        self.commit(doc).await
    }

    /// Invoices keep their client id after the client is gone; lists fall
    /// back to an "Unknown Client" label.
    pub async fn delete_client(&mut self, id: &str) -> Result<(), StoreError> {
        self.get_client(id).await?;

        let mut doc = self.doc.clone();
        doc.clients.retain(|c| c.id != id);
        self.commit(doc).await
    }

    // Invoice operations
    pub async fn load_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        let mut invoices = self.doc.invoices.clone();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Invoice, StoreError> {
        self.doc
            .invoices
            .iter()
            .find(|inv| inv.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "invoice",
                id: id.to_string(),
            })
    }

    pub async fn create_invoice(&mut self, mut invoice: Invoice) -> Result<String, StoreError> {
        let now = Utc::now();
        invoice.id = Self::new_id();
        invoice.created_at = now;
        invoice.updated_at = now;
        let id = invoice.id.clone();

        let mut doc = self.doc.clone();
        doc.invoices.push(invoice);
        self.commit(doc).await?;

        Ok(id)
    }

    pub async fn update_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        let existing = self.get_invoice(&invoice.id).await?;

        let mut updated = invoice.clone();
        updated.created_at = existing.created_at;
        updated.updated_at = Utc::now();

        let mut doc = self.doc.clone();
        if let Some(slot) = doc.invoices.iter_mut().find(|inv| inv.id == invoice.id) {
            *slot = updated;
        }
        self.commit(doc).await
    }

    pub async fn delete_invoice(&mut self, id: &str) -> Result<(), StoreError> {
        self.get_invoice(id).await?;

        let mut doc = self.doc.clone();
        doc.invoices.retain(|inv| inv.id != id);
        self.commit(doc).await
    }

    // Expense operations
    pub async fn load_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let mut expenses = self.doc.expenses.clone();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    pub async fn get_expense(&self, id: &str) -> Result<Expense, StoreError> {
        self.doc
            .expenses
            .iter()
            .find(|exp| exp.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "expense",
                id: id.to_string(),
            })
    }

    pub async fn create_expense(&mut self, mut expense: Expense) -> Result<String, StoreError> {
        expense.id = Self::new_id();
        expense.created_at = Utc::now();
        let id = expense.id.clone();

        let mut doc = self.doc.clone();
        doc.expenses.push(expense);
        self.commit(doc).await?;

        Ok(id)
    }

    pub async fn update_expense(&mut self, expense: &Expense) -> Result<(), StoreError> {
        let existing = self.get_expense(&expense.id).await?;

        let mut updated = expense.clone();
        updated.created_at = existing.created_at;

        let mut doc = self.doc.clone();
        if let Some(slot) = doc.expenses.iter_mut().find(|exp| exp.id == expense.id) {
            *slot = updated;
        }
        self.commit(doc).await
    }

    pub async fn delete_expense(&mut self, id: &str) -> Result<(), StoreError> {
        self.get_expense(id).await?;

        let mut doc = self.doc.clone();
        doc.expenses.retain(|exp| exp.id != id);
        self.commit(doc).await
    }

    // User operations
    pub async fn load_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.doc.users.clone())
    }
}

/// Open the record store at the configured data file
pub async fn init(config: &Config) -> Result<Store, StoreError> {
    Store::open(config.data_file()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use crate::tax::GstRate;
    use chrono::NaiveDate;

    async fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("data.json")).await.unwrap();
        (dir, store)
    }

    fn sample_firm(name: &str) -> Firm {
        Firm {
            id: String::new(),
            name: name.to_string(),
            description: "CONTRACTOR".to_string(),
            gst_number: None,
            permanent_address: "Keonjhar".to_string(),
            present_address: "Keonjhar".to_string(),
            phone: "9000000000".to_string(),
            proprietor: "Prop. Test".to_string(),
            account_number: None,
            ifsc_code: None,
            letterhead_type: "template".to_string(),
            letterhead_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_invoice(firm_id: &str) -> Invoice {
        Invoice {
            id: String::new(),
            invoice_number: "T/2025/001".to_string(),
            firm_id: firm_id.to_string(),
            client_id: "1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            description: "Services".to_string(),
            sac_code: None,
            rate: 100.0,
            quantity: 2.0,
            unit: "Hours".to_string(),
            gst_rate: GstRate::Exempt,
            taxable_amount: 200.0,
            cgst_amount: 0.0,
            sgst_amount: 0.0,
            igst_amount: 0.0,
            grand_total: 200.0,
            payment_status: PaymentStatus::Pending,
            paid_amount: 0.0,
            pending_amount: 200.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_open_seeds_demo_records() {
        let (_dir, store) = temp_store().await;

        assert_eq!(store.load_firms().await.unwrap().len(), 2);
        assert_eq!(store.load_clients().await.unwrap().len(), 3);
        assert_eq!(store.load_invoices().await.unwrap().len(), 2);
        assert_eq!(store.load_expenses().await.unwrap().len(), 2);
        assert_eq!(store.load_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn seeded_invoice_totals_survive_the_round_trip() {
        let (_dir, store) = temp_store().await;

        let invoice = store.get_invoice("1").await.unwrap();
        assert_eq!(invoice.invoice_number, "KDJ/LHR/24-25/19");
        assert_eq!(invoice.gst_rate, GstRate::Eighteen);
        assert_eq!(invoice.taxable_amount, 177_800.0);
        assert_eq!(invoice.cgst_amount, 16_002.0);
        assert_eq!(invoice.grand_total, 209_804.0);
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn created_records_get_ids_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let id = {
            let mut store = Store::open(&path).await.unwrap();
            store.create_firm(sample_firm("NEW FIRM")).await.unwrap()
        };
        assert!(!id.is_empty());

        let reopened = Store::open(&path).await.unwrap();
        let firm = reopened.get_firm(&id).await.unwrap();
        assert_eq!(firm.name, "NEW FIRM");
    }

    #[tokio::test]
    async fn update_preserves_creation_time() {
        let (_dir, mut store) = temp_store().await;

        let id = store.create_firm(sample_firm("NEW FIRM")).await.unwrap();
        let created = store.get_firm(&id).await.unwrap();

        let mut edited = created.clone();
        edited.phone = "9111111111".to_string();
        store.update_firm(&edited).await.unwrap();

        let reloaded = store.get_firm(&id).await.unwrap();
        assert_eq!(reloaded.phone, "9111111111");
        assert_eq!(reloaded.created_at, created.created_at);
        assert!(reloaded.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn deleting_a_firm_cascades_to_its_records() {
        let (_dir, mut store) = temp_store().await;

        let firm_id = store.create_firm(sample_firm("DOOMED")).await.unwrap();
        store.create_invoice(sample_invoice(&firm_id)).await.unwrap();

        store.delete_firm(&firm_id).await.unwrap();

        assert!(matches!(
            store.get_firm(&firm_id).await,
            Err(StoreError::NotFound { .. })
        ));
        let orphaned = store
            .load_invoices()
            .await
            .unwrap()
            .into_iter()
            .any(|inv| inv.firm_id == firm_id);
        assert!(!orphaned);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let (_dir, store) = temp_store().await;
        assert!(matches!(
            store.get_client("no-such-id").await,
            Err(StoreError::NotFound { entity: "client", .. })
        ));
    }
}
