//! Filesystem bill store
//!
//! Downloads each bill's file into one directory and keeps a JSON index of
//! stored records next to it. Bills are identified by filename: a bill whose
//! file already exists is skipped, which makes repeated runs cheap.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::account::AccountFields;
use crate::domain::bill::BillRecord;
use crate::domain::services::{BillSaver, PageFetcher, SaveOptions, SaveSummary};

/// On-disk index of stored bills, keyed by filename
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BillIndex {
    pub identifiers: Vec<String>,
    pub account: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    pub bills: BTreeMap<String, BillRecord>,
}

pub struct FileBillStore {
    root: PathBuf,
    index_file: String,
    fetcher: Arc<dyn PageFetcher>,
}

impl FileBillStore {
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
            fetcher,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    pub async fn load_index(&self) -> Result<BillIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(BillIndex::default());
        }
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read bill index {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Corrupted bill index {:?}", path))
    }

    async fn write_index(&self, index: &BillIndex) -> Result<()> {
        let content = serde_json::to_string_pretty(index).context("Failed to serialize bill index")?;
        fs::write(self.index_path(), content)
            .await
            .context("Failed to write bill index")
    }

    fn bill_path(&self, filename: &str) -> Result<PathBuf> {
        if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
            bail!("Refusing to store bill under unsafe filename '{}'", filename);
        }
        Ok(self.root.join(filename))
    }

    async fn store_file(&self, bill: &BillRecord, path: &Path, options: &SaveOptions) -> Result<()> {
        let download = self
            .fetcher
            .download(&bill.fileurl)
            .await
            .map_err(|e| anyhow!("Failed to download {}: {}", bill.fileurl, e))?;

        match download.content_type.as_deref() {
            Some(ct) if ct.starts_with(options.content_type.as_str()) => {}
            other => warn!(
                "⚠️ {} served as {:?}, expected {}",
                bill.fileurl, other, options.content_type
            ),
        }

        // A partial write must never look like a stored bill
        let partial = partial_path(path);
        fs::write(&partial, &download.bytes)
            .await
            .with_context(|| format!("Failed to write {:?}", partial))?;
        fs::rename(&partial, path)
            .await
            .with_context(|| format!("Failed to move {:?} to {:?}", partial, path))?;
        debug!("Stored {} ({} bytes)", bill.filename, download.bytes.len());
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[async_trait]
impl BillSaver for FileBillStore {
    async fn save_bills(
        &self,
        bills: &[BillRecord],
        fields: &AccountFields,
        options: &SaveOptions,
    ) -> Result<SaveSummary> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create bill directory {:?}", self.root))?;

        let mut index = self.load_index().await?;
        let mut summary = SaveSummary::default();

        for bill in bills {
            let path = self.bill_path(&bill.filename)?;
            if path.exists() {
                debug!("Skipping already stored {}", bill.filename);
                index.bills.entry(bill.filename.clone()).or_insert_with(|| bill.clone());
                summary.skipped += 1;
                continue;
            }

            self.store_file(bill, &path, options).await?;
            index.bills.insert(bill.filename.clone(), bill.clone());
            summary.saved += 1;
        }

        index.identifiers.clone_from(&options.identifiers);
        index.account = Some(fields.login.clone());
        index.updated_at = Some(Utc::now());
        self.write_index(&index).await?;

        info!(
            "💾 Stored {} new bills, {} already present in {:?}",
            summary.saved, summary.skipped, self.root
        );
        Ok(summary)
    }
}
