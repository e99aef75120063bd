//! The end-to-end pipeline: raw dataset → recipe set → base table →
//! operator-seeded table → resolved export.
//!
//! Each step reads and writes well-known files inside one working
//! directory, so a run can stop between steps (the seeding step is a human)
//! and pick up later.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::domain::{
    build_price_table, extract_recipes, finalize, resolve_prices, Lookup, PriceTable,
    PricingPolicy, ResolutionOutcome,
};
use crate::infra::dataset::{self, DatasetClient, DatasetError};
use crate::infra::store::{self, StoreError};
use crate::infra::table_io::{self, TableIoError};

/// File name of the raw spell dataset release blob.
pub const SPELL_DATASET_FILE: &str = "Spell.csv.gz";

/// The working directory and the well-known files inside it.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The gzipped-JSON item dump produced by the database layer.
    pub fn item_dump(&self) -> PathBuf {
        self.root.join("items.json.gz")
    }

    pub fn recipes(&self) -> PathBuf {
        self.root.join("recipes.json.gz")
    }

    /// The generated table with every price unresolved.
    pub fn base_table(&self) -> PathBuf {
        self.root.join("base-price-table.tsv")
    }

    /// The operator's copy of the base table with atomic prices seeded.
    pub fn price_table(&self) -> PathBuf {
        self.root.join("price-table.tsv")
    }

    pub fn final_table(&self) -> PathBuf {
        self.root.join("final-price-table.tsv")
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    TableIo(#[from] TableIoError),
}

/// Runs the pipeline steps against one workspace under one policy.
pub struct PriceIndexWorkflow {
    workspace: Workspace,
    policy: PricingPolicy,
    lookup: Lookup,
}

impl PriceIndexWorkflow {
    pub fn new(workspace: Workspace, policy: PricingPolicy, lookup: Lookup) -> Self {
        Self {
            workspace,
            policy,
            lookup,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Step 1: obtain the raw dataset, mine the recipe set, persist it.
    ///
    /// With `spell_csv` given, the local file is used; otherwise the
    /// versioned release blob is downloaded into the workspace (or reused
    /// from an earlier run). Returns how many recipes survived extraction.
    pub async fn extract_recipes(&self, spell_csv: Option<&Path>) -> Result<usize, WorkflowError> {
        let path = match spell_csv {
            Some(path) => path.to_path_buf(),
            None => {
                DatasetClient::new()?
                    .download(SPELL_DATASET_FILE, self.workspace.root())
                    .await?
            }
        };
        info!(path = %path.display(), "reading spell dataset");
        let records = dataset::read_spell_records(&path)?;
        info!(records = records.len(), "dataset decoded");
        let recipes = extract_recipes(&records);
        info!(recipes = recipes.len(), "recipes extracted");
        store::save_recipes(&self.workspace.recipes(), &recipes)?;
        info!(path = %self.workspace.recipes().display(), "recipe set saved");
        Ok(recipes.len())
    }

    /// Step 2: join the item dump with the stored recipe set into the base
    /// table, every price unresolved. The operator copies the output to the
    /// seeded table and fills in atomic-item prices by hand.
    pub fn build_base_table(&self) -> Result<PriceTable, WorkflowError> {
        let items = store::load_item_dump(&self.workspace.item_dump())?;
        info!(items = items.len(), "item dump loaded");
        let recipes = store::load_recipes(&self.workspace.recipes())?;
        info!(recipes = recipes.len(), "recipe set loaded");
        let table = build_price_table(&items, &recipes, &self.policy, &self.lookup);
        info!(rows = table.len(), "price table built");
        table_io::write_price_table(&self.workspace.base_table(), &table)?;
        info!(path = %self.workspace.base_table().display(), "base table written");
        Ok(table)
    }

    /// Step 3: read the seeded table, run the solver, export every row that
    /// priced out. Rows the solver could not reach stay out of the export
    /// and are reported in the outcome, not treated as an error.
    pub fn resolve(&self) -> Result<ResolutionOutcome, WorkflowError> {
        let mut table = table_io::read_price_table(&self.workspace.price_table())?;
        info!(
            rows = table.len(),
            seeded = table.resolved_count(),
            "seeded price table loaded"
        );
        let outcome = resolve_prices(&mut table, self.policy.max_passes);
        info!(
            passes = outcome.passes,
            resolved = outcome.resolved,
            unresolved = outcome.unresolved,
            "resolution finished"
        );
        let final_rows = finalize(&table);
        table_io::write_final_table(&self.workspace.final_table(), &final_rows)?;
        info!(
            path = %self.workspace.final_table().display(),
            rows = final_rows.len(),
            "final table written"
        );
        Ok(outcome)
    }
}
