//! buildaudit: audit a project's build state against its written plan
//!
//! Harvests structured facts from three kinds of input and reconciles them:
//!
//! ## Pipeline
//!
//! - Schema extraction: tables, columns, indexes, functions and triggers from
//!   migration SQL
//! - Document extraction: phase-tagged features and component references from
//!   planning documents
//! - Inventory: categorized implementation files and naming-convention counts
//!   from the source tree
//! - Reconciliation: one status per planned feature (Not Started, Partially
//!   Complete, Complete, Modified) with its gap and evidence
//! - Reporting: per-phase completion and a markdown progress report
//!
//! Each extractor produces an immutable fact set; the reconciler only ever
//! sees those fact sets, never raw input.

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod inventory;
pub mod reconcile;
pub mod report;
pub mod types;

use tracing::info;

pub use config::AuditConfig;
pub use error::{AuditError, Result};

use reconcile::Reconciler;
use types::{FeatureStatus, InventoryFacts, SchemaFacts, SpecificationFacts};

/// Extract schema facts from every migration unit
pub fn analyze_schema(config: &AuditConfig) -> Result<SchemaFacts> {
    extraction::schema::analyze_migrations(
        &config.migrations_dir(),
        &config.database.migration_pattern,
    )
}

/// Extract features and components from every planning document
pub fn extract_specifications(config: &AuditConfig) -> Result<SpecificationFacts> {
    extraction::documents::analyze_documents(&config.documents_dir(), &config.documents.pattern)
}

/// Build the implementation inventory from one walk of the source tree
pub fn analyze_implementation(config: &AuditConfig) -> Result<InventoryFacts> {
    inventory::build_inventory(config)
}

/// Everything one audit run produces, held in memory until written
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub schema: SchemaFacts,
    pub inventory: InventoryFacts,
    pub specifications: SpecificationFacts,
    pub statuses: Vec<FeatureStatus>,
    pub report: String,
}

/// Reconcile the three fact sets and render the report
pub fn reconcile_and_render(
    config: &AuditConfig,
    specifications: &SpecificationFacts,
    schema: &SchemaFacts,
    inventory: &InventoryFacts,
) -> (Vec<FeatureStatus>, String) {
    let statuses = Reconciler::new().reconcile(specifications, schema, inventory);
    let report = report::render_report(&config.project_name, &statuses, &config.phases);
    info!("Reconciled {} features", statuses.len());
    (statuses, report)
}

/// Run the whole pipeline. Any unreadable or missing input aborts the run
/// before anything is written.
pub fn run_audit(config: &AuditConfig) -> Result<AuditOutcome> {
    info!("Auditing {}", config.root.display());

    let schema = analyze_schema(config)?;
    let specifications = extract_specifications(config)?;
    let inventory = analyze_implementation(config)?;
    let (statuses, report) = reconcile_and_render(config, &specifications, &schema, &inventory);

    Ok(AuditOutcome {
        schema,
        inventory,
        specifications,
        statuses,
        report,
    })
}
