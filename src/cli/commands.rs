//! Command implementations for CLI operations

use anyhow::Result;

use crate::config::AuditConfig;
use crate::types::{InventoryFacts, SchemaFacts, SpecificationFacts};
use crate::{
    analyze_implementation, analyze_schema, extract_specifications, reconcile_and_render, run_audit,
};

use super::artifacts::{
    artifact_path, ensure_output_directory, read_json, write_json, write_text, INVENTORY_ARTIFACT,
    REPORT_ARTIFACT, SCHEMA_ARTIFACT, SPECIFICATIONS_ARTIFACT,
};

/// Extract schema facts from the migrations directory
pub fn schema_command(config: &AuditConfig) -> Result<()> {
    let facts = analyze_schema(config)?;

    ensure_output_directory(config)?;
    let output = artifact_path(config, SCHEMA_ARTIFACT);
    write_json(&output, &facts)?;

    print_schema_summary(&facts);
    if !facts.table_names.is_empty() {
        println!("\nTables: {}", facts.table_names.join(", "));
    }
    println!("\nResults saved to: {}", output.display());
    Ok(())
}

/// Inventory the source tree
pub fn inventory_command(config: &AuditConfig) -> Result<()> {
    let facts = analyze_implementation(config)?;

    ensure_output_directory(config)?;
    let output = artifact_path(config, INVENTORY_ARTIFACT);
    write_json(&output, &facts)?;

    print_inventory_summary(&facts);
    println!("\nResults saved to: {}", output.display());
    Ok(())
}

/// Extract features from the planning documents
pub fn extract_command(config: &AuditConfig) -> Result<()> {
    let facts = extract_specifications(config)?;

    ensure_output_directory(config)?;
    let output = artifact_path(config, SPECIFICATIONS_ARTIFACT);
    write_json(&output, &facts)?;

    print_specification_summary(&facts);
    println!("\nResults saved to: {}", output.display());
    Ok(())
}

/// Reconcile previously saved fact artifacts into the report
pub fn report_command(config: &AuditConfig) -> Result<()> {
    let specs: SpecificationFacts =
        read_json(&artifact_path(config, SPECIFICATIONS_ARTIFACT), "specification facts")?;
    let inventory: InventoryFacts =
        read_json(&artifact_path(config, INVENTORY_ARTIFACT), "implementation facts")?;
    let schema: SchemaFacts = read_json(&artifact_path(config, SCHEMA_ARTIFACT), "schema facts")?;

    let (statuses, report) = reconcile_and_render(config, &specs, &schema, &inventory);

    let output = artifact_path(config, REPORT_ARTIFACT);
    write_text(&output, &report)?;

    println!("\nReconciled {} features", statuses.len());
    println!("Report generated successfully: {}", output.display());
    Ok(())
}

/// Run every stage, then write all artifacts
pub fn audit_command(config: &AuditConfig) -> Result<()> {
    let outcome = run_audit(config)?;

    ensure_output_directory(config)?;
    write_json(&artifact_path(config, SCHEMA_ARTIFACT), &outcome.schema)?;
    write_json(&artifact_path(config, INVENTORY_ARTIFACT), &outcome.inventory)?;
    write_json(&artifact_path(config, SPECIFICATIONS_ARTIFACT), &outcome.specifications)?;
    let report_path = artifact_path(config, REPORT_ARTIFACT);
    write_text(&report_path, &outcome.report)?;

    print_schema_summary(&outcome.schema);
    print_inventory_summary(&outcome.inventory);
    print_specification_summary(&outcome.specifications);

    let summary = crate::report::summarize(&outcome.statuses, &config.phases);
    println!(
        "\nOverall completion: {}/{} ({:.1}%)",
        summary.total.complete,
        summary.total.total,
        summary.total.percentage()
    );
    println!("Report generated successfully: {}", report_path.display());
    Ok(())
}

fn print_schema_summary(facts: &SchemaFacts) {
    println!("\nDatabase Analysis Complete!");
    println!("  Total Migrations: {}", facts.summary.total_migrations);
    println!("  Total Tables: {}", facts.summary.total_tables);
    println!("  Total Indexes: {}", facts.summary.total_indexes);
    println!("  Total Functions: {}", facts.summary.total_functions);
    println!("  Total Triggers: {}", facts.summary.total_triggers);
}

fn print_inventory_summary(facts: &InventoryFacts) {
    println!("\nImplementation Analysis Complete!");
    for (name, count) in &facts.summary {
        println!("  {}: {}", name, count);
    }
    if !facts.counts.is_empty() {
        println!("\nConventions:");
        for (name, count) in &facts.counts {
            println!("  {}: {}", name, count);
        }
    }
}

fn print_specification_summary(facts: &SpecificationFacts) {
    println!("\nExtraction complete!");
    println!("  Total documents: {}", facts.summary.total_documents);
    println!("  Total tables found: {}", facts.summary.total_tables);
    println!("  Total features found: {}", facts.summary.total_features);
    println!("  Total components found: {}", facts.summary.total_components);
}
