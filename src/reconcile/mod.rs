//! Status reconciliation
//!
//! Compares every planned feature against the schema and inventory fact sets
//! and assigns exactly one status. The cascade is an ordered list of rules;
//! the first rule that fires decides the base status, then the Modified
//! override is layered on top.

pub mod rules;

use tracing::debug;

use crate::types::{
    Feature, FeatureStatus, InventoryFacts, SchemaFacts, SpecificationFacts, StatusResult,
};

pub use rules::{
    apply_modified_override, search_terms, FileMatch, NotFound, Rule, RuleFacts, TableMatch,
};

/// Runs the classification cascade
pub struct Reconciler {
    rules: Vec<Box<dyn Rule>>,
}

impl Reconciler {
    /// Table match, then file match, then not found
    pub fn new() -> Self {
        Self::with_rules(vec![Box::new(TableMatch), Box::new(FileMatch), Box::new(NotFound)])
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Classify one feature
    pub fn classify(&self, feature: &Feature, facts: &RuleFacts<'_>) -> StatusResult {
        let base = self
            .rules
            .iter()
            .find_map(|rule| {
                let result = rule.evaluate(feature, facts)?;
                debug!("{:?} -> {:?} via {}", feature.title, result.status, rule.name());
                Some(result)
            })
            .unwrap_or_else(rules::not_started);

        apply_modified_override(&feature.title, base)
    }

    /// Classify every feature of every document, in document order
    pub fn reconcile(
        &self,
        specs: &SpecificationFacts,
        schema: &SchemaFacts,
        inventory: &InventoryFacts,
    ) -> Vec<FeatureStatus> {
        let facts = RuleFacts {
            tables: &schema.tables,
            files: &inventory.files,
        };

        specs
            .features()
            .map(|feature| FeatureStatus {
                phase: feature.phase.clone(),
                title: feature.title.clone(),
                result: self.classify(feature, &facts),
            })
            .collect()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DocumentFacts, InventoryFile, Status, Table};

    fn feature(title: &str, description: &str) -> Feature {
        Feature {
            phase: "Phase 2".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            has_code: false,
            code_blocks_count: 0,
        }
    }

    fn orders_table() -> Table {
        Table::new(
            "orders",
            vec![Column {
                name: "id".to_string(),
                column_type: "uuid".to_string(),
                is_primary_key: true,
                is_foreign_key: false,
                is_not_null: false,
                has_default: false,
                is_unique: false,
            }],
        )
    }

    fn web_file(path: &str) -> InventoryFile {
        InventoryFile {
            path: path.to_string(),
            app: "web".to_string(),
            category: "pages".to_string(),
        }
    }

    #[test]
    fn test_default_rule_order() {
        assert_eq!(
            Reconciler::new().rule_names(),
            vec!["table_match", "file_match", "not_found"]
        );
    }

    #[test]
    fn test_table_rule_short_circuits_file_rule() {
        // the file would trigger the "no UI component" downgrade if evaluated
        let tables = vec![orders_table()];
        let files = vec![web_file("lib/orders-component.ts")];
        let facts = RuleFacts {
            tables: &tables,
            files: &files,
        };

        let result = Reconciler::new().classify(&feature("Create Orders Component", ""), &facts);
        assert_eq!(result.status, Status::Complete);
        assert_eq!(result.evidence, "Table: orders");
    }

    #[test]
    fn test_update_with_table_match_becomes_modified() {
        let tables = vec![orders_table()];
        let facts = RuleFacts {
            tables: &tables,
            files: &[],
        };

        let result = Reconciler::new().classify(
            &feature("Update checkout flow", "Writes a row to orders on submit"),
            &facts,
        );
        assert_eq!(result.status, Status::Modified);
        assert_eq!(result.gap, rules::GAP_MODIFIED);
        assert_eq!(result.evidence, "Table: orders");
    }

    #[test]
    fn test_refactor_with_partial_stays_partial() {
        let files = vec![web_file("lib/database.ts")];
        let facts = RuleFacts {
            tables: &[],
            files: &files,
        };
        let result = Reconciler::new().classify(&feature("Refactor database layer", ""), &facts);
        assert_eq!(result.status, Status::PartiallyComplete);
    }

    #[test]
    fn test_nothing_matches_not_started() {
        let facts = RuleFacts {
            tables: &[],
            files: &[],
        };
        let result = Reconciler::new().classify(&feature("Build Login Page", ""), &facts);
        assert_eq!(result.status, Status::NotStarted);
        assert_eq!(result.gap, rules::GAP_NOT_FOUND);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn test_mentions_past_truncation_are_not_seen() {
        let text = format!("### Sync\n{}Store rows in orders via orders.tsx\n", "x ".repeat(300));
        let features = crate::extraction::extract_features(&text, "Phase 2");
        assert_eq!(features.len(), 1);
        assert!(!features[0].title.contains("orders"));
        assert!(!features[0].description.contains("orders"));

        let tables = vec![orders_table()];
        let files = vec![web_file("orders/OrderTable.tsx")];
        let facts = RuleFacts {
            tables: &tables,
            files: &files,
        };
        let reconciler = Reconciler::new();

        let result = reconciler.classify(&features[0], &facts);
        assert_eq!(result.status, Status::NotStarted);

        // the same feature is found when its full text is kept
        let full = feature("Sync", &text);
        assert_eq!(reconciler.classify(&full, &facts).status, Status::Complete);
    }

    #[test]
    fn test_empty_rule_list_falls_back_to_not_started() {
        let facts = RuleFacts {
            tables: &[],
            files: &[],
        };
        let result = Reconciler::with_rules(vec![]).classify(&feature("Anything", ""), &facts);
        assert_eq!(result.status, Status::NotStarted);
    }

    #[test]
    fn test_reconcile_one_status_per_feature() {
        let specs = SpecificationFacts::from_documents(vec![DocumentFacts {
            file: "b2b-phase2.txt".to_string(),
            phase: "Phase 2".to_string(),
            features: vec![feature("Order history", ""), feature("Order history", "")],
            ..Default::default()
        }]);
        let schema = SchemaFacts::aggregate(vec![]);
        let inventory = InventoryFacts {
            files: vec![web_file("orders/page.tsx")],
            ..Default::default()
        };

        let statuses = Reconciler::new().reconcile(&specs, &schema, &inventory);
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.result.status == Status::Complete));
        assert_eq!(statuses[0].phase, "Phase 2");
    }
}
