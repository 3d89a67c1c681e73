//! Schema fact extraction from migration SQL

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{AuditError, Result};
use crate::types::{Column, Index, MigrationFacts, SchemaFacts, SchemaSummary, Table, Trigger};

use super::{file_name, list_matching, read_input};

pub(super) static TABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)CREATE TABLE\s+(\w+)\s*\((.*?)\);").unwrap());

static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CREATE\s+(?:UNIQUE\s+)?INDEX\s+(\w+)\s+ON\s+(\w+)").unwrap()
});

static FUNCTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CREATE\s+(?:OR\s+REPLACE\s+)?FUNCTION\s+(\w+)\s*\(").unwrap()
});

static TRIGGER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)CREATE\s+TRIGGER\s+(\w+)\s+.*?ON\s+(\w+)").unwrap());

/// Line prefixes that introduce table constraints rather than columns
const CONSTRAINT_PREFIXES: &[&str] = &["CONSTRAINT", "UNIQUE", "CHECK"];

/// First tokens that never name a column
const STRUCTURAL_KEYWORDS: &[&str] = &["PRIMARY", "FOREIGN", "REFERENCES", "ON", "DEFAULT"];

/// Extract `CREATE TABLE` blocks with their column definitions
pub fn extract_tables(sql: &str) -> Vec<Table> {
    TABLE_REGEX
        .captures_iter(sql)
        .map(|cap| {
            let columns = cap[2].split('\n').filter_map(parse_column).collect();
            Table::new(&cap[1], columns)
        })
        .collect()
}

/// Interpret one line of a table body as a column definition.
///
/// Flags come from substring search on the whole line, so a keyword inside
/// a string literal or comment on that line sets them too.
fn parse_column(line: &str) -> Option<Column> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("--") {
        return None;
    }

    let upper = line.to_uppercase();
    if CONSTRAINT_PREFIXES.iter().any(|p| upper.starts_with(p)) {
        return None;
    }

    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let column_type = parts.next()?;
    if STRUCTURAL_KEYWORDS.contains(&name.to_uppercase().as_str()) {
        return None;
    }

    Some(Column {
        name: name.trim_matches(',').to_string(),
        column_type: column_type.trim_matches(',').to_string(),
        is_primary_key: upper.contains("PRIMARY KEY"),
        is_foreign_key: upper.contains("REFERENCES"),
        is_not_null: upper.contains("NOT NULL"),
        has_default: upper.contains("DEFAULT"),
        is_unique: upper.contains("UNIQUE"),
    })
}

pub fn extract_indexes(sql: &str) -> Vec<Index> {
    INDEX_REGEX
        .captures_iter(sql)
        .map(|cap| Index {
            name: cap[1].to_string(),
            table: cap[2].to_string(),
        })
        .collect()
}

/// Function names in order of appearance, duplicates kept
pub fn extract_functions(sql: &str) -> Vec<String> {
    FUNCTION_REGEX
        .captures_iter(sql)
        .map(|cap| cap[1].to_string())
        .collect()
}

pub fn extract_triggers(sql: &str) -> Vec<Trigger> {
    TRIGGER_REGEX
        .captures_iter(sql)
        .map(|cap| Trigger {
            name: cap[1].to_string(),
            table: cap[2].to_string(),
        })
        .collect()
}

/// Extract every schema fact from one migration unit
pub fn analyze_migration(file: &str, sql: &str) -> MigrationFacts {
    MigrationFacts {
        file: file.to_string(),
        tables: extract_tables(sql),
        indexes: extract_indexes(sql),
        functions: extract_functions(sql),
        triggers: extract_triggers(sql),
    }
}

impl SchemaFacts {
    /// Merge per-unit facts into one schema view.
    ///
    /// A table defined in several units keeps the column list of its first
    /// definition; later definitions are dropped, not merged.
    pub fn aggregate(migrations: Vec<MigrationFacts>) -> Self {
        let mut seen = HashSet::new();
        let mut tables = Vec::new();
        let mut indexes = Vec::new();
        let mut functions = BTreeSet::new();
        let mut triggers = Vec::new();

        for migration in &migrations {
            for table in &migration.tables {
                if seen.insert(table.name.clone()) {
                    tables.push(table.clone());
                } else {
                    debug!(
                        "Ignoring redefinition of table {} in {}",
                        table.name, migration.file
                    );
                }
            }
            indexes.extend(migration.indexes.iter().cloned());
            functions.extend(migration.functions.iter().cloned());
            triggers.extend(migration.triggers.iter().cloned());
        }

        let mut table_names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
        table_names.sort();

        let summary = SchemaSummary {
            total_migrations: migrations.len(),
            total_tables: tables.len(),
            total_indexes: indexes.len(),
            total_functions: functions.len(),
            total_triggers: triggers.len(),
        };

        Self {
            migrations,
            summary,
            tables,
            table_names,
            indexes,
            functions,
            triggers,
        }
    }
}

/// Read and analyze every migration unit in `dir`, in file-name order
pub fn analyze_migrations(dir: &Path, pattern: &str) -> Result<SchemaFacts> {
    if !dir.is_dir() {
        return Err(AuditError::missing("migrations directory", dir));
    }

    let mut migrations = Vec::new();
    for path in list_matching(dir, pattern)? {
        let name = file_name(&path);
        info!("Analyzing {}...", name);
        let sql = read_input(&path)?;
        migrations.push(analyze_migration(&name, &sql));
    }

    let facts = SchemaFacts::aggregate(migrations);
    info!(
        "Schema: {} migrations, {} tables, {} indexes, {} functions, {} triggers",
        facts.summary.total_migrations,
        facts.summary.total_tables,
        facts.summary.total_indexes,
        facts.summary.total_functions,
        facts.summary.total_triggers
    );
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES_SQL: &str = r#"
-- profiles
CREATE TABLE profiles (
    id UUID PRIMARY KEY REFERENCES auth.users(id),
    email TEXT NOT NULL UNIQUE,
    full_name TEXT,
    role TEXT DEFAULT 'buyer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT role_check CHECK (role IN ('buyer', 'admin'))
);

CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    profile_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    total NUMERIC(10, 2),
    UNIQUE (profile_id, id)
);
"#;

    #[test]
    fn test_extract_tables_counts_blocks_and_columns() {
        let tables = extract_tables(PROFILES_SQL);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "profiles");
        assert_eq!(tables[0].column_count, 5);
        assert_eq!(tables[1].name, "orders");
        assert_eq!(tables[1].column_count, 3);
    }

    #[test]
    fn test_column_flags_from_line_text() {
        let tables = extract_tables(PROFILES_SQL);
        let id = &tables[0].columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.column_type, "UUID");
        assert!(id.is_primary_key);
        assert!(id.is_foreign_key);
        assert!(!id.is_not_null);

        let email = &tables[0].columns[1];
        assert!(email.is_not_null);
        assert!(email.is_unique);
        assert!(!email.has_default);

        let role = &tables[0].columns[3];
        assert!(role.has_default);
    }

    #[test]
    fn test_flags_set_by_string_literal_text() {
        let tables = extract_tables(
            "CREATE TABLE notes (\n  body TEXT DEFAULT 'not null please'\n);",
        );
        let body = &tables[0].columns[0];
        assert!(body.has_default);
        assert!(body.is_not_null);
    }

    #[test]
    fn test_structural_lines_are_not_columns() {
        let sql = "create table t (\n  a INT,\n  PRIMARY KEY (a),\n  FOREIGN KEY (a) REFERENCES x(id),\n  CHECK (a > 0)\n);";
        let tables = extract_tables(sql);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column_count, 1);
        assert_eq!(tables[0].columns[0].name, "a");
    }

    #[test]
    fn test_column_name_comma_stripped() {
        let tables = extract_tables("CREATE TABLE t (\n  qty INT,\n  sku TEXT\n);");
        assert_eq!(tables[0].columns[0].name, "qty");
        assert_eq!(tables[0].columns[0].column_type, "INT");
    }

    #[test]
    fn test_extract_indexes_functions_triggers() {
        let sql = r#"
CREATE INDEX idx_orders_profile ON orders(profile_id);
CREATE UNIQUE INDEX idx_profiles_email ON profiles (email);
CREATE OR REPLACE FUNCTION handle_updated_at()
RETURNS TRIGGER AS $$ BEGIN RETURN NEW; END; $$ LANGUAGE plpgsql;
CREATE FUNCTION calc_total (order_id UUID) RETURNS NUMERIC AS $$ SELECT 1 $$;
CREATE TRIGGER set_updated_at
    BEFORE UPDATE
    ON orders
    FOR EACH ROW EXECUTE FUNCTION handle_updated_at();
"#;
        let indexes = extract_indexes(sql);
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[1].name, "idx_profiles_email");
        assert_eq!(indexes[1].table, "profiles");

        assert_eq!(extract_functions(sql), vec!["handle_updated_at", "calc_total"]);

        let triggers = extract_triggers(sql);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].name, "set_updated_at");
        assert_eq!(triggers[0].table, "orders");
    }

    #[test]
    fn test_aggregate_first_definition_wins() {
        let first = analyze_migration("001_init.sql", "CREATE TABLE items (\n  id INT\n);");
        let second = analyze_migration(
            "002_items.sql",
            "CREATE TABLE items (\n  id INT,\n  name TEXT,\n  price NUMERIC\n);\nCREATE TABLE carts (\n  id INT\n);",
        );

        let facts = SchemaFacts::aggregate(vec![first, second]);
        assert_eq!(facts.tables.len(), 2);
        assert_eq!(facts.tables[0].name, "items");
        assert_eq!(facts.tables[0].column_count, 1);
        assert_eq!(facts.table_names, vec!["carts", "items"]);
        assert_eq!(facts.summary.total_migrations, 2);
    }

    #[test]
    fn test_aggregate_dedups_functions_only() {
        let sql = "CREATE FUNCTION f() RETURNS INT;\nCREATE INDEX i ON t (a);";
        let facts = SchemaFacts::aggregate(vec![
            analyze_migration("a.sql", sql),
            analyze_migration("b.sql", sql),
        ]);
        assert_eq!(facts.summary.total_functions, 1);
        assert_eq!(facts.summary.total_indexes, 2);
    }

    #[test]
    fn test_empty_input_yields_no_facts() {
        let facts = analyze_migration("empty.sql", "");
        assert!(facts.tables.is_empty());
        assert!(facts.indexes.is_empty());
        assert!(facts.functions.is_empty());
        assert!(facts.triggers.is_empty());
    }
}
