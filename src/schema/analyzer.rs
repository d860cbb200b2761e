use serde::Serialize;

use super::models::{ColumnDefinition, DatabaseSchema, Dialect, TableDefinition};

const TIMESTAMP_COLUMNS: &[&str] = &["created_at", "updated_at", "createdAt", "updatedAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToMany,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAnalysis {
    pub table_count: usize,
    pub column_count: usize,
    pub index_count: usize,
    pub relationships: Vec<Relationship>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn analyze_schema(schema: &DatabaseSchema) -> SchemaAnalysis {
    let mut column_count = 0;
    let mut index_count = 0;
    let mut relationships = Vec::new();
    let mut suggestions = Vec::new();

    for (table_name, table) in schema.tables.iter() {
        column_count += table.columns.len();
        index_count += table.indexes.len();

        relationships.extend(table.foreign_keys.iter().map(|fk| Relationship {
            from: table_name.to_string(),
            to: fk.referenced_table.clone(),
            kind: RelationshipKind::OneToMany,
        }));

        let has_auto_id = table
            .columns
            .iter()
            .any(|(name, col)| name.eq_ignore_ascii_case("id") && col.auto_increment);
        if !has_auto_id {
            suggestions.push(format!(
                "Consider adding an auto-increment id column to table '{}'.",
                table_name
            ));
        }

        let has_timestamps = table.columns.keys().any(|name| TIMESTAMP_COLUMNS.contains(&name.as_str()));
        if !has_timestamps {
            suggestions.push(format!(
                "Consider adding timestamp columns to table '{}'.",
                table_name
            ));
        }

        for fk in &table.foreign_keys {
            if !has_covering_index(table, &fk.columns) {
                suggestions.push(format!(
                    "Consider adding an index on foreign key '{}'.",
                    fk.columns.join(", ")
                ));
            }
        }
    }

    SchemaAnalysis {
        table_count: schema.tables.len(),
        column_count,
        index_count,
        relationships,
        suggestions,
    }
}

// Indexes are declared by name only, so a name mentioning every column counts.
fn has_covering_index(table: &TableDefinition, columns: &[String]) -> bool {
    table
        .indexes
        .iter()
        .any(|index| columns.iter().all(|col| index.contains(col.as_str())))
}

/// Renders CREATE TABLE statements followed by CREATE INDEX statements.
pub fn generate_ddl(schema: &DatabaseSchema, dialect: Dialect) -> String {
    let mut statements = Vec::new();

    for (table_name, table) in schema.tables.iter() {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|(name, column)| column_ddl(name, column, dialect))
            .collect();

        if !table.primary_key.is_empty() {
            lines.push(format!("  PRIMARY KEY ({})", table.primary_key.join(", ")));
        }

        for fk in &table.foreign_keys {
            let mut line = format!(
                "  FOREIGN KEY ({}) REFERENCES {}({})",
                fk.columns.join(", "),
                fk.referenced_table,
                fk.referenced_columns.join(", ")
            );
            if let Some(action) = fk.on_delete {
                line.push_str(&format!(" ON DELETE {}", action));
            }
            if let Some(action) = fk.on_update {
                line.push_str(&format!(" ON UPDATE {}", action));
            }
            lines.push(line);
        }

        statements.push(format!("CREATE TABLE {} (\n{}\n);", table_name, lines.join(",\n")));
    }

    for (table_name, table) in schema.tables.iter() {
        for index_name in &table.indexes {
            statements.push(format!("CREATE INDEX {} ON {}(id);", index_name, table_name));
        }
    }

    statements.join("\n\n")
}

fn column_ddl(name: &str, column: &ColumnDefinition, dialect: Dialect) -> String {
    let mut line = format!("  {} {}", name, column.data_type);

    if column.auto_increment {
        match dialect {
            Dialect::Mysql => line.push_str(" AUTO_INCREMENT"),
            Dialect::Postgresql => line = format!("  {} SERIAL", name),
            Dialect::Sqlite => {}
        }
    }

    if !column.nullable {
        line.push_str(" NOT NULL");
    }

    if let Some(default) = &column.default {
        line.push_str(" DEFAULT ");
        match default {
            serde_json::Value::String(s) => line.push_str(s),
            other => line.push_str(&other.to_string()),
        }
    }

    if column.unique {
        line.push_str(" UNIQUE");
    }

    line
}

pub fn validate_schema(schema: &DatabaseSchema) -> SchemaValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if schema.tables.is_empty() {
        errors.push("Schema defines no tables.".to_string());
        return SchemaValidation {
            is_valid: false,
            errors,
            warnings,
        };
    }

    for (table_name, table) in schema.tables.iter() {
        if table.columns.is_empty() {
            errors.push(format!("Table '{}' defines no columns.", table_name));
            continue;
        }

        for fk in &table.foreign_keys {
            match schema.tables.get(&fk.referenced_table) {
                None => errors.push(format!(
                    "Foreign key in table '{}' references unknown table '{}'.",
                    table_name, fk.referenced_table
                )),
                Some(referenced) => {
                    for column in &fk.referenced_columns {
                        if !referenced.columns.contains_key(column) {
                            errors.push(format!(
                                "Foreign key references unknown column '{}.{}'.",
                                fk.referenced_table, column
                            ));
                        }
                    }
                }
            }
        }

        for column in &table.primary_key {
            if !table.columns.contains_key(column) {
                errors.push(format!(
                    "Primary key of table '{}' references unknown column '{}'.",
                    table_name, column
                ));
            }
        }

        if !table.columns.keys().any(|name| name.eq_ignore_ascii_case("id")) {
            warnings.push(format!("Table '{}' has no id column.", table_name));
        }

        if table.primary_key.is_empty() {
            warnings.push(format!("Table '{}' has no primary key.", table_name));
        }
    }

    SchemaValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shop_schema() -> DatabaseSchema {
        serde_json::from_value(json!({
            "tables": {
                "users": {
                    "columns": {
                        "id": {"type": "INT", "autoIncrement": true},
                        "email": {"type": "VARCHAR(255)", "unique": true},
                        "created_at": {"type": "TIMESTAMP", "default": "CURRENT_TIMESTAMP"}
                    },
                    "primaryKey": ["id"]
                },
                "orders": {
                    "columns": {
                        "id": {"type": "INT", "autoIncrement": true},
                        "user_id": {"type": "INT"},
                        "note": {"type": "TEXT", "nullable": true},
                        "total": {"type": "DECIMAL(10,2)", "default": 0}
                    },
                    "primaryKey": ["id"],
                    "foreignKeys": [{
                        "columns": ["user_id"],
                        "referencedTable": "users",
                        "referencedColumns": ["id"],
                        "onDelete": "CASCADE"
                    }],
                    "indexes": ["idx_orders_user_id"]
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn analysis_counts_and_relationships() {
        let analysis = analyze_schema(&shop_schema());
        assert_eq!(analysis.table_count, 2);
        assert_eq!(analysis.column_count, 7);
        assert_eq!(analysis.index_count, 1);
        assert_eq!(
            analysis.relationships,
            vec![Relationship {
                from: "orders".to_string(),
                to: "users".to_string(),
                kind: RelationshipKind::OneToMany,
            }]
        );
        // orders lacks timestamps; the FK is covered by idx_orders_user_id
        assert_eq!(
            analysis.suggestions,
            vec!["Consider adding timestamp columns to table 'orders'."]
        );
    }

    #[test]
    fn foreign_key_on_primary_key_is_still_one_to_many() {
        let schema: DatabaseSchema = serde_json::from_value(json!({
            "tables": {
                "users": {"columns": {"id": {"type": "INT"}}, "primaryKey": ["id"]},
                "profiles": {
                    "columns": {"user_id": {"type": "INT"}},
                    "primaryKey": ["user_id"],
                    "foreignKeys": [{"columns": ["user_id"], "referencedTable": "users", "referencedColumns": ["id"]}]
                }
            }
        }))
        .unwrap();

        let analysis = analyze_schema(&schema);
        assert_eq!(analysis.relationships[0].kind, RelationshipKind::OneToMany);
        assert_eq!(serde_json::to_value(&analysis.relationships[0]).unwrap()["type"], "one-to-many");
        assert!(analysis
            .suggestions
            .contains(&"Consider adding an index on foreign key 'user_id'.".to_string()));
        assert!(analysis
            .suggestions
            .contains(&"Consider adding an auto-increment id column to table 'users'.".to_string()));
    }

    #[test]
    fn mysql_ddl() {
        let ddl = generate_ddl(&shop_schema(), Dialect::Mysql);
        let expected = [
            "CREATE TABLE users (",
            "  id INT AUTO_INCREMENT NOT NULL,",
            "  email VARCHAR(255) NOT NULL UNIQUE,",
            "  created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,",
            "  PRIMARY KEY (id)",
            ");",
            "",
            "CREATE TABLE orders (",
            "  id INT AUTO_INCREMENT NOT NULL,",
            "  user_id INT NOT NULL,",
            "  note TEXT,",
            "  total DECIMAL(10,2) NOT NULL DEFAULT 0,",
            "  PRIMARY KEY (id),",
            "  FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE",
            ");",
            "",
            "CREATE INDEX idx_orders_user_id ON orders(id);",
        ]
        .join("\n");
        assert_eq!(ddl, expected);
    }

    #[test]
    fn postgres_uses_serial_and_sqlite_ignores_auto_increment() {
        let postgres = generate_ddl(&shop_schema(), Dialect::Postgresql);
        assert!(postgres.contains("  id SERIAL NOT NULL,"));
        assert!(!postgres.contains("AUTO_INCREMENT"));

        let sqlite = generate_ddl(&shop_schema(), Dialect::Sqlite);
        assert!(sqlite.contains("  id INT NOT NULL,"));
    }

    #[test]
    fn valid_schema_has_no_errors_or_warnings() {
        let validation = validate_schema(&shop_schema());
        assert!(validation.is_valid);
        assert!(validation.errors.is_empty());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn empty_schema_is_invalid() {
        let schema: DatabaseSchema = serde_json::from_value(json!({"tables": {}})).unwrap();
        let validation = validate_schema(&schema);
        assert!(!validation.is_valid);
        assert_eq!(validation.errors, vec!["Schema defines no tables."]);
    }

    #[test]
    fn broken_references_are_errors() {
        let schema: DatabaseSchema = serde_json::from_value(json!({
            "tables": {
                "empty": {"columns": {}},
                "orders": {
                    "columns": {"order_no": {"type": "INT"}, "user_id": {"type": "INT"}},
                    "primaryKey": ["missing_pk"],
                    "foreignKeys": [
                        {"columns": ["user_id"], "referencedTable": "users", "referencedColumns": ["id"]},
                        {"columns": ["order_no"], "referencedTable": "orders", "referencedColumns": ["nope"]}
                    ]
                }
            }
        }))
        .unwrap();

        let validation = validate_schema(&schema);
        assert!(!validation.is_valid);
        assert_eq!(
            validation.errors,
            vec![
                "Table 'empty' defines no columns.",
                "Foreign key in table 'orders' references unknown table 'users'.",
                "Foreign key references unknown column 'orders.nope'.",
                "Primary key of table 'orders' references unknown column 'missing_pk'.",
            ]
        );
        assert_eq!(validation.warnings, vec!["Table 'orders' has no id column."]);
    }
}
