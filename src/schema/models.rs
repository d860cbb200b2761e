use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The `schemaData` document stored with a [`crate::storage::Schema`].
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSchema {
    /// Tables in document order.
    #[serde(default)]
    pub tables: IndexMap<String, TableDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    #[serde(default)]
    pub columns: IndexMap<String, ColumnDefinition>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    /// Index names declared on the table.
    #[serde(default)]
    pub indexes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        };
        f.write_str(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Mysql,
    Postgresql,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgresql => "postgresql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "postgresql" | "postgres" => Ok(Dialect::Postgresql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("Unsupported dialect: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tables_and_columns_keep_document_order() {
        let schema: DatabaseSchema = serde_json::from_value(json!({
            "tables": {
                "users": { "columns": { "id": {"type": "INT"}, "email": {"type": "TEXT"}, "age": {"type": "INT"} } },
                "accounts": { "columns": { "id": {"type": "INT"} } }
            }
        }))
        .unwrap();

        assert_eq!(schema.tables.keys().collect::<Vec<_>>(), vec!["users", "accounts"]);
        let users = schema.tables.get("users").unwrap();
        assert_eq!(users.columns.keys().collect::<Vec<_>>(), vec!["id", "email", "age"]);
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let schema: DatabaseSchema = serde_json::from_value(json!({})).unwrap();
        assert!(schema.tables.is_empty());

        let schema: DatabaseSchema =
            serde_json::from_value(json!({"tables": {"t": {"columns": {"c": {"type": "TEXT"}}}}})).unwrap();
        let table = schema.tables.get("t").unwrap();
        assert!(table.primary_key.is_empty());
        assert!(table.foreign_keys.is_empty());
        assert!(!table.columns.get("c").unwrap().nullable);
    }

    #[test]
    fn column_without_a_type_is_rejected() {
        let err = serde_json::from_value::<DatabaseSchema>(json!({
            "tables": { "t": { "columns": { "c": {"nullable": true} } } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing field `type`"));
    }

    #[test]
    fn referential_actions_parse_and_display() {
        let fk: ForeignKeyDefinition = serde_json::from_value(json!({
            "columns": ["user_id"],
            "referencedTable": "users",
            "referencedColumns": ["id"],
            "onDelete": "SET NULL"
        }))
        .unwrap();
        assert_eq!(fk.on_delete, Some(ReferentialAction::SetNull));
        assert_eq!(fk.on_delete.unwrap().to_string(), "SET NULL");
        assert!(fk.on_update.is_none());
    }

    #[test]
    fn dialect_parsing() {
        assert_eq!("MySQL".parse::<Dialect>(), Ok(Dialect::Mysql));
        assert_eq!("postgres".parse::<Dialect>(), Ok(Dialect::Postgresql));
        assert_eq!("sqlite".parse::<Dialect>(), Ok(Dialect::Sqlite));
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
