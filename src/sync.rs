//! Schema sync: add storage columns for localized fields that are missing.
//!
//! Needed after adding a language to the configuration or marking a new
//! field translatable. Only ever adds columns, so running it again resumes
//! from the first column that is still missing.

use crate::schema::{FieldDefinition, ModelId, ModelRegistry};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info, warn};

/// Live storage the sync tool inspects and alters.
#[allow(async_fn_in_trait)]
pub trait SchemaConnection {
    /// Quote an identifier for use in SQL.
    fn quote_name(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Column names of an existing table.
    async fn table_columns(&mut self, table: &str) -> Result<Vec<String>>;

    /// Execute one `ALTER TABLE ... ADD COLUMN` statement in its own
    /// transaction: committed on success, rolled back before the error is
    /// returned.
    async fn add_column(&mut self, table: &str, column: &str, sql: &str) -> Result<()>;
}

/// A column added by the sync tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedColumn {
    /// `app_label.ModelName`
    pub model: String,
    pub table: String,
    pub column: String,
    pub sql: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub models_checked: usize,
    pub added: Vec<AddedColumn>,
}

/// `ALTER TABLE <table> ADD COLUMN <column> <type>[ NOT NULL];`
pub fn add_column_sql<C: SchemaConnection>(conn: &C, table: &str, field: &FieldDefinition) -> String {
    let mut column = vec![conn.quote_name(field.column_name()), field.db_type()];
    if !field.is_nullable() {
        column.push("NOT NULL".to_string());
    }
    format!(
        "ALTER TABLE {} ADD COLUMN {};",
        conn.quote_name(table),
        column.join(" ")
    )
}

/// Sync every registered model, in registration order.
pub async fn sync_all<C, W>(registry: &mut ModelRegistry, conn: &mut C, out: &mut W) -> Result<SyncReport>
where
    C: SchemaConnection,
    W: Write,
{
    let mut report = SyncReport::default();
    let ids: Vec<ModelId> = registry.ids().collect();

    for id in ids {
        report.models_checked += 1;
        let added = sync_model(registry, id, conn, out).await?;
        report.added.extend(added);
    }

    info!(
        models = report.models_checked,
        columns = report.added.len(),
        "Translatable fields synced"
    );
    Ok(report)
}

/// Add the missing localized columns of one model.
///
/// Models without translatable fields and abstract models are skipped, as
/// are fields stored in a concrete ancestor's table. Each
/// statement is written to `out` as `<app_label>.<Model>.<column>\n\t<SQL>\n`
/// before it is executed.
pub async fn sync_model<C, W>(
    registry: &mut ModelRegistry,
    id: ModelId,
    conn: &mut C,
    out: &mut W,
) -> Result<Vec<AddedColumn>>
where
    C: SchemaConnection,
    W: Write,
{
    let Some(engine) = registry.engine().cloned() else {
        return Ok(Vec::new());
    };

    let fields = engine.translatable_fields(registry, id, true);
    if fields.is_empty() {
        return Ok(Vec::new());
    }

    let model = registry.model(id);
    let Some(meta) = model.meta() else {
        return Ok(Vec::new());
    };
    if meta.is_abstract {
        debug!(model = %model.name(), "Skipping abstract model");
        return Ok(Vec::new());
    }

    let columns = conn
        .table_columns(&meta.db_table)
        .await
        .with_context(|| format!("Failed to read columns of {}", meta.db_table))?;

    let mut added = Vec::new();
    let local_fields = fields
        .iter()
        .filter(|name| model.has_field(name) && model.field_owner(name).is_none());
    for field_name in local_fields {
        for code in engine.languages().codes() {
            let localized_name = format!("{}_{}", field_name, code);
            let Some(field) = model.field(&localized_name) else {
                warn!(model = %model.name(), field = %localized_name, "Localized field missing from schema");
                continue;
            };
            if columns.iter().any(|column| column == field.column_name()) {
                continue;
            }

            let sql = add_column_sql(conn, &meta.db_table, field);
            writeln!(out, "{}.{}.{}\n\t{}\n", meta.app_label, model.name(), field.name, sql)
                .context("Failed to write sync output")?;

            conn.add_column(&meta.db_table, field.column_name(), &sql).await?;
            info!(table = %meta.db_table, column = %field.column_name(), "Added column");

            added.push(AddedColumn {
                model: format!("{}.{}", meta.app_label, model.name()),
                table: meta.db_table.clone(),
                column: field.column_name().to_string(),
                sql,
            });
        }
    }

    Ok(added)
}
