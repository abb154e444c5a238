//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved resource.
//! Rows come back as a single `jsonb` column so any table shape decodes into a record.
//! Written values travel as one `jsonb` parameter expanded with `jsonb_populate_record`,
//! which lets Postgres coerce each value to its column type (dates, arrays, jsonb).

use crate::config::ResolvedResource;
use crate::sql::SqlParam;
use crate::store::RecordId;

/// Alias of the target table in every statement.
const ROW_ALIAS: &str = "r";
/// Alias of the populated record in INSERT / UPDATE.
const INPUT_ALIAS: &str = "p";

/// Quote identifier for PostgreSQL (safe: only from catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(resource: &ResolvedResource) -> String {
    format!("{}.{}", quoted(&resource.schema_name), quoted(&resource.table_name))
}

fn returning_row() -> String {
    format!("to_jsonb({}.*)", ROW_ALIAS)
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlParam) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT all rows ordered by the resource sort column (ascending).
pub fn select_all(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} AS {} ORDER BY {}.{} ASC",
        returning_row(),
        qualified_table(resource),
        ROW_ALIAS,
        ROW_ALIAS,
        quoted(resource.sort_column())
    );
    q
}

/// SELECT by primary key.
pub fn select_by_id(resource: &ResolvedResource, id: &RecordId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::from(id));
    q.sql = format!(
        "SELECT {} FROM {} AS {} WHERE {}.{} = ${}",
        returning_row(),
        qualified_table(resource),
        ROW_ALIAS,
        ROW_ALIAS,
        quoted(&resource.pk_column),
        n
    );
    q
}

/// INSERT the given columns, values taken from the record passed as `$1` (jsonb).
/// Columns left out fall back to their database defaults.
pub fn insert(resource: &ResolvedResource, columns: &[&str], record: serde_json::Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(resource);
    if columns.is_empty() {
        q.sql = format!("INSERT INTO {} AS {} DEFAULT VALUES RETURNING {}", table, ROW_ALIAS, returning_row());
        return q;
    }
    let n = q.push_param(SqlParam::Json(record));
    let target: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    let source: Vec<String> = columns
        .iter()
        .map(|c| format!("{}.{}", INPUT_ALIAS, quoted(c)))
        .collect();
    q.sql = format!(
        "INSERT INTO {table} AS {row} ({target}) SELECT {source} FROM jsonb_populate_record(NULL::{table}, ${n}) AS {input} RETURNING {returning}",
        table = table,
        row = ROW_ALIAS,
        target = target.join(", "),
        source = source.join(", "),
        n = n,
        input = INPUT_ALIAS,
        returning = returning_row()
    );
    q
}

/// UPDATE by id: SET only the given columns. With no columns this degrades to a
/// SELECT of the row so callers still get the current state back.
pub fn update(resource: &ResolvedResource, id: &RecordId, columns: &[&str], patch: serde_json::Value) -> QueryBuf {
    if columns.is_empty() {
        return select_by_id(resource, id);
    }
    let mut q = QueryBuf::new();
    let table = qualified_table(resource);
    let patch_param = q.push_param(SqlParam::Json(patch));
    let id_param = q.push_param(SqlParam::from(id));
    let sets: Vec<String> = columns
        .iter()
        .map(|c| format!("{} = {}.{}", quoted(c), INPUT_ALIAS, quoted(c)))
        .collect();
    q.sql = format!(
        "UPDATE {table} AS {row} SET {sets} FROM jsonb_populate_record(NULL::{table}, ${patch}) AS {input} WHERE {row}.{pk} = ${id} RETURNING {returning}",
        table = table,
        row = ROW_ALIAS,
        sets = sets.join(", "),
        patch = patch_param,
        input = INPUT_ALIAS,
        pk = quoted(&resource.pk_column),
        id = id_param,
        returning = returning_row()
    );
    q
}

/// DELETE by id, returning the removed row.
pub fn delete(resource: &ResolvedResource, id: &RecordId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::from(id));
    q.sql = format!(
        "DELETE FROM {} AS {} WHERE {}.{} = ${} RETURNING {}",
        qualified_table(resource),
        ROW_ALIAS,
        ROW_ALIAS,
        quoted(&resource.pk_column),
        n,
        returning_row()
    );
    q
}
