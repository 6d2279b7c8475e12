use crate::{OutputMode, emit_success};
use std::path::Path;
use dbrecord::config::{self, DbRecordConfig};
use dbrecord::ui::{self, Icons};
use dbrecord::{Record, SqliteConnector, Value};
use owo_colors::OwoColorize;

/// Root record addressed by a command
pub struct Target {
    pub table: String,
    pub pk: String,
    pub id: Option<String>,
}

impl Target {
    fn open<'db>(&self, db: &'db SqliteConnector) -> Record<'db> {
        let key = self
            .id
            .as_deref()
            .map(Value::parse_literal)
            .unwrap_or(Value::Null);
        Record::with_named_key(db, &self.table, &self.pk, key)
    }
}

/// Split `PATH=VALUE` at the first `=` outside brackets, so
/// `t1[id = t1_id].title=x` keeps its join condition.
pub fn split_assignment(raw: &str) -> anyhow::Result<(&str, Value)> {
    let mut depth = 0usize;
    for (i, c) in raw.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                let path = raw[..i].trim();
                if path.is_empty() {
                    anyhow::bail!("missing path in assignment `{}`", raw);
                }
                return Ok((path, Value::parse_literal(&raw[i + 1..])));
            }
            _ => {}
        }
    }
    anyhow::bail!("expected PATH=VALUE, got `{}`", raw)
}

pub fn run_init(
    output_mode: OutputMode,
    config_path: &Path,
    database: &Path,
    primary_key: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let settings = DbRecordConfig {
        database: Some(database.display().to_string()),
        primary_key,
    };
    config::write_config(config_path, &settings, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", config_path.display()));
        ui::status(Icons::DATABASE, "database", &database.display().to_string());
    } else {
        emit_success(
            output_mode,
            "init",
            serde_json::json!({
                "config": config_path.display().to_string(),
                "database": settings.database,
                "primary_key": settings.primary_key_or_default(),
            }),
        )?;
    }
    Ok(())
}

pub fn run_save(
    output_mode: OutputMode,
    db: &SqliteConnector,
    target: &Target,
    assignments: &[String],
) -> anyhow::Result<()> {
    let pairs = assignments
        .iter()
        .map(|raw| split_assignment(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut record = target.open(db);
    let was_new = record.is_new(record.root());
    record.save(pairs)?;
    let key = record.key(record.root())?;
    let joined = record.node_count() - 1;

    if output_mode.is_human() {
        let verb = if was_new { "Inserted" } else { "Updated" };
        ui::success(&format!("{} `{}`", verb, target.table));
        ui::status(
            Icons::KEY,
            &target.pk,
            &key.to_string().style(ui::theme().key.clone()).to_string(),
        );
        if joined > 0 {
            ui::status(Icons::LINK, "joined", &format!("{} record(s) saved", joined));
        }
    } else {
        emit_success(
            output_mode,
            "save",
            serde_json::json!({
                "table": target.table,
                "inserted": was_new,
                "key": key,
                "joined": joined,
            }),
        )?;
    }
    Ok(())
}

pub fn run_fetch(
    output_mode: OutputMode,
    db: &SqliteConnector,
    target: &Target,
    paths: &[String],
) -> anyhow::Result<()> {
    let mut record = target.open(db);
    let values = record.fetch(paths)?;

    if output_mode.is_human() {
        ui::header(&format!("{} {} = {}", target.table, target.pk, record.key(record.root())?));
        println!("{}", ui::value_table(paths, &values));
    } else {
        let rows: Vec<serde_json::Value> = paths
            .iter()
            .zip(&values)
            .map(|(path, value)| serde_json::json!({ "path": path, "value": value }))
            .collect();
        emit_success(output_mode, "fetch", serde_json::Value::Array(rows))?;
    }
    Ok(())
}

pub fn run_delete(
    output_mode: OutputMode,
    db: &SqliteConnector,
    target: &Target,
    tables: &[String],
) -> anyhow::Result<()> {
    let mut record = target.open(db);
    let deleted = record.delete(tables)?;

    if output_mode.is_human() {
        ui::success(&format!("{} Deleted {} row(s) from `{}` and its joins", Icons::DEL, deleted, target.table));
        let skipped = record.node_count() - deleted;
        if skipped > 0 {
            ui::info("skipped", &format!("{} joined record(s) without a row", skipped));
        }
    } else {
        emit_success(
            output_mode,
            "delete",
            serde_json::json!({
                "table": target.table,
                "deleted": deleted,
                "skipped": record.node_count() - deleted,
            }),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_assignment() {
        let (path, value) = split_assignment("title=Title 1").unwrap();
        assert_eq!(path, "title");
        assert_eq!(value, Value::from("Title 1"));

        let (path, value) = split_assignment("t1[id = t1_id].count = 3").unwrap();
        assert_eq!(path, "t1[id = t1_id].count");
        assert_eq!(value, Value::Integer(3));

        assert!(split_assignment("title").is_err());
        assert!(split_assignment("=x").is_err());
    }

    #[test]
    fn test_save_then_fetch_through_target() {
        let db = SqliteConnector::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE t0 (id INTEGER PRIMARY KEY, title TEXT, t1_id INTEGER);
             CREATE TABLE t1 (id INTEGER PRIMARY KEY, title TEXT);",
        )
        .unwrap();

        let target = Target {
            table: "t0".to_string(),
            pk: "id".to_string(),
            id: None,
        };
        let pairs = vec![split_assignment("title=A").unwrap(), split_assignment("t1.title=B").unwrap()];
        let mut record = target.open(&db);
        record.save(pairs).unwrap();

        let target = Target {
            id: Some(record.key(record.root()).unwrap().to_string()),
            ..target
        };
        let values = target.open(&db).fetch(["title", "t1.title"]).unwrap();
        assert_eq!(values, vec![Value::from("A"), Value::from("B")]);
    }

    #[test]
    fn test_delete_counts_only_existing_rows() {
        let db = SqliteConnector::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE t0 (id INTEGER PRIMARY KEY, t1_id INTEGER);
             CREATE TABLE t1 (id INTEGER PRIMARY KEY);
             INSERT INTO t0 (id) VALUES (5);",
        )
        .unwrap();

        let target = Target {
            table: "t0".to_string(),
            pk: "id".to_string(),
            id: Some("5".to_string()),
        };
        let mut record = target.open(&db);
        assert_eq!(record.delete(["t1"]).unwrap(), 1);
        assert_eq!(record.node_count(), 2);
    }
}
