//! SQLite loading with schema sniffing.
//!
//! Scripture files come from several packagings whose schemas differ in
//! table and column names. The loader inspects what is actually present
//! and maps known aliases onto the logical schema; the required minimum is
//! a line id, a source, and the Gurmukhi text. Corrupt rows are skipped
//! and logged, never fatal.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};

use katha_core::{ScriptureLine, ScriptureSource};

use crate::ScriptureError;

const LINES_TABLES: &[&str] = &["lines", "gurbani_lines", "line", "shabad_lines"];
const TEXT_COLUMNS: &[&str] = &["gurmukhi", "text", "line", "gurbani", "line_text"];
const ID_COLUMNS: &[&str] = &["id", "line_id"];
const ANG_COLUMNS: &[&str] = &["source_page", "ang", "page", "page_number"];
const ROMAN_COLUMNS: &[&str] = &["roman", "transliteration", "pronunciation"];
const RAAG_COLUMNS: &[&str] = &["raag", "raag_name", "section"];
const AUTHOR_COLUMNS: &[&str] = &["author", "writer", "writer_name"];
const SHABAD_COLUMNS: &[&str] = &["shabad_id", "shabad"];
const POSITION_COLUMNS: &[&str] = &["line_position", "position", "order_id", "seq"];

/// Load every line of a scripture database.
pub fn load_lines(
    path: &Path,
    source: ScriptureSource,
) -> Result<Vec<ScriptureLine>, ScriptureError> {
    if !path.exists() {
        return Err(ScriptureError::NotFound {
            path: path.display().to_string(),
        });
    }

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |e| ScriptureError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    )?;

    let tables = table_names(&conn, path)?;
    let lines_table = pick_lines_table(&tables).ok_or_else(|| ScriptureError::NoLinesTable {
        path: path.display().to_string(),
        tables: tables.clone(),
    })?;

    let columns = column_names(&conn, &lines_table, path)?;
    let schema = SchemaMap::resolve(&columns).ok_or_else(|| ScriptureError::NoLinesTable {
        path: path.display().to_string(),
        tables,
    })?;
    debug!(
        table = %lines_table,
        text_column = %schema.text,
        "resolved scripture schema"
    );

    let selected = schema.selected_columns();
    let query = format!("SELECT {} FROM {}", selected.join(", "), lines_table);

    let mut stmt = conn.prepare(&query).map_err(|e| ScriptureError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut lines = Vec::new();
    let mut skipped = 0usize;
    let mut rows = stmt.query([]).map_err(|e| ScriptureError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut fallback_position = 0u32;
    while let Some(row) = rows.next().map_err(|e| ScriptureError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })? {
        fallback_position += 1;
        match schema.read_row(row, source, fallback_position) {
            Some(line) => lines.push(line),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped corrupt scripture rows");
    }
    info!(
        lines = lines.len(),
        source = source.display_name(),
        path = %path.display(),
        "loaded scripture corpus"
    );

    Ok(lines)
}

fn table_names(conn: &Connection, path: &Path) -> Result<Vec<String>, ScriptureError> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
        .map_err(|e| ScriptureError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| ScriptureError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(names)
}

fn column_names(
    conn: &Connection,
    table: &str,
    path: &Path,
) -> Result<Vec<String>, ScriptureError> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(|e| ScriptureError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| ScriptureError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(names)
}

fn pick_lines_table(tables: &[String]) -> Option<String> {
    for candidate in LINES_TABLES {
        if tables.iter().any(|t| t == candidate) {
            return Some(candidate.to_string());
        }
    }
    // Last resort: any table whose name smells like line storage.
    tables
        .iter()
        .find(|t| {
            let lower = t.to_lowercase();
            lower.contains("line") || lower.contains("gurbani") || lower.contains("shabad")
        })
        .cloned()
}

/// Mapping from logical fields to the columns this file actually has.
struct SchemaMap {
    id: Option<String>,
    text: String,
    ang: Option<String>,
    roman: Option<String>,
    raag: Option<String>,
    author: Option<String>,
    shabad: Option<String>,
    position: Option<String>,
}

impl SchemaMap {
    fn resolve(columns: &[String]) -> Option<Self> {
        let find = |aliases: &[&str]| -> Option<String> {
            aliases
                .iter()
                .find(|a| columns.iter().any(|c| c.eq_ignore_ascii_case(a)))
                .map(|a| a.to_string())
        };

        Some(Self {
            text: find(TEXT_COLUMNS)?,
            id: find(ID_COLUMNS),
            ang: find(ANG_COLUMNS),
            roman: find(ROMAN_COLUMNS),
            raag: find(RAAG_COLUMNS),
            author: find(AUTHOR_COLUMNS),
            shabad: find(SHABAD_COLUMNS),
            position: find(POSITION_COLUMNS),
        })
    }

    /// Columns to select, text first then the optional fields that exist.
    fn selected_columns(&self) -> Vec<String> {
        let mut cols = vec![self.text.clone()];
        for col in [
            &self.id,
            &self.ang,
            &self.roman,
            &self.raag,
            &self.author,
            &self.shabad,
            &self.position,
        ]
        .into_iter()
        .flatten()
        {
            cols.push(col.clone());
        }
        cols
    }

    fn read_row(
        &self,
        row: &rusqlite::Row<'_>,
        source: ScriptureSource,
        fallback_position: u32,
    ) -> Option<ScriptureLine> {
        let mut idx = 0usize;
        let mut next = |present: bool| -> Option<Value> {
            if !present {
                return None;
            }
            let value = row.get::<_, Value>(idx).ok();
            idx += 1;
            value
        };

        let gurmukhi = value_to_string(next(true)?)?;
        if gurmukhi.trim().is_empty() {
            return None;
        }

        let id = next(self.id.is_some()).and_then(value_to_string);
        let ang = next(self.ang.is_some()).and_then(value_to_u16);
        let roman = next(self.roman.is_some())
            .and_then(value_to_string)
            .filter(|s| !s.trim().is_empty());
        let raag = next(self.raag.is_some()).and_then(value_to_string);
        let author = next(self.author.is_some()).and_then(value_to_string);
        let shabad = next(self.shabad.is_some()).and_then(value_to_string);
        let position = next(self.position.is_some()).and_then(value_to_u32);

        let mut line = ScriptureLine::new(
            id.unwrap_or_else(|| format!("row-{fallback_position}")),
            source,
            gurmukhi,
        );
        line.ang = ang;
        line.roman = roman;
        line.raag = raag;
        line.author = author;
        line.shabad_id = shabad;
        line.line_position = position.or(Some(fallback_position));
        Some(line)
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

fn value_to_u16(value: Value) -> Option<u16> {
    match value {
        Value::Integer(i) => u16::try_from(i).ok(),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Real(f) if f >= 0.0 => Some(f as u16),
        _ => None,
    }
}

fn value_to_u32(value: Value) -> Option<u32> {
    match value {
        Value::Integer(i) => u32::try_from(i).ok(),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Real(f) if f >= 0.0 => Some(f as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_db(schema: &str, rows: &[&str]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(schema).unwrap();
        for row in rows {
            conn.execute_batch(row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_shabados_like_schema() {
        let file = fixture_db(
            "CREATE TABLE lines (id TEXT, gurmukhi TEXT, source_page INTEGER, shabad_id TEXT, order_id INTEGER)",
            &[
                "INSERT INTO lines VALUES ('L1', 'ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ', 1, 'S1', 1)",
                "INSERT INTO lines VALUES ('L2', 'ਨਿਰਭਉ ਨਿਰਵੈਰੁ', 1, 'S1', 2)",
            ],
        );

        let lines = load_lines(file.path(), ScriptureSource::Sggs).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_id, "L1");
        assert_eq!(lines[0].ang, Some(1));
        assert_eq!(lines[0].shabad_id.as_deref(), Some("S1"));
        assert_eq!(lines[1].line_position, Some(2));
    }

    #[test]
    fn test_corrupt_rows_skipped() {
        let file = fixture_db(
            "CREATE TABLE lines (id TEXT, gurmukhi TEXT)",
            &[
                "INSERT INTO lines VALUES ('L1', 'ਸਤਿ ਨਾਮੁ')",
                "INSERT INTO lines VALUES ('L2', NULL)",
                "INSERT INTO lines VALUES ('L3', '   ')",
            ],
        );

        let lines = load_lines(file.path(), ScriptureSource::Sggs).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_alias_columns() {
        let file = fixture_db(
            "CREATE TABLE gurbani_lines (line_id INTEGER, text TEXT, page INTEGER, writer TEXT)",
            &["INSERT INTO gurbani_lines VALUES (7, 'ਧੰਨ ਗੁਰੂ ਨਾਨਕ', 462, 'Guru Nanak Dev Ji')"],
        );

        let lines = load_lines(file.path(), ScriptureSource::Sggs).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_id, "7");
        assert_eq!(lines[0].ang, Some(462));
        assert_eq!(lines[0].author.as_deref(), Some("Guru Nanak Dev Ji"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_lines(Path::new("/nonexistent/sggs.sqlite"), ScriptureSource::Sggs)
            .unwrap_err();
        assert!(matches!(err, ScriptureError::NotFound { .. }));
    }

    #[test]
    fn test_no_lines_table() {
        let file = fixture_db("CREATE TABLE settings (k TEXT, v TEXT)", &[]);
        let err = load_lines(file.path(), ScriptureSource::Sggs).unwrap_err();
        assert!(matches!(err, ScriptureError::NoLinesTable { .. }));
    }
}
