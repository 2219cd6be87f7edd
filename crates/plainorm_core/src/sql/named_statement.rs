//! Prepared statements with `:name` placeholders.
//!
//! # Responsibility
//! - Rewrite `:name` placeholders into SQLite's numbered `?N` form.
//! - Bind values by name, including names that occur several times.
//! - Optionally capture the keys generated by an INSERT.
//!
//! # Invariants
//! - Placeholders inside string literals, quoted identifiers and comments are
//!   left untouched; so are `::` casts.
//! - Every parameter of a prepared statement is a named placeholder; `?`,
//!   `?NNN`, `@name` and `$name` are rejected at prepare time.
//! - A statement never executes while any placeholder is unbound.
//! - Keys are only captured for INSERT/REPLACE statements and describe the
//!   most recent execution only.

use crate::error::{BindError, OrmResult};
use crate::mapping::params::ParamMap;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, Statement};
use std::collections::{BTreeMap, BTreeSet};

/// SQL text rewritten to positional form plus the name → slots table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    pub sql: String,
    /// 1-based positional slots per placeholder name.
    pub slots: BTreeMap<String, Vec<usize>>,
}

/// Scans `sql` for `:name` placeholders.
///
/// # Errors
/// - `BindError::Positional` for a `?` or `?NNN` marker outside literals and
///   comments.
pub fn parse_named_sql(sql: &str) -> Result<ParsedSql, BindError> {
    let chars: Vec<char> = sql.chars().collect();
    let mut rewritten = String::with_capacity(sql.len());
    let mut slots: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut position = 0;
    let mut index = 0;

    while index < chars.len() {
        let current = chars[index];
        let next = chars.get(index + 1).copied();
        let end = match (current, next) {
            ('\'' | '"', _) => quoted_end(&chars, index, current),
            ('-', Some('-')) => chars[index..]
                .iter()
                .position(|&ch| ch == '\n')
                .map_or(chars.len(), |offset| index + offset),
            ('/', Some('*')) => block_comment_end(&chars, index),
            (':', Some(':')) => index + 2,
            ('?', _) => {
                let digits = chars[index + 1..]
                    .iter()
                    .take_while(|ch| ch.is_ascii_digit())
                    .count();
                return Err(BindError::Positional {
                    marker: chars[index..=index + digits].iter().collect(),
                });
            }
            (':', Some(ch)) if is_name_start(ch) => {
                let mut end = index + 1;
                while end < chars.len() && is_name_part(chars[end]) {
                    end += 1;
                }
                let name: String = chars[index + 1..end].iter().collect();
                position += 1;
                rewritten.push('?');
                rewritten.push_str(&position.to_string());
                slots.entry(name).or_default().push(position);
                index = end;
                continue;
            }
            _ => index + 1,
        };
        rewritten.extend(&chars[index..end]);
        index = end;
    }

    Ok(ParsedSql {
        sql: rewritten,
        slots,
    })
}

fn is_insert(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

fn quoted_end(chars: &[char], start: usize, quote: char) -> usize {
    let mut index = start + 1;
    while index < chars.len() {
        if chars[index] == quote {
            if chars.get(index + 1) == Some(&quote) {
                index += 2;
                continue;
            }
            return index + 1;
        }
        index += 1;
    }
    chars.len()
}

fn block_comment_end(chars: &[char], start: usize) -> usize {
    let mut index = start + 2;
    while index + 1 < chars.len() {
        if chars[index] == '*' && chars[index + 1] == '/' {
            return index + 2;
        }
        index += 1;
    }
    chars.len()
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_name_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// A prepared statement bound by placeholder name.
pub struct NamedStatement<'conn> {
    conn: &'conn Connection,
    statement: Statement<'conn>,
    slots: BTreeMap<String, Vec<usize>>,
    bound: BTreeSet<String>,
    capture_keys: bool,
    generated_keys: Vec<i64>,
}

impl<'conn> NamedStatement<'conn> {
    /// Prepares `sql` on `conn`.
    pub fn prepare(conn: &'conn Connection, sql: &str) -> OrmResult<Self> {
        Self::prepare_inner(conn, sql, false)
    }

    /// Prepares `sql` and records the keys generated by each execution.
    ///
    /// With a `RETURNING` clause the first returned column of every row is
    /// the key; without one it is the rowid of the inserted row. NULL keys
    /// are not recorded. Statements other than INSERT/REPLACE record nothing.
    pub fn prepare_with_keys(conn: &'conn Connection, sql: &str) -> OrmResult<Self> {
        Self::prepare_inner(conn, sql, true)
    }

    fn prepare_inner(conn: &'conn Connection, sql: &str, capture_keys: bool) -> OrmResult<Self> {
        let parsed = parse_named_sql(sql)?;
        let statement = conn.prepare(&parsed.sql)?;
        // Named placeholders were rewritten to `?N`; anything else is a
        // parameter the caller could never bind.
        for index in 1..=statement.parameter_count() {
            match statement.parameter_name(index) {
                Some(name) if name.starts_with('?') => {}
                other => {
                    return Err(BindError::Positional {
                        marker: other.unwrap_or("?").to_string(),
                    }
                    .into())
                }
            }
        }
        let capture_keys = capture_keys && is_insert(&parsed.sql);
        debug!(
            "event=statement_prepare module=sql status=ok placeholders={} capture_keys={}",
            parsed.slots.len(),
            capture_keys
        );
        Ok(Self {
            conn,
            statement,
            slots: parsed.slots,
            bound: BTreeSet::new(),
            capture_keys,
            generated_keys: Vec::new(),
        })
    }

    /// Distinct placeholder names, sorted.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Binds `value` to every occurrence of `:name`.
    pub fn set_parameter(&mut self, name: &str, value: &Value) -> OrmResult<()> {
        let positions = self
            .slots
            .get(name)
            .ok_or_else(|| BindError::UnknownParameter {
                name: name.to_string(),
            })?;
        for &position in positions {
            self.statement.raw_bind_parameter(position, value)?;
        }
        self.bound.insert(name.to_string());
        Ok(())
    }

    /// Binds every placeholder from `params`. Entries without a matching
    /// placeholder are ignored.
    pub fn set_parameters(&mut self, params: &ParamMap) -> OrmResult<()> {
        for (name, positions) in &self.slots {
            let value = params.get(name).ok_or_else(|| BindError::MissingParameter {
                name: name.clone(),
            })?;
            for &position in positions {
                self.statement.raw_bind_parameter(position, value)?;
            }
            self.bound.insert(name.clone());
        }
        Ok(())
    }

    /// Runs a query and materializes every row as column → value.
    pub fn execute_query(&mut self) -> OrmResult<Vec<ParamMap>> {
        self.ensure_bound()?;
        let columns: Vec<String> = self
            .statement
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut keys = Vec::new();
        let mut records = Vec::new();
        let mut rows = self.statement.raw_query();
        while let Some(row) = rows.next()? {
            let mut record = ParamMap::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                record.insert(column.as_str(), row.get::<_, Value>(index)?);
            }
            if let Some((_, Value::Integer(key))) = record.iter().next() {
                keys.push(*key);
            }
            records.push(record);
        }
        drop(rows);

        if self.capture_keys {
            self.generated_keys = keys;
        }
        Ok(records)
    }

    /// Runs a data-changing statement and returns the affected row count.
    pub fn execute_update(&mut self) -> OrmResult<usize> {
        self.ensure_bound()?;
        if self.capture_keys && self.statement.column_count() > 0 {
            return Ok(self.execute_query()?.len());
        }

        let changed = self.statement.raw_execute()?;
        if self.capture_keys {
            self.generated_keys.clear();
            if changed > 0 {
                self.generated_keys.push(self.conn.last_insert_rowid());
            }
        }
        Ok(changed)
    }

    /// Runs any statement; `true` when it produced a result set (which is
    /// discarded).
    pub fn execute(&mut self) -> OrmResult<bool> {
        if self.statement.column_count() > 0 {
            self.execute_query()?;
            Ok(true)
        } else {
            self.execute_update()?;
            Ok(false)
        }
    }

    /// Keys generated by the most recent execution; always empty unless
    /// prepared with keys.
    pub fn generated_keys(&self) -> &[i64] {
        &self.generated_keys
    }

    pub fn generated_key(&self) -> Option<i64> {
        self.generated_keys.last().copied()
    }

    fn ensure_bound(&self) -> Result<(), BindError> {
        match self.slots.keys().find(|name| !self.bound.contains(*name)) {
            Some(name) => Err(BindError::Unbound { name: name.clone() }),
            None => Ok(()),
        }
    }
}
