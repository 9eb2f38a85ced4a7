//! Rewrites the logical table of a statement to its physical shard table.

use regex::Regex;
use shard_router_types::models::format_tb_key;
use shard_router_types::RouterError;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use super::context;

static TABLE_REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();

/// `from`, `into` or `update` followed by whitespace and a bare identifier.
pub fn get_table_reference_regex() -> &'static Regex {
    TABLE_REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(?:from|into|update)\s+(\w+)").expect("Table reference regex is valid")
    })
}

/// First table referenced by `sql`, ignoring keywords inside quoted spans.
pub fn find_table(sql: &str) -> Option<&str> {
    let quoted = quoted_spans(sql);
    get_table_reference_regex()
        .captures_iter(sql)
        .filter(|caps| caps.get(0).is_some_and(|m| !in_spans(&quoted, m.start())))
        .find_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replace every occurrence of the first referenced table with
/// `<table>_<tb_index:03>`.
///
/// Statements whose table already carries the suffix for `tb_index` come
/// back unchanged, so rewriting twice is harmless.
pub fn rewrite_table(sql: &str, tb_index: u32) -> Result<String, RouterError> {
    let Some(table) = find_table(sql) else {
        tracing::error!(sql, "statement has no table reference to rewrite");
        return Err(RouterError::AmbiguousTableReference { sql: sql.to_string() });
    };

    let suffix = format!("_{}", format_tb_key(tb_index));
    if table.ends_with(&suffix) {
        return Ok(sql.to_string());
    }

    let physical = format!("{table}{suffix}");
    tracing::debug!(table, physical = %physical, "rewriting logical table");
    Ok(replace_identifier(sql, table, &physical))
}

/// Replace whole-identifier occurrences of `ident`. Occurrences embedded in a
/// longer identifier (`user` inside `user_id`) or inside a quoted span
/// (`'user'`, `"user"`, `` `user` ``) are left alone.
fn replace_identifier(sql: &str, ident: &str, replacement: &str) -> String {
    let quoted = quoted_spans(sql);
    let mut out = String::with_capacity(sql.len() + replacement.len());
    let mut copied = 0;

    for run in identifier_runs(sql) {
        if &sql[run.clone()] == ident && !in_spans(&quoted, run.start) {
            out.push_str(&sql[copied..run.start]);
            out.push_str(replacement);
            copied = run.end;
        }
    }

    out.push_str(&sql[copied..]);
    out
}

/// Byte ranges of maximal identifier character runs.
fn identifier_runs(sql: &str) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in sql.char_indices() {
        match (start, is_ident_char(c)) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                runs.push(s..i);
                start = None;
            },
            _ => {},
        }
    }
    if let Some(s) = start {
        runs.push(s..sql.len());
    }
    runs
}

/// Byte ranges of quoted spans, quotes included. An unterminated quote runs
/// to the end of the statement. A doubled quote (`'it''s'`) yields two
/// adjacent spans.
fn quoted_spans(sql: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<(char, usize)> = None;
    for (i, c) in sql.char_indices() {
        match open {
            Some((quote, start)) if c == quote => {
                spans.push(start..i + c.len_utf8());
                open = None;
            },
            Some(_) => {},
            None if matches!(c, '\'' | '"' | '`') => open = Some((c, i)),
            None => {},
        }
    }
    if let Some((_, start)) = open {
        spans.push(start..sql.len());
    }
    spans
}

fn in_spans(spans: &[Range<usize>], pos: usize) -> bool {
    spans.iter().any(|span| span.contains(&pos))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Rewrites statements of one data-access declaration.
///
/// Declarations that are not split by table pass their statements through
/// untouched and never read the routing context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementRewriter {
    split_table: bool,
}

impl StatementRewriter {
    pub const fn new(split_table: bool) -> Self {
        Self { split_table }
    }

    pub const fn split_table(&self) -> bool {
        self.split_table
    }

    /// Rewrite `sql` against the table index bound to the running operation.
    pub fn rewrite<'a>(&self, sql: &'a str) -> Result<Cow<'a, str>, RouterError> {
        if !self.split_table {
            return Ok(Cow::Borrowed(sql));
        }

        let tb_index = context::current().tb_index().ok_or(RouterError::TableIndexUnbound)?;
        rewrite_table(sql, tb_index).map(Cow::Owned)
    }
}
