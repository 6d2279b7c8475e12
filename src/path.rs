//! Path expressions - compact addressing of columns through foreign keys
//!
//! Grammar:
//!
//! ```text
//! colPath   := [ tablePath "." ] identifier
//! tablePath := tableSpec ( "." tableSpec )*
//! tableSpec := identifier [ "[" joinSpec "]" ]
//! joinSpec  := [ identifier "=" ] colPath
//! ```
//!
//! Examples:
//! - `title` - a column of the current record
//! - `table1.title` - shorthand of `table1[id = table1_id].title`
//! - `table2[table1.table2_id].title` - `table2` joined through a key that
//!   lives on `table1`
//! - `table1.table2.title` - same as the previous one
//!
//! Whitespace around tokens is ignored. Identifiers are case-sensitive.

use std::fmt;
use std::str::FromStr;

/// Maximum bracket nesting accepted by the parser
pub const MAX_NESTING: usize = 32;

/// Join column used when a table spec doesn't name one
pub const DEFAULT_JOIN_COLUMN: &str = "id";

/// Malformed path expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path `{path}` at position {position}: {message}")]
pub struct PathSyntaxError {
    /// The full expression that failed to parse
    pub path: String,
    /// Character offset of the offending token
    pub position: usize,
    pub message: String,
}

/// A column reached from the current record, possibly through joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPath {
    /// Tables to walk, left to right, before reaching the column
    pub tables: Vec<TableSpec>,
    /// Column name on the last table (or on the current record)
    pub column: String,
}

/// One hop in a path: a table and how it is joined to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table: String,
    pub join: Option<JoinSpec>,
}

/// Bracketed join condition `[child_column = foreign_key]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    /// Column of the joined table matched against the foreign key
    pub child_column: Option<String>,
    /// Foreign key, resolved relative to the parent record
    pub foreign_key: Box<ColumnPath>,
}

impl ColumnPath {
    /// Parse a column path expression
    pub fn parse(path: &str) -> Result<Self, PathSyntaxError> {
        let mut parser = Parser::new(path);
        let col = parser.column_path(0)?;
        parser.expect_end()?;
        Ok(col)
    }

    /// Check if the column lives on the current record
    pub fn is_local(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableSpec {
    /// Parse a table path (`t1`, `t2[t1.t2_id]`, `t1.t2`) into its hops
    pub fn parse_path(path: &str) -> Result<Vec<TableSpec>, PathSyntaxError> {
        let mut parser = Parser::new(path);
        let mut specs = vec![parser.table_spec(0)?];
        loop {
            parser.skip_ws();
            if parser.eat('.') {
                specs.push(parser.table_spec(0)?);
            } else {
                break;
            }
        }
        parser.expect_end()?;
        Ok(specs)
    }

    /// Column name on the joined table, `id` unless given
    pub fn child_column(&self) -> &str {
        self.join
            .as_ref()
            .and_then(|j| j.child_column.as_deref())
            .unwrap_or(DEFAULT_JOIN_COLUMN)
    }

    /// Foreign key path on the parent, `<table>_id` unless given
    pub fn foreign_key(&self) -> ColumnPath {
        match &self.join {
            Some(join) => (*join.foreign_key).clone(),
            None => ColumnPath {
                tables: Vec::new(),
                column: format!("{}_id", self.table),
            },
        }
    }
}

impl FromStr for ColumnPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for spec in &self.tables {
            write!(f, "{}.", spec)?;
        }
        write!(f, "{}", self.column)
    }
}

impl fmt::Display for TableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(join) = &self.join {
            match &join.child_column {
                Some(child) => write!(f, "[{} = {}]", child, join.foreign_key)?,
                None => write!(f, "[{}]", join.foreign_key)?,
            }
        }
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '.' | '[' | ']' | '=')
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, position: usize, message: impl Into<String>) -> PathSyntaxError {
        PathSyntaxError {
            path: self.source.to_string(),
            position,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_end(&mut self) -> Result<(), PathSyntaxError> {
        self.skip_ws();
        match self.peek() {
            None => Ok(()),
            Some(']') => Err(self.error(self.pos, "unbalanced ']'")),
            Some(c) => Err(self.error(self.pos, format!("unexpected '{}'", c))),
        }
    }

    fn identifier(&mut self) -> Result<String, PathSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            let message = match self.peek() {
                None => "expected identifier, found end of path".to_string(),
                Some(c) => format!("expected identifier, found '{}'", c),
            };
            return Err(self.error(start, message));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// `[ ... ]` following a table name; the opening bracket is not consumed yet
    fn join_spec(&mut self, depth: usize) -> Result<JoinSpec, PathSyntaxError> {
        let open = self.pos;
        if depth >= MAX_NESTING {
            return Err(self.error(open, "path nested too deeply"));
        }
        self.pos += 1;

        // `name =` is optional; backtrack when there's no '='
        let checkpoint = self.pos;
        let mut child_column = None;
        if let Ok(name) = self.identifier() {
            self.skip_ws();
            if self.eat('=') {
                child_column = Some(name);
            } else {
                self.pos = checkpoint;
            }
        } else {
            self.pos = checkpoint;
        }

        let foreign_key = self.column_path(depth + 1)?;
        self.skip_ws();
        if !self.eat(']') {
            return match self.peek() {
                None => Err(self.error(open, "unclosed '['")),
                Some(c) => Err(self.error(self.pos, format!("expected ']', found '{}'", c))),
            };
        }

        Ok(JoinSpec {
            child_column,
            foreign_key: Box::new(foreign_key),
        })
    }

    fn table_spec(&mut self, depth: usize) -> Result<TableSpec, PathSyntaxError> {
        let table = self.identifier()?;
        self.skip_ws();
        let join = if self.peek() == Some('[') {
            Some(self.join_spec(depth)?)
        } else {
            None
        };
        Ok(TableSpec { table, join })
    }

    fn column_path(&mut self, depth: usize) -> Result<ColumnPath, PathSyntaxError> {
        let mut tables = Vec::new();
        loop {
            let spec = self.table_spec(depth)?;
            self.skip_ws();
            if self.eat('.') {
                tables.push(spec);
                continue;
            }
            if spec.join.is_some() {
                return Err(self.error(self.pos, "expected '.' and a column name after ']'"));
            }
            return Ok(ColumnPath {
                tables,
                column: spec.table,
            });
        }
    }
}
