use tabled::{settings::Style, Table, Tabled};
use crate::value::Value;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, path: &str, value: &Value) {
        self.rows.push(TableRow {
            path: path.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render fetched values next to the paths that produced them
pub fn value_table<P: AsRef<str>>(paths: &[P], values: &[Value]) -> String {
    let mut builder = TableBuilder::new();
    for (path, value) in paths.iter().zip(values) {
        builder.add_row(path.as_ref(), value);
    }
    builder.build()
}
