//! CSV output format for period tables
//!
//! Wide layout: one row per period, one column per entity. Undefined cells
//! are written as empty fields.

use crate::matrix::PeriodTable;
use crate::render::{RenderConfig, RenderError, Renderer};
use std::io::Write;

/// Writes a period table as CSV
pub struct CsvRenderer<W> {
    out: W,
}

impl<W: Write> CsvRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Format a cell; NaN becomes an empty field
fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Header row: `period` followed by entity names
fn header(table: &PeriodTable) -> String {
    let mut fields = vec!["period".to_string()];
    fields.extend(table.columns().iter().map(|c| escape_field(c)));
    fields.join(",")
}

/// Generate CSV output as string
pub fn to_csv(table: &PeriodTable) -> String {
    let mut output = String::new();

    output.push_str(&header(table));
    output.push('\n');

    for (period, row) in table.rows().iter().zip(table.row_values()) {
        output.push_str(&escape_field(period));
        for value in row {
            output.push(',');
            output.push_str(&format_cell(*value));
        }
        output.push('\n');
    }

    output
}

impl<W: Write> Renderer for CsvRenderer<W> {
    fn render(&mut self, table: &PeriodTable, config: &RenderConfig) -> Result<(), RenderError> {
        config.validate()?;
        self.out.write_all(to_csv(table).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn table() -> PeriodTable {
        Matrix::from_parts(
            vec!["2021-01-01".to_string(), "2021-01-02".to_string()],
            vec!["Roland Banks".to_string(), "Zoey, \"the Faithful\"".to_string()],
            vec![vec![f64::NAN, 1.0], vec![3.0, 2.5]],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(escape_field("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(escape_field("hello,world"), "\"hello,world\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_header() {
        assert_eq!(
            header(&table()),
            "period,Roland Banks,\"Zoey, \"\"the Faithful\"\"\""
        );
    }

    #[test]
    fn test_csv_rows_and_nan() {
        let csv = to_csv(&table());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2021-01-01,,1");
        assert_eq!(lines[2], "2021-01-02,3,2.5");
    }

    #[test]
    fn test_csv_empty_table() {
        assert_eq!(to_csv(&PeriodTable::empty()), "period\n");
    }

    #[test]
    fn test_csv_renderer_writes() {
        let mut renderer = CsvRenderer::new(Vec::new());
        renderer.render(&table(), &RenderConfig::default()).unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with("period,Roland Banks,"));
    }
}
