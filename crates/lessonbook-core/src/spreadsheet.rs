//! Spreadsheet-friendly CSV.
//!
//! Files produced here open cleanly in Excel/LibreOffice with a Portuguese
//! locale: UTF-8 with a byte-order mark, `;` as the delimiter and decimal
//! commas. Values that a spreadsheet would reinterpret (`"12,13"` read as a
//! number) are written as text literals `="12,13"`.

use thiserror::Error;

pub const BOM: char = '\u{feff}';
pub const DELIMITER: u8 = b';';

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to flush CSV output")]
    Flush,
}

/// Wraps a value as a spreadsheet text literal. `None` and empty values stay empty.
pub fn excel_text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format!("=\"{}\"", v.replace('"', "\"\"")),
        _ => String::new(),
    }
}

/// Reverses [`excel_text`]. Plain values are returned trimmed.
pub fn unwrap_excel_text(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed
        .strip_prefix("=\"")
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => trimmed.to_string(),
    }
}

pub fn decimal_comma(value: f64, places: usize) -> String {
    format!("{value:.places$}").replace('.', ",")
}

/// Picks `;` or `,` from the header line, whichever occurs more.
pub fn sniff_delimiter(text: &str) -> u8 {
    let first_line = strip_bom(text).lines().next().unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if commas > semicolons { b',' } else { DELIMITER }
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

/// Accumulates rows and renders them as a BOM-prefixed `;`-delimited document.
pub struct SpreadsheetWriter {
    inner: csv::Writer<Vec<u8>>,
}

impl SpreadsheetWriter {
    pub fn new(headers: &[&str]) -> Result<Self, SpreadsheetError> {
        let mut inner = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(Vec::new());
        inner.write_record(headers)?;
        Ok(Self { inner })
    }

    pub fn write_row<I, T>(&mut self, row: I) -> Result<(), SpreadsheetError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(row)?;
        Ok(())
    }

    pub fn finish(self) -> Result<String, SpreadsheetError> {
        let bytes = self.inner.into_inner().map_err(|_| SpreadsheetError::Flush)?;
        let mut out = String::with_capacity(bytes.len() + BOM.len_utf8());
        out.push(BOM);
        out.push_str(&String::from_utf8(bytes)?);
        Ok(out)
    }
}

/// Parsed spreadsheet: header row plus data rows, all cells as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads a document produced by [`SpreadsheetWriter`] (or a hand-edited copy).
///
/// The delimiter is sniffed from the header line. Rows may have fewer cells
/// than the header.
pub fn read_sheet(text: &str) -> Result<Sheet, SpreadsheetError> {
    let body = strip_bom(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(body))
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Sheet { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_text() {
        assert_eq!(excel_text(None), "");
        assert_eq!(excel_text(Some("")), "");
        assert_eq!(excel_text(Some("10")), "=\"10\"");
        assert_eq!(excel_text(Some("12,13")), "=\"12,13\"");
    }

    #[test]
    fn test_unwrap_excel_text() {
        assert_eq!(unwrap_excel_text("=\"12,13\""), "12,13");
        assert_eq!(unwrap_excel_text(" plain "), "plain");
        assert_eq!(unwrap_excel_text(&excel_text(Some("a\"b"))), "a\"b");
    }

    #[test]
    fn test_writer_starts_with_bom_and_uses_semicolons() {
        let mut writer = SpreadsheetWriter::new(&["DATA", "MÓDULO"]).unwrap();
        writer.write_row(["15/09/2025", "Módulo 1"]).unwrap();
        let out = writer.finish().unwrap();

        assert!(out.starts_with('\u{feff}'));
        assert!(out.contains("DATA;MÓDULO"));
        assert!(out.contains("15/09/2025;Módulo 1"));
    }

    #[test]
    fn test_round_trip_preserves_accents_and_rows() {
        let headers = ["DATA", "MÓDULO", "N.º Sumário", "Sumário"];
        let rows = vec![
            vec![
                "15/09/2025".to_string(),
                "Programação".to_string(),
                excel_text(Some("1,2")),
                "Apresentação; regras da disciplina".to_string(),
            ],
            vec![
                "16/09/2025".to_string(),
                String::new(),
                excel_text(Some("3")),
                "Revisões \"gerais\"".to_string(),
            ],
        ];

        let mut writer = SpreadsheetWriter::new(&headers).unwrap();
        for row in &rows {
            writer.write_row(row).unwrap();
        }
        let sheet = read_sheet(&writer.finish().unwrap()).unwrap();

        assert_eq!(sheet.headers, headers);
        assert_eq!(sheet.rows, rows);
        assert_eq!(unwrap_excel_text(&sheet.rows[0][2]), "1,2");
    }

    #[test]
    fn test_read_sheet_sniffs_commas_and_skips_blank_rows() {
        let sheet = read_sheet("processo,numero,nome\n123,1,Ana\n,,\n456,2,Rui\n").unwrap();
        assert_eq!(sheet.headers, ["processo", "numero", "nome"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1][2], "Rui");
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(decimal_comma(3.456, 2), "3,46");
        assert_eq!(decimal_comma(4.0, 1), "4,0");
    }
}
