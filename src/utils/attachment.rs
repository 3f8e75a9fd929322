//! File download responses.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{Local, NaiveDate};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Reduces a file name to `[A-Za-z0-9._-]`, folding Portuguese accents.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let folded = match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' => 'A',
            'é' | 'ê' => 'e',
            'É' | 'Ê' => 'E',
            'í' => 'i',
            'Í' => 'I',
            'ó' | 'ô' | 'õ' => 'o',
            'Ó' | 'Ô' | 'Õ' => 'O',
            'ú' => 'u',
            'Ú' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => c,
            _ => '_',
        };
        if folded == '_' && out.ends_with('_') {
            continue;
        }
        out.push(folded);
    }
    out.trim_matches('_').to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `<stem>_<YYYY-MM-DD>.<extension>`, sanitized.
pub fn dated_filename(stem: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", sanitize_filename(stem), date.format("%Y-%m-%d"), extension)
}

/// Body served as a download.
pub fn attachment(body: impl Into<axum::body::Body>, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", sanitize_filename(filename)),
            ),
        ],
        body.into(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_folds_accents() {
        assert_eq!(sanitize_filename("calendario_10.º B_sumários"), "calendario_10._B_sumarios");
        assert_eq!(sanitize_filename("Programação"), "Programacao");
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_dated_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            dated_filename("outras_datas", date, "csv"),
            "outras_datas_2026-01-15.csv"
        );
    }

    #[test]
    fn test_attachment_headers() {
        let response = attachment("a;b\n", CSV_CONTENT_TYPE, "avaliacoes_9.º D_2026-01-15.csv");
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], CSV_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"avaliacoes_9._D_2026-01-15.csv\""
        );
    }
}
