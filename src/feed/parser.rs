//! Markup-to-record parsing
//!
//! The pipeline only depends on [`AnnouncementParser`]. [`TableParser`] is a
//! regex-based reference implementation for the BSE announcements table; it
//! is not a general HTML parser.

use super::RawAnnouncement;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

lazy_static! {
    static ref TABLE_RE: Regex = Regex::new(
        r#"(?is)<table[^>]*(?:id\s*=\s*["']tbldatanew["']|class\s*=\s*["'][^"']*\bdata\b[^"']*["'])[^>]*>(.*?)</table>"#
    )
    .unwrap();
    static ref ROW_RE: Regex = Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap();
    static ref CELL_RE: Regex = Regex::new(r"(?is)<td[^>]*>(.*?)</td>").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"(?s)<[^>]+>").unwrap();
    static ref HREF_RE: Regex = Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Minimum number of cells for a row to be an announcement
const MIN_CELLS: usize = 4;

/// Converts a raw feed page into announcement rows
pub trait AnnouncementParser: Send + Sync {
    /// Parse a page into zero or more rows
    fn parse(&self, page: &str) -> Vec<RawAnnouncement>;
}

/// Parses the announcements table: date, time, company, title, category
pub struct TableParser {
    base_url: Option<Url>,
}

impl TableParser {
    /// Create a parser that resolves relative PDF links against `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).ok(),
        }
    }

    fn extract_row(&self, row_html: &str) -> Option<RawAnnouncement> {
        let cells: Vec<&str> = CELL_RE
            .captures_iter(row_html)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        if cells.len() < MIN_CELLS {
            return None;
        }

        let text = |i: usize| cells.get(i).map(|c| cell_text(c)).unwrap_or_default();

        Some(RawAnnouncement {
            date: text(0),
            time: text(1),
            company_name: text(2),
            title: text(3),
            category: text(4),
            pdf_url: self.pdf_link(&cells),
        })
    }

    fn pdf_link(&self, cells: &[&str]) -> Option<String> {
        cells
            .iter()
            .flat_map(|cell| HREF_RE.captures_iter(cell))
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .find(|href| href.to_lowercase().contains("pdf"))
            .and_then(|href| self.absolutize(href))
    }

    fn absolutize(&self, href: &str) -> Option<String> {
        if href.starts_with("http") {
            return Some(href.to_string());
        }
        match &self.base_url {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Some(href.to_string()),
        }
    }
}

impl AnnouncementParser for TableParser {
    fn parse(&self, page: &str) -> Vec<RawAnnouncement> {
        let Some(table) = TABLE_RE.captures(page).and_then(|c| c.get(1)) else {
            tracing::warn!("Could not find announcements table");
            return vec![];
        };

        let rows: Vec<RawAnnouncement> = ROW_RE
            .captures_iter(table.as_str())
            .filter_map(|c| c.get(1))
            .filter_map(|row| self.extract_row(row.as_str()))
            .collect();

        tracing::debug!(rows = rows.len(), "Parsed announcements");
        rows
    }
}

/// Strip tags, decode the common entities and collapse whitespace
fn cell_text(cell: &str) -> String {
    let stripped = TAG_RE.replace_all(cell, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    SPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table id="tbldatanew">
          <tr><th>Date</th><th>Time</th><th>Company</th><th>Subject</th></tr>
          <tr>
            <td>15-01-2024</td><td>10:30:00</td>
            <td><b>XYZ  Limited</b></td>
            <td>Company XYZ Secures Contract worth Rs. 120 crore</td>
            <td>Company Update</td>
            <td><a href="/xml-data/corpfiling/AttachLive/abc.pdf">PDF</a></td>
          </tr>
          <tr>
            <td>15-01-2024</td><td>10:31:00</td>
            <td>A &amp; B Industries Ltd</td>
            <td>Board Meeting Intimation</td>
          </tr>
          <tr><td>only</td><td>three</td><td>cells</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_rows() {
        let parser = TableParser::new("https://www.bseindia.com/corporates/ann.html");
        let rows = parser.parse(PAGE);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "15-01-2024");
        assert_eq!(rows[0].company_name, "XYZ Limited");
        assert_eq!(
            rows[0].title,
            "Company XYZ Secures Contract worth Rs. 120 crore"
        );
        assert_eq!(rows[0].category, "Company Update");
        assert_eq!(rows[1].company_name, "A & B Industries Ltd");
        assert_eq!(rows[1].category, "");
    }

    #[test]
    fn test_relative_pdf_link_resolved() {
        let parser = TableParser::new("https://www.bseindia.com/corporates/ann.html");
        let rows = parser.parse(PAGE);
        assert_eq!(
            rows[0].pdf_url.as_deref(),
            Some("https://www.bseindia.com/xml-data/corpfiling/AttachLive/abc.pdf")
        );
        assert!(rows[1].pdf_url.is_none());
    }

    #[test]
    fn test_missing_table() {
        let parser = TableParser::new("https://example.com");
        assert!(parser.parse("<html><p>maintenance</p></html>").is_empty());
    }

    #[test]
    fn test_table_by_class() {
        let parser = TableParser::new("https://example.com");
        let page = r#"<table class="grid data"><tr><td>d</td><td>t</td><td>C Ltd</td><td>Title</td></tr></table>"#;
        let rows = parser.parse(page);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company_name, "C Ltd");
    }
}
