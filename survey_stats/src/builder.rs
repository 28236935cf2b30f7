pub use crate::config::*;

/// A builder for assembling a table of responses in code.
///
/// Readers of spreadsheet formats and tests use it to make sure that all
/// the rows are normalized the same way.
///
/// ```
/// use survey_stats::builder::TableBuilder;
///
/// let mut builder = TableBuilder::new(&["ID", "Where are you located ?"]);
/// builder.add_row(&["1", "Europe"]);
/// builder.add_row(&["2", ""]);
/// let table = builder.build();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.rows[1].get(1), None);
/// ```
pub struct TableBuilder {
    pub(crate) _header: Vec<String>,
    pub(crate) _rows: Vec<Respondent>,
}

impl TableBuilder {
    pub fn new(header: &[&str]) -> TableBuilder {
        TableBuilder {
            _header: header.iter().map(|h| h.trim().to_string()).collect(),
            _rows: Vec::new(),
        }
    }

    pub fn from_header(header: Vec<String>) -> TableBuilder {
        TableBuilder {
            _header: header.iter().map(|h| h.trim().to_string()).collect(),
            _rows: Vec::new(),
        }
    }

    /// Adds a row where every cell was answered as text. Empty strings
    /// become missing answers.
    pub fn add_row(&mut self, cells: &[&str]) {
        let cells: Vec<Option<String>> = cells.iter().map(|c| normalize(Some(*c))).collect();
        self.add_cells(cells);
    }

    /// Adds a row of optional cells.
    ///
    /// Rows shorter than the header are padded with missing answers;
    /// cells beyond the header are kept but cannot be addressed by title.
    pub fn add_cells(&mut self, cells: Vec<Option<String>>) {
        let mut cells: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| normalize(c.as_deref()))
            .collect();
        while cells.len() < self._header.len() {
            cells.push(None);
        }
        let row = self._rows.len();
        self._rows.push(Respondent::new(row, cells));
    }

    pub fn build(self) -> Table {
        Table {
            header: self._header,
            rows: self._rows,
        }
    }
}

fn normalize(cell: Option<&str>) -> Option<String> {
    match cell {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        _ => None,
    }
}
