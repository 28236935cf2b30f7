// Primitives for reading CSV files.

use survey_stats::builder::TableBuilder;
use survey_stats::Table;

use crate::dashboard::io_common::read_text_cell;
use crate::dashboard::*;

/// Reads a comma separated file. The first line is the header.
pub fn read_csv_table(path: &str) -> DResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header = match records.next() {
        Some(r) => r.context(CsvLineParseSnafu { lineno: 1_usize })?,
        None => return MissingHeaderSnafu { path }.fail(),
    };
    let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();
    debug!("read_csv_table: header: {:?}", header);
    let mut builder = TableBuilder::from_header(header);

    for (idx, line_r) in records.enumerate() {
        // The index starts at 1 to respect most conventions in the excel world
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<Option<String>> = line.iter().map(read_text_cell).collect();
        builder.add_cells(cells);
    }
    let table = builder.build();
    info!("read_csv_table: {} respondents in {:?}", table.len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_header_and_rows() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "ID,Rating,Reasons").unwrap();
        writeln!(f, "1,4,\"Fast;Friendly;\"").unwrap();
        writeln!(f, "2,,").unwrap();
        writeln!(f, "3,5").unwrap();
        let path = f.path().display().to_string();

        let table = read_csv_table(&path).unwrap();
        assert_eq!(table.header, vec!["ID", "Rating", "Reasons"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].get(2), Some("Fast;Friendly;"));
        assert_eq!(table.rows[1].get(1), None);
        // Short lines are padded.
        assert_eq!(table.rows[2].cells.len(), 3);
        assert_eq!(table.rows[2].get(2), None);
    }

    #[test]
    fn empty_file_has_no_header() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().display().to_string();
        assert!(read_csv_table(&path).is_err());
    }

    #[test]
    fn missing_file() {
        assert!(read_csv_table("/nonexistent/survey.csv").is_err());
    }
}
