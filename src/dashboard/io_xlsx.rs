use calamine::{open_workbook, DataType, Reader, Xlsx};

use survey_stats::builder::TableBuilder;
use survey_stats::Table;

use crate::dashboard::io_common::read_calamine_cell;
use crate::dashboard::*;

/// Reads the responses from an Excel workbook, as exported by Microsoft
/// Forms. The first row is the header.
pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> DResult<Table> {
    let wrange = get_range(path, worksheet_name)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    let header: Vec<String> = header
        .iter()
        .map(|c| read_calamine_cell(c).unwrap_or_default())
        .collect();
    debug!("read_xlsx_table: header: {:?}", header);

    let mut builder = TableBuilder::from_header(header);
    for (idx, row) in iter.enumerate() {
        debug!("read_xlsx_table: idx: {:?} row: {:?}", idx, row);
        builder.add_cells(row.iter().map(read_calamine_cell).collect());
    }
    let table = builder.build();
    info!("read_xlsx_table: {} respondents in {:?}", table.len(), path);
    Ok(table)
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> DResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_workbook() {
        let err = read_xlsx_table("/nonexistent/survey.xlsx", None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/survey.xlsx"));
    }

    #[test]
    fn not_a_workbook() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut f, b"ID,Rating\n1,4\n").unwrap();
        let path = f.path().display().to_string();
        assert!(read_xlsx_table(&path, Some("Form1")).is_err());
    }
}
