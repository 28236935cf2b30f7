use calamine::DataType;
use std::path::Path;

/// The last component of a path or URL, for logs and cache names.
pub fn simplify_file_name(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let name = Path::new(trimmed)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(trimmed);
    // Remote names may carry a query string.
    name.split(['?', '#']).next().unwrap_or(name).to_string()
}

/// Normalizes a text cell: blank cells are missing answers.
pub fn read_text_cell(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Reads a spreadsheet cell as text.
///
/// Ratings are often stored as floating point numbers by the spreadsheet:
/// integral values are written without a fractional part.
pub fn read_calamine_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => read_text_cell(s),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(format_number(*f)),
        DataType::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        DataType::DateTime(f) => Some(format_number(*f)),
        _ => None,
    }
}

fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_lose_their_fraction() {
        assert_eq!(read_calamine_cell(&DataType::Float(4.0)), Some("4".to_string()));
        assert_eq!(read_calamine_cell(&DataType::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(read_calamine_cell(&DataType::Int(3)), Some("3".to_string()));
        assert_eq!(
            read_calamine_cell(&DataType::String("  ".to_string())),
            None
        );
        assert_eq!(read_calamine_cell(&DataType::Empty), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/survey.xlsx"), "survey.xlsx");
        assert_eq!(
            simplify_file_name("https://example.com/raw/main/data/Voice%20of%20Customer.xlsx?raw=true"),
            "Voice%20of%20Customer.xlsx"
        );
    }
}
