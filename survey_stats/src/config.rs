// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One completed questionnaire.
///
/// Cells are kept in column order. A cell is `None` when the respondent
/// left the question blank.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Respondent {
    /// 0-based position of the respondent in the table.
    pub row: usize,
    pub cells: Vec<Option<String>>,
}

impl Respondent {
    pub fn new(row: usize, cells: Vec<Option<String>>) -> Respondent {
        Respondent { row, cells }
    }

    /// The answer in the given column, if any.
    ///
    /// Blank answers and columns beyond the end of the row are both
    /// reported as missing.
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells
            .get(column)
            .and_then(|c| c.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// The full set of responses, as read from the spreadsheet.
///
/// The table is never mutated once loaded: filtering produces views
/// (`Vec<&Respondent>`) over the rows.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Respondent>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Position of the column whose title matches exactly (ignoring
    /// surrounding whitespace).
    pub fn column_index(&self, title: &str) -> Option<usize> {
        let title = title.trim();
        self.header.iter().position(|h| h.trim() == title)
    }

    /// All the rows, in their original order.
    pub fn all(&self) -> Vec<&Respondent> {
        self.rows.iter().collect()
    }
}

/// The columns holding the three filter dimensions.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct FilterColumns {
    pub role: usize,
    pub function: usize,
    pub location: usize,
}

/// The values chosen by the viewer for each filter dimension.
///
/// An empty list means that the dimension is not filtered.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FilterSelection {
    pub roles: Vec<String>,
    pub functions: Vec<String>,
    pub locations: Vec<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.functions.is_empty() && self.locations.is_empty()
    }

    pub fn clear(&mut self) {
        self.roles.clear();
        self.functions.clear();
        self.locations.clear();
    }
}

/// A restriction to a sub-population: only the rows where `column`
/// holds `value`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Condition {
    pub column: usize,
    pub value: String,
}

// ******** Output data structures *********

/// The lowest and highest values of the rating scale.
pub const SCALE_MIN: u8 = 1;
pub const SCALE_MAX: u8 = 5;

/// Relative frequencies of each scale value, and the median of the
/// observed scores.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreDistribution {
    /// (scale value, percentage of the non-missing responses), in
    /// ascending scale order. Always five entries.
    pub percentages: Vec<(u8, f64)>,
    /// (scale value, number of responses), same order.
    pub counts: Vec<(u8, u64)>,
    /// Number of non-missing responses.
    pub responses: u64,
    /// NaN when there is no response.
    pub median: f64,
}

impl ScoreDistribution {
    pub fn percentage(&self, score: u8) -> f64 {
        self.percentages
            .iter()
            .find(|(s, _)| *s == score)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    pub fn median(&self) -> Option<f64> {
        if self.median.is_nan() {
            None
        } else {
            Some(self.median)
        }
    }
}

/// Occurrences of each token of a multi-value (semicolon-delimited)
/// question.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TokenCounts {
    /// Count descending, ties in order of first appearance.
    pub counts: Vec<(String, u64)>,
    /// Number of respondents who gave at least one token.
    pub respondents: u64,
    /// Size of the population the counts were taken from.
    pub population: u64,
}

impl TokenCounts {
    pub fn total_tokens(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// The most frequent token.
    pub fn top(&self) -> Option<&(String, u64)> {
        self.counts.first()
    }

    /// Share of the population that picked each token. A respondent may
    /// pick several tokens, so the values do not add up to 100.
    pub fn percent_of_respondents(&self) -> Vec<(String, f64)> {
        self.counts
            .iter()
            .map(|(t, c)| (t.clone(), percent(*c, self.population).unwrap_or(0.0)))
            .collect()
    }

    /// Share of each token among all the tokens given.
    pub fn percent_of_tokens(&self) -> Vec<(String, f64)> {
        let total = self.total_tokens();
        self.counts
            .iter()
            .map(|(t, c)| (t.clone(), percent(*c, total).unwrap_or(0.0)))
            .collect()
    }
}

/// A count of respondents out of a population.
#[derive(PartialEq, Debug, Clone)]
pub struct Proportion {
    pub count: u64,
    pub denominator: u64,
    /// `None` when the denominator is zero: the question does not apply
    /// to anyone in the current selection.
    pub percentage: Option<f64>,
}

/// The two halves of a satisfaction chart.
#[derive(PartialEq, Debug, Clone)]
pub struct SatisfactionSplit {
    /// Shares of the scores 1, 2 and 3 among the dissatisfied respondents.
    pub dissatisfied: Vec<(u8, f64)>,
    /// Shares of the scores 4 and 5 among the satisfied respondents.
    pub satisfied: Vec<(u8, f64)>,
    pub total_dissatisfied: u64,
    pub total_satisfied: u64,
}

/// One line of the side-by-side comparison of two multi-value questions.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BreakdownPair {
    pub token: String,
    pub left: u64,
    pub right: u64,
}

pub(crate) fn percent(count: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(count as f64 / denominator as f64 * 100.0)
    }
}

/// Errors that prevent an aggregate from being computed.
#[derive(PartialEq, Debug, Clone)]
pub enum SurveyError {
    /// A rating cell holds something else than an integer of the scale.
    /// `row` is the position of the respondent in the table.
    InvalidScale {
        column: usize,
        row: usize,
        content: String,
    },
    /// A column position beyond the width of the table.
    MissingColumn { column: usize, width: usize },
}

impl Error for SurveyError {}

impl Display for SurveyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyError::InvalidScale {
                column,
                row,
                content,
            } => write!(
                f,
                "invalid rating {:?} in column {} (respondent {}): expected an integer between {} and {}",
                content,
                column,
                row + 1,
                SCALE_MIN,
                SCALE_MAX
            ),
            SurveyError::MissingColumn { column, width } => write!(
                f,
                "column {} does not exist (the table has {} columns)",
                column, width
            ),
        }
    }
}
