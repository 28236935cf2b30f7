mod config;
pub mod builder;
pub mod manual;
pub mod text;

use log::debug;

use std::collections::HashMap;

pub use crate::config::*;

/// The answer given to a multi-value question, broken into its tokens.
///
/// One trailing separator is dropped; empty tokens are ignored.
pub fn split_tokens(answer: &str) -> Vec<&str> {
    let trimmed = answer.strip_suffix(';').unwrap_or(answer);
    trimmed.split(';').filter(|t| !t.trim().is_empty()).collect()
}

/// Parses a rating cell. Spreadsheets usually store ratings as floats.
pub fn parse_scale(cell: &str) -> Option<u8> {
    let x: f64 = cell.trim().parse().ok()?;
    if x.fract() != 0.0 || x < SCALE_MIN as f64 || x > SCALE_MAX as f64 {
        return None;
    }
    Some(x as u8)
}

/// Ensures that a column position exists in the table.
pub fn check_column(table: &Table, column: usize) -> Result<(), SurveyError> {
    if column < table.width() {
        Ok(())
    } else {
        Err(SurveyError::MissingColumn {
            column,
            width: table.width(),
        })
    }
}

/// Restricts the table to the respondents matching the selection.
///
/// Within a dimension, a row matches if its value is any of the selected
/// values. Across dimensions, a row must match all the dimensions that
/// have a selection. Rows keep their original order.
pub fn apply_filters<'a>(
    data: &'a Table,
    columns: &FilterColumns,
    selection: &FilterSelection,
) -> Vec<&'a Respondent> {
    let dims: [(usize, &[String]); 3] = [
        (columns.role, &selection.roles),
        (columns.function, &selection.functions),
        (columns.location, &selection.locations),
    ];
    let res: Vec<&Respondent> = data
        .rows
        .iter()
        .filter(|r| {
            dims.iter().all(|(col, allowed)| {
                allowed.is_empty()
                    || r.get(*col)
                        .map(|v| allowed.iter().any(|a| a == v))
                        .unwrap_or(false)
            })
        })
        .collect();
    debug!(
        "apply_filters: {} of {} rows kept for {:?}",
        res.len(),
        data.len(),
        selection
    );
    res
}

/// Percentage of each scale value among the non-missing answers, and the
/// median of these answers.
///
/// An empty population gives all-zero percentages and a NaN median.
pub fn score_distribution(
    rows: &[&Respondent],
    column: usize,
) -> Result<ScoreDistribution, SurveyError> {
    let mut scores: Vec<u8> = Vec::new();
    for r in rows.iter() {
        if let Some(cell) = r.get(column) {
            let score = parse_scale(cell).ok_or_else(|| SurveyError::InvalidScale {
                column,
                row: r.row,
                content: cell.to_string(),
            })?;
            scores.push(score);
        }
    }

    let responses = scores.len() as u64;
    let counts: Vec<(u8, u64)> = (SCALE_MIN..=SCALE_MAX)
        .map(|s| (s, scores.iter().filter(|x| **x == s).count() as u64))
        .collect();
    let percentages: Vec<(u8, f64)> = counts
        .iter()
        .map(|(s, c)| (*s, percent(*c, responses).unwrap_or(0.0)))
        .collect();

    scores.sort_unstable();
    let median = median_of_sorted(&scores);
    debug!(
        "score_distribution: column {} responses {} median {}",
        column, responses, median
    );
    Ok(ScoreDistribution {
        percentages,
        counts,
        responses,
        median,
    })
}

fn median_of_sorted(values: &[u8]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    let mid = n / 2;
    if n % 2 == 0 {
        (values[mid - 1] as f64 + values[mid] as f64) / 2.0
    } else {
        values[mid] as f64
    }
}

/// Counts the tokens of a multi-value question.
///
/// Each respondent contributes one occurrence per token in the answer.
/// The population used for percentages is the number of rows given,
/// whether they answered or not.
pub fn explode_counts(rows: &[&Respondent], column: usize) -> TokenCounts {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut respondents: u64 = 0;
    for r in rows.iter() {
        let tokens = match r.get(column) {
            Some(answer) => split_tokens(answer),
            None => continue,
        };
        if tokens.is_empty() {
            continue;
        }
        respondents += 1;
        for token in tokens {
            match index.get(token) {
                Some(pos) => counts[*pos].1 += 1,
                None => {
                    index.insert(token, counts.len());
                    counts.push((token.to_string(), 1));
                }
            }
        }
    }
    // Stable: ties stay in order of first appearance.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    TokenCounts {
        counts,
        respondents,
        population: rows.len() as u64,
    }
}

/// Number of respondents whose answer is exactly `sentinel` (usually
/// "Yes"), as a share of the population.
///
/// With a condition, the denominator is the size of the sub-population
/// satisfying the condition while the answers are still counted over all
/// the rows. A zero denominator gives a not-applicable percentage.
pub fn conditional_yes_rate(
    rows: &[&Respondent],
    column: usize,
    sentinel: &str,
    condition: Option<&Condition>,
) -> Proportion {
    let count = rows
        .iter()
        .filter(|r| r.get(column) == Some(sentinel))
        .count() as u64;
    let denominator = match condition {
        Some(c) => rows
            .iter()
            .filter(|r| r.get(c.column) == Some(c.value.as_str()))
            .count() as u64,
        None => rows.len() as u64,
    };
    if denominator == 0 {
        debug!(
            "conditional_yes_rate: column {}: empty population for {:?}",
            column, condition
        );
    }
    Proportion {
        count,
        denominator,
        percentage: percent(count, denominator),
    }
}

/// Number of respondents for each distinct answer, most frequent first.
/// Missing answers are not counted.
pub fn value_counts(rows: &[&Respondent], column: usize) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for r in rows.iter() {
        if let Some(v) = r.get(column) {
            match index.get(v) {
                Some(pos) => counts[*pos].1 += 1,
                None => {
                    index.insert(v, counts.len());
                    counts.push((v.to_string(), 1));
                }
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The distinct answers of a column, in order of first appearance.
pub fn distinct_values(rows: &[&Respondent], column: usize) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for r in rows.iter() {
        if let Some(v) = r.get(column) {
            if !res.iter().any(|x| x == v) {
                res.push(v.to_string());
            }
        }
    }
    res
}

/// The respondents who gave the rating `score`. Unparseable cells never
/// match.
pub fn filter_by_score<'a>(
    rows: &[&'a Respondent],
    column: usize,
    score: u8,
) -> Vec<&'a Respondent> {
    rows.iter()
        .filter(|r| r.get(column).and_then(parse_scale) == Some(score))
        .cloned()
        .collect()
}

/// Splits the ratings into dissatisfied (1 to 3) and satisfied (4 and 5)
/// respondents, with the share of each score inside its group.
pub fn satisfaction_split(
    rows: &[&Respondent],
    column: usize,
) -> Result<SatisfactionSplit, SurveyError> {
    let dist = score_distribution(rows, column)?;
    let count = |s: u8| -> u64 {
        dist.counts
            .iter()
            .find(|(x, _)| *x == s)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    };
    let total_dissatisfied: u64 = (1..=3).map(count).sum();
    let total_satisfied: u64 = (4..=5).map(count).sum();
    let share = |s: u8, total: u64| -> (u8, f64) {
        if total == 0 {
            (s, 0.0)
        } else {
            (s, count(s) as f64 / total as f64)
        }
    };
    Ok(SatisfactionSplit {
        dissatisfied: (1..=3).map(|s| share(s, total_dissatisfied)).collect(),
        satisfied: (4..=5).map(|s| share(s, total_satisfied)).collect(),
        total_dissatisfied,
        total_satisfied,
    })
}

/// Joins the tokens of two multi-value questions side by side.
///
/// Tokens missing on one side count zero there. Lines are sorted by the
/// left count (descending); the `trailing` token, if present, is always
/// put last.
pub fn compare_breakdowns(
    left: &TokenCounts,
    right: &TokenCounts,
    trailing: Option<&str>,
) -> Vec<BreakdownPair> {
    let mut res: Vec<BreakdownPair> = left
        .counts
        .iter()
        .map(|(token, c)| BreakdownPair {
            token: token.clone(),
            left: *c,
            right: right.count(token),
        })
        .collect();
    for (token, c) in right.counts.iter() {
        if left.count(token) == 0 {
            res.push(BreakdownPair {
                token: token.clone(),
                left: 0,
                right: *c,
            });
        }
    }
    res.sort_by(|a, b| b.left.cmp(&a.left));
    if let Some(t) = trailing {
        if let Some(pos) = res.iter().position(|p| p.token == t) {
            let p = res.remove(pos);
            res.push(p);
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ratings(values: &[&str]) -> Table {
        let mut b = TableBuilder::new(&["ID", "Rating"]);
        for (idx, v) in values.iter().enumerate() {
            let id = (idx + 1).to_string();
            b.add_row(&[id.as_str(), *v]);
        }
        b.build()
    }

    // 10 respondents, 6 in Europe, 4 managers of which 2 in Europe.
    fn population() -> Table {
        let mut b = TableBuilder::new(&["ID", "Role", "Function", "Location"]);
        let rows = [
            ("Manager", "HR", "Europe"),
            ("Manager", "Finance", "Europe"),
            ("Manager", "HR", "Asia"),
            ("Manager", "IT", "Africa"),
            ("Employee", "HR", "Europe"),
            ("Employee", "IT", "Europe"),
            ("Employee", "IT", "Europe"),
            ("Employee", "Finance", "Europe"),
            ("Executive", "HR", "Oceania"),
            ("Executive", "IT", "Asia"),
        ];
        for (idx, (role, function, location)) in rows.iter().enumerate() {
            let id = (idx + 1).to_string();
            b.add_row(&[id.as_str(), *role, *function, *location]);
        }
        b.build()
    }

    const COLUMNS: FilterColumns = FilterColumns {
        role: 1,
        function: 2,
        location: 3,
    };

    fn ids(rows: &[&Respondent]) -> Vec<String> {
        rows.iter().map(|r| r.get(0).unwrap().to_string()).collect()
    }

    #[test]
    fn filters_combine_dimensions_with_and() {
        init();
        let t = population();
        let selection = FilterSelection {
            roles: vec!["Manager".to_string()],
            functions: vec![],
            locations: vec!["Europe".to_string()],
        };
        let res = apply_filters(&t, &COLUMNS, &selection);
        assert_eq!(ids(&res), vec!["1", "2"]);
    }

    #[test]
    fn filters_combine_values_with_or() {
        let t = population();
        let selection = FilterSelection {
            roles: vec![],
            functions: vec!["Finance".to_string(), "HR".to_string()],
            locations: vec![],
        };
        let res = apply_filters(&t, &COLUMNS, &selection);
        assert_eq!(ids(&res), vec!["1", "2", "3", "5", "8", "9"]);
        for r in res.iter() {
            let f = r.get(2).unwrap();
            assert!(f == "Finance" || f == "HR");
        }
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let t = population();
        let res = apply_filters(&t, &COLUMNS, &FilterSelection::default());
        assert_eq!(res.len(), 10);
    }

    #[test]
    fn unknown_value_matches_nothing() {
        let t = population();
        let selection = FilterSelection {
            roles: vec!["Intern".to_string()],
            ..FilterSelection::default()
        };
        assert!(apply_filters(&t, &COLUMNS, &selection).is_empty());
    }

    #[test]
    fn median_of_odd_count() {
        let t = ratings(&["1", "2", "2", "4", "5"]);
        let d = score_distribution(&t.all(), 1).unwrap();
        assert_eq!(d.median, 2.0);
        assert_eq!(d.responses, 5);
        assert!((d.percentage(2) - 40.0).abs() < 1e-9);
        assert_eq!(d.percentage(3), 0.0);
    }

    #[test]
    fn median_of_even_count() {
        let t = ratings(&["1", "2", "3", "4"]);
        let d = score_distribution(&t.all(), 1).unwrap();
        assert_eq!(d.median, 2.5);
    }

    #[test]
    fn distribution_sums_to_hundred() {
        let t = ratings(&["5", "4.0", "", "3", "3", "1", "4", "2"]);
        let d = score_distribution(&t.all(), 1).unwrap();
        assert_eq!(d.responses, 7);
        let total: f64 = d.percentages.iter().map(|(_, p)| p).sum();
        assert!((total - 100.0).abs() < 1e-9);
        let scales: Vec<u8> = d.percentages.iter().map(|(s, _)| *s).collect();
        assert_eq!(scales, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn distribution_of_nobody() {
        let t = ratings(&["", " "]);
        let d = score_distribution(&t.all(), 1).unwrap();
        assert_eq!(d.responses, 0);
        assert!(d.percentages.iter().all(|(_, p)| *p == 0.0));
        assert!(d.median.is_nan());
        assert_eq!(d.median(), None);

        let d = score_distribution(&[], 1).unwrap();
        assert_eq!(d.percentages.len(), 5);
    }

    #[test]
    fn distribution_rejects_text() {
        let t = ratings(&["4", "Satisfied"]);
        let err = score_distribution(&t.all(), 1).unwrap_err();
        assert_eq!(
            err,
            SurveyError::InvalidScale {
                column: 1,
                row: 1,
                content: "Satisfied".to_string()
            }
        );
        // The error points at the respondent in the table, not in the subset.
        let rows: Vec<&Respondent> = t.rows.iter().skip(1).collect();
        match score_distribution(&rows, 1).unwrap_err() {
            SurveyError::InvalidScale { row, .. } => assert_eq!(row, 1),
            e => panic!("unexpected error {:?}", e),
        }
        assert!(score_distribution(&ratings(&["6"]).all(), 1).is_err());
        assert!(score_distribution(&ratings(&["2.5"]).all(), 1).is_err());
    }

    #[test]
    fn explode_counts_multi_values() {
        let t = ratings(&["A;B;", "A;", ""]);
        let c = explode_counts(&t.all(), 1);
        assert_eq!(
            c.counts,
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
        assert_eq!(c.respondents, 2);
        assert_eq!(c.population, 3);
        let pct = c.percent_of_respondents();
        assert!((pct[0].1 - 200.0 / 3.0).abs() < 1e-9);
        let pct = c.percent_of_tokens();
        assert!((pct[1].1 - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn explode_counts_keeps_duplicates() {
        let t = ratings(&["A;A;B", "B;;C;"]);
        let c = explode_counts(&t.all(), 1);
        assert_eq!(c.count("A"), 2);
        assert_eq!(c.count("B"), 2);
        assert_eq!(c.count("C"), 1);
        assert_eq!(c.count(""), 0);
        // Ties keep the order of first appearance.
        assert_eq!(c.top(), Some(&("A".to_string(), 2)));
    }

    #[test]
    fn yes_rate_over_population() {
        let t = ratings(&["Yes", "No", "Yes", ""]);
        let p = conditional_yes_rate(&t.all(), 1, "Yes", None);
        assert_eq!(p.count, 2);
        assert_eq!(p.denominator, 4);
        assert_eq!(p.percentage, Some(50.0));
    }

    #[test]
    fn yes_rate_among_sub_population() {
        let mut b = TableBuilder::new(&["ID", "Participates", "Fair"]);
        b.add_row(&["1", "Yes", "Yes"]);
        b.add_row(&["2", "Yes", "No"]);
        b.add_row(&["3", "No", "Yes"]);
        b.add_row(&["4", "Yes", "Yes"]);
        let t = b.build();
        let cond = Condition {
            column: 1,
            value: "Yes".to_string(),
        };
        let p = conditional_yes_rate(&t.all(), 2, "Yes", Some(&cond));
        // Respondent 3 answers "Yes" without being part of the sub-population.
        assert_eq!(p.count, 3);
        assert_eq!(p.denominator, 3);
        assert_eq!(p.percentage, Some(100.0));
    }

    #[test]
    fn yes_rate_counts_outside_the_sub_population() {
        let mut b = TableBuilder::new(&["ID", "Campaign", "Fair"]);
        b.add_row(&["1", "Yes", "Yes"]);
        b.add_row(&["2", "No", "Yes"]);
        b.add_row(&["3", "Yes", "No"]);
        let t = b.build();
        let cond = Condition {
            column: 1,
            value: "Yes".to_string(),
        };
        let p = conditional_yes_rate(&t.all(), 2, "Yes", Some(&cond));
        assert_eq!(p.count, 2);
        assert_eq!(p.denominator, 2);
        assert_eq!(p.percentage, Some(100.0));
    }

    #[test]
    fn yes_rate_with_empty_sub_population() {
        let t = ratings(&["No", "No"]);
        let cond = Condition {
            column: 1,
            value: "Yes".to_string(),
        };
        let p = conditional_yes_rate(&t.all(), 1, "Yes", Some(&cond));
        assert_eq!(p.count, 0);
        assert_eq!(p.denominator, 0);
        assert_eq!(p.percentage, None);

        let p = conditional_yes_rate(&[], 1, "Yes", None);
        assert_eq!(p.percentage, None);
    }

    #[test]
    fn value_counts_and_distinct_values() {
        let t = population();
        let rows = t.all();
        let counts = value_counts(&rows, 3);
        assert_eq!(counts[0], ("Europe".to_string(), 6));
        assert_eq!(counts[1], ("Asia".to_string(), 2));
        assert_eq!(
            distinct_values(&rows, 1),
            vec!["Manager", "Employee", "Executive"]
        );
    }

    #[test]
    fn drill_down_by_score() {
        let t = ratings(&["1", "5", "5.0", "x", ""]);
        let rows = t.all();
        let res = filter_by_score(&rows, 1, 5);
        assert_eq!(ids(&res), vec!["2", "3"]);
    }

    #[test]
    fn split_satisfied_and_dissatisfied() {
        let t = ratings(&["1", "3", "3", "4", "5", "5", "5"]);
        let s = satisfaction_split(&t.all(), 1).unwrap();
        assert_eq!(s.total_dissatisfied, 3);
        assert_eq!(s.total_satisfied, 4);
        assert!((s.dissatisfied[2].1 - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.satisfied[1], (5, 0.75));

        let s = satisfaction_split(&ratings(&["4"]).all(), 1).unwrap();
        assert!(s.dissatisfied.iter().all(|(_, p)| *p == 0.0));
    }

    #[test]
    fn breakdowns_side_by_side() {
        let mut b = TableBuilder::new(&["ID", "Used", "Improve"]);
        b.add_row(&["1", "Payroll;None;", "Learning;"]);
        b.add_row(&["2", "Payroll;Learning", "Payroll"]);
        b.add_row(&["3", "None", "Recruiting"]);
        b.add_row(&["4", "None", ""]);
        let t = b.build();
        let rows = t.all();
        let used = explode_counts(&rows, 1);
        let improve = explode_counts(&rows, 2);
        let pairs = compare_breakdowns(&used, &improve, Some("None"));
        let tokens: Vec<&str> = pairs.iter().map(|p| p.token.as_str()).collect();
        assert_eq!(tokens, vec!["Payroll", "Learning", "Recruiting", "None"]);
        assert_eq!(
            pairs[2],
            BreakdownPair {
                token: "Recruiting".to_string(),
                left: 0,
                right: 1
            }
        );
        assert_eq!(pairs[3].left, 3);
    }

    #[test]
    fn missing_column_is_reported() {
        let t = ratings(&["1"]);
        assert!(check_column(&t, 1).is_ok());
        assert_eq!(
            check_column(&t, 7),
            Err(SurveyError::MissingColumn {
                column: 7,
                width: 2
            })
        );
    }
}
