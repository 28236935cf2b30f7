use crate::dashboard::schema::{ColumnLocator, SurveyColumn};
use crate::dashboard::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    /// `xlsx` or `csv`. Guessed from the file name when absent.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "cacheDirectory")]
    pub cache_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct InferenceConfig {
    /// Base URL of the service. The model name is appended to it.
    pub endpoint: String,
    /// Name of the environment variable holding the access token.
    #[serde(rename = "tokenEnv")]
    pub token_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "sentimentModel")]
    pub sentiment_model: Option<String>,
    #[serde(rename = "emotionModels")]
    pub emotion_models: Option<Vec<String>>,
    #[serde(rename = "summarizerModel")]
    pub summarizer_model: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    pub source: Option<SourceConfig>,
    /// Survey column name -> header text, 1-based number or Excel letters.
    pub columns: Option<BTreeMap<String, JSValue>>,
    /// Additional words left out of the word tables.
    pub stopwords: Option<Vec<String>>,
    pub inference: Option<InferenceConfig>,
}

impl DashboardConfig {
    pub fn column_overrides(&self) -> DResult<Vec<(SurveyColumn, ColumnLocator)>> {
        let mut res: Vec<(SurveyColumn, ColumnLocator)> = Vec::new();
        if let Some(columns) = self.columns.as_ref() {
            for (key, js) in columns.iter() {
                let column =
                    SurveyColumn::from_key(key).context(UnknownSurveyColumnSnafu { key })?;
                let locator = read_column_ref(js)?;
                debug!("column_overrides: {:?} -> {:?}", column, locator);
                res.push((column, locator));
            }
        }
        Ok(res)
    }
}

pub fn read_config(path: &str) -> DResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> DResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads a column reference from the configuration.
///
/// Numbers (or strings of digits) are 1-based column numbers, strings of
/// one to three capital letters are Excel columns, and any other string is
/// the text of the header. A header that looks like Excel letters can be
/// given as `{"header": "ID"}`.
pub fn read_column_ref(x: &JSValue) -> DResult<ColumnLocator> {
    match x {
        JSValue::Number(n) => match n.as_u64() {
            Some(v) if v >= 1 => Ok(ColumnLocator::Position((v - 1) as usize)),
            _ => ColumnReferenceSnafu {
                content: n.to_string(),
            }
            .fail(),
        },
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            match s.parse::<usize>() {
                Ok(v) if v >= 1 => Ok(ColumnLocator::Position(v - 1)),
                _ => ColumnReferenceSnafu { content: s }.fail(),
            }
        }
        // Parsing the Excel-style columns
        JSValue::String(s)
            if (1..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            let mut idx: usize = 0;
            for c in s.chars() {
                idx = idx * 26 + ((c as usize) - ('A' as usize) + 1);
            }
            Ok(ColumnLocator::Position(idx - 1))
        }
        JSValue::String(s) if !s.trim().is_empty() => Ok(ColumnLocator::Header(s.clone())),
        JSValue::Object(m) => match m.get("header") {
            Some(JSValue::String(s)) => Ok(ColumnLocator::Header(s.clone())),
            _ => ColumnReferenceSnafu {
                content: x.to_string(),
            }
            .fail(),
        },
        _ => ColumnReferenceSnafu {
            content: x.to_string(),
        }
        .fail(),
    }
}
