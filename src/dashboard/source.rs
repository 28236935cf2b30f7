// Locating, fetching and loading the survey data.

use std::ops::Deref;
use std::sync::Arc;

use survey_stats::Table;

use crate::dashboard::io_common::simplify_file_name;
use crate::dashboard::io_csv::read_csv_table;
use crate::dashboard::io_xlsx::read_xlsx_table;
use crate::dashboard::schema::{ColumnLocator, Schema, SurveyColumn};
use crate::dashboard::*;

/// The published results of the survey.
pub const DEFAULT_DATA_URL: &str = "https://github.com/001202ZHENG/V1_Chatbot_Streamlit/raw/main/data/Voice%20of%20Customer_Second%20data%20set.xlsx";

pub const DEFAULT_CACHE_DIR: &str = ".hrpulse-cache";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Xlsx,
    Csv,
}

impl InputType {
    pub fn parse(s: &str) -> DResult<InputType> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(InputType::Xlsx),
            "csv" => Ok(InputType::Csv),
            _ => UnknownInputTypeSnafu { input_type: s }.fail(),
        }
    }

    /// Guesses the type from a file name. Spreadsheets are the default.
    pub fn from_file_name(name: &str) -> InputType {
        if simplify_file_name(name).to_lowercase().ends_with(".csv") {
            InputType::Csv
        } else {
            InputType::Xlsx
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            InputType::Xlsx => "xlsx",
            InputType::Csv => "csv",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DataLocation {
    File(PathBuf),
    Url(String),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceSettings {
    pub location: DataLocation,
    pub input_type: Option<InputType>,
    pub worksheet: Option<String>,
    /// Where downloaded files are kept.
    pub cache_dir: PathBuf,
}

/// The loaded responses and the position of every survey column.
#[derive(Debug)]
pub struct Dataset {
    pub table: Table,
    pub schema: Schema,
    /// Where the data came from, for display.
    pub origin: String,
}

/// Shared read-only access to the dataset.
///
/// The dataset is loaded once and never modified: handles can be cloned
/// freely and the data is released with the last one.
#[derive(Debug, Clone)]
pub struct DatasetHandle(Arc<Dataset>);

impl DatasetHandle {
    pub fn new(dataset: Dataset) -> DatasetHandle {
        DatasetHandle(Arc::new(dataset))
    }
}

impl Deref for DatasetHandle {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        &self.0
    }
}

pub fn load_dataset(
    settings: &SourceSettings,
    overrides: &[(SurveyColumn, ColumnLocator)],
) -> DResult<DatasetHandle> {
    let (path, origin) = match &settings.location {
        DataLocation::File(p) => (p.clone(), p.display().to_string()),
        DataLocation::Url(u) => {
            let input_type = settings
                .input_type
                .unwrap_or_else(|| InputType::from_file_name(u));
            (fetch_remote(u, &settings.cache_dir, input_type)?, u.clone())
        }
    };
    let path_s = path.display().to_string();
    let input_type = settings
        .input_type
        .unwrap_or_else(|| InputType::from_file_name(&path_s));
    info!("Attempting to read survey file {:?} ({:?})", path_s, input_type);

    let table = match input_type {
        InputType::Xlsx => read_xlsx_table(&path_s, settings.worksheet.as_deref())?,
        InputType::Csv => read_csv_table(&path_s)?,
    };
    let schema = Schema::resolve(&table, overrides)?;
    info!(
        "load_dataset: {} respondents, {} columns from {}",
        table.len(),
        table.width(),
        origin
    );
    Ok(DatasetHandle::new(Dataset {
        table,
        schema,
        origin,
    }))
}

/// Where the download of this URL is kept.
pub fn cache_path(url: &str, cache_dir: &Path, input_type: InputType) -> PathBuf {
    cache_dir.join(format!("{}.{}", sha256::digest(url), input_type.extension()))
}

/// Downloads the file once. Later calls read it from the cache.
pub fn fetch_remote(url: &str, cache_dir: &Path, input_type: InputType) -> DResult<PathBuf> {
    let dest = cache_path(url, cache_dir, input_type);
    if dest.exists() {
        info!("fetch_remote: using cached copy {:?} of {}", dest, url);
        return Ok(dest);
    }
    let cache_s = cache_dir.display().to_string();
    fs::create_dir_all(cache_dir).context(CacheWriteSnafu { path: cache_s })?;

    info!("fetch_remote: downloading {}", simplify_file_name(url));
    let resp = reqwest::blocking::get(url).context(DownloadSnafu { url })?;
    if !resp.status().is_success() {
        return DownloadStatusSnafu {
            url,
            status: resp.status().as_u16(),
        }
        .fail();
    }
    let bytes = resp.bytes().context(DownloadSnafu { url })?;

    // An interrupted download never leaves a file under the final name.
    let partial = dest.with_extension("partial");
    let partial_s = partial.display().to_string();
    fs::write(&partial, &bytes).context(CacheWriteSnafu {
        path: partial_s.clone(),
    })?;
    fs::rename(&partial, &dest).context(CacheWriteSnafu { path: partial_s })?;
    debug!("fetch_remote: {} bytes written to {:?}", bytes.len(), dest);
    Ok(dest)
}
