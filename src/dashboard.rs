use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use survey_stats::distinct_values;

pub mod config_reader;
pub mod explore;
pub mod inference;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod pages;
pub mod schema;
pub mod session;
pub mod source;

use crate::dashboard::config_reader::*;
use crate::dashboard::inference::TextModels;
use crate::dashboard::pages::{Page, PageReport, RenderContext};
use crate::dashboard::session::{Dimension, Session};
use crate::dashboard::source::*;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} does not contain any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The file {path} does not have a header row"))]
    MissingHeader { path: String },
    #[snafu(display("Error downloading {url}"))]
    Download { source: reqwest::Error, url: String },
    #[snafu(display("Downloading {url} failed with HTTP status {status}"))]
    DownloadStatus { url: String, status: u16 },
    #[snafu(display("Error creating the client of the inference service"))]
    InferenceClient { source: reqwest::Error },
    #[snafu(display("Error writing the cache file {path}"))]
    CacheWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Survey column {column} ({locator}) is missing from the data"))]
    MissingSurveyColumn { column: String, locator: String },
    #[snafu(display("Unknown survey column {key:?} in the configuration"))]
    UnknownSurveyColumn { key: String },
    #[snafu(display("Could not understand the column reference {content}"))]
    ColumnReference { content: String },
    #[snafu(display("Unknown input type {input_type:?}: expected xlsx or csv"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Unknown page {name:?}"))]
    UnknownPage { name: String },
    #[snafu(display("Error reading the commands"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Error writing the output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DResult<T> = Result<T, DashboardError>;

/// Everything the command line can ask for. The values set here take
/// precedence over the ones of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub config_path: Option<String>,
    pub input: Option<String>,
    pub url: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub cache_dir: Option<String>,
    pub page: Option<String>,
    pub all_pages: bool,
    pub roles: Vec<String>,
    pub functions: Vec<String>,
    pub locations: Vec<String>,
    pub focus: Option<String>,
    pub list_options: bool,
    pub interactive: bool,
    pub out: Option<String>,
    pub reference: Option<String>,
}

pub fn run_dashboard(settings: &RunSettings) -> DResult<()> {
    let (config, root_path) = match settings.config_path.as_ref() {
        Some(p) => {
            let config = read_config(p)?;
            info!("config: {:?}", config);
            let root: PathBuf = Path::new(p)
                .parent()
                .map(|x| x.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (DashboardConfig::default(), PathBuf::new()),
    };

    let source_settings = build_source_settings(&config, &root_path, settings)?;
    let overrides = config.column_overrides()?;
    let dataset = load_dataset(&source_settings, &overrides)?;

    let models = match config.inference.as_ref() {
        Some(inf) => TextModels::from_config(inf)?,
        None => {
            info!("run_dashboard: no inference service configured, text models are disabled");
            TextModels::disabled()
        }
    };
    let stopwords: Vec<String> = config.stopwords.clone().unwrap_or_default();
    let ctx = RenderContext {
        dataset: &dataset,
        stopwords: &stopwords,
        models: &models,
    };

    if settings.interactive {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        return explore::run_explorer(stdin.lock(), &mut stdout, &ctx);
    }

    let result_js = if settings.list_options {
        filter_options_to_json(&dataset)
    } else {
        let session = build_session(settings)?;
        if settings.all_pages {
            let reports: Vec<PageReport> = Page::ALL
                .iter()
                .map(|p| {
                    let mut s = session.clone();
                    s.select_page(*p);
                    s.set_selection(session.selection().clone());
                    s.set_focus(session.focus());
                    pages::render_page(&ctx, &s)
                })
                .collect();
            serde_json::to_value(reports).context(ParsingJsonSnafu {})?
        } else {
            serde_json::to_value(pages::render_page(&ctx, &session))
                .context(ParsingJsonSnafu {})?
        }
    };

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_output(settings.out.as_deref(), &pretty_js_stats)?;

    // The reference report, if provided for comparison
    if let Some(reference_p) = settings.reference.as_ref() {
        let reference = read_summary(reference_p)?;
        debug!("reference: {:?}", reference);
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_js_reference != pretty_js_stats {
            warn!("Found differences with the reference report");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between the rendered report and the reference report")
        }
    }

    Ok(())
}

fn build_source_settings(
    config: &DashboardConfig,
    root_path: &Path,
    settings: &RunSettings,
) -> DResult<SourceSettings> {
    let cfs = config.source.clone().unwrap_or_default();

    // Relative paths from the configuration are relative to the configuration file.
    let config_file = cfs.file_path.as_ref().map(|p| root_path.join(p));
    let location = match (settings.input.as_ref(), settings.url.as_ref()) {
        (Some(p), _) => DataLocation::File(PathBuf::from(p)),
        (None, Some(u)) => DataLocation::Url(u.clone()),
        (None, None) => match (config_file, cfs.url.as_ref()) {
            (Some(p), _) => DataLocation::File(p),
            (None, Some(u)) => DataLocation::Url(u.clone()),
            (None, None) => DataLocation::Url(DEFAULT_DATA_URL.to_string()),
        },
    };

    let input_type = match settings.input_type.as_ref().or(cfs.provider.as_ref()) {
        Some(s) => Some(InputType::parse(s)?),
        None => None,
    };

    let cache_dir = settings
        .cache_dir
        .clone()
        .map(PathBuf::from)
        .or_else(|| cfs.cache_directory.as_ref().map(|p| root_path.join(p)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

    Ok(SourceSettings {
        location,
        input_type,
        worksheet: settings
            .excel_worksheet_name
            .clone()
            .or(cfs.excel_worksheet_name),
        cache_dir,
    })
}

fn build_session(settings: &RunSettings) -> DResult<Session> {
    let mut session = Session::new();
    if let Some(p) = settings.page.as_ref() {
        session.select_page(Page::parse(p)?);
    }
    for (dim, values) in [
        (Dimension::Role, &settings.roles),
        (Dimension::Function, &settings.functions),
        (Dimension::Location, &settings.locations),
    ] {
        for v in values.iter() {
            session.select(dim, v);
        }
    }
    if let Some(f) = settings.focus.as_ref() {
        session.set_focus(session::parse_focus(f)?);
    }
    Ok(session)
}

pub fn filter_options_to_json(dataset: &Dataset) -> JSValue {
    let rows = dataset.table.all();
    let fc = dataset.schema.filter_columns();
    json!({
        "respondents": dataset.table.len(),
        "roles": distinct_values(&rows, fc.role),
        "functions": distinct_values(&rows, fc.function),
        "locations": distinct_values(&rows, fc.location),
        "pages": Page::ALL.iter().map(|p| json!({"page": p.slug(), "title": p.title()})).collect::<Vec<JSValue>>(),
    })
}

fn write_output(out: Option<&str>, content: &str) -> DResult<()> {
    match out {
        None | Some("stdout") | Some("") => {
            println!("{}", content);
            Ok(())
        }
        Some(path) => {
            info!("Writing report to {:?}", path);
            fs::write(path, content).context(WritingOutputSnafu { path })
        }
    }
}
