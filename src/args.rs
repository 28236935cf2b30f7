use clap::Parser;

/// Results dashboard of the HR survey: renders the pages of the dashboard as JSON reports.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration of the dashboard: data source, column overrides,
    /// stopwords and text models. Relative paths in this file are relative to its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference report in JSON format. If provided, hrpulse will check that the
    /// rendered output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where the report is written. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The survey responses. Setting this option overrides the source of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (URL) Downloads the survey responses from this address. The file is kept in the cache directory.
    #[clap(long, value_parser)]
    pub url: Option<String>,

    /// (xlsx or csv) The type of the input. By default, it is guessed from the file name.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, the name of the worksheet to use. Defaults to the first one.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (directory) Where downloaded files are kept.
    #[clap(long, value_parser)]
    pub cache_dir: Option<String>,

    /// (slug, number or title) The page to render. Defaults to the general page.
    #[clap(short, long, value_parser)]
    pub page: Option<String>,

    /// Renders all the pages with the same filters.
    #[clap(long, takes_value = false)]
    pub all_pages: bool,

    /// Only keeps the respondents with this role. Can be repeated.
    #[clap(long, value_parser)]
    pub role: Vec<String>,

    /// Only keeps the respondents of this function. Can be repeated.
    #[clap(long, value_parser)]
    pub function: Vec<String>,

    /// Only keeps the respondents located there. Can be repeated.
    #[clap(long, value_parser)]
    pub location: Vec<String>,

    /// (1 to 5) Singles out a rating: the rating charts add the profile of the respondents who gave it.
    #[clap(long, value_parser)]
    pub focus: Option<String>,

    /// Lists the values available for each filter, instead of rendering a page.
    #[clap(long, takes_value = false)]
    pub list_options: bool,

    /// Reads commands from the standard input to explore the pages.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
