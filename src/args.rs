use clap::Parser;

/// Imports Workday feedback spreadsheet exports into the local feedback store.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The Workday XLSX export to import.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path) The feedback store to import into. Created on first use.
    #[clap(short, long, value_parser, default_value = "feedback.jsonl")]
    pub store: String,

    /// (file path, optional) Import configuration overriding the built-in column
    /// mappings. When not given, workday_config.json in the working directory is
    /// used if present.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the import summary is written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, wdimport will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, prints the (year, month) ranges available in the
    /// store after the import.
    #[clap(long, takes_value = false)]
    pub ranges: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
