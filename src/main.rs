mod args;
mod dashboard;

use clap::Parser;
use log::{debug, LevelFilter};
use std::error::Error;

use crate::args::Args;
use crate::dashboard::{run_dashboard, RunSettings};

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    let settings = RunSettings {
        config_path: args.config,
        input: args.input,
        url: args.url,
        input_type: args.input_type,
        excel_worksheet_name: args.excel_worksheet_name,
        cache_dir: args.cache_dir,
        page: args.page,
        all_pages: args.all_pages,
        roles: args.role,
        functions: args.function,
        locations: args.location,
        focus: args.focus,
        list_options: args.list_options,
        interactive: args.interactive,
        out: args.out,
        reference: args.reference,
    };

    if let Err(e) = run_dashboard(&settings) {
        eprintln!("Error: {}", e);
        let mut cause = e.source();
        while let Some(c) = cause {
            eprintln!("  caused by: {}", c);
            cause = c.source();
        }
        std::process::exit(1);
    }
}
