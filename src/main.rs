use clap::Parser;
use env_logger::Env;
use log::error;

use imclassify::Opts;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    if let Err(e) = imclassify::cli::run(&opts) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
