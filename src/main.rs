//! apidoc CLI entry point.

use apidoc::cli::{self, Cli};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    let exit_code = cli::run(cli);
    std::process::exit(exit_code);
}
