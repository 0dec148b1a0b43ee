//! tileforge - command-line tool for resolving blueprint definitions and
//! rendering recolored tiles

use std::process::ExitCode;

use tileforge::cli;

fn main() -> ExitCode {
    cli::run()
}
