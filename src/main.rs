use clap::Parser;
use stockdigest::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
