use std::io;
use std::process::ExitCode;

use clap::Parser;
use myfs_cli::cli::Cli;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match myfs_cli::run(cli.command, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:?}");
            eprintln!("myfs: {e}");
            ExitCode::FAILURE
        }
    }
}
