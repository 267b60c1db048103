mod args;
mod feedback;

use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    let config = args.config.as_deref();
    let res = match &args.command {
        Command::Add { name } => feedback::run_add(config, name),
        Command::Delete { name } => feedback::run_delete(config, name),
        Command::Rename { old_name, new_name } => feedback::run_rename(config, old_name, new_name),
        Command::List => feedback::run_list(config),
        Command::Upload {
            input,
            out,
            reference,
            worksheet,
        } => feedback::run_upload(
            config,
            input,
            out.as_deref(),
            reference.as_deref(),
            worksheet.as_deref(),
        ),
    };

    if let Err(e) = res {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
