use clap::{Parser, Subcommand};

/// This is a faculty feedback tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration file: storage locations, tie-break rule and oracles.
    /// Without it, the files are stored in the current directory and the default oracles are used.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Registers a new faculty member, without verdict.
    Add {
        #[clap(value_parser)]
        name: String,
    },
    /// Removes a faculty member.
    Delete {
        #[clap(value_parser)]
        name: String,
    },
    /// Changes the name of a faculty member.
    Rename {
        #[clap(value_parser)]
        old_name: String,
        #[clap(value_parser)]
        new_name: String,
    },
    /// Prints all the faculty members and their verdicts.
    List,
    /// Processes a feedback file. The name of the file (without extension) is the faculty name.
    Upload {
        /// (file path) The feedback file, in csv or xlsx format.
        #[clap(value_parser)]
        input: String,

        /// (file path, 'stdout' or empty) If specified, the report of the analysis will be written in JSON format
        /// to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference report in JSON format. If provided, facsent will
        /// check that the computed report matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,

        /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
        #[clap(long, value_parser)]
        worksheet: Option<String>,
    },
}
