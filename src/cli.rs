use std::path::PathBuf;

use clap::Parser;

use crate::config::{Flags, Overrides};

#[derive(Parser, Debug)]
#[command(
    name = "siginspect",
    version,
    about = "Report the certificates that signed the files under a path"
)]
pub struct Cli {
    /// File or directory to inspect
    pub path: PathBuf,

    /// Check every subdirectory of PATH
    #[arg(short, long)]
    pub recursive: bool,

    /// Only check binaries (.exe, .dll, .msi)
    #[arg(short, long)]
    pub binaries_only: bool,

    /// Write reports to FILE (o.txt next to the config file if omitted)
    #[arg(short, long, value_name = "FILE", num_args = 0..=1)]
    pub output: Option<Option<PathBuf>>,

    /// Show certificate details and failure causes
    #[arg(short, long)]
    pub verbose: bool,

    /// Show files whose certificate could not be read
    #[arg(short, long)]
    pub exceptions: bool,

    /// Add borders and coloring
    #[arg(short, long)]
    pub style: bool,

    /// Config file [default: sigins.ini next to the executable]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Emit logs as JSON on stderr")]
    pub log_json: bool,
}

impl Cli {
    /// The switches given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            flags: Flags {
                recursive: self.recursive,
                binaries_only: self.binaries_only,
                output: self.output.is_some(),
                verbose: self.verbose,
                show_exceptions: self.exceptions,
                style: self.style,
            },
            output_path: self.output.clone().flatten(),
        }
    }
}
