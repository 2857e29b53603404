//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use probeconf::util::shell::ColorChoice;

/// probeconf - detect C headers, functions, types and members, and write a config.h
#[derive(Parser)]
#[command(name = "probeconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every check in a config file and write the header
    Run(RunArgs),

    /// Run a single check
    Check(CheckArgs),

    /// Print the macro name derived from an identifier
    MacroName(MacroNameArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Checks file (defaults to probeconf.toml)
    pub config: Option<PathBuf>,

    /// C compiler command (overrides the config file and $CC)
    #[arg(long)]
    pub cc: Option<String>,

    /// Header to write (overrides `output` in the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print compiler output under failed checks
    #[arg(long)]
    pub show_diagnostics: bool,

    /// Print a JSON report instead of status lines
    #[arg(long)]
    pub json: bool,

    /// Ignore ~/.probeconf/config.toml
    #[arg(long)]
    pub no_user_config: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub probe: ProbeCommand,

    /// C compiler command (defaults to $CC)
    #[arg(long, global = true)]
    pub cc: Option<String>,

    /// Preprocessor flag passed to the compiler (repeatable)
    #[arg(long = "cppflag", global = true, allow_hyphen_values = true)]
    pub cppflags: Vec<String>,

    /// Feature macro NAME or NAME=VALUE defined in the probe (repeatable)
    #[arg(short = 'D', long = "define", global = true)]
    pub defines: Vec<String>,

    /// Print compiler output if the check fails
    #[arg(long, global = true)]
    pub show_diagnostics: bool,
}

#[derive(Subcommand)]
pub enum ProbeCommand {
    /// Check that headers can be included together
    Header {
        /// Headers, included in order
        #[arg(required = true)]
        headers: Vec<String>,
    },

    /// Check that a function is declared and links
    Func {
        name: String,
        /// Header to include (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Check that a type exists
    Type {
        name: String,
        /// Header to include (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Check that a macro, constant or symbol is declared
    Decl {
        name: String,
        /// Header to include (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Check that a struct or union has a member
    Member {
        /// The aggregate type, e.g. "struct stat"
        #[arg(value_name = "TYPE")]
        ty: String,
        member: String,
        /// Header to include (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[derive(Args)]
pub struct MacroNameArgs {
    /// Identifier parts, joined with `_`
    #[arg(required = true)]
    pub parts: Vec<String>,

    /// Prefix the name with HAVE_
    #[arg(long)]
    pub have: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
