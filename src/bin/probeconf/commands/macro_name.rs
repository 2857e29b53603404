//! `probeconf macro-name` command

use anyhow::Result;

use crate::cli::MacroNameArgs;
use probeconf::core::identifier::{have_macro, macro_name};

pub fn execute(args: MacroNameArgs) -> Result<()> {
    let name = if args.have {
        have_macro(&args.parts)
    } else {
        macro_name(&args.parts)
    };
    println!("{}", name);
    Ok(())
}
