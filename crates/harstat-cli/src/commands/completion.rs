use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io;

/// Print the completion script for `shell` to stdout.
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    let bin_name = cmd.get_name().to_string();
    tracing::debug!("Generating {} completions for {}", shell, bin_name);
    generate(shell, cmd, bin_name, &mut io::stdout());
    Ok(())
}
