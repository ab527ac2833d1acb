//! Shell completion scripts for `bincompat`.

use std::io;

use clap::Command;
use clap_complete::{generate, Shell};

const BIN_NAME: &str = "bincompat";

/// One-line hint on where the generated script goes.
fn install_hint(shell: Shell) -> String {
    format!(
        "Run `{bin} completions {shell} > FILE` and source FILE from your {shell} startup config.",
        bin = BIN_NAME,
        shell = shell
    )
}

/// Write the completion script for `shell` to stdout, or only the install hint.
pub fn run(shell: Shell, show_instructions: bool, cmd: &mut Command) -> anyhow::Result<()> {
    if show_instructions {
        println!("{}", install_hint(shell));
    } else {
        generate(shell, cmd, BIN_NAME, &mut io::stdout());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_hint_names_shell() {
        let hint = install_hint(Shell::Zsh);
        assert!(hint.contains("bincompat completions zsh"));
    }
}
