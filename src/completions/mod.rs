//! Shell completion support for emblemtags
//!
//! Completion scripts are static: subcommands, flags and path hints. Tag
//! names are not completed.

use clap::Command;
use clap_complete::Shell;
use std::io::Write;

/// Generate static shell completions into `buf`
///
/// # Arguments
/// * `shell` - Target shell (bash, zsh, fish, powershell, elvish)
/// * `cmd` - The clap Command to generate completions for
pub fn generate_static<W: Write>(shell: Shell, cmd: &mut Command, buf: &mut W) {
    clap_complete::generate(shell, cmd, cmd.get_name().to_string(), buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_bash_script_names_subcommands() {
        let mut buf = Vec::new();
        generate_static(Shell::Bash, &mut Cli::command(), &mut buf);

        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("emblemtags"));
        assert!(script.contains("purge-color"));
    }
}
