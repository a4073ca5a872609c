//! Alias-aware command formatting.
//!
//! Shell aliases are only expanded by an interactive shell, or by `eval`
//! after the alias file has been sourced. A command sent through a
//! non-interactive exec is therefore wrapped as
//!
//! ```text
//! zsh -c "source /opt/.zsh_aliases; eval $(echo <base64> | base64 -d)"
//! ```
//!
//! The payload is base64 so that quotes and metacharacters in the original
//! command line survive the trip untouched.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use garrison_common::{GarrisonError, GarrisonResult};

/// Default shell inside containers.
pub const DEFAULT_SHELL: &str = "zsh";

/// Alias definitions sourced before evaluating a command.
pub const DEFAULT_ALIAS_FILE: &str = "/opt/.zsh_aliases";

const PAYLOAD_START: &str = "eval $(echo ";
const PAYLOAD_END: &str = " | base64 -d)";

/// Shell and alias file used inside containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProfile {
    /// Alias-capable shell binary.
    pub shell: String,
    /// File defining the aliases.
    pub alias_file: String,
}

impl Default for ShellProfile {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            alias_file: DEFAULT_ALIAS_FILE.to_string(),
        }
    }
}

impl ShellProfile {
    /// Wrap `tokens` into an alias-aware shell invocation.
    #[must_use]
    pub fn format<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        let payload = BASE64.encode(join_tokens(tokens).as_bytes());
        format!(
            "{} -c \"source {}; {PAYLOAD_START}{payload}{PAYLOAD_END}\"",
            self.shell, self.alias_file
        )
    }
}

/// Join command tokens with single spaces.
#[must_use]
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format `tokens` with the default shell profile.
#[must_use]
pub fn format_shell_command<S: AsRef<str>>(tokens: &[S]) -> String {
    ShellProfile::default().format(tokens)
}

/// Extract and decode the command line embedded in a formatted command.
///
/// # Errors
///
/// Fails if `formatted` was not produced by [`ShellProfile::format`].
pub fn decode_payload(formatted: &str) -> GarrisonResult<String> {
    let malformed = |reason: &str| GarrisonError::Exec {
        message: format!("Malformed shell command ({reason}): {formatted}"),
    };

    let start = formatted
        .find(PAYLOAD_START)
        .ok_or_else(|| malformed("no payload"))?
        + PAYLOAD_START.len();
    let len = formatted[start..]
        .find(PAYLOAD_END)
        .ok_or_else(|| malformed("unterminated payload"))?;

    let bytes = BASE64
        .decode(&formatted[start..start + len])
        .map_err(|_| malformed("invalid base64"))?;
    String::from_utf8(bytes).map_err(|_| malformed("payload is not UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_listing_command() {
        let cmd = format_shell_command(&["ls", "-la", "/root"]);
        insta::assert_snapshot!(
            cmd,
            @r#"zsh -c "source /opt/.zsh_aliases; eval $(echo bHMgLWxhIC9yb290 | base64 -d)""#
        );
        assert_eq!(decode_payload(&cmd).unwrap(), "ls -la /root");
    }

    #[test]
    fn quotes_and_operators_survive() {
        let tokens = ["nmap", "-sV", "10.0.0.1", "&&", "echo", "\"done\""];
        let cmd = format_shell_command(&tokens);
        assert!(cmd.contains("bm1hcCAtc1YgMTAuMC4wLjEgJiYgZWNobyAiZG9uZSI="));
        assert_eq!(
            decode_payload(&cmd).unwrap(),
            "nmap -sV 10.0.0.1 && echo \"done\""
        );
    }

    #[test]
    fn custom_profile() {
        let profile = ShellProfile {
            shell: "bash".to_string(),
            alias_file: "/etc/aliases.sh".to_string(),
        };
        let cmd = profile.format(&["id"]);
        assert!(cmd.starts_with("bash -c \"source /etc/aliases.sh; eval $(echo "));
        assert_eq!(decode_payload(&cmd).unwrap(), "id");
    }

    #[test]
    fn splits_into_three_arguments() {
        let cmd = format_shell_command(&["echo", "'single'", "$HOME"]);
        let argv = shell_words::split(&cmd).unwrap();
        assert_eq!(argv.len(), 3);
        assert_eq!(argv[0], "zsh");
        assert_eq!(argv[1], "-c");
        assert!(argv[2].starts_with("source /opt/.zsh_aliases; eval $(echo "));
    }

    #[test]
    fn rejects_foreign_commands() {
        assert!(decode_payload("ls -la").is_err());
        assert!(decode_payload("eval $(echo !!! | base64 -d)").is_err());
    }

    proptest! {
        #[test]
        fn payload_round_trips(tokens in proptest::collection::vec(".*", 0..8)) {
            let cmd = format_shell_command(&tokens);
            prop_assert_eq!(decode_payload(&cmd).unwrap(), tokens.join(" "));
        }
    }
}
