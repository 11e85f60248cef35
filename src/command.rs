//! Construction of the search-executable invocation.
//!
//! The builder produces a plain argument vector that is handed to the OS
//! verbatim. No shell is involved anywhere: search terms come from
//! arbitrary selection text, and a shell would reinterpret metacharacters
//! in them.

use crate::config::SearchConfiguration;
use crate::error::{FastFindError, Result};
use crate::types::{OutputFormat, SearchQuery};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Build the argument vector for a search, JSON output mode.
pub fn build(config: &SearchConfiguration, query: &SearchQuery) -> Result<Vec<OsString>> {
    build_with_format(config, query, OutputFormat::JsonLines)
}

/// Build the argument vector for a search in the given output format.
///
/// The vector starts with the executable itself, in order: output-format
/// flags, the case-insensitivity flag when configured, context flags,
/// custom file-type registrations and selections, standard file-type
/// selections, ignore-folder exclusions, the column flag, and finally the
/// literal term and the expanded search path.
pub fn build_with_format(
    config: &SearchConfiguration,
    query: &SearchQuery,
    format: OutputFormat,
) -> Result<Vec<OsString>> {
    if query.term.is_empty() {
        return Err(FastFindError::Configuration(
            "search term is empty".to_string(),
        ));
    }
    if query.path.is_empty() {
        return Err(FastFindError::Configuration(
            "search path is empty".to_string(),
        ));
    }

    let mut argv: Vec<OsString> = Vec::new();
    argv.push(config.executable.clone().into());

    match format {
        OutputFormat::JsonLines => argv.push("--json".into()),
        OutputFormat::LegacyText => {
            argv.push("--no-heading".into());
            argv.push("--color=never".into());
        }
    }

    if !config.case_sensitive {
        argv.push("-i".into());
    }

    argv.push(format!("-B{}", config.before_context).into());
    argv.push(format!("-A{}", config.after_context).into());

    for tag in &config.non_std_file_type_pattern {
        argv.push("--type-add".into());
        argv.push(format!("{}:*.{}", tag, tag).into());
        argv.push(format!("-t{}", tag).into());
    }
    for tag in &config.file_type_pattern {
        argv.push(format!("-t{}", tag).into());
    }
    for folder in &config.ignore_folders {
        argv.push("-g".into());
        argv.push(format!("!{}/**", folder).into());
    }

    argv.push("--column".into());
    // Terms may start with a dash; `--` keeps them out of flag parsing.
    argv.push("--".into());
    argv.push(query.term.clone().into());
    argv.push(expand_env_vars(&query.path).into());

    Ok(argv)
}

/// Turn a built argument vector into a spawnable command with piped
/// stdio and the configured working directory.
pub fn to_command(argv: &[OsString], cwd: Option<&Path>) -> Result<Command> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        FastFindError::Configuration("empty argument vector".to_string())
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    // Child console windows flash on Windows without this flag.
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);

    Ok(cmd)
}

/// Expand `$VAR` and `${VAR}` references in a path expression.
///
/// Undefined variables are left verbatim so a typo stays visible in the
/// reported search path instead of vanishing silently.
pub fn expand_env_vars(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let braced = matches!(chars.peek(), Some((_, '{')));
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c == '_' || c.is_ascii_alphanumeric() {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if braced {
            if matches!(chars.peek(), Some((_, '}'))) {
                chars.next();
            } else {
                // Unterminated brace, keep the original text.
                out.push_str("${");
                out.push_str(&name);
                continue;
            }
        }
        if name.is_empty() {
            out.push('$');
            continue;
        }
        match std::env::var(&name) {
            Ok(value) => out.push_str(&value),
            Err(_) => {
                if braced {
                    out.push_str("${");
                    out.push_str(&name);
                    out.push('}');
                } else {
                    out.push('$');
                    out.push_str(&name);
                }
            }
        }
    }
    out
}
