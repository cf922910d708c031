use std::{
    ffi::OsStr,
    process::{Command, Output, Stdio},
    string::FromUtf8Error,
};

use anyhow::anyhow;
use console::style;

use crate::{
    config::global_config,
    logger::{self},
};

/// A wrapper around [`xshell::Cmd`] that allows for improved error handling,
/// and verbose logging.
#[derive(Debug)]
pub struct Cmd<'a> {
    inner: xshell::Cmd<'a>,
    force_run: bool,
}

#[derive(thiserror::Error, Debug)]
#[error("Cmd error: {source} {stderr:?}")]
pub struct CmdError {
    pub stderr: Option<String>,
    pub source: anyhow::Error,
}

impl From<xshell::Error> for CmdError {
    fn from(value: xshell::Error) -> Self {
        Self {
            stderr: None,
            source: value.into(),
        }
    }
}

impl From<std::io::Error> for CmdError {
    fn from(value: std::io::Error) -> Self {
        Self {
            stderr: None,
            source: value.into(),
        }
    }
}

impl From<FromUtf8Error> for CmdError {
    fn from(value: FromUtf8Error) -> Self {
        Self {
            stderr: None,
            source: value.into(),
        }
    }
}

pub type CmdResult<T> = Result<T, CmdError>;

impl<'a> Cmd<'a> {
    /// Create a new `Cmd` instance.
    pub fn new(cmd: xshell::Cmd<'a>) -> Self {
        Self {
            inner: cmd,
            force_run: false,
        }
    }

    /// Run the command attached to the terminal: its output is streamed and
    /// it can read from stdin (keystore passwords, interactive imports).
    pub fn with_force_run(mut self) -> Self {
        self.force_run = true;
        self
    }

    /// Set env variables for the command.
    pub fn env<K: AsRef<OsStr>, V: AsRef<OsStr>>(mut self, key: K, value: V) -> Self {
        self.inner = self.inner.env(key, value);
        self
    }

    /// Run the command, capturing its output unless it is force-run.
    pub fn run(mut self) -> CmdResult<()> {
        let command_txt = self.inner.to_string();
        let output = if global_config().verbose || self.force_run {
            logger::debug(format!("Running: {}", command_txt));
            logger::new_empty_line();
            let output = run_attached(self.inner)?;
            logger::new_empty_line();
            logger::new_line();
            output
        } else {
            // Command will be logged manually.
            self.inner.set_quiet(true);
            // Error will be handled manually.
            self.inner.set_ignore_status(true);
            self.inner.output()?
        };

        check_output_status(&command_txt, &output)?;

        if global_config().verbose {
            logger::debug(format!("Command completed: {}", command_txt));
        }

        Ok(())
    }

    /// Run the command and return its output.
    pub fn run_with_output(&mut self) -> CmdResult<Output> {
        if global_config().verbose || self.force_run {
            logger::debug(format!("Running: {}", self.inner));
            logger::new_empty_line();
        }

        self.inner.set_quiet(true);
        self.inner.set_ignore_status(true);
        let output = self.inner.output()?;

        if global_config().verbose || self.force_run {
            logger::raw(log_output(&output));
            logger::new_empty_line();
            logger::new_line();
        }

        Ok(output)
    }

    /// Run the command and return its trimmed stdout, failing on a non-zero exit.
    pub fn read_stdout(mut self) -> CmdResult<String> {
        let command_txt = self.inner.to_string();
        let output = self.run_with_output()?;
        if !output.status.success() {
            return Err(CmdError {
                stderr: Some(String::from_utf8(output.stderr)?),
                source: anyhow!("Command failed to run: {}", command_txt),
            });
        }
        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }
}

fn run_attached(cmd: xshell::Cmd<'_>) -> std::io::Result<Output> {
    let mut command: Command = cmd.into();
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command.spawn()?.wait_with_output()
}

fn check_output_status(command_text: &str, output: &Output) -> CmdResult<()> {
    if !output.status.success() {
        logger::new_line();
        logger::error_note(
            &format!("Command failed to run: {}", command_text),
            &log_output(output),
        );
        return Err(CmdError {
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            source: anyhow!("Command failed to run: {}", command_text),
        });
    }

    Ok(())
}

fn log_output(output: &Output) -> String {
    let (status, stdout, stderr) = get_indented_output(output, 4, 120);
    let status_header = style("  Status:").bold();
    let stdout_header = style("  Stdout:").bold();
    let stderr_header = style("  Stderr:").bold();

    format!("{status_header}\n{status}\n{stdout_header}\n{stdout}\n{stderr_header}\n{stderr}")
}

// Indent output and wrap text.
fn get_indented_output(output: &Output, indentation: usize, wrap: usize) -> (String, String, String) {
    let status = output.status.to_string();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let indent = |s: &str| {
        s.lines()
            .map(|l| format!("{:indent$}{}", "", l, indent = indentation))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let wrap_text_to_len = |s: &str| {
        let mut result = String::new();

        for original_line in s.split('\n') {
            if original_line.trim().is_empty() {
                result.push('\n');
                continue;
            }

            let mut line = String::new();
            for word in original_line.split_whitespace() {
                if line.len() + word.len() + 1 > wrap {
                    result.push_str(&line);
                    result.push('\n');
                    line.clear();
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
            result.push_str(&line);
            result.push('\n');
        }

        result
    };

    (
        indent(&wrap_text_to_len(&status)),
        indent(&wrap_text_to_len(&stdout)),
        indent(&wrap_text_to_len(&stderr)),
    )
}

#[cfg(test)]
mod tests {
    use xshell::{cmd, Shell};

    use super::*;

    #[test]
    fn failed_command_keeps_stderr() {
        let shell = Shell::new().unwrap();
        let err = Cmd::new(cmd!(shell, "sh -c 'echo boom >&2; exit 3'"))
            .run()
            .unwrap_err();
        assert_eq!(err.stderr.as_deref().map(str::trim), Some("boom"));
    }

    #[test]
    fn read_stdout_trims_output() {
        let shell = Shell::new().unwrap();
        let out = Cmd::new(cmd!(shell, "echo '  hello  '")).read_stdout().unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn wrap_splits_long_lines() {
        let output = Output {
            status: std::os::unix::process::ExitStatusExt::from_raw(0),
            stdout: b"aaaa bbbb cccc".to_vec(),
            stderr: Vec::new(),
        };
        let (_, stdout, _) = get_indented_output(&output, 2, 9);
        assert_eq!(stdout, "  aaaa bbbb\n  cccc");
    }
}
