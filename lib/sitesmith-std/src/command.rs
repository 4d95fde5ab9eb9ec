use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, error};

use crate::error::{SitesmithStdError, SitesmithStdResult};

/// Runs the given program with `args` and returns its standard output.
///
/// Output that is not valid UTF-8 is decoded lossily. A non-zero exit status is an error and
/// whatever the program wrote is logged.
pub fn run_program_with_args<I, S>(
    program: &str,
    args: I,
    root: Option<&Path>,
    envs: Vec<(&str, &str)>,
) -> SitesmithStdResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).envs(envs);
    if let Some(cwd) = root {
        command.current_dir(cwd);
    }

    debug!(program, "running program");
    let output = command.output()?;
    handle_output(program, output)
}

fn handle_output(program: &str, output: Output) -> SitesmithStdResult<String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        for output in [output.stdout, output.stderr] {
            let output = String::from_utf8_lossy(&output);
            if !output.is_empty() {
                error!("{}", output);
            }
        }

        Err(SitesmithStdError::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
        })
    }
}
