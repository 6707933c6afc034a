//! External program invocation.
//!
//! All subprocess work goes through [`ToolRunner`] so pipelines can be driven
//! by a scripted runner in tests. Calls block until the program exits.

use crate::domain::models::ToolsConfig;
use crate::error::XfmError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCall {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().to_string())
    }

    pub fn describe(&self) -> String {
        let mut out = self.program.clone();
        for a in &self.args {
            out.push(' ');
            out.push_str(a);
        }
        out
    }
}

/// A labelled call in a command sequence.
#[derive(Debug, Clone)]
pub struct Step {
    pub label: String,
    pub call: ToolCall,
}

impl Step {
    pub fn new(label: impl Into<String>, call: ToolCall) -> Self {
        Self {
            label: label.into(),
            call,
        }
    }
}

pub trait ToolRunner {
    /// Runs to completion; non-zero exit is an error. The program's stdout is
    /// sent to our stderr so stdout stays reserved for results.
    fn run(&self, call: &ToolCall) -> Result<(), XfmError>;

    /// Runs to completion and returns stdout.
    fn capture(&self, call: &ToolCall) -> Result<String, XfmError>;
}

pub struct SystemRunner {
    bin_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            bin_dir: config.fsl_bin.as_ref().map(PathBuf::from),
        }
    }

    fn resolve(&self, program: &str) -> PathBuf {
        resolve_program(self.bin_dir.as_deref(), program)
            .unwrap_or_else(|| PathBuf::from(program))
    }

    fn command(&self, call: &ToolCall) -> Command {
        tracing::debug!("running command: {}", call.describe());
        let mut cmd = Command::new(self.resolve(&call.program));
        cmd.args(&call.args);
        cmd
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, call: &ToolCall) -> Result<(), XfmError> {
        let status = self
            .command(call)
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .status()
            .map_err(|source| XfmError::ToolNotFound {
                tool: call.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(XfmError::ToolFailed {
                tool: call.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    fn capture(&self, call: &ToolCall) -> Result<String, XfmError> {
        let out = self
            .command(call)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| XfmError::ToolNotFound {
                tool: call.program.clone(),
                source,
            })?;
        if !out.status.success() {
            return Err(XfmError::ToolFailed {
                tool: call.program.clone(),
                status: out.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

/// Finds a program in `bin_dir`, falling back to `PATH`. Names containing a
/// path separator are taken as given when they exist.
pub fn resolve_program(bin_dir: Option<&Path>, program: &str) -> Option<PathBuf> {
    let given = Path::new(program);
    if given.components().count() > 1 {
        return given.is_file().then(|| given.to_path_buf());
    }
    if let Some(dir) = bin_dir {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

pub fn run_steps(runner: &dyn ToolRunner, steps: &[Step]) -> Result<(), XfmError> {
    for step in steps {
        tracing::info!("{}", step.label);
        runner.run(&step.call)?;
    }
    Ok(())
}

pub fn img2imgcoord(
    config: &ToolsConfig,
    probe: &Path,
    src: &Path,
    dest: &Path,
    xfm: &Path,
) -> ToolCall {
    ToolCall::new(&config.img2imgcoord)
        .path(probe)
        .arg("-mm")
        .arg("-src")
        .path(src)
        .arg("-dest")
        .path(dest)
        .arg("-xfm")
        .path(xfm)
}

pub fn flirt(
    config: &ToolsConfig,
    input: &Path,
    reference: &Path,
    cost: &str,
    dof: u32,
    out_matrix: &Path,
) -> ToolCall {
    ToolCall::new(&config.flirt)
        .arg("-cost")
        .arg(cost)
        .arg("-in")
        .path(input)
        .arg("-usesqform")
        .arg("-dof")
        .arg(dof.to_string())
        .arg("-ref")
        .path(reference)
        .arg("-omat")
        .path(out_matrix)
        .arg("-searchrx")
        .arg("-180")
        .arg("180")
        .arg("-searchry")
        .arg("-180")
        .arg("180")
        .arg("-searchrz")
        .arg("-179")
        .arg("180")
}

/// Splits a 4D volume along time into `<basename>0000`, `<basename>0001`, ...
pub fn fslsplit(config: &ToolsConfig, input: &Path, basename: &Path) -> ToolCall {
    ToolCall::new(&config.fslsplit)
        .path(input)
        .path(basename)
        .arg("-t")
}
