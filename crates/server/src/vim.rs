use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use engine::SyncError;
use eyre::WrapErr;

use crate::process::{is_binary, run_with_timeout};

/// Default timeout for remote calls into Vim
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(2);

/// A Vim instance running in server mode, addressed by name
#[derive(Debug, Clone)]
pub struct VimServer {
    executable: PathBuf,
    servername: String,
    timeout: Duration,
}

impl VimServer {
    pub fn new(executable: impl Into<PathBuf>, servername: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            servername: servername.into(),
            timeout: REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn servername(&self) -> &str {
        &self.servername
    }

    fn command(&self) -> eyre::Result<Command> {
        let executable = which::which(&self.executable).map_err(|_| {
            eyre::eyre!(
                "{} not found in PATH. Install a Vim built with +clientserver",
                self.executable.display()
            )
        })?;
        Ok(Command::new(executable))
    }

    /// Names of the running Vim servers
    pub fn server_list(&self) -> eyre::Result<Vec<String>> {
        let mut command = self.command()?;
        command.arg("--serverlist");
        let output = run_with_timeout(command, self.timeout).wrap_err("listing vim servers")?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Whether a server with our name is running
    ///
    /// Vim upper-cases server names, so the comparison ignores case.
    pub fn is_running(&self) -> bool {
        match self.server_list() {
            Ok(servers) => servers
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&self.servername)),
            Err(e) => {
                tracing::debug!(error = %e, "could not list vim servers");
                false
            }
        }
    }

    /// Run Vim in the foreground as our server, editing `files`
    ///
    /// Returns once the user quits Vim.
    #[tracing::instrument(skip(self))]
    pub fn start(&self, vimrc: &Path, files: &[PathBuf]) -> eyre::Result<()> {
        if !vimrc.is_file() {
            return Err(SyncError::ConfigMissing(vimrc.to_path_buf()).into());
        }
        for file in files {
            if file.exists() && is_binary(file)? {
                eyre::bail!("{} is not a text file", file.display());
            }
        }

        let mut command = self.command()?;
        command
            .arg("--servername")
            .arg(&self.servername)
            .arg("-n")
            .arg("-c")
            .arg(format!("source {}", vimrc.display()))
            .args(files);

        tracing::debug!(?command, "starting vim");
        let status = command
            .status()
            .wrap_err_with(|| format!("running {}", self.executable.display()))?;
        if !status.success() {
            eyre::bail!("vim exited with {status}");
        }
        Ok(())
    }

    /// Evaluate `expr` in the server and return the result
    pub fn remote_expr(&self, expr: &str) -> eyre::Result<String> {
        let mut command = self.command()?;
        command
            .arg("--servername")
            .arg(&self.servername)
            .arg("--remote-expr")
            .arg(expr);
        run_with_timeout(command, self.timeout)
            .wrap_err_with(|| format!("evaluating expression in {}", self.servername))
    }
}
