use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    process::{Child, Command, Stdio},
    sync::{Arc, Mutex, mpsc},
    thread,
    time::Duration,
};

use eyre::WrapErr;
use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};

/// How much of a file is inspected when deciding whether it is binary
const BINARY_SNIFF_LEN: u64 = 8 * 1024;

/// Run `command` to completion and return its standard output
///
/// Output is read on a background thread. If the process does not finish
/// within `timeout` it is terminated and an error returned, as is a non-zero
/// exit status.
pub(crate) fn run_with_timeout(mut command: Command, timeout: Duration) -> eyre::Result<String> {
    let description = format!("{command:?}");
    tracing::debug!(command = %description, "running command");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .wrap_err_with(|| format!("spawning {description}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| eyre::eyre!("no stdout for {description}"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| eyre::eyre!("no stderr for {description}"))?;

    let collected_errors = Arc::new(Mutex::new(Vec::<String>::new()));
    let collected_errors_writer = Arc::clone(&collected_errors);
    let stderr_reader = thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else {
                break;
            };
            if let Ok(mut output) = collected_errors_writer.lock() {
                output.push(line);
            }
        }
    });

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut output = String::new();
        let result = BufReader::new(stdout)
            .read_to_string(&mut output)
            .map(|_| output);
        let _ = tx.send(result);
    });

    let errors = || {
        collected_errors
            .lock()
            .map(|o| o.join("\n"))
            .unwrap_or_default()
    };

    let output = match rx.recv_timeout(timeout) {
        Ok(output) => output.wrap_err_with(|| format!("reading output of {description}"))?,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            terminate(&mut child);
            eyre::bail!(
                "timed out after {timeout:?} waiting for {description}\nCollected errors:\n{}",
                errors()
            )
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            terminate(&mut child);
            eyre::bail!("output reader for {description} ended unexpectedly")
        }
    };

    let status = child
        .wait()
        .wrap_err_with(|| format!("waiting for {description}"))?;
    if !status.success() {
        let _ = stderr_reader.join();
        eyre::bail!(
            "{description} failed with {status}\nCollected errors:\n{}",
            errors()
        );
    }
    Ok(output)
}

/// Ask the process to stop, then make sure it has
fn terminate(child: &mut Child) {
    if let Ok(pid) = i32::try_from(child.id()) {
        if let Err(e) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
            tracing::debug!(error = %e, "could not signal process");
        }
    }
    thread::sleep(Duration::from_millis(50));
    match child.try_wait() {
        Ok(Some(_)) => {}
        _ => {
            if let Err(e) = child.kill() {
                tracing::warn!(error = %e, "could not terminate process");
            }
            let _ = child.wait();
        }
    }
}

/// Whether the start of the file contains a NUL byte
pub fn is_binary(path: impl AsRef<Path>) -> eyre::Result<bool> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    let mut head = Vec::new();
    file.take(BINARY_SNIFF_LEN)
        .read_to_end(&mut head)
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    Ok(head.contains(&0))
}
