use std::ffi::OsStr;
use std::process::{Child, Command, Output, Stdio};

/// Run the `podchurn` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_podchurn<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    podchurn_command()?
        .args(args)
        .output()
        .map_err(|err| format!("run podchurn failed: {}", err))
}

/// Run the `podchurn` binary with no log filter override and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_podchurn_default_logging<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    podchurn_command()?
        .env_remove("PODCHURN_LOG")
        .args(args)
        .output()
        .map_err(|err| format!("run podchurn failed: {}", err))
}

/// Start the `podchurn` binary with piped output.
///
/// # Errors
///
/// Returns an error if the binary cannot be started.
pub fn spawn_podchurn<I, S>(args: I) -> Result<Child, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    podchurn_command()?
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn podchurn failed: {}", err))
}

/// Fails with both output streams when the run did not succeed.
///
/// # Errors
///
/// Returns the captured stdout and stderr when the exit status is a failure.
pub fn expect_success(output: &Output) -> Result<String, String> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(stdout)
}

/// Checks that every expected line is present in `stdout`.
///
/// # Errors
///
/// Returns the first missing line together with the full output.
pub fn expect_lines(stdout: &str, expected: &[&str]) -> Result<(), String> {
    for line in expected {
        if !stdout.lines().any(|candidate| candidate == *line) {
            return Err(format!("Missing '{}' in stdout:\n{}", line, stdout));
        }
    }
    Ok(())
}

fn podchurn_command() -> Result<Command, String> {
    let bin = podchurn_bin()?;
    let mut command = Command::new(bin);
    command
        .env("PODCHURN_LOG", "error")
        .env_remove("RUST_LOG")
        .env_remove("KUBERNETES_SERVICE_HOST")
        .env_remove("KUBERNETES_SERVICE_PORT")
        .env_remove("PODCHURN_API_SERVER")
        .env_remove("PODCHURN_TOKEN_FILE")
        .env_remove("KUBECONFIG")
        .env_remove("HOME")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy");
    Ok(command)
}

fn podchurn_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_podchurn").map_or_else(
        || Err("CARGO_BIN_EXE_podchurn missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
