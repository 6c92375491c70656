mod support;

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use support::{expect_lines, expect_success, run_podchurn};

struct ApiServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    requests: Arc<AtomicUsize>,
}

impl ApiServerHandle {
    fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for ApiServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a fake API server answering every request with `status`.
fn spawn_api_server(status: u16) -> Result<(String, ApiServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let counter = Arc::clone(&counter);
                    thread::spawn(move || handle_client(stream, status, &counter));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ApiServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            requests,
        },
    ))
}

fn handle_client(mut stream: TcpStream, status: u16, counter: &AtomicUsize) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    if read_request(&mut stream).is_none() {
        return;
    }
    counter.fetch_add(1, Ordering::SeqCst);

    let response = format!(
        "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}",
        status
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Reads headers and a `Content-Length` body so the socket is drained before
/// the response.
fn read_request(stream: &mut TcpStream) -> Option<()> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return None;
        }
        raw.extend_from_slice(chunk.get(..read)?);
        if let Some(pos) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos;
        }
    };
    let head = String::from_utf8_lossy(raw.get(..header_end)?).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let total = header_end.checked_add(4)?.checked_add(content_length)?;
    while raw.len() < total {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(chunk.get(..read)?);
    }
    Some(())
}

#[test]
fn e2e_kube_round_against_fake_api_server() -> Result<(), String> {
    let (url, server) = spawn_api_server(200)?;

    let output = run_podchurn([
        "--api-server",
        url.as_str(),
        "-n",
        "churn",
        "--rounds",
        "1",
        "-t",
        "1",
        "-c",
        "2",
        "--cycle-delay",
        "20ms",
    ])?;
    let stdout = expect_success(&output)?;
    expect_lines(
        &stdout,
        &[
            "provisioner: kube",
            "rounds: 1 (round limit reached)",
            "create_failures: 0",
            "delete_failures: 0",
        ],
    )?;
    if server.request_count() < 3 {
        return Err(format!(
            "Expected preflight plus churn requests, got {}",
            server.request_count()
        ));
    }
    Ok(())
}

#[test]
fn e2e_kube_preflight_failure_is_fatal() -> Result<(), String> {
    let (url, server) = spawn_api_server(403)?;

    let output = run_podchurn(["--api-server", url.as_str(), "--rounds", "1", "-t", "1"])?;
    if output.status.success() {
        return Err(format!(
            "Expected failure, stdout: {}",
            String::from_utf8_lossy(&output.stdout)
        ));
    }
    if server.request_count() != 1 {
        return Err(format!(
            "Expected only the preflight request, got {}",
            server.request_count()
        ));
    }
    if String::from_utf8_lossy(&output.stdout).contains("Summary:") {
        return Err("No round should run after a failed preflight".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_kube_round_uses_kubeconfig_context() -> Result<(), String> {
    let (url, server) = spawn_api_server(200)?;
    let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let kubeconfig = dir.path().join("config");
    let contents = format!(
        "current-context: local\nclusters:\n- name: fake\n  cluster:\n    server: {}\ncontexts:\n- name: local\n  context:\n    cluster: fake\n    user: churner\nusers:\n- name: churner\n  user:\n    token: kube-token\n",
        url
    );
    std::fs::write(&kubeconfig, contents).map_err(|err| format!("write failed: {}", err))?;
    let kubeconfig_arg = kubeconfig.to_string_lossy().into_owned();

    let output = run_podchurn([
        "--kubeconfig",
        kubeconfig_arg.as_str(),
        "--rounds",
        "1",
        "-t",
        "1",
        "-c",
        "1",
        "--cycle-delay",
        "50ms",
    ])?;
    let stdout = expect_success(&output)?;
    expect_lines(
        &stdout,
        &["provisioner: kube", "rounds: 1 (round limit reached)"],
    )?;
    if server.request_count() < 3 {
        return Err(format!(
            "Expected preflight plus churn requests, got {}",
            server.request_count()
        ));
    }
    Ok(())
}

#[test]
fn e2e_kube_without_api_server_or_kubeconfig_is_rejected() -> Result<(), String> {
    let output = run_podchurn(["--provisioner", "kube", "--rounds", "1"])?;
    if output.status.success() {
        return Err("Expected missing API server to fail".to_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("MissingApiServer") {
        return Err(format!("Unexpected stderr: {}", stderr));
    }
    Ok(())
}
