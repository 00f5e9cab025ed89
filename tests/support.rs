use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        drop(self.shutdown.send(()));
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server answering `200 OK` to every request.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
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
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// An address nothing listens on.
///
/// # Errors
///
/// Returns an error if a probe listener cannot be bound.
pub fn closed_port_url() -> Result<String, String> {
    let listener =
        TcpListener::bind("127.0.0.1:0").map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 1024];
    if stream.read(&mut buffer).is_err() {
        return;
    }
    if stream
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK")
        .is_err()
    {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `hpstress` binary inside `dir` and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_hpstress<I, S>(dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = hpstress_bin()?;
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("HPSTRESS_LOG", "warn")
        .output()
        .map_err(|err| format!("run hpstress failed: {}", err))
}

fn hpstress_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_hpstress").map_or_else(
        || Err("CARGO_BIN_EXE_hpstress missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

/// Formats captured output for an error message.
#[must_use]
pub fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
