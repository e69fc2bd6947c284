use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::SpotlinkError;

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><body><h1>Authorization received</h1>\
     <p>You can close this window and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str = "<!DOCTYPE html><html><body><h1>Authorization failed</h1>\
     <p>Return to the terminal for details.</p></body></html>";

/// How long a single connection may take to send its request line.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait on `listener` for the browser to hit `expected_path` and return the
/// request target (path plus query), e.g. `/callback?code=...&state=...`.
///
/// Each connection is served on its own task, so an idle or broken
/// connection cannot hold up the redirect. Requests for any other path get a
/// 404 and are ignored. There is no overall timeout here; callers bound the
/// wait.
pub async fn listen_for_redirect(
    listener: TcpListener,
    expected_path: &str,
) -> Result<String, SpotlinkError> {
    let (tx, mut rx) = mpsc::channel::<String>(1);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let tx = tx.clone();
                let expected_path = expected_path.to_string();
                tokio::spawn(async move {
                    match serve_connection(stream, &expected_path).await {
                        Ok(Some(target)) => {
                            let _ = tx.send(target).await;
                        }
                        Ok(None) => {}
                        Err(e) => debug!(%peer, error = %e, "redirect listener connection failed"),
                    }
                });
            }
            Some(target) = rx.recv() => return Ok(target),
        }
    }
}

/// Answer one connection. Returns the request target if it was the redirect.
async fn serve_connection(
    mut stream: TcpStream,
    expected_path: &str,
) -> Result<Option<String>, SpotlinkError> {
    let mut buf = vec![0u8; 8192];
    let n = match tokio::time::timeout(READ_TIMEOUT, stream.read(&mut buf)).await {
        Ok(read) => read?,
        Err(_) => {
            debug!("closing idle connection on redirect listener");
            return Ok(None);
        }
    };
    if n == 0 {
        return Ok(None);
    }
    let request = String::from_utf8_lossy(&buf[..n]);

    let Some(target) = parse_request_target(&request) else {
        debug!("ignoring unparseable request on redirect listener");
        write_response(&mut stream, "400 Bad Request", "").await?;
        return Ok(None);
    };

    let path = target.split('?').next().unwrap_or_default();
    if path != expected_path {
        debug!(path, "ignoring request for unexpected path");
        write_response(&mut stream, "404 Not Found", "").await?;
        return Ok(None);
    }

    let page = if target.contains("error=") {
        FAILURE_PAGE
    } else {
        SUCCESS_PAGE
    };
    // The redirect counts even if the browser hangs up before the page is written
    if let Err(e) = write_response(&mut stream, "200 OK", page).await {
        debug!(error = %e, "could not write redirect page");
    }
    Ok(Some(target.to_string()))
}

async fn write_response(
    stream: &mut TcpStream,
    status: &str,
    body: &str,
) -> Result<(), SpotlinkError> {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len(),
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Extract the request target from "GET /callback?code=... HTTP/1.1".
fn parse_request_target(request: &str) -> Option<&str> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    if method != "GET" || !target.starts_with('/') {
        return None;
    }
    Some(target)
}
