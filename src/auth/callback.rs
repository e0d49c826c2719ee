use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use error_stack::{IntoReport, Report, ResultExt};
use log::debug;
use tiny_http::{Header, Request, Response, Server};
use tokio::sync::oneshot;
use url::Url;

use super::{AuthError, AuthResult};

/// Why the redirect did not yield an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackFailure {
    /// Spotify redirected with `error=...`, e.g. the user denied access.
    Denied(String),
    MissingCode,
    StateMismatch,
    TimedOut,
    /// The local listener stopped accepting connections.
    Listener(String),
}

impl fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackFailure::Denied(reason) => write!(f, "authorization denied: {}", reason),
            CallbackFailure::MissingCode => f.write_str("callback carried no authorization code"),
            CallbackFailure::StateMismatch => {
                f.write_str("callback state does not match the login request")
            }
            CallbackFailure::TimedOut => f.write_str("timed out waiting for the login callback"),
            CallbackFailure::Listener(reason) => {
                write!(f, "login callback listener failed: {}", reason)
            }
        }
    }
}

/// Reads the redirect target the browser requested. Requests for any other
/// path return `None` so the listener can keep waiting.
pub fn parse_callback(
    request_url: &str,
    callback_path: &str,
    expected_state: &str,
) -> Option<Result<String, CallbackFailure>> {
    let url = Url::parse(&format!("http://localhost{}", request_url)).ok()?;
    if url.path() != callback_path {
        return None;
    }
    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }
    if let Some(reason) = error {
        return Some(Err(CallbackFailure::Denied(reason)));
    }
    if state.as_deref() != Some(expected_state) {
        return Some(Err(CallbackFailure::StateMismatch));
    }
    Some(code.filter(|code| !code.is_empty()).ok_or(CallbackFailure::MissingCode))
}

/// Listens on the redirect URI until exactly one callback arrives, then tears
/// the listener down and hands back the authorization code.
pub async fn wait_for_code(
    redirect_uri: &Url,
    expected_state: String,
    timeout: Duration,
) -> AuthResult<String> {
    let host = redirect_uri.host_str().unwrap_or("127.0.0.1").to_string();
    let port = redirect_uri.port_or_known_default().unwrap_or(80);
    let server = Server::http(format!("{}:{}", host, port)).map_err(|err| {
        Report::new(AuthError).attach_printable(format!(
            "Could not listen on {}:{} for the login callback: {}",
            host, port, err
        ))
    })?;
    let callback_path = redirect_uri.path().to_string();

    let (sender, receiver) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        let outcome = serve_until_callback(&server, &callback_path, &expected_state, timeout);
        let _ = sender.send(outcome);
    });

    receiver
        .await
        .into_report()
        .change_context(AuthError)
        .attach_printable("Login callback listener stopped unexpectedly")?
        .map_err(|failure| Report::new(AuthError).attach_printable(failure.to_string()))
}

fn serve_until_callback(
    server: &Server,
    callback_path: &str,
    expected_state: &str,
    timeout: Duration,
) -> Result<String, CallbackFailure> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let request = match next_request(server.recv_timeout(Duration::from_millis(200)))? {
            Some(request) => request,
            None => continue,
        };
        debug!("callback listener received {}", request.url());
        match parse_callback(request.url(), callback_path, expected_state) {
            Some(Ok(code)) => {
                respond(request, 200, "Login successful. You can close this tab.");
                return Ok(code);
            }
            Some(Err(failure)) => {
                respond(request, 400, &format!("Login failed: {}", failure));
                return Err(failure);
            }
            None => respond(request, 404, "Not Found"),
        }
    }
    Err(CallbackFailure::TimedOut)
}

/// A listener error ends the wait instead of being retried in a tight loop.
fn next_request<T>(received: io::Result<Option<T>>) -> Result<Option<T>, CallbackFailure> {
    received.map_err(|err| {
        debug!("callback listener error: {}", err);
        CallbackFailure::Listener(err.to_string())
    })
}

fn respond(request: Request, status: u16, message: &str) {
    let html = format!(
        "<html><body style=\"font-family: sans-serif\"><h1>{}</h1></body></html>",
        message
    );
    let mut response = Response::from_string(html).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}
