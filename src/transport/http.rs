//! HTTP JSON controller.
//!
//! POSTs the drive request as JSON. A 2xx answer carries an optional
//! `DriveResponse` body; any other status is a rejection.

use std::time::Duration;

use super::{DriveRequest, DriveResponse, MotionController};
use crate::motion::DispatchError;

/// HTTP motion controller client.
pub struct HttpController {
    url: String,
    agent: ureq::Agent,
}

impl HttpController {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl MotionController for HttpController {
    fn name(&self) -> &'static str {
        "http"
    }

    fn call(
        &mut self,
        request: &DriveRequest,
        timeout: Duration,
    ) -> Result<DriveResponse, DispatchError> {
        let body = serde_json::to_string(request)
            .map_err(|e| DispatchError::Transport(format!("encode request: {e}")))?;
        let result = self
            .agent
            .post(&self.url)
            .timeout(timeout)
            .set("Content-Type", "application/json")
            .send_string(&body);

        match result {
            Ok(response) => {
                let text = response
                    .into_string()
                    .map_err(|e| DispatchError::Transport(format!("read response: {e}")))?;
                DriveResponse::parse(&text)
            }
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                Err(DispatchError::Rejected(format!(
                    "http {}: {}",
                    code,
                    detail.trim()
                )))
            }
            Err(ureq::Error::Transport(e)) => Err(DispatchError::Transport(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Minimal one-shot HTTP server returning a canned response.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}/ball_chaser/command_robot", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let request_body = read_request_body(&stream);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            (&stream).write_all(reply.as_bytes()).unwrap();
            request_body
        });
        (url, handle)
    }

    fn read_request_body(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();
        String::from_utf8(body).unwrap()
    }

    #[test]
    fn posts_json_and_parses_feedback() {
        let (url, server) = serve_once("200 OK", r#"{"msg_feedback":"driving"}"#);
        let mut controller = HttpController::new(url);

        let response = controller
            .call(&DriveRequest::new(0.5, 1.0), Duration::from_secs(2))
            .expect("response");
        assert_eq!(response, DriveResponse::accepted("driving"));

        let sent: DriveRequest = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent, DriveRequest::new(0.5, 1.0));
    }

    #[test]
    fn error_status_is_a_rejection() {
        let (url, server) = serve_once("503 Service Unavailable", "motors offline");
        let mut controller = HttpController::new(url);

        let err = controller
            .call(&DriveRequest::new(0.0, 0.0), Duration::from_secs(2))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Rejected("http 503: motors offline".into())
        );
        server.join().unwrap();
    }
}
