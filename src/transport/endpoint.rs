use anyhow::{anyhow, Context, Result};
use url::Url;

use super::{MotionController, RecordingController, TcpController};

/// Where motion commands are sent, parsed from a controller URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEndpoint {
    /// `http://` or `https://` JSON endpoint (full URL).
    Http(String),
    /// `tcp://host:port` line-delimited JSON endpoint (`host:port`).
    Tcp(String),
    /// `stub://...` in-process recording controller.
    Stub(String),
}

impl ControllerEndpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let url = Url::parse(raw).with_context(|| format!("invalid controller url '{}'", raw))?;
        match url.scheme() {
            "http" | "https" => {
                if url.host_str().is_none() {
                    return Err(anyhow!("controller url '{}' has no host", raw));
                }
                Ok(Self::Http(raw.to_string()))
            }
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| anyhow!("controller url '{}' has no host", raw))?;
                let port = url
                    .port()
                    .ok_or_else(|| anyhow!("missing controller port in '{}'", raw))?;
                Ok(Self::Tcp(format!("{}:{}", host, port)))
            }
            "stub" => Ok(Self::Stub(raw.to_string())),
            other => Err(anyhow!(
                "unsupported controller scheme '{}': expected http(s), tcp or stub",
                other
            )),
        }
    }
}

impl std::fmt::Display for ControllerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{}", url),
            Self::Tcp(addr) => write!(f, "tcp://{}", addr),
            Self::Stub(url) => write!(f, "{}", url),
        }
    }
}

/// Requests a `stub://` controller keeps for inspection.
const STUB_HISTORY: usize = 64;

/// Build the controller client for an endpoint. `tcp://` hosts are resolved
/// here, once.
pub fn connect_controller(endpoint: &ControllerEndpoint) -> Result<Box<dyn MotionController>> {
    match endpoint {
        ControllerEndpoint::Http(url) => {
            #[cfg(feature = "controller-http")]
            {
                Ok(Box::new(super::HttpController::new(url.clone())))
            }
            #[cfg(not(feature = "controller-http"))]
            {
                Err(anyhow!(
                    "controller url '{}' requires the controller-http feature",
                    url
                ))
            }
        }
        ControllerEndpoint::Tcp(addr) => Ok(Box::new(TcpController::resolve(addr)?)),
        ControllerEndpoint::Stub(url) => {
            log::warn!("motion controller {} is a stub; commands are only recorded", url);
            Ok(Box::new(RecordingController::with_capacity(STUB_HISTORY)))
        }
    }
}
