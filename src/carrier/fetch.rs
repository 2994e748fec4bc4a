// src/carrier/fetch.rs
//! The boundary to whatever moves bytes over the network.
//!
//! The crate itself never opens a socket. Callers hand a [`Fetch`]
//! implementation to a [`Shipment`](super::Shipment); the CLI and the tests use
//! [`FileFetch`], which serves captured payloads from disk.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::Carrier;
use crate::error::TrackError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Primary tracking payload for this number.
    Tracking(String),
    /// Secondary lookup of one store / branch.
    StoreDetail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub carrier: Carrier,
    pub kind: RequestKind,
    pub url: String,
    /// Passed through untouched; enforcing it is the fetcher's job.
    pub timeout: Duration,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn not_found() -> Self {
        Self { status: 404, body: s!() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Fetch {
    fn fetch(&self, request: &Request) -> Result<Response, TrackError>;
}

impl<F> Fetch for F
where
    F: Fn(&Request) -> Result<Response, TrackError>,
{
    fn fetch(&self, request: &Request) -> Result<Response, TrackError> {
        self(request)
    }
}

/// Serves `<dir>/<carrier id>/<number>.<ext>` for tracking requests and
/// `<dir>/<carrier id>/store-<id>.<ext>` for store lookups. A missing file
/// answers 404.
#[derive(Debug, Clone)]
pub struct FileFetch {
    dir: PathBuf,
}

impl FileFetch {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, request: &Request) -> PathBuf {
        let ext = request.carrier.payload_ext();
        let file = match &request.kind {
            RequestKind::Tracking(number) => format!("{}.{}", number, ext),
            RequestKind::StoreDetail(id) => format!("store-{}.{}", id, ext),
        };
        self.dir.join(request.carrier.identifier()).join(file)
    }
}

impl Fetch for FileFetch {
    fn fetch(&self, request: &Request) -> Result<Response, TrackError> {
        let path = self.path_for(request);
        match fs::read_to_string(&path) {
            Ok(body) => {
                debug!(path = %path.display(), bytes = body.len(), "payload served from disk");
                Ok(Response::ok(body))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no captured payload");
                Ok(Response::not_found())
            }
            Err(e) => Err(e.into()),
        }
    }
}
