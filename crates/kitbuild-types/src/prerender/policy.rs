//! Error policies for issues found while crawling during prerendering.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::logger::Logger;

/// How a crawled URL was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    /// Found through an `<a href>` on a page.
    Linked,
    /// Requested with `fetch` while rendering a page.
    Fetched,
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceType::Linked => write!(f, "linked"),
            ReferenceType::Fetched => write!(f, "fetched"),
        }
    }
}

/// A non-success HTTP response met while crawling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorDetails {
    /// Response status.
    pub status: u16,
    /// Path that failed.
    pub path: String,
    /// Page that linked to or fetched `path`, if known.
    pub referrer: Option<String>,
    /// How `path` was reached.
    pub reference_type: ReferenceType,
    /// Formatted description.
    pub message: String,
}

impl HttpErrorDetails {
    /// Creates details and formats the message.
    pub fn new(
        status: u16,
        path: impl Into<String>,
        referrer: Option<String>,
        reference_type: ReferenceType,
    ) -> Self {
        let path = path.into();
        let message = match &referrer {
            Some(from) => format!("{} {} ({} from {})", status, path, reference_type, from),
            None => format!("{} {}", status, path),
        };
        Self {
            status,
            path,
            referrer,
            reference_type,
            message,
        }
    }
}

/// A link to a fragment id that does not exist on the target page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingIdDetails {
    /// Page that lacks the id.
    pub path: String,
    /// The missing fragment id.
    pub id: String,
    /// Pages linking to `path#id`.
    pub referrers: Vec<String>,
    /// Formatted description.
    pub message: String,
}

impl MissingIdDetails {
    /// Creates details and formats the message.
    pub fn new(path: impl Into<String>, id: impl Into<String>, referrers: Vec<String>) -> Self {
        let path = path.into();
        let id = id.into();
        let mut message = format!(
            "The following pages contain links to {}#{}, but no element with id=\"{}\" exists on {} - see the `handle_missing_id` prerender option for more info:",
            path, id, id, path
        );
        for referrer in &referrers {
            message.push_str("\n  - ");
            message.push_str(referrer);
        }
        Self {
            path,
            id,
            referrers,
            message,
        }
    }
}

/// Callback invoked for a prerender issue. Returning `Err` aborts the build.
pub type IssueHandler<D> = Arc<dyn Fn(&D) -> Result<(), String> + Send + Sync>;

/// What to do when a prerender issue occurs.
pub enum ErrorPolicy<D> {
    /// Abort the build.
    Fail,
    /// Log a warning and continue.
    Warn,
    /// Continue silently.
    Ignore,
    /// Delegate to a custom handler.
    Handler(IssueHandler<D>),
}

/// Policy for HTTP errors during crawling.
pub type HttpErrorPolicy = ErrorPolicy<HttpErrorDetails>;

/// Policy for missing fragment ids during crawling.
pub type MissingIdPolicy = ErrorPolicy<MissingIdDetails>;

impl<D> ErrorPolicy<D> {
    /// Wraps a closure as a handler policy.
    pub fn handler(f: impl Fn(&D) -> Result<(), String> + Send + Sync + 'static) -> Self {
        ErrorPolicy::Handler(Arc::new(f))
    }

    /// Returns the policy name (`custom` for handlers).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Fail => "fail",
            ErrorPolicy::Warn => "warn",
            ErrorPolicy::Ignore => "ignore",
            ErrorPolicy::Handler(_) => "custom",
        }
    }
}

impl<D> Default for ErrorPolicy<D> {
    fn default() -> Self {
        ErrorPolicy::Fail
    }
}

impl<D> Clone for ErrorPolicy<D> {
    fn clone(&self) -> Self {
        match self {
            ErrorPolicy::Fail => ErrorPolicy::Fail,
            ErrorPolicy::Warn => ErrorPolicy::Warn,
            ErrorPolicy::Ignore => ErrorPolicy::Ignore,
            ErrorPolicy::Handler(h) => ErrorPolicy::Handler(Arc::clone(h)),
        }
    }
}

impl<D> std::fmt::Debug for ErrorPolicy<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<D> PartialEq for ErrorPolicy<D> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ErrorPolicy::Handler(a), ErrorPolicy::Handler(b)) => Arc::ptr_eq(a, b),
            _ => self.as_str() == other.as_str(),
        }
    }
}

impl<D> std::str::FromStr for ErrorPolicy<D> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(ErrorPolicy::Fail),
            "warn" => Ok(ErrorPolicy::Warn),
            "ignore" => Ok(ErrorPolicy::Ignore),
            other => Err(format!(
                "invalid error policy '{}' (expected fail, warn or ignore)",
                other
            )),
        }
    }
}

impl<D> Serialize for ErrorPolicy<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorPolicy::Handler(_) => Err(serde::ser::Error::custom(
                "custom error handlers cannot be serialized",
            )),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

impl<'de, D> Deserialize<'de> for ErrorPolicy<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that abort a prerender run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrerenderError {
    /// An HTTP error under the `fail` policy.
    #[error("{0}")]
    HttpError(String),

    /// A missing fragment id under the `fail` policy.
    #[error("{0}")]
    MissingId(String),

    /// A custom handler rejected the issue.
    #[error("prerender handler failed: {0}")]
    Handler(String),
}

/// An issue that was reported and let the build continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedIssue {
    /// HTTP error under the `warn` policy.
    Http(HttpErrorDetails),
    /// Missing fragment id under the `warn` policy.
    MissingId(MissingIdDetails),
}

impl ReportedIssue {
    /// Returns the formatted message.
    pub fn message(&self) -> &str {
        match self {
            ReportedIssue::Http(d) => &d.message,
            ReportedIssue::MissingId(d) => &d.message,
        }
    }
}

/// Applies the configured policies to issues raised by the crawler.
pub struct IssueReporter {
    http_policy: HttpErrorPolicy,
    missing_id_policy: MissingIdPolicy,
    logger: Arc<dyn Logger>,
    warnings: Mutex<Vec<ReportedIssue>>,
}

impl IssueReporter {
    /// Creates a reporter.
    pub fn new(
        http_policy: HttpErrorPolicy,
        missing_id_policy: MissingIdPolicy,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            http_policy,
            missing_id_policy,
            logger,
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Handles an HTTP error. `Err` means the build must stop.
    pub fn handle_http_error(&self, details: HttpErrorDetails) -> Result<(), PrerenderError> {
        match &self.http_policy {
            ErrorPolicy::Fail => Err(PrerenderError::HttpError(details.message)),
            ErrorPolicy::Warn => {
                self.logger.warn(&details.message);
                self.record(ReportedIssue::Http(details));
                Ok(())
            }
            ErrorPolicy::Ignore => Ok(()),
            ErrorPolicy::Handler(handler) => handler(&details).map_err(PrerenderError::Handler),
        }
    }

    /// Handles a missing fragment id. `Err` means the build must stop.
    pub fn handle_missing_id(&self, details: MissingIdDetails) -> Result<(), PrerenderError> {
        match &self.missing_id_policy {
            ErrorPolicy::Fail => Err(PrerenderError::MissingId(details.message)),
            ErrorPolicy::Warn => {
                self.logger.warn(&details.message);
                self.record(ReportedIssue::MissingId(details));
                Ok(())
            }
            ErrorPolicy::Ignore => Ok(()),
            ErrorPolicy::Handler(handler) => handler(&details).map_err(PrerenderError::Handler),
        }
    }

    /// Returns the issues reported under the `warn` policy.
    pub fn warnings(&self) -> Vec<ReportedIssue> {
        self.warnings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, issue: ReportedIssue) {
        self.warnings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(issue);
    }
}

impl std::fmt::Debug for IssueReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueReporter")
            .field("http_policy", &self.http_policy)
            .field("missing_id_policy", &self.missing_id_policy)
            .finish_non_exhaustive()
    }
}
