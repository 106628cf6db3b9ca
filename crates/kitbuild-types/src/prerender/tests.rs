//! Tests for prerender output and error policies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::logger::{LogLevel, MemoryLogger};

// ============================================================================
// Output Tests
// ============================================================================

#[test]
fn test_page_file() {
    assert_eq!(page_file("/foo"), "foo.html");
    assert_eq!(page_file("/bar/"), "bar/index.html");
    assert_eq!(page_file("/"), "index.html");
    assert_eq!(page_file("/blog/post-1"), "blog/post-1.html");
}

#[test]
fn test_prerendered_paths_strip_trailing_slash() {
    let mut prerendered = Prerendered::new();
    assert_eq!(prerendered.add_page("/bar/"), "bar/index.html");
    prerendered.add_page("/");
    prerendered.add_asset("/data.json", "application/json");
    prerendered.add_redirect("/old", 308, "/new");
    prerendered.add_page("/bar");

    assert_eq!(prerendered.paths, vec!["/bar", "/", "/data.json", "/old"]);
    assert!(prerendered.contains_path("/bar/"));
    assert_eq!(prerendered.pages.len(), 3);
    assert_eq!(prerendered.redirects["/old"].status, 308);
}

#[test]
fn test_repeated_slashes_keep_root() {
    let mut prerendered = Prerendered::new();
    prerendered.add_asset("//", "text/plain");
    prerendered.add_page("/");
    prerendered.add_page("/docs//");

    assert_eq!(prerendered.paths, vec!["/", "/docs"]);
    assert!(prerendered.contains_path("///"));
    assert!(!prerendered.contains_path(""));
}

#[test]
fn test_prerendered_json_shape() {
    let mut prerendered = Prerendered::new();
    prerendered.add_asset("/feed.xml", "application/rss+xml");

    let json = serde_json::to_value(&prerendered).unwrap();
    assert_eq!(json["assets"]["/feed.xml"]["type"], "application/rss+xml");
    assert_eq!(json["paths"][0], "/feed.xml");
}

#[test]
fn test_prerender_option_serde() {
    let map: PrerenderMap =
        serde_json::from_str(r#"{"/a": true, "/b": false, "/c": "auto"}"#).unwrap();
    assert_eq!(map["/a"], PrerenderOption::Enabled);
    assert_eq!(map["/b"], PrerenderOption::Disabled);
    assert_eq!(map["/c"], PrerenderOption::Auto);

    assert_eq!(serde_json::to_string(&PrerenderOption::Auto).unwrap(), "\"auto\"");
    assert_eq!(serde_json::to_string(&PrerenderOption::Enabled).unwrap(), "true");
    assert!(serde_json::from_str::<PrerenderOption>("\"always\"").is_err());
}

#[test]
fn test_prerender_option_flags() {
    assert!(!PrerenderOption::Enabled.needs_server());
    assert!(PrerenderOption::Auto.needs_server());
    assert!(PrerenderOption::Auto.may_prerender());
    assert!(!PrerenderOption::Disabled.may_prerender());
}

// ============================================================================
// Details Tests
// ============================================================================

#[test]
fn test_http_error_message() {
    let with_referrer =
        HttpErrorDetails::new(404, "/missing", Some("/".to_string()), ReferenceType::Linked);
    assert_eq!(with_referrer.message, "404 /missing (linked from /)");

    let without = HttpErrorDetails::new(500, "/api", None, ReferenceType::Fetched);
    assert_eq!(without.message, "500 /api");
}

#[test]
fn test_missing_id_message_lists_referrers() {
    let details = MissingIdDetails::new(
        "/docs",
        "intro",
        vec!["/".to_string(), "/blog".to_string()],
    );
    assert!(details.message.starts_with(
        "The following pages contain links to /docs#intro, but no element with id=\"intro\" exists on /docs"
    ));
    assert!(details.message.ends_with("\n  - /\n  - /blog"));
}

// ============================================================================
// Policy Tests
// ============================================================================

fn reporter(http: HttpErrorPolicy, missing: MissingIdPolicy) -> (IssueReporter, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    (IssueReporter::new(http, missing, logger.clone()), logger)
}

#[test]
fn test_policy_parse() {
    assert_eq!("fail".parse::<HttpErrorPolicy>().unwrap(), ErrorPolicy::Fail);
    assert_eq!("warn".parse::<HttpErrorPolicy>().unwrap(), ErrorPolicy::Warn);
    assert_eq!("ignore".parse::<MissingIdPolicy>().unwrap(), ErrorPolicy::Ignore);
    assert!("explode".parse::<HttpErrorPolicy>().is_err());
    assert_eq!(HttpErrorPolicy::default(), ErrorPolicy::Fail);
}

#[test]
fn test_policy_serde() {
    let policy: MissingIdPolicy = serde_json::from_str("\"warn\"").unwrap();
    assert_eq!(policy, ErrorPolicy::Warn);
    assert_eq!(serde_json::to_string(&policy).unwrap(), "\"warn\"");

    let custom = HttpErrorPolicy::handler(|_| Ok(()));
    assert!(serde_json::to_string(&custom).is_err());
}

#[test]
fn test_fail_policy_aborts() {
    let (reporter, logger) = reporter(ErrorPolicy::Fail, ErrorPolicy::Fail);
    let err = reporter
        .handle_http_error(HttpErrorDetails::new(404, "/x", None, ReferenceType::Linked))
        .unwrap_err();
    assert_eq!(err, PrerenderError::HttpError("404 /x".to_string()));

    let err = reporter
        .handle_missing_id(MissingIdDetails::new("/x", "top", vec![]))
        .unwrap_err();
    assert!(matches!(err, PrerenderError::MissingId(_)));
    assert!(logger.entries().is_empty());
}

#[test]
fn test_warn_policy_on_fetched_404_continues() {
    let (reporter, logger) = reporter(ErrorPolicy::Warn, ErrorPolicy::Fail);
    let details = HttpErrorDetails::new(
        404,
        "/api/data.json",
        Some("/dashboard".to_string()),
        ReferenceType::Fetched,
    );

    assert!(reporter.handle_http_error(details).is_ok());

    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        ReportedIssue::Http(d) => {
            assert_eq!(d.reference_type, ReferenceType::Fetched);
            assert_eq!(d.status, 404);
        }
        other => panic!("unexpected issue: {:?}", other),
    }
    assert_eq!(
        logger.messages(LogLevel::Warn),
        vec!["404 /api/data.json (fetched from /dashboard)".to_string()]
    );
}

#[test]
fn test_ignore_policy_is_silent() {
    let (reporter, logger) = reporter(ErrorPolicy::Ignore, ErrorPolicy::Ignore);
    assert!(reporter
        .handle_http_error(HttpErrorDetails::new(500, "/x", None, ReferenceType::Linked))
        .is_ok());
    assert!(reporter
        .handle_missing_id(MissingIdDetails::new("/x", "a", vec!["/".to_string()]))
        .is_ok());
    assert!(reporter.warnings().is_empty());
    assert!(logger.entries().is_empty());
}

#[test]
fn test_handler_policy_receives_details() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let http = HttpErrorPolicy::handler(move |details| {
        seen.fetch_add(1, Ordering::SeqCst);
        if details.status >= 500 {
            Err(format!("server error on {}", details.path))
        } else {
            Ok(())
        }
    });
    let (reporter, _) = reporter(http, ErrorPolicy::Fail);

    assert!(reporter
        .handle_http_error(HttpErrorDetails::new(404, "/a", None, ReferenceType::Linked))
        .is_ok());
    let err = reporter
        .handle_http_error(HttpErrorDetails::new(503, "/b", None, ReferenceType::Fetched))
        .unwrap_err();
    assert_eq!(err, PrerenderError::Handler("server error on /b".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_id_handler_gets_referrers() {
    let missing = MissingIdPolicy::handler(|details| {
        if details.referrers.len() == 2 {
            Ok(())
        } else {
            Err("unexpected referrers".to_string())
        }
    });
    let (reporter, _) = reporter(ErrorPolicy::Fail, missing);
    let details = MissingIdDetails::new("/a", "b", vec!["/x".to_string(), "/y".to_string()]);
    assert!(reporter.handle_missing_id(details).is_ok());
}
