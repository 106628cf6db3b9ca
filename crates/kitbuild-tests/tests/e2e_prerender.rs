//! End-to-end tests for prerender crawling policies and output.

use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use kitbuild_types::logger::{LogLevel, MemoryLogger};
use kitbuild_types::prerender::{
    ErrorPolicy, HttpErrorDetails, IssueReporter, MissingIdDetails, PrerenderError, Prerendered,
    ReferenceType, ReportedIssue,
};
use kitbuild_types::{KitConfig, PrerenderConfig};

/// A fake site: path to (status, links, fetches, ids on the page).
struct Site {
    pages: BTreeMap<&'static str, Page>,
}

struct Page {
    status: u16,
    links: Vec<&'static str>,
    fetches: Vec<&'static str>,
    ids: Vec<&'static str>,
}

impl Page {
    fn ok(links: &[&'static str]) -> Self {
        Self {
            status: 200,
            links: links.to_vec(),
            fetches: Vec::new(),
            ids: Vec::new(),
        }
    }
}

fn site() -> Site {
    let mut pages = BTreeMap::new();
    pages.insert("/", Page::ok(&["/about", "/blog", "/docs#install"]));
    pages.insert("/about", Page::ok(&["/"]));
    pages.insert(
        "/blog",
        Page {
            status: 200,
            links: vec!["/blog/hello"],
            fetches: vec!["/api/posts.json"],
            ids: vec![],
        },
    );
    pages.insert("/blog/hello", Page::ok(&["/blog/missing"]));
    pages.insert(
        "/docs",
        Page {
            status: 200,
            links: vec![],
            fetches: vec![],
            ids: vec!["usage"],
        },
    );
    Site { pages }
}

/// Crawls from `/`, applying the reporter's policies.
fn crawl(site: &Site, reporter: &IssueReporter) -> Result<Prerendered, PrerenderError> {
    let mut prerendered = Prerendered::new();
    let mut queue: VecDeque<(&str, Option<&str>, ReferenceType)> = VecDeque::new();
    let mut seen = Vec::new();
    let mut fragments: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    queue.push_back(("/", None, ReferenceType::Linked));

    while let Some((path, referrer, reference_type)) = queue.pop_front() {
        if seen.contains(&path) {
            continue;
        }
        seen.push(path);

        let page = match site.pages.get(path) {
            Some(page) if page.status == 200 => page,
            other => {
                let status = other.map_or(404, |p| p.status);
                reporter.handle_http_error(HttpErrorDetails::new(
                    status,
                    path,
                    referrer.map(String::from),
                    reference_type,
                ))?;
                continue;
            }
        };

        if path.ends_with(".json") {
            prerendered.add_asset(path, "application/json");
        } else {
            prerendered.add_page(path);
        }

        for link in &page.links {
            let (target, fragment) = match link.split_once('#') {
                Some((t, f)) => (t, Some(f)),
                None => (*link, None),
            };
            if let Some(id) = fragment {
                fragments
                    .entry((target.to_string(), id.to_string()))
                    .or_default()
                    .push(path.to_string());
            }
            queue.push_back((target, Some(path), ReferenceType::Linked));
        }
        for fetch in &page.fetches {
            queue.push_back((*fetch, Some(path), ReferenceType::Fetched));
        }
    }

    for ((target, id), referrers) in fragments {
        let has_id = site
            .pages
            .get(target.as_str())
            .map_or(false, |p| p.ids.iter().any(|known| *known == id));
        if !has_id {
            reporter.handle_missing_id(MissingIdDetails::new(target, id, referrers))?;
        }
    }

    Ok(prerendered)
}

fn reporter_for(config: &PrerenderConfig) -> (IssueReporter, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    (config.reporter(logger.clone()), logger)
}

// ============================================================================
// Policies
// ============================================================================

#[test]
fn test_fail_policy_stops_at_first_error() {
    let config = PrerenderConfig::default();
    let (reporter, _) = reporter_for(&config);

    let err = crawl(&site(), &reporter).unwrap_err();
    assert_eq!(
        err,
        PrerenderError::HttpError("404 /api/posts.json (fetched from /blog)".to_string())
    );
}

#[test]
fn test_fetched_404_with_warn_continues() {
    let config = KitConfig::from_json(
        r#"{"prerender": {"handle_http_error": "warn", "handle_missing_id": "warn"}}"#,
    )
    .unwrap();
    let (reporter, logger) = reporter_for(&config.prerender);

    let prerendered = crawl(&site(), &reporter).unwrap();
    assert_eq!(
        prerendered.paths,
        vec!["/", "/about", "/blog", "/docs", "/blog/hello"]
    );

    let warnings = reporter.warnings();
    let fetched: Vec<&HttpErrorDetails> = warnings
        .iter()
        .filter_map(|w| match w {
            ReportedIssue::Http(d) if d.reference_type == ReferenceType::Fetched => Some(d),
            _ => None,
        })
        .collect();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].path, "/api/posts.json");
    assert_eq!(fetched[0].referrer.as_deref(), Some("/blog"));

    assert_eq!(warnings.len(), 3);
    let logged = logger.messages(LogLevel::Warn);
    assert_eq!(logged[0], "404 /api/posts.json (fetched from /blog)");
    assert_eq!(logged[1], "404 /blog/missing (linked from /blog/hello)");
    assert!(logged[2].starts_with("The following pages contain links to /docs#install"));
    assert!(logged[2].ends_with("\n  - /"));
}

#[test]
fn test_ignore_policy_is_silent() {
    let config = PrerenderConfig {
        handle_http_error: ErrorPolicy::Ignore,
        handle_missing_id: ErrorPolicy::Ignore,
        ..Default::default()
    };
    let (reporter, logger) = reporter_for(&config);

    let prerendered = crawl(&site(), &reporter).unwrap();
    assert_eq!(prerendered.pages.len(), 5);
    assert!(reporter.warnings().is_empty());
    assert!(logger.entries().is_empty());
}

#[test]
fn test_handler_policy_sees_details_and_can_abort() {
    let seen: Arc<Mutex<Vec<u16>>> = Arc::default();
    let recorded = seen.clone();
    let config = PrerenderConfig {
        handle_http_error: ErrorPolicy::handler(move |details: &HttpErrorDetails| {
            recorded.lock().unwrap().push(details.status);
            if details.reference_type == ReferenceType::Linked {
                Err(format!("broken link to {}", details.path))
            } else {
                Ok(())
            }
        }),
        handle_missing_id: ErrorPolicy::Ignore,
        ..Default::default()
    };
    let (reporter, _) = reporter_for(&config);

    let err = crawl(&site(), &reporter).unwrap_err();
    assert_eq!(
        err,
        PrerenderError::Handler("broken link to /blog/missing".to_string())
    );
    assert_eq!(*seen.lock().unwrap(), vec![404, 404]);
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_prerendered_output_files() {
    let config = PrerenderConfig {
        handle_http_error: ErrorPolicy::Ignore,
        handle_missing_id: ErrorPolicy::Ignore,
        ..Default::default()
    };
    let (reporter, _) = reporter_for(&config);
    let prerendered = crawl(&site(), &reporter).unwrap();

    assert_eq!(prerendered.pages["/"].file, "index.html");
    assert_eq!(prerendered.pages["/blog/hello"].file, "blog/hello.html");
    assert!(prerendered.contains_path("/about/"));
    assert!(!prerendered.contains_path("/api/posts.json"));

    let json = serde_json::to_value(&prerendered).unwrap();
    assert_eq!(json["pages"]["/about"]["file"], "about.html");
}
