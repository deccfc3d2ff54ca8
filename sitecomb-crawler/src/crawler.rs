use crate::error::{CrawlError, Result};
use crate::fetch::Fetcher;
use crate::page::{PageOutcome, PageRecord};
use crate::parse;
use crate::readability;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(&PageRecord) + Send + Sync>;

/// Resource extensions that are skipped during link discovery by default.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] =
    &[".pdf", ".jpg", ".jpeg", ".png", ".gif", ".css", ".js"];

const DEFAULT_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which measurement each visited page receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMode {
    /// HEAD probe per page, recording the HTTP status code.
    Status,
    /// Full-body fetch per page, recording a readability grade.
    Readability,
    /// Pure discovery, recording page identity only.
    Sitemap,
}

impl fmt::Display for AuditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditMode::Status => "status",
            AuditMode::Readability => "readability",
            AuditMode::Sitemap => "sitemap",
        };
        write!(f, "{}", name)
    }
}

/// Sequential crawl engine: visits every in-scope page reachable from a seed
/// exactly once and applies the configured analysis to each.
pub struct Crawler {
    mode: AuditMode,
    delay: Duration,
    timeout: Duration,
    user_agent: String,
    max_pages: Option<usize>,
    excluded_extensions: Vec<String>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(mode: AuditMode) -> Self {
        Self {
            mode,
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("sitecomb/{}", env!("CARGO_PKG_VERSION")),
            max_pages: None,
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            progress_callback: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_excluded_extensions(mut self, extensions: Vec<String>) -> Self {
        // Paths are compared lowercased, so the filter list must be too.
        self.excluded_extensions = extensions
            .into_iter()
            .map(|ext| ext.to_lowercase())
            .collect();
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Visit every in-scope page reachable from `seed_url`, one at a time,
    /// and return one record per visited URL.
    pub async fn crawl(&self, seed_url: &str) -> Result<Vec<PageRecord>> {
        let mut seed = Url::parse(seed_url)
            .map_err(|e| CrawlError::InvalidSeed(format!("{}: {}", seed_url, e)))?;
        if seed.host_str().is_none() {
            return Err(CrawlError::UnscopedSeed(seed_url.to_string()));
        }
        seed.set_fragment(None);

        let fetcher = Fetcher::new(&self.user_agent, self.timeout)?;

        let mut frontier: VecDeque<Url> = VecDeque::new();
        let mut visited: HashSet<Url> = HashSet::new();
        let mut records: Vec<PageRecord> = Vec::new();

        info!("Starting {} crawl of {}", self.mode, seed);
        frontier.push_back(seed.clone());

        while let Some(url) = frontier.pop_front() {
            // The same URL can be enqueued twice before its first visit
            if visited.contains(&url) {
                continue;
            }
            visited.insert(url.clone());

            debug!("Visiting {}", url);
            let (record, expandable) = self.analyze(&fetcher, &url).await;
            if record.is_unreachable() {
                warn!("Unreachable: {}", url);
            }
            if let Some(ref callback) = self.progress_callback {
                callback(&record);
            }
            records.push(record);

            if self.max_pages.is_some_and(|cap| visited.len() >= cap) {
                info!("Stopping at the configured cap of {} pages", visited.len());
                break;
            }

            if expandable {
                for link in self.discover(&fetcher, &url, &seed).await {
                    if !visited.contains(&link) {
                        debug!("Enqueueing {}", link);
                        frontier.push_back(link);
                    }
                }
            }

            // Politeness pause before the next fetch
            if !frontier.is_empty() && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }

        info!("Crawl finished: {} pages", records.len());
        Ok(records)
    }

    /// Per-mode measurement of one page: the record plus whether its own
    /// outgoing links should be explored.
    async fn analyze(&self, fetcher: &Fetcher, url: &Url) -> (PageRecord, bool) {
        match self.mode {
            AuditMode::Status => match fetcher.status(url).await {
                Some(code) => (PageRecord::new(url, PageOutcome::Status(code)), code != 404),
                None => (PageRecord::unreachable(url), false),
            },
            AuditMode::Readability => match fetcher.page(url).await {
                Some(page) if page.status == 200 => {
                    let text = parse::extract_text(&page.body);
                    let score = readability::grade_level(&text);
                    (PageRecord::new(url, PageOutcome::Readability(score)), true)
                }
                _ => (PageRecord::unreachable(url), false),
            },
            AuditMode::Sitemap => (PageRecord::new(url, PageOutcome::Discovered), true),
        }
    }

    /// Links worth following from `url`: same authority as the seed and not
    /// an excluded resource type. A failed or non-200 fetch yields none.
    async fn discover(&self, fetcher: &Fetcher, url: &Url, scope: &Url) -> Vec<Url> {
        let Some(page) = fetcher.page(url).await else {
            return Vec::new();
        };
        if page.status != 200 {
            debug!("Not expanding {} (status {})", url, page.status);
            return Vec::new();
        }

        parse::extract_links(&page.body, url)
            .into_iter()
            .filter(|link| same_scope(link, scope))
            .filter(|link| !self.is_excluded(link))
            .collect()
    }

    fn is_excluded(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();
        self.excluded_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}

// Scope is host plus explicit port, never the scheme. Url::parse has
// already dropped default ports.
fn same_scope(link: &Url, scope: &Url) -> bool {
    link.host_str() == scope.host_str() && link.port() == scope.port()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_page(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(html),
            )
            .mount(server)
            .await;
    }

    async fn mount_head(server: &MockServer, route: &str, status: u16) {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    fn crawler(mode: AuditMode) -> Crawler {
        Crawler::new(mode).with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn two_page_cycle_terminates_after_two_visits() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/a",
            &format!(r#"<a href="{}/b">b</a>"#, server.uri()),
        )
        .await;
        mount_page(
            &server,
            "/b",
            &format!(r#"<a href="{}/a">a</a>"#, server.uri()),
        )
        .await;

        let records = crawler(AuditMode::Sitemap)
            .crawl(&format!("{}/a", server.uri()))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.outcome == PageOutcome::Discovered));
    }

    #[tokio::test]
    async fn repeatedly_linked_pages_are_visited_once() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            &format!(r#"<a href="{0}/p">one</a><a href="{0}/p">two</a>"#, server.uri()),
        )
        .await;
        mount_page(
            &server,
            "/p",
            &format!(r#"<a href="{}/">home</a>"#, server.uri()),
        )
        .await;

        let records = crawler(AuditMode::Sitemap)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        let p_visits = records
            .iter()
            .filter(|r| r.url == format!("{}/p", server.uri()))
            .count();
        assert_eq!(p_visits, 1);
    }

    #[tokio::test]
    async fn fragment_variants_collapse_to_one_page() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            r#"<a href="/p#section1">one</a><a href="/p#section2">two</a>"#,
        )
        .await;
        mount_page(&server, "/p", "<p>leaf</p>").await;

        let records = crawler(AuditMode::Sitemap)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.url == format!("{}/p", server.uri())));

        let requests = server.received_requests().await.unwrap();
        let p_requests = requests.iter().filter(|r| r.url.path() == "/p").count();
        assert_eq!(p_requests, 1, "fragment variants caused extra fetches");
    }

    #[tokio::test]
    async fn cross_domain_links_are_never_followed() {
        let server = MockServer::start().await;
        let other = MockServer::start().await;
        mount_page(&other, "/x", "<p>elsewhere</p>").await;
        mount_page(
            &server,
            "/",
            &format!(r#"<a href="{}/x">away</a><a href="/local">here</a>"#, other.uri()),
        )
        .await;
        mount_page(&server, "/local", "<p>local</p>").await;

        let records = crawler(AuditMode::Sitemap)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.url.starts_with(&other.uri())));
        assert!(other.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn scope_spans_schemes_but_not_hosts_or_ports() {
        let seed = Url::parse("http://site.test/").unwrap();
        assert!(same_scope(
            &Url::parse("https://site.test/about").unwrap(),
            &seed
        ));
        assert!(!same_scope(&Url::parse("http://other.test/").unwrap(), &seed));
        assert!(!same_scope(
            &Url::parse("http://site.test:8080/").unwrap(),
            &seed
        ));
    }

    #[tokio::test]
    async fn dead_pages_are_recorded_but_not_expanded() {
        let server = MockServer::start().await;
        mount_head(&server, "/", 200).await;
        mount_page(
            &server,
            "/",
            r#"<a href="/dead">dead</a><a href="/live">live</a>"#,
        )
        .await;
        mount_head(&server, "/dead", 404).await;
        mount_page(&server, "/dead", r#"<a href="/hidden">hidden</a>"#).await;
        mount_head(&server, "/live", 200).await;
        mount_page(&server, "/live", "<p>ok</p>").await;

        let records = crawler(AuditMode::Status)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        let dead = records
            .iter()
            .find(|r| r.url.ends_with("/dead"))
            .expect("404 page missing from results");
        assert_eq!(dead.outcome, PageOutcome::Status(404));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/hidden"));
        // The single /dead request is the probe; no expansion fetch followed
        assert_eq!(requests.iter().filter(|r| r.url.path() == "/dead").count(), 1);
    }

    #[tokio::test]
    async fn status_probe_reports_redirects_without_following() {
        let server = MockServer::start().await;
        mount_head(&server, "/", 200).await;
        mount_page(&server, "/", r#"<a href="/moved">moved</a>"#).await;
        Mock::given(method("HEAD"))
            .and(path("/moved"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/target"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/target"))
            .mount(&server)
            .await;
        mount_page(&server, "/target", "<p>target</p>").await;

        let records = crawler(AuditMode::Status)
            .crawl(&server.uri())
            .await
            .unwrap();

        let moved = records
            .iter()
            .find(|r| r.url.ends_with("/moved"))
            .expect("redirecting page missing from results");
        assert_eq!(moved.outcome, PageOutcome::Status(301));
    }

    #[tokio::test]
    async fn transport_failure_records_an_unreachable_page() {
        // Bind then drop to get a port nothing is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let seed = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let records = crawler(AuditMode::Status).crawl(&seed).await.unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].is_unreachable());
    }

    #[tokio::test]
    async fn readability_mode_scores_page_text() {
        let server = MockServer::start().await;
        mount_page(&server, "/", "<p>The cat sat. The dog ran.</p>").await;

        let records = crawler(AuditMode::Readability)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score(), Some(-2.62));
    }

    #[tokio::test]
    async fn readability_mode_treats_error_pages_as_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<p>Server error.</p>"))
            .mount(&server)
            .await;

        let records = crawler(AuditMode::Readability)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].is_unreachable());

        // No expansion fetch after the failed analysis
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn excluded_extensions_are_not_enqueued() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            r#"<a href="/report.pdf">r</a><a href="/logo.PNG">l</a><a href="/app.js">j</a><a href="/page">p</a>"#,
        )
        .await;
        mount_page(&server, "/page", "<p>leaf</p>").await;

        let records = crawler(AuditMode::Sitemap)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| {
            let p = r.url.path().to_lowercase();
            !p.ends_with(".pdf") && !p.ends_with(".png") && !p.ends_with(".js")
        }));
    }

    #[tokio::test]
    async fn configured_extension_case_is_ignored() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            r#"<a href="/report.pdf">r</a><a href="/page">p</a>"#,
        )
        .await;
        mount_page(&server, "/page", "<p>leaf</p>").await;

        let records = crawler(AuditMode::Sitemap)
            .with_excluded_extensions(vec![".PDF".to_string()])
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.path().ends_with(".pdf")));
    }

    #[tokio::test]
    async fn page_cap_bounds_the_run() {
        let server = MockServer::start().await;
        let mut root = String::new();
        for i in 1..=5 {
            root.push_str(&format!(r#"<a href="/p{}">p</a>"#, i));
        }
        mount_page(&server, "/", &root).await;
        for i in 1..=5 {
            mount_page(&server, &format!("/p{}", i), "<p>leaf</p>").await;
        }

        let records = crawler(AuditMode::Sitemap)
            .with_max_pages(3)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn seed_fragment_is_stripped() {
        let server = MockServer::start().await;
        mount_page(&server, "/p", "<p>leaf</p>").await;

        let records = crawler(AuditMode::Sitemap)
            .crawl(&format!("{}/p#intro", server.uri()))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, format!("{}/p", server.uri()));
    }

    #[tokio::test]
    async fn invalid_seeds_are_rejected_up_front() {
        let err = crawler(AuditMode::Sitemap)
            .crawl("not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSeed(_)));

        let err = crawler(AuditMode::Sitemap)
            .crawl("data:text/plain,hello")
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::UnscopedSeed(_)));
    }

    #[tokio::test]
    async fn progress_callback_sees_every_record() {
        let server = MockServer::start().await;
        mount_page(&server, "/", r#"<a href="/p">p</a>"#).await;
        mount_page(&server, "/p", "<p>leaf</p>").await;

        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        let records = crawler(AuditMode::Sitemap)
            .with_progress_callback(Arc::new(move |_record| {
                seen.fetch_add(1, Ordering::SeqCst);
            }))
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), records.len());
    }

    #[tokio::test]
    async fn configured_user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "combtest/9.9"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let records = crawler(AuditMode::Sitemap)
            .with_user_agent("combtest/9.9")
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
    }
}
