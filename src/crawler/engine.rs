use crate::analytics;
use crate::browser::{Browser, BrowserLauncher};
use crate::config::{validate_seed_url, ScanConfig, Settings};
use crate::consent::ConsentResult;
use crate::crawler::frontier::Frontier;
use crate::crawler::types::{CrawlProgress, PageResult, ScanOutcome, ScanStatus};
use crate::crawler::visitor;
use crate::robots;
use crate::url::DomainKey;
use crate::Result;
use std::time::Instant;

/// Breadth-first crawl engine for a single domain
///
/// Owns the frontier, the caps, and the crawl-scoped browser. Construction
/// snapshots the effective (clamped) configuration; a running crawl never
/// sees configuration changes.
pub struct CrawlEngine {
    config: ScanConfig,
    settings: Settings,
    base: DomainKey,
    progress: CrawlProgress,
}

impl CrawlEngine {
    /// Creates an engine for the given scan
    ///
    /// Fails when the seed URL does not parse, is not http(s), or has no
    /// host. Caps outside their allowed ranges are clamped, not rejected.
    pub fn new(config: ScanConfig, settings: Settings) -> Result<Self> {
        let config = config.effective();
        validate_seed_url(&config)?;
        let base = DomainKey::from_url(&config.url)?;
        Ok(Self {
            config,
            settings,
            base,
            progress: CrawlProgress::new(),
        })
    }

    /// Live progress for this crawl
    pub fn progress(&self) -> &CrawlProgress {
        &self.progress
    }

    /// Executes the crawl
    ///
    /// Checks robots.txt, launches a browser, works the frontier under the
    /// wall-clock budget, and tears the browser down on every exit path.
    /// Page-level failures are recorded in their [`PageResult`]s; the only
    /// errors that abort a crawl outright are robots-client construction and
    /// browser launch.
    pub async fn run(
        &mut self,
        scan_id: &str,
        launcher: &dyn BrowserLauncher,
    ) -> Result<ScanOutcome> {
        self.progress.scan_id = scan_id.to_string();
        let started = Instant::now();

        let client =
            robots::build_http_client(&self.settings.user_agent, self.settings.robots_timeout())?;
        let robots =
            robots::check_robots(&client, &self.config.url, &self.settings.user_agent).await;
        tracing::info!(
            "robots.txt: found={}, allowed={}",
            robots.found,
            robots.allowed
        );

        if !robots.allowed {
            tracing::warn!("robots.txt disallows scanning {}", self.config.url);
            self.progress.status = ScanStatus::BlockedByRobots;
            return Ok(ScanOutcome {
                status: ScanStatus::BlockedByRobots,
                pages: Vec::new(),
                consent: None,
                analytics: Vec::new(),
                robots,
            });
        }

        let mut browser = launcher.launch().await?;

        let mut frontier = Frontier::new();
        frontier.push(&self.config.url, 0);

        let mut pages: Vec<PageResult> = Vec::new();
        let mut consent: Option<ConsentResult> = None;

        let budget = self.settings.scan_timeout();
        let timed_out = tokio::time::timeout(
            budget,
            self.crawl_loop(browser.as_ref(), &mut frontier, &mut pages, &mut consent),
        )
        .await
        .is_err();

        browser.close().await;

        self.progress.status = if timed_out {
            tracing::warn!("Crawl timed out after {}s", budget.as_secs());
            ScanStatus::Timeout
        } else {
            ScanStatus::Completed
        };

        let analytics = analytics::union_frameworks(
            pages
                .iter()
                .flat_map(|page| page.analytics.iter().map(String::as_str)),
        );

        tracing::info!(
            "Crawl complete: {} pages, {} elements in {:.1}s",
            pages.len(),
            pages.iter().map(|p| p.elements.len()).sum::<usize>(),
            started.elapsed().as_secs_f64()
        );

        Ok(ScanOutcome {
            status: self.progress.status,
            pages,
            consent,
            analytics,
            robots,
        })
    }

    /// Works the frontier until it runs dry or the page cap is reached
    ///
    /// The caller wraps this in the scan budget; results accumulated in
    /// `pages` survive a budget cancellation.
    async fn crawl_loop(
        &mut self,
        browser: &dyn Browser,
        frontier: &mut Frontier,
        pages: &mut Vec<PageResult>,
        consent: &mut Option<ConsentResult>,
    ) {
        let delay = self.config.request_delay();

        loop {
            if pages.len() >= self.config.max_pages as usize {
                tracing::info!("Reached page cap ({})", self.config.max_pages);
                break;
            }

            let (url, depth) = match frontier.pop() {
                Some(entry) => entry,
                None => break,
            };

            if frontier.is_visited(&url) {
                continue;
            }
            if depth > self.config.max_depth {
                continue;
            }

            frontier.mark_visited(&url);
            self.progress.current_url = Some(url.clone());

            let visit = visitor::visit_page(
                browser,
                &self.base,
                &self.config,
                &self.settings,
                &url,
                depth,
                consent.is_none(),
            )
            .await;

            if let Some(result) = visit.consent {
                *consent = Some(result);
            }

            for link in &visit.links {
                frontier.push(link, depth + 1);
            }

            tracing::info!(
                "[{}/{}] {} (depth={}) -> {} ({} elements)",
                pages.len() + 1,
                self.config.max_pages,
                url,
                depth,
                visit.result.title.as_deref().unwrap_or("(no title)"),
                visit.result.elements.len()
            );

            pages.push(visit.result);
            self.progress.pages_scanned = pages.len();
            self.progress.total_pages_found = frontier.discovered();

            tokio::time::sleep(delay).await;
        }
    }
}
