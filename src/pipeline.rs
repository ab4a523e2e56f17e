//! The scrape → dedupe → fetch → annotate loop.
//!
//! A [`Pipeline`] borrows the HTTP client, the text generator and the
//! [`Ledger`] for the length of one run and produces a [`Digest`]. Sites,
//! articles and generation calls are handled strictly one at a time.

use crate::api::{TextGenerator, classify, summarize};
use crate::error::ScrapeError;
use crate::ledger::Ledger;
use crate::models::{Article, CandidateLink, Digest, Site, SiteReport, SiteStatus};
use crate::scrapers::{article::fetch_article_text, fetch_page, links::extract_candidates};
use chrono::Utc;
use reqwest::Client;
use std::io;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Read the newline-delimited site list. Lines are trimmed and blank lines
/// skipped.
pub async fn read_sites(path: &Path) -> io::Result<Vec<Site>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(Site::new)
        .collect())
}

/// One scraping run.
///
/// Borrows everything it needs for the length of the run: the shared HTTP
/// client, the text generator, and the [`Ledger`], which it updates as each
/// article is created.
pub struct Pipeline<'a, G> {
    http: &'a Client,
    generator: &'a G,
    ledger: &'a mut Ledger,
    min_article_chars: usize,
}

impl<'a, G: TextGenerator> Pipeline<'a, G> {
    /// Create a pipeline for one run.
    ///
    /// # Arguments
    ///
    /// * `http` - Client used for landing pages and articles
    /// * `generator` - Backend for classification and summaries
    /// * `ledger` - Processed-URL ledger, read for dedupe and appended to
    /// * `min_article_chars` - Extracted text shorter than this is skipped
    pub fn new(
        http: &'a Client,
        generator: &'a G,
        ledger: &'a mut Ledger,
        min_article_chars: usize,
    ) -> Self {
        Pipeline {
            http,
            generator,
            ledger,
            min_article_chars,
        }
    }

    /// Scrape every site in order and collect the new articles.
    ///
    /// # Returns
    ///
    /// A [`Digest`] with one [`SiteReport`] per site, in input order, and
    /// every article created during the run. Site failures are reported in
    /// the digest rather than returned.
    pub async fn run(&mut self, sites: &[Site]) -> Digest {
        let mut reports = Vec::with_capacity(sites.len());
        let mut articles = Vec::new();

        for site in sites {
            let before = articles.len();
            let status = match self.process_site(site, &mut articles).await {
                Ok(status) => status,
                Err(e) if e.is_network() => {
                    error!(%site, error = %e, "Failed to fetch site");
                    SiteStatus::NetworkError(e.to_string())
                }
                Err(e) => {
                    error!(%site, error = %e, "Failed to process site");
                    SiteStatus::ProcessingError(e.to_string())
                }
            };
            info!(%site, ?status, new_articles = articles.len() - before, "Finished site");
            reports.push(SiteReport {
                site: site.clone(),
                status,
            });
        }

        info!(
            sites = sites.len(),
            articles = articles.len(),
            ledger_size = self.ledger.len(),
            "Run complete"
        );
        Digest {
            generated_at: Utc::now(),
            sites: reports,
            articles,
        }
    }

    #[instrument(level = "info", skip_all, fields(%site))]
    async fn process_site(
        &mut self,
        site: &Site,
        articles: &mut Vec<Article>,
    ) -> Result<SiteStatus, ScrapeError> {
        Url::parse(site.url()).map_err(|e| ScrapeError::InvalidUrl {
            url: site.url().to_string(),
            reason: e.to_string(),
        })?;

        let html = fetch_page(self.http, site.url()).await?;
        let candidates = extract_candidates(&html);
        if candidates.is_empty() {
            warn!("No candidate article links found");
            return Ok(SiteStatus::NoArticles);
        }

        let total = candidates.len();
        let mut skipped_seen = 0usize;
        for link in candidates {
            if self.ledger.contains(&link.href) {
                skipped_seen += 1;
                continue;
            }
            match self.process_article(site, &link).await {
                Ok(article) => {
                    self.ledger.record(&article.url).await?;
                    info!(url = %article.url, category = %article.category, "Processed article");
                    articles.push(article);
                }
                Err(e) => warn!(url = %link.href, error = %e, "Skipping article"),
            }
        }
        debug!(total, skipped_seen, "Candidates handled");

        Ok(SiteStatus::Success)
    }

    async fn process_article(
        &self,
        site: &Site,
        link: &CandidateLink,
    ) -> Result<Article, ScrapeError> {
        let text = fetch_article_text(self.http, &link.href, self.min_article_chars).await?;
        let category = classify(self.generator, &text).await;
        let summary = summarize(self.generator, &link.text, &text).await;
        Ok(Article {
            url: link.href.clone(),
            title: link.text.clone(),
            summary,
            category,
            site: site.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapeConfig;
    use crate::error::GenerationError;
    use crate::outputs::html::render_digest;
    use crate::scrapers::build_client;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeGenerator {
        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(GenerationError::Network("offline".to_string()));
            }
            if prompt.starts_with("Analyze") {
                Ok("Business".to_string())
            } else {
                Ok("A short summary.".to_string())
            }
        }
    }

    fn article_html(topic: &str) -> String {
        format!(
            r#"<html><body><div class="article-content">
                <p>This is the opening paragraph of a long report about {topic}.</p>
                <p>It continues with enough detail to clear the minimum length check easily.</p>
            </div></body></html>"#
        )
    }

    fn landing_html(base: &str, paths: &[(&str, &str)]) -> String {
        let links: String = paths
            .iter()
            .map(|(path, text)| format!(r#"<a href="{base}{path}">{text}</a>"#))
            .collect();
        format!("<html><body>{links}</body></html>")
    }

    async fn ledger_in(dir: &tempfile::TempDir, existing: &[String]) -> Ledger {
        let path = dir.path().join("processed_urls.txt");
        if !existing.is_empty() {
            std::fs::write(&path, existing.join("\n") + "\n").unwrap();
        }
        Ledger::load(&path).await.unwrap()
    }

    #[tokio::test]
    async fn test_seen_urls_are_not_refetched_and_new_ones_are_recorded() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let seen_url = format!("{base}/news/seen");

        let _landing = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(landing_html(
                &base,
                &[
                    ("/news/alpha", "Alpha story"),
                    ("/news/seen", "Old story"),
                    ("/news/beta", "Beta story"),
                    ("/news/alpha", "Alpha again"),
                    ("/tag/misc", "Misc"),
                ],
            ))
            .create_async()
            .await;
        let alpha = server
            .mock("GET", "/news/alpha")
            .with_status(200)
            .with_body(article_html("alpha"))
            .expect(1)
            .create_async()
            .await;
        let beta = server
            .mock("GET", "/news/beta")
            .with_status(200)
            .with_body(article_html("beta"))
            .expect(1)
            .create_async()
            .await;
        let seen = server
            .mock("GET", "/news/seen")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[seen_url.clone()]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();
        let site = Site::new(format!("{base}/"));

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(std::slice::from_ref(&site))
            .await;

        alpha.assert_async().await;
        beta.assert_async().await;
        seen.assert_async().await;

        assert_eq!(digest.sites.len(), 1);
        assert_eq!(digest.sites[0].status, SiteStatus::Success);
        let titles: Vec<&str> = digest.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha story", "Beta story"]);
        assert!(digest.articles.iter().all(|a| a.category == "Business"));
        assert!(digest.articles.iter().all(|a| a.summary == "A short summary."));
        assert_eq!(generator.calls(), 4);

        let on_disk = std::fs::read_to_string(dir.path().join("processed_urls.txt")).unwrap();
        assert_eq!(
            on_disk,
            format!("{seen_url}\n{base}/news/alpha\n{base}/news/beta\n")
        );
        assert!(ledger.contains(&format!("{base}/news/beta")));
    }

    #[tokio::test]
    async fn test_failing_site_does_not_stop_the_run() {
        let mut broken = mockito::Server::new_async().await;
        let _down = broken
            .mock("GET", "/")
            .with_status(500)
            .create_async()
            .await;

        let mut healthy = mockito::Server::new_async().await;
        let base = healthy.url();
        let _landing = healthy
            .mock("GET", "/")
            .with_status(200)
            .with_body(landing_html(&base, &[("/2024/05/01/story", "Dated story")]))
            .create_async()
            .await;
        let _story = healthy
            .mock("GET", "/2024/05/01/story")
            .with_status(200)
            .with_body(article_html("dates"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();
        let sites = vec![
            Site::new(format!("{}/", broken.url())),
            Site::new(format!("{base}/")),
        ];

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&sites)
            .await;

        assert!(matches!(digest.sites[0].status, SiteStatus::NetworkError(ref m) if m.contains("500")));
        assert_eq!(digest.sites[1].status, SiteStatus::Success);
        assert_eq!(digest.articles.len(), 1);
        assert_eq!(digest.articles[0].site, sites[1]);

        let html = render_digest(&digest);
        assert!(html.contains("Could not load this site"));
        assert!(html.contains("Dated story"));
    }

    #[tokio::test]
    async fn test_page_without_candidates_is_no_articles() {
        let mut server = mockito::Server::new_async().await;
        let _landing = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"<html><body><a href="/about">About us</a></body></html>"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&[Site::new(format!("{}/", server.url()))])
            .await;

        assert_eq!(digest.sites[0].status, SiteStatus::NoArticles);
        assert!(digest.articles.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_article_is_skipped_and_not_recorded() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _landing = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(landing_html(&base, &[("/news/brief", "Brief")]))
            .create_async()
            .await;
        let _brief = server
            .mock("GET", "/news/brief")
            .with_status(200)
            .with_body("<p>Just a line.</p>")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&[Site::new(format!("{base}/"))])
            .await;

        assert_eq!(digest.sites[0].status, SiteStatus::Success);
        assert!(digest.articles.is_empty());
        assert!(ledger.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_article_with_placeholders() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _landing = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(landing_html(&base, &[("/article/one", "One")]))
            .create_async()
            .await;
        let _one = server
            .mock("GET", "/article/one")
            .with_status(200)
            .with_body(article_html("quotas"))
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator {
            fail: true,
            ..Default::default()
        };

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&[Site::new(format!("{base}/"))])
            .await;

        assert_eq!(digest.articles.len(), 1);
        assert_eq!(digest.articles[0].category, crate::api::PLACEHOLDER);
        assert_eq!(digest.articles[0].summary, crate::api::PLACEHOLDER);
        assert!(ledger.contains(&format!("{base}/article/one")));
    }

    #[tokio::test]
    async fn test_url_linked_from_two_sites_is_processed_once() {
        let mut first = mockito::Server::new_async().await;
        let mut second = mockito::Server::new_async().await;
        let shared = format!("{}/news/shared", first.url());

        let _first_landing = first
            .mock("GET", "/")
            .with_status(200)
            .with_body(format!(r#"<a href="{shared}">Shared story</a>"#))
            .create_async()
            .await;
        let _second_landing = second
            .mock("GET", "/")
            .with_status(200)
            .with_body(format!(r#"<a href="{shared}">Same story, other site</a>"#))
            .create_async()
            .await;
        let article = first
            .mock("GET", "/news/shared")
            .with_status(200)
            .with_body(article_html("syndication"))
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();
        let sites = vec![
            Site::new(format!("{}/", first.url())),
            Site::new(format!("{}/", second.url())),
        ];

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&sites)
            .await;

        article.assert_async().await;
        assert_eq!(digest.articles.len(), 1);
        assert_eq!(digest.articles[0].site, sites[0]);
        assert_eq!(digest.articles[0].title, "Shared story");
        assert_eq!(digest.sites[1].status, SiteStatus::Success);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_ledger_write_failure_marks_site_and_run_continues() {
        let mut failing = mockito::Server::new_async().await;
        let base = failing.url();
        let _landing = failing
            .mock("GET", "/")
            .with_status(200)
            .with_body(landing_html(&base, &[("/news/one", "One")]))
            .create_async()
            .await;
        let _one = failing
            .mock("GET", "/news/one")
            .with_status(200)
            .with_body(article_html("disks"))
            .create_async()
            .await;

        let mut quiet = mockito::Server::new_async().await;
        let _quiet_landing = quiet
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"<a href="/about">About</a>"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        // A directory in place of the ledger file makes every append fail.
        std::fs::create_dir(dir.path().join("processed_urls.txt")).unwrap();
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();
        let sites = vec![
            Site::new(format!("{base}/")),
            Site::new(format!("{}/", quiet.url())),
        ];

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&sites)
            .await;

        assert!(matches!(
            digest.sites[0].status,
            SiteStatus::ProcessingError(ref m) if m.starts_with("ledger write failed")
        ));
        assert_eq!(digest.sites[1].status, SiteStatus::NoArticles);
        assert!(digest.articles.is_empty());
        assert!(!ledger.contains(&format!("{base}/news/one")));
    }

    #[tokio::test]
    async fn test_invalid_site_url_is_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir, &[]).await;
        let http = build_client(&ScrapeConfig::default()).unwrap();
        let generator = FakeGenerator::default();

        let digest = Pipeline::new(&http, &generator, &mut ledger, 100)
            .run(&[Site::new("not a url")])
            .await;

        assert!(matches!(
            digest.sites[0].status,
            SiteStatus::ProcessingError(_)
        ));
    }

    #[tokio::test]
    async fn test_read_sites_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.txt");
        std::fs::write(&path, "https://a.example/\n\n  https://b.example/  \n").unwrap();

        let sites = read_sites(&path).await.unwrap();
        assert_eq!(
            sites,
            vec![Site::new("https://a.example/"), Site::new("https://b.example/")]
        );
    }

    #[tokio::test]
    async fn test_missing_sites_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_sites(&dir.path().join("sites.txt")).await.is_err());
    }
}
