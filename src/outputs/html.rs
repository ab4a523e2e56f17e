//! Static tabbed HTML digest.
//!
//! One tab per configured site, in `sites.txt` order. Inside a tab the
//! site's articles are grouped under category headings sorted
//! alphabetically; within a category articles keep discovery order.
//!
//! ```text
//! <div class="tab">      one button per site
//! <div id="site-N">      one panel per site
//!   <h2>Business</h2>
//!   <div class="article">title, summary, link</div>
//! ```

use crate::models::{Article, Digest, SiteReport, SiteStatus};
use crate::utils::html_escape;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const STYLESHEET: &str = "style.css";

const TAB_SCRIPT: &str = r#"<script>
function openSite(evt, siteId) {
  var panels = document.getElementsByClassName("tabcontent");
  for (var i = 0; i < panels.length; i++) {
    panels[i].style.display = "none";
  }
  var buttons = document.getElementsByClassName("tablinks");
  for (var i = 0; i < buttons.length; i++) {
    buttons[i].className = buttons[i].className.replace(" active", "");
  }
  document.getElementById(siteId).style.display = "block";
  evt.currentTarget.className += " active";
}
document.addEventListener("DOMContentLoaded", function () {
  var first = document.getElementsByClassName("tablinks")[0];
  if (first) {
    first.click();
  }
});
</script>
"#;

/// Render the whole digest document.
pub fn render_digest(digest: &Digest) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>My News Feed</title>\n");
    writeln!(out, "<link rel=\"stylesheet\" href=\"{STYLESHEET}\">").unwrap();
    out.push_str("</head>\n<body>\n<h1>Today's News</h1>\n");
    writeln!(
        out,
        "<p><em>Last updated: {}</em></p>\n<hr>",
        digest.generated_at.format("%Y-%m-%d %H:%M UTC")
    )
    .unwrap();

    out.push_str("<div class=\"tab\">\n");
    for (i, report) in digest.sites.iter().enumerate() {
        writeln!(
            out,
            "<button class=\"tablinks\" onclick=\"openSite(event, 'site-{i}')\">{}</button>",
            html_escape(&report.site.display_name())
        )
        .unwrap();
    }
    out.push_str("</div>\n");

    for (i, report) in digest.sites.iter().enumerate() {
        writeln!(out, "<div id=\"site-{i}\" class=\"tabcontent\">").unwrap();
        render_site_panel(&mut out, digest, report);
        out.push_str("</div>\n");
    }

    out.push_str(TAB_SCRIPT);
    out.push_str("</body>\n</html>\n");
    out
}

fn render_site_panel(out: &mut String, digest: &Digest, report: &SiteReport) {
    let message = match &report.status {
        SiteStatus::NetworkError(e) | SiteStatus::ProcessingError(e) => {
            writeln!(
                out,
                "<p class=\"error\">Could not load this site: {}</p>",
                html_escape(e)
            )
            .unwrap();
            return;
        }
        SiteStatus::NoArticles => "No article links were found on this page.",
        SiteStatus::Success => "No new articles since the last update.",
    };

    let by_category = group_by_category(digest.articles_for(&report.site));
    if by_category.is_empty() {
        writeln!(out, "<p class=\"empty\">{message}</p>").unwrap();
        return;
    }

    for (category, articles) in by_category {
        writeln!(out, "<h2>{}</h2>", html_escape(category)).unwrap();
        for article in articles {
            render_article(out, article);
        }
    }
}

/// Group articles by category label. Labels come out sorted; each group
/// keeps the order the articles were given in.
pub fn group_by_category<'a>(
    articles: impl Iterator<Item = &'a Article>,
) -> BTreeMap<&'a str, Vec<&'a Article>> {
    let mut groups: BTreeMap<&str, Vec<&Article>> = BTreeMap::new();
    for article in articles {
        groups.entry(article.category.as_str()).or_default().push(article);
    }
    groups
}

fn render_article(out: &mut String, article: &Article) {
    out.push_str("<div class=\"article\">\n");
    writeln!(out, "<h3>{}</h3>", html_escape(&article.title)).unwrap();
    writeln!(out, "<p>{}</p>", html_escape(&article.summary)).unwrap();
    writeln!(
        out,
        "<a href=\"{}\" target=\"_blank\">Read full article</a>",
        html_escape(&article.url)
    )
    .unwrap();
    out.push_str("</div>\n");
}

/// Render `digest` and overwrite the file at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_digest(digest: &Digest, path: &Path) -> Result<(), Box<dyn Error>> {
    let html = render_digest(digest);
    fs::write(path, html).await?;
    info!(
        sites = digest.sites.len(),
        articles = digest.articles.len(),
        "Wrote HTML digest"
    );
    Ok(())
}
