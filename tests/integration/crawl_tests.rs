//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the aggregator and the sites it
//! links to, and run full crawl cycles into a temporary output directory.

use news_harvester::config::Config;
use news_harvester::crawler::{crawl_once, CrawlCycle, Scheduler, SeenSet, DETAIL_FILE_NAME};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration pointing at the mock aggregator
fn create_test_config(site: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.site_url = site.to_string();
    config.crawler.request_timeout = 1;
    config.output.directory = output.to_path_buf();
    config.schedule.period = 1;
    config
}

fn front_page(items: &[(&str, &str)]) -> String {
    let rows: String = items
        .iter()
        .map(|(id, title)| {
            format!(
                r#"<tr class="athing" id="{id}"><td class="title"><span class="titleline"><a href="item?id={id}">{title}</a></span></td></tr>
                <tr><td class="subtext">1 point</td></tr>"#
            )
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

fn detail_page(title: &str, href: &str, comment_links: &[String]) -> String {
    let anchors: String = comment_links
        .iter()
        .map(|link| format!(r#"<span class="commtext">see <a href="{link}">{link}</a></span>"#))
        .collect();
    format!(
        r#"<html><body>
        <table class="fatitem"><tr class="athing"><td><span class="titleline"><a href="{href}">{title}</a></span></td></tr></table>
        <table class="comment-tree"><tr><td>
            <a href="user?id=someone">someone</a>
            {anchors}
        </td></tr></table>
        </body></html>"#
    )
}

async fn mount_front_page(server: &MockServer, items: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(front_page(items)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn text_item(title: &str, id: &str) -> String {
    detail_page(title, &format!("item?id={id}"), &[])
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_second_cycle_skips_seen_items() {
    let server = MockServer::start().await;
    mount_front_page(&server, &[("1", "First"), ("2", "Second")]).await;
    // Each detail page must be requested exactly once across both cycles
    mount_detail(&server, "1", text_item("First", "1"), 1).await;
    mount_detail(&server, "2", text_item("Second", "2"), 1).await;

    let output = TempDir::new().unwrap();
    let cycle = CrawlCycle::new(&create_test_config(&server.uri(), output.path())).unwrap();
    let mut scheduler = Scheduler::new(cycle, Duration::from_secs(1));

    let first = scheduler.run_once().await.expect("first cycle failed");
    assert_eq!(first.discovered, 2);
    assert_eq!(first.processed, 2);
    assert!(scheduler.seen().contains("1"));
    assert!(scheduler.seen().contains("2"));

    let second = scheduler.run_once().await.expect("second cycle failed");
    assert_eq!(second.discovered, 2);
    assert_eq!(second.already_seen, 2);
    assert_eq!(second.processed, 0);
    assert_eq!(second.aborted, 0);
}

#[tokio::test]
async fn test_preseeded_items_are_never_fetched() {
    let server = MockServer::start().await;
    mount_front_page(&server, &[("10", "Old news"), ("11", "New news")]).await;
    mount_detail(&server, "10", text_item("Old news", "10"), 0).await;
    mount_detail(&server, "11", text_item("New news", "11"), 1).await;

    let output = TempDir::new().unwrap();
    let cycle = CrawlCycle::new(&create_test_config(&server.uri(), output.path())).unwrap();
    let seen: SeenSet = ["10"].into_iter().collect();
    let mut scheduler = Scheduler::with_seen(cycle, Duration::from_secs(1), seen);

    let stats = scheduler.run_once().await.unwrap();

    assert_eq!(stats.processed, 1);
    assert!(!output.path().join("Old news").exists());
    assert!(output.path().join("New news").join(DETAIL_FILE_NAME).is_file());
}

#[tokio::test]
async fn test_failed_item_is_not_retried_next_cycle() {
    let server = MockServer::start().await;
    mount_front_page(&server, &[("20", "Broken")]).await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "20"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let cycle = CrawlCycle::new(&create_test_config(&server.uri(), output.path())).unwrap();
    let mut seen = SeenSet::new();

    let first = cycle.run_cycle(&mut seen).await.unwrap();
    let second = cycle.run_cycle(&mut seen).await.unwrap();

    assert_eq!(first.aborted, 1);
    assert_eq!(second.already_seen, 1);
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_full_item_layout() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_front_page(&server, &[("30", "Show HN: a/b?")]).await;
    mount_detail(
        &server,
        "30",
        detail_page(
            "Show HN: a/b?",
            &format!("{base}/article"),
            &[format!("{base}/links/docs.html"), format!("{base}/")],
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string("article body"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/links/docs.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("docs"))
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let stats = crawl_once(&create_test_config(&base, output.path()))
        .await
        .unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.articles_saved, 1);
    assert_eq!(stats.comments_saved, 2);

    let item_dir = output.path().join("Show HN- a-b-");
    assert_eq!(
        std::fs::read_to_string(item_dir.join("Show HN- a-b-")).unwrap(),
        "article body"
    );
    assert!(std::fs::read_to_string(item_dir.join(DETAIL_FILE_NAME))
        .unwrap()
        .contains("comment-tree"));
    assert_eq!(
        std::fs::read_to_string(item_dir.join("docs.html")).unwrap(),
        "docs"
    );
    // The bare root link has no path segment and is named after the whole URL
    let names = file_names(&item_dir);
    assert_eq!(names.len(), 4);
    assert!(names.iter().any(|n| n.starts_with("http---127.0.0.1-")));
}

#[tokio::test]
async fn test_article_timeout_writes_placeholder() {
    let server = MockServer::start().await;
    let base = server.uri();
    let article_url = format!("{base}/slow-article");
    mount_front_page(&server, &[("40", "Slow site")]).await;
    mount_detail(&server, "40", detail_page("Slow site", &article_url, &[]), 1).await;
    Mock::given(method("GET"))
        .and(path("/slow-article"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let stats = crawl_once(&create_test_config(&base, output.path()))
        .await
        .unwrap();

    assert_eq!(stats.placeholders, 1);
    let article = output.path().join("Slow site").join("Slow site");
    let content = std::fs::read_to_string(&article).expect("placeholder must exist");
    assert_eq!(content, format!("Sorry =(. Url {} not available.", article_url));
}

#[tokio::test]
async fn test_failing_comment_link_is_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_front_page(&server, &[("50", "Threads")]).await;
    mount_detail(
        &server,
        "50",
        detail_page(
            "Threads",
            "item?id=50",
            &[
                format!("{base}/c/one"),
                "http://127.0.0.1:1/refused".to_string(),
                format!("{base}/c/two"),
            ],
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/c/(one|two)$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("comment page"))
        .expect(2)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let stats = crawl_once(&create_test_config(&base, output.path()))
        .await
        .unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.aborted, 0);
    assert_eq!(stats.comments_saved, 2);
    assert_eq!(stats.comments_failed, 1);

    let item_dir = output.path().join("Threads");
    assert_eq!(
        file_names(&item_dir),
        vec![DETAIL_FILE_NAME.to_string(), "one".to_string(), "two".to_string()]
    );
}

#[tokio::test]
async fn test_colliding_comment_names_are_both_kept() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_front_page(&server, &[("60", "Dupes")]).await;
    mount_detail(
        &server,
        "60",
        detail_page(
            "Dupes",
            "item?id=60",
            &[format!("{base}/same/page"), format!("{base}/other/page")],
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/(same|other)/page$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("page"))
        .expect(2)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    crawl_once(&create_test_config(&base, output.path()))
        .await
        .unwrap();

    let names = file_names(&output.path().join("Dupes"));
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"page".to_string()));
    assert!(names.iter().any(|n| n.starts_with("page_")));
}

/// Records when each request arrives, then answers after a fixed delay
struct RecordingResponder {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for RecordingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        let id = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        ResponseTemplate::new(200)
            .set_body_string(text_item(&format!("Story {id}"), &id))
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_item_concurrency_is_bounded() {
    let server = MockServer::start().await;
    mount_front_page(
        &server,
        &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d"), ("5", "e")],
    )
    .await;

    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let delay = Duration::from_millis(300);
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(RecordingResponder {
            arrivals: Arc::clone(&arrivals),
            delay,
        })
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), output.path());
    config.crawler.max_concurrent_items = 2;
    let cycle = CrawlCycle::new(&config).unwrap();

    let stats = cycle.run_cycle(&mut SeenSet::new()).await.unwrap();
    assert_eq!(stats.processed, 5);

    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 5);
    // With two permits, the third request can only start once an earlier
    // item has received its delayed response.
    let min_gap = delay.mul_f64(0.8);
    for window in arrivals.windows(3) {
        let gap = window[2].duration_since(window[0]);
        assert!(gap >= min_gap, "three items in flight within {:?}", gap);
    }
}

#[tokio::test]
async fn test_cycle_deadline_stops_waiting() {
    let server = MockServer::start().await;
    mount_front_page(&server, &[("70", "Quick"), ("71", "Stuck")]).await;
    mount_detail(&server, "70", text_item("Quick", "70"), 1).await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "71"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(text_item("Stuck", "71"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), output.path());
    config.crawler.request_timeout = 10;
    config.crawler.cycle_timeout = Some(1);
    let cycle = CrawlCycle::new(&config).unwrap();

    let started = Instant::now();
    let stats = cycle.run_cycle(&mut SeenSet::new()).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(stats.timed_out);
    assert_eq!(stats.processed, 1);
    assert!(output.path().join("Quick").is_dir());
    assert!(!output.path().join("Stuck").exists());
}
