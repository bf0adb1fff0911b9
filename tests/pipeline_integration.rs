//! End-to-end pipeline tests: page fetch, fan-out, aggregation, export.

use std::time::Duration;

use imgrab::{
    DownloadOutcome, EngineError, FetchEngine, HttpFetcher, PageError, RetryPolicy, SessionExport,
    aggregate_and_export,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_engine() -> FetchEngine {
    FetchEngine::new(
        HttpFetcher::new(),
        RetryPolicy::new(Duration::from_millis(10)),
        None,
    )
}

async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, at: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/png")
                .set_body_bytes(bytes.to_vec()),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_downloads_aggregates_and_exports() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/gallery",
        r#"<html><head><title>Cat Pics!</title></head><body>
           <img src="/img/one.png">
           <img src="/img/two.png">
           <img src="/banner">
           </body></html>"#,
    )
    .await;
    mount_image(&mock_server, "/img/one.png", b"first image bytes").await;
    mount_image(&mock_server, "/img/two.png", b"second").await;
    // The banner answers with HTML: soft skip, zero outcome.
    mount_page(&mock_server, "/banner", "<html>ad</html>").await;

    let engine = test_engine();
    let page_url = format!("{}/gallery", mock_server.uri());
    let run = engine.run(&page_url, temp_dir.path()).await.unwrap();

    assert_eq!(run.outcomes.len(), 3);
    assert_eq!(run.outcomes.len(), run.image_urls.len());
    assert!(run.outcomes[0].success);
    assert!(run.outcomes[1].success);
    assert_eq!(run.outcomes[2], DownloadOutcome::zero());

    // Image files land under their URL basenames; the skip writes nothing.
    assert_eq!(
        std::fs::read(temp_dir.path().join("one.png")).unwrap(),
        b"first image bytes"
    );
    assert_eq!(
        std::fs::read(temp_dir.path().join("two.png")).unwrap(),
        b"second"
    );

    let summary = aggregate_and_export(
        &run.outcomes,
        &run.image_urls,
        run.title.as_deref(),
        temp_dir.path(),
    )
    .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(
        summary.total_bytes,
        (b"first image bytes".len() + b"second".len()) as u64
    );

    // Title "Cat Pics!" sanitizes to "CatPics".
    assert_eq!(
        summary.json_path,
        temp_dir.path().join("CatPics_images.json")
    );
    let txt = std::fs::read_to_string(&summary.txt_path).unwrap();
    let lines: Vec<&str> = txt.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("/img/one.png"));
    assert!(lines[2].ends_with("/banner"));
}

#[tokio::test]
async fn test_rerun_with_same_title_accumulates_links() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/gallery",
        r#"<html><head><title>T</title></head>
           <body><img src="/a.png"></body></html>"#,
    )
    .await;
    mount_image(&mock_server, "/a.png", b"img").await;

    let engine = test_engine();
    let page_url = format!("{}/gallery", mock_server.uri());

    for _ in 0..2 {
        let run = engine.run(&page_url, temp_dir.path()).await.unwrap();
        aggregate_and_export(
            &run.outcomes,
            &run.image_urls,
            run.title.as_deref(),
            temp_dir.path(),
        )
        .unwrap();
    }

    let export: SessionExport = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join("T_images.json")).unwrap(),
    )
    .unwrap();
    // Both runs' links, prior entries first, nothing dropped.
    assert_eq!(export.image_links.len(), 2);
    assert_eq!(export.image_links[0], export.image_links[1]);
    assert!(export.all_links.is_empty());
}

#[tokio::test]
async fn test_rate_limited_image_retries_and_lands_in_totals() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/gallery",
        r#"<html><body><img src="/guarded.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/guarded.png"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_image(&mock_server, "/guarded.png", b"worth the wait").await;

    let engine = test_engine();
    let page_url = format!("{}/gallery", mock_server.uri());
    let run = engine.run(&page_url, temp_dir.path()).await.unwrap();

    assert_eq!(run.outcomes.len(), 1);
    assert!(run.outcomes[0].success);
    assert_eq!(
        run.outcomes[0].bytes_written,
        b"worth the wait".len() as u64
    );
}

#[tokio::test]
async fn test_page_failure_aborts_run_without_artifacts() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("out");

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let engine = test_engine();
    let page_url = format!("{}/gone", mock_server.uri());
    let result = engine.run(&page_url, &target).await;

    match result {
        Err(EngineError::Page(PageError::Status { status, .. })) => assert_eq!(status, 404),
        other => panic!("expected page status error, got: {other:?}"),
    }
    let entries: Vec<_> = std::fs::read_dir(&target).unwrap().collect();
    assert!(entries.is_empty(), "no partial output: {entries:?}");
}

#[tokio::test]
async fn test_capped_engine_produces_identical_results() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/gallery",
        r#"<html><body>
           <img src="/1.png"><img src="/2.png"><img src="/3.png"><img src="/4.png">
           </body></html>"#,
    )
    .await;
    for at in ["/1.png", "/2.png", "/3.png", "/4.png"] {
        mount_image(&mock_server, at, b"x").await;
    }

    let page_url = format!("{}/gallery", mock_server.uri());

    let unbounded_dir = TempDir::new().unwrap();
    let unbounded = test_engine()
        .run(&page_url, unbounded_dir.path())
        .await
        .unwrap();

    let capped_dir = TempDir::new().unwrap();
    let capped_engine = FetchEngine::new(
        HttpFetcher::new(),
        RetryPolicy::new(Duration::from_millis(10)),
        Some(2),
    );
    let capped = capped_engine.run(&page_url, capped_dir.path()).await.unwrap();

    assert_eq!(unbounded.image_urls, capped.image_urls);
    let results = |run: &imgrab::PageRun| {
        run.outcomes
            .iter()
            .map(|o| (o.success, o.bytes_written))
            .collect::<Vec<_>>()
    };
    assert_eq!(results(&unbounded), results(&capped));
}
