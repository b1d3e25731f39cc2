//! End-to-end tests driving a whole session against a mock HTTP server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use podpick::{
    DownloadMode, ProgressEvent, ProgressReporter, Prompter, ReqwestClient, SessionError,
    SessionOptions, format_progress, run_session,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressReporter for Recorder {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Fails the test if anything asks the user
struct NoPrompts;

#[async_trait]
impl Prompter for NoPrompts {
    async fn ask(&self, filename: &str) -> std::io::Result<Option<String>> {
        panic!("unexpected prompt for {filename}");
    }
}

fn pilot_feed(server_uri: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Show</title>
    <description>A show</description>
    <item>
      <title>Show: Pilot</title>
      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
      <enclosure url="{server_uri}/audio/pilot.mp3" length="100" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#
    )
}

async fn setup_server(audio: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pilot_feed(&server.uri())))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/audio/pilot.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn all_mode_downloads_pilot_with_full_progress() {
    let audio: Vec<u8> = (0..100u8).collect();
    let server = setup_server(audio.clone()).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let recorder = Arc::new(Recorder::default());

    let options = SessionOptions {
        output_dir: temp_dir.path().to_path_buf(),
        mode: DownloadMode::All,
    };

    let summary = run_session(
        &ReqwestClient::new(),
        &format!("{}/feed.xml", server.uri()),
        &options,
        &NoPrompts,
        recorder.clone(),
    )
    .await
    .expect("session should succeed");

    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.failed, 0);

    let file = temp_dir.path().join("20060102-Show- Pilot.mp3");
    assert_eq!(std::fs::read(&file).expect("episode file"), audio);

    let events = recorder.events.lock().unwrap();
    let last_progress = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::DownloadProgress {
                bytes_downloaded,
                total_bytes,
                ..
            } => Some(format_progress(*bytes_downloaded, *total_bytes)),
            _ => None,
        })
        .last()
        .expect("at least one progress update");
    assert_eq!(last_progress, "100.0% complete");

    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::DownloadCompleted { filename, bytes_downloaded: 100 }
            if filename == "20060102-Show- Pilot.mp3"
    )));
}

#[tokio::test]
async fn existing_episode_makes_no_enclosure_request() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp_dir.path().join("20060102-Show- Pilot.mp3"), b"old").unwrap();

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pilot_feed(&server.uri())))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/audio/pilot.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let options = SessionOptions {
        output_dir: temp_dir.path().to_path_buf(),
        mode: DownloadMode::All,
    };

    let summary = run_session(
        &ReqwestClient::new(),
        &format!("{}/feed.xml", server.uri()),
        &options,
        &NoPrompts,
        Arc::new(Recorder::default()),
    )
    .await
    .expect("session should succeed");

    assert_eq!(summary.already_present, 1);
    assert_eq!(
        std::fs::read(temp_dir.path().join("20060102-Show- Pilot.mp3")).unwrap(),
        b"old"
    );
}

#[tokio::test]
async fn missing_feed_is_fatal() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let options = SessionOptions {
        output_dir: temp_dir.path().to_path_buf(),
        mode: DownloadMode::All,
    };

    let result = run_session(
        &ReqwestClient::new(),
        &format!("{}/feed.xml", server.uri()),
        &options,
        &NoPrompts,
        Arc::new(Recorder::default()),
    )
    .await;

    assert!(matches!(result, Err(SessionError::Feed(_))));
}
