//! Feed client integration tests against a local HTTP server

use momentum_alpha::config::FeedConfig;
use momentum_alpha::feed::{AnnouncementFeed, FeedClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const PAGE: &str = r#"<html><body>
<table id="tbldatanew">
  <tr><th>Date</th><th>Time</th><th>Company</th><th>Subject</th><th>Category</th></tr>
  <tr>
    <td>15-01-2024</td><td>10:30:00</td><td>XYZ Limited</td>
    <td>Company XYZ Secures Contract worth Rs. 120 crore</td><td>Company Update</td>
    <td><a href="/files/xyz.pdf">Attachment</a></td>
  </tr>
  <tr>
    <td>15-01-2024</td><td>10:32:00</td><td>  </td>
    <td>Row without a company</td><td>Company Update</td>
  </tr>
</table>
</body></html>"#;

/// Serve `failures` 500 responses, then the announcements page
async fn serve(failures: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let hit = counter.fetch_add(1, Ordering::SeqCst);

            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let response = if hit < failures {
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string()
            } else {
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    PAGE.len(),
                    PAGE
                )
            };
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/corporates/ann.html"), hits)
}

fn config(url: String, max_retries: u32) -> FeedConfig {
    FeedConfig {
        url,
        timeout_secs: 5,
        max_retries,
        backoff_factor: 0.0,
        ..FeedConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_retries_after_server_error() {
    let (url, hits) = serve(1).await;
    let mut client = FeedClient::new(config(url, 3)).unwrap();

    let announcements = client.fetch().await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].company_name, "XYZ Limited");
    assert_eq!(announcements[0].hash.len(), 64);

    let stats = client.stats();
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.failed_fetches, 0);
    assert_eq!(stats.records_parsed, 2);
    assert_eq!(stats.records_dropped, 1);
    assert!(stats.last_success.is_some());
}

#[tokio::test]
async fn test_pdf_link_resolved_against_feed_url() {
    let (url, _) = serve(0).await;
    let base = url.trim_end_matches("/corporates/ann.html").to_string();
    let mut client = FeedClient::new(config(url, 1)).unwrap();

    let announcements = client.fetch().await;

    assert_eq!(
        announcements[0].pdf_url.as_deref(),
        Some(format!("{base}/files/xyz.pdf").as_str())
    );
}

#[tokio::test]
async fn test_exhausted_retries_yield_empty_batch() {
    let (url, hits) = serve(usize::MAX).await;
    let mut client = FeedClient::new(config(url, 2)).unwrap();

    let announcements = client.fetch().await;

    assert!(announcements.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(client.stats().failed_fetches, 1);
}

#[tokio::test]
async fn test_hash_stable_across_fetches() {
    let (url, _) = serve(0).await;
    let mut client = FeedClient::new(config(url, 1)).unwrap();

    let first = client.fetch().await;
    let second = client.fetch().await;

    assert_eq!(first[0].hash, second[0].hash);
    assert_eq!(client.stats().fetches, 2);
}
