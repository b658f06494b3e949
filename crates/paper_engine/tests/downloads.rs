use std::fs;
use std::sync::Arc;
use std::time::Duration;

use paper_engine::{
    ArchiveEntry, DirectoryPersister, DownloadError, DownloadOrchestrator, DownloadSlot,
    FailureKind, GatewaySettings, ReqwestGateway,
};
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.7\n%fake\n";
const ZIP_BYTES: &[u8] = b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0";

fn orchestrator(server: &MockServer, dir: &TempDir) -> DownloadOrchestrator {
    let settings = GatewaySettings::new(Url::parse(&server.uri()).unwrap());
    let gateway = Arc::new(ReqwestGateway::new(settings).unwrap());
    DownloadOrchestrator::new(gateway, Arc::new(DirectoryPersister::new(dir.path())))
}

fn dir_entries(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn wait_until_busy(downloads: &DownloadOrchestrator) {
    for _ in 0..200 {
        if downloads.is_busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("download never started");
}

#[test]
fn slot_admits_one_holder_at_a_time() {
    let slot = DownloadSlot::new();
    let guard = slot.try_acquire().expect("free slot");
    assert!(slot.is_busy());
    assert!(slot.clone().try_acquire().is_none());

    drop(guard);
    assert!(!slot.is_busy());
    assert!(slot.try_acquire().is_some());
}

#[tokio::test]
async fn single_download_saves_pdf_under_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .and(query_param("pdf_url", "https://arxiv.org/pdf/2401.00001.pdf"))
        .and(query_param("filename", "My_Paper_Title"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES, "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let downloads = orchestrator(&server, &dir);

    let saved = downloads
        .download_single("https://arxiv.org/pdf/2401.00001.pdf", "My Paper Title")
        .await
        .unwrap();

    assert_eq!(saved, dir.path().join("My_Paper_Title.pdf"));
    assert_eq!(fs::read(&saved).unwrap(), PDF_BYTES);
    assert!(!downloads.is_busy());
}

#[tokio::test]
async fn long_multibyte_title_is_saved_under_a_short_enough_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES, "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let downloads = orchestrator(&server, &dir);

    let saved = downloads
        .download_single("https://arxiv.org/pdf/2401.00002.pdf", &"深度学习".repeat(30))
        .await
        .unwrap();

    let name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.len() <= 255);
    assert!(name.starts_with("深度学习"));
    assert!(name.ends_with(".pdf"));
    assert_eq!(fs::read(&saved).unwrap(), PDF_BYTES);
}

#[tokio::test]
async fn concurrent_download_is_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_raw(PDF_BYTES, "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/download_all_pdfs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ZIP_BYTES, "application/zip"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let downloads = orchestrator(&server, &dir);

    let first = {
        let downloads = downloads.clone();
        tokio::spawn(async move { downloads.download_single("https://arxiv.org/pdf/1", "First").await })
    };
    wait_until_busy(&downloads).await;

    let err = downloads
        .download_single("https://arxiv.org/pdf/2", "Second")
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Busy));
    let err = downloads.download_bulk(&[]).await.unwrap_err();
    assert!(matches!(err, DownloadError::Busy));

    first.await.unwrap().unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(dir_entries(&dir), vec!["First.pdf".to_string()]);

    // Released after completion: the next call goes through.
    downloads.download_bulk(&[]).await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_download_releases_slot_and_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES, "application/pdf"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let downloads = orchestrator(&server, &dir);

    let err = downloads
        .download_single("https://arxiv.org/pdf/1", "Broken Paper")
        .await
        .unwrap_err();
    match err {
        DownloadError::Network(err) => assert_eq!(err.kind, FailureKind::HttpStatus(500)),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!downloads.is_busy());
    assert!(dir_entries(&dir).is_empty());

    downloads
        .download_single("https://arxiv.org/pdf/1", "Broken Paper")
        .await
        .unwrap();
    assert_eq!(dir_entries(&dir), vec!["Broken_Paper.pdf".to_string()]);
}

#[tokio::test]
async fn save_failure_releases_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES, "application/pdf"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let settings = GatewaySettings::new(Url::parse(&server.uri()).unwrap());
    let gateway = Arc::new(ReqwestGateway::new(settings).unwrap());
    let downloads = DownloadOrchestrator::new(gateway, Arc::new(DirectoryPersister::new(&blocker)));

    let err = downloads
        .download_single("https://arxiv.org/pdf/1", "Paper")
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Persist(_)));
    assert!(!downloads.is_busy());
    assert_eq!(dir_entries(&dir), vec!["blocker".to_string()]);
}

#[tokio::test]
async fn bulk_download_posts_ordered_pairs_and_saves_zip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download_all_pdfs"))
        .and(body_json(json!([
            ["https://arxiv.org/pdf/2", "Zeta"],
            ["https://arxiv.org/pdf/1", "Alpha Beta"]
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ZIP_BYTES, "application/zip"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let downloads = orchestrator(&server, &dir);

    let entries = vec![
        ArchiveEntry {
            pdf_url: "https://arxiv.org/pdf/2".to_string(),
            title: "Zeta".to_string(),
        },
        ArchiveEntry {
            pdf_url: "https://arxiv.org/pdf/1".to_string(),
            title: "Alpha Beta".to_string(),
        },
    ];
    let saved = downloads.download_bulk(&entries).await.unwrap();

    assert_eq!(saved, dir.path().join("papers.zip"));
    assert_eq!(fs::read(&saved).unwrap(), ZIP_BYTES);
}

#[tokio::test]
async fn empty_bulk_download_is_still_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download_all_pdfs"))
        .and(body_json(json!([])))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ZIP_BYTES, "application/zip"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let saved = orchestrator(&server, &dir).download_bulk(&[]).await.unwrap();
    assert!(saved.ends_with("papers.zip"));
}

#[tokio::test]
async fn hung_download_times_out_and_releases_slot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download_all_pdfs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_raw(ZIP_BYTES, "application/zip"),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let settings = GatewaySettings {
        download_timeout: Duration::from_millis(50),
        ..GatewaySettings::new(Url::parse(&server.uri()).unwrap())
    };
    let gateway = Arc::new(ReqwestGateway::new(settings).unwrap());
    let downloads = DownloadOrchestrator::new(gateway, Arc::new(DirectoryPersister::new(dir.path())));

    let err = downloads.download_bulk(&[]).await.unwrap_err();
    match err {
        DownloadError::Network(err) => assert_eq!(err.kind, FailureKind::Timeout),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!downloads.is_busy());
    assert!(dir_entries(&dir).is_empty());
}

#[tokio::test]
async fn dropped_download_future_releases_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_raw(PDF_BYTES, "application/pdf"),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let downloads = orchestrator(&server, &dir);

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        downloads.download_single("https://arxiv.org/pdf/1", "Slow"),
    )
    .await;
    assert!(outcome.is_err());
    assert!(!downloads.is_busy());
}
