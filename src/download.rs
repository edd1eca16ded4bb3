//! HTTP access to the archive: the directory index and individual daily files.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use futures::StreamExt;
use reqwest::{Client, Url};
use tempfile::NamedTempFile;

use crate::error::SyncError;

/// Fetches a directory index page.
pub async fn fetch_listing(client: &Client, url: &Url) -> Result<String, SyncError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| SyncError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(SyncError::Listing {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response.text().await.map_err(|source| SyncError::Transport {
        url: url.to_string(),
        source,
    })
}

/// Streams `url` into `dir/file_name`.
///
/// The body is written to a temporary file in `dir` and renamed into place
/// once complete, so the final name only ever refers to a whole file.
pub async fn download_file(
    client: &Client,
    url: &Url,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, SyncError> {
    let transport = |source| SyncError::Transport {
        url: url.to_string(),
        source,
    };
    let io_error = |path: &Path, source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };

    let response = client.get(url.clone()).send().await.map_err(transport)?;

    if !response.status().is_success() {
        return Err(SyncError::Fetch {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let mut file = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transport)?;
        file.write_all(&chunk).map_err(|e| io_error(file.path(), e))?;
    }
    file.as_file().sync_all().map_err(|e| io_error(file.path(), e))?;

    let destination = dir.join(file_name);
    file.persist(&destination)
        .map_err(|e| io_error(&destination, e.error))?;

    Ok(destination)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    #[tokio::test]
    async fn should_download_whole_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/202306/a.20230601.nc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let url = Url::parse(&format!("{}/202306/a.20230601.nc", server.uri())).unwrap();

        let saved = download_file(&Client::new(), &url, tmp.path(), "a.20230601.nc")
            .await
            .unwrap();

        assert_eq!(saved, tmp.path().join("a.20230601.nc"));
        assert_eq!(fs::read(&saved).unwrap(), vec![7u8; 4096]);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn should_leave_nothing_behind_on_failed_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let url = Url::parse(&format!("{}/202306/a.20230601.nc", server.uri())).unwrap();

        let result = download_file(&Client::new(), &url, tmp.path(), "a.20230601.nc").await;

        assert!(matches!(result, Err(SyncError::Fetch { .. })));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn should_report_failed_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/202306/", server.uri())).unwrap();
        let result = fetch_listing(&Client::new(), &url).await;

        assert!(matches!(result, Err(SyncError::Listing { status, .. }) if status == 503));
    }
}
