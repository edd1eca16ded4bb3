use anyhow::Result;
use reqwest::Client;

use crate::{cache::sync::synchronize, cache::MonthCache, config::Config, window::YearMonth};

use super::{reconcile_month, RunSummary};

pub async fn cache(config: &Config, period: YearMonth) -> Result<RunSummary> {
    let client = Client::new();
    let mut summary = RunSummary::new("cache");

    refresh_month(&client, config, period, &mut summary).await?;

    Ok(summary)
}

/// Mirrors the archive's files for `period` into its month cache, then
/// drops the preliminary files that now have a final revision.
pub async fn refresh_month(
    client: &Client,
    config: &Config,
    period: YearMonth,
    summary: &mut RunSummary,
) -> Result<MonthCache> {
    let report = synchronize(client, config, period).await?;
    summary.listed += report.listed;
    summary.downloaded += report.downloaded.len();
    if report.listing_failed {
        summary.listing_failures += 1;
    }

    reconcile_month(config, period, summary)
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
    use crate::config::Workspace;

    #[tokio::test]
    async fn should_download_final_and_evict_preliminary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/202306/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="oisst-avhrr-v02r01.20230601.nc">oisst-avhrr-v02r01.20230601.nc</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/202306/oisst-avhrr-v02r01.20230601.nc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"final".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let config = Config::resolve(
            Workspace::Docker,
            Some(tmp.path().to_path_buf()),
            &server.uri(),
            false,
        )
        .unwrap();
        let dir = config.month_cache_dir(6);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("oisst-avhrr-v02r01.20230601_preliminary.nc"), b"prelim").unwrap();

        let period = YearMonth::new(2023, 6).unwrap();
        let summary = cache(&config, period).await.unwrap();

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.evicted, 1);
        assert_eq!(summary.listing_failures, 0);
        assert!(!dir.join("oisst-avhrr-v02r01.20230601_preliminary.nc").exists());
        assert_eq!(
            fs::read(dir.join("oisst-avhrr-v02r01.20230601.nc")).unwrap(),
            b"final"
        );
    }
}
