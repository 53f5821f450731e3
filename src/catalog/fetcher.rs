//! Catalog loader worker.

use crate::catalog::cache::{CachedPage, NeoCache};
use crate::catalog::parser::parse_records;
use crate::catalog::types::{LoadCommand, LoadResultMsg, LoadSource, LoaderChannels};
use crate::config::NeoFeedConfig;
use crate::orbital::RawElementRecord;
use anyhow::{Context, Result};
use bevy::prelude::*;
use chrono::Utc;
use std::path::Path;
use std::sync::{
    Arc, Mutex,
    mpsc::{self},
};
use std::thread;

/// NeoWs browse page size (the API maximum)
const NEO_PAGE_SIZE: u32 = 20;

/// Start the background loader thread
pub fn start_loader_worker() -> LoaderChannels {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoadCommand>();
    let (res_tx, res_rx) = mpsc::channel::<LoadResultMsg>();

    thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
        rt.block_on(async move {
            let client = reqwest::Client::new();

            while let Ok(cmd) = cmd_rx.recv() {
                let (source, generation, result) = match cmd {
                    LoadCommand::File { path, generation } => {
                        let res = load_file(&path);
                        (LoadSource::File(path), generation, res)
                    }
                    LoadCommand::NeoFeed {
                        feed,
                        page,
                        generation,
                    } => {
                        let res = load_neo_page(&client, &feed, page).await;
                        (LoadSource::NeoFeed { page }, generation, res)
                    }
                };

                let send = |msg| {
                    let _ = res_tx.send(msg);
                };

                match result {
                    Ok(records) => send(LoadResultMsg::Batch {
                        source,
                        generation,
                        records,
                    }),
                    Err(err) => {
                        warn!("Load of {} failed: {:#}", source, err);
                        send(LoadResultMsg::Failure {
                            source,
                            generation,
                            error: format!("{:#}", err),
                        })
                    }
                }
            }
        });
    });

    LoaderChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    }
}

fn load_file(path: &Path) -> Result<Vec<RawElementRecord>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_records(&body).with_context(|| format!("parsing {}", path.display()))
}

async fn load_neo_page(
    client: &reqwest::Client,
    feed: &NeoFeedConfig,
    page: u32,
) -> Result<Vec<RawElementRecord>> {
    let cache = NeoCache::new(feed.cache_expiration_hours)
        .inspect_err(|err| warn!("NeoWs cache unavailable: {}", err))
        .ok();

    if let Some(records) = cache.as_ref().and_then(|c| cached_records(c, page)) {
        return Ok(records);
    }

    let url = build_browse_url(feed, page)?;
    let body = fetch_body(client, &url).await?;
    let records = parse_records(&body)?;

    if let Some(cache) = cache {
        let entry = CachedPage {
            page,
            body,
            cached_at: Utc::now(),
        };
        if let Err(err) = cache.write(&entry) {
            warn!("Failed to cache NeoWs page {}: {}", page, err);
        }
    }
    Ok(records)
}

/// Records from a fresh cached page. An unparsable entry counts as a miss.
fn cached_records(cache: &NeoCache, page: u32) -> Option<Vec<RawElementRecord>> {
    let body = cache.fresh_body(page)?;
    match parse_records(&body) {
        Ok(records) => {
            debug!("NeoWs page {} served from cache", page);
            Some(records)
        }
        Err(err) => {
            warn!("Ignoring unreadable cached NeoWs page {}: {:#}", page, err);
            None
        }
    }
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        anyhow::bail!("HTTP {} for {}", status, redact_key(url));
    }
    Ok(body)
}

fn build_browse_url(feed: &NeoFeedConfig, page: u32) -> Result<String> {
    let mut url = reqwest::Url::parse(&feed.url)
        .with_context(|| format!("invalid NeoWs url {:?}", feed.url))?;
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("size", &NEO_PAGE_SIZE.to_string())
        .append_pair("api_key", &feed.api_key);
    Ok(url.to_string())
}

fn redact_key(url: &str) -> &str {
    url.split_once("api_key=").map_or(url, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "bevyorrery_fetcher_test_{}_{}_{}",
            test_name,
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn cache_page(cache: &NeoCache, page: u32, body: &str) {
        let entry = CachedPage {
            page,
            body: body.to_string(),
            cached_at: Utc::now(),
        };
        cache.write(&entry).expect("write cache entry");
    }

    #[test]
    fn test_unparsable_cached_page_is_a_miss() {
        let dir = unique_temp_dir("bad_cache");
        let cache = NeoCache::new_in_dir(dir.clone(), 24).expect("create cache");
        cache_page(&cache, 0, r#"{ "unexpected": true }"#);
        assert!(cached_records(&cache, 0).is_none());

        cache_page(&cache, 1, r#"[ { "name": "Ceres" } ]"#);
        let records = cached_records(&cache, 1).expect("fresh cached page");
        assert_eq!(records.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_browse_url_carries_paging_and_key() {
        let feed = NeoFeedConfig {
            api_key: "abc123".to_string(),
            ..Default::default()
        };
        let url = build_browse_url(&feed, 3).expect("valid url");
        assert!(url.starts_with("https://api.nasa.gov/neo/rest/v1/neo/browse?"));
        assert!(url.contains("page=3"), "url: {}", url);
        assert!(url.contains("size=20"), "url: {}", url);
        assert!(url.contains("api_key=abc123"), "url: {}", url);
        assert!(!redact_key(&url).contains("abc123"));
    }

    #[test]
    fn test_invalid_feed_url_is_an_error() {
        let feed = NeoFeedConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(build_browse_url(&feed, 0).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("bevyorrery-definitely-missing.json");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_worker_round_trip_for_file() {
        let dir = unique_temp_dir("worker");
        let path = dir.join("catalog.json");
        std::fs::write(&path, r#"[ { "name": "Ceres" } ]"#).expect("write catalog");

        let channels = start_loader_worker();
        channels
            .cmd_tx
            .send(LoadCommand::File {
                path: path.clone(),
                generation: 4,
            })
            .expect("send command");
        let msg = channels
            .res_rx
            .lock()
            .expect("lock")
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("worker answers");
        match msg {
            LoadResultMsg::Batch {
                generation,
                records,
                ..
            } => {
                assert_eq!(generation, 4);
                assert_eq!(records.len(), 1);
            }
            other => panic!("expected batch, got {:?}", other),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
