/// Throttled, disk-cached fetcher for dkr64.com pages.
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use afopt_core::TrackVariant;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const BASE_URL: &str = "https://www.dkr64.com";

/// Cached marker for pages that returned 404/500 — a leaderboard that does
/// not exist (e.g. a car board on a hovercraft-only track).
const NOT_FOUND_SENTINEL: &str = "__DKR_NOT_FOUND__";

pub struct Fetcher {
    client: Client,
    cache_dir: PathBuf,
    cache_ttl: Duration,
    request_delay: Duration,
    session_established: bool,
    last_request: Option<Instant>,
}

#[derive(Serialize, Deserialize)]
struct CacheMeta {
    url: String,
    /// Unix seconds.
    fetched_at: u64,
}

impl Fetcher {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        cache_ttl_hours: f64,
        request_delay: Duration,
    ) -> Result<Self, String> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| format!("Failed to create cache dir {}: {e}", cache_dir.display()))?;

        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Fetcher {
            client,
            cache_dir,
            cache_ttl: Duration::from_secs_f64(cache_ttl_hours * 3600.0),
            request_delay,
            session_established: false,
            last_request: None,
        })
    }

    fn cache_key(url: &str) -> String {
        format!("{:x}", Sha256::digest(url.as_bytes()))
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.html", Self::cache_key(url)))
    }

    fn meta_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.meta", Self::cache_key(url)))
    }

    fn cache_valid(&self, url: &str) -> bool {
        let Ok(raw) = std::fs::read_to_string(self.meta_path(url)) else {
            return false;
        };
        let Ok(meta) = serde_json::from_str::<CacheMeta>(&raw) else {
            return false;
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now.saturating_sub(meta.fetched_at) < self.cache_ttl.as_secs()
    }

    /// Read cached content. None means the page was cached as non-existent.
    fn read_cache(&self, url: &str) -> Result<Option<String>, String> {
        let path = self.cache_path(url);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read cache file {}: {e}", path.display()))?;
        if content == NOT_FOUND_SENTINEL {
            Ok(None)
        } else {
            Ok(Some(content))
        }
    }

    fn write_cache(&self, url: &str, html: &str) -> Result<(), String> {
        let path = self.cache_path(url);
        std::fs::write(&path, html)
            .map_err(|e| format!("Failed to write cache file {}: {e}", path.display()))?;

        let meta = CacheMeta {
            url: url.to_string(),
            fetched_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };
        let meta_path = self.meta_path(url);
        std::fs::write(&meta_path, serde_json::to_string(&meta).unwrap())
            .map_err(|e| format!("Failed to write cache meta {}: {e}", meta_path.display()))
    }

    async fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                tokio::time::sleep(self.request_delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    /// Throwaway request to obtain the ci_session cookie.
    async fn establish_session(&mut self) -> Result<(), String> {
        if self.session_established {
            return Ok(());
        }
        self.client
            .get(BASE_URL)
            .send()
            .await
            .map_err(|e| format!("Failed to reach {BASE_URL}: {e}"))?;
        self.session_established = true;
        self.throttle().await;
        Ok(())
    }

    /// Fetch a URL, serving from cache when valid.
    ///
    /// Returns Ok(None) for pages that don't exist (404/500, negatively
    /// cached so reruns don't re-request them).
    pub async fn fetch(&mut self, url: &str) -> Result<Option<String>, String> {
        if self.cache_valid(url) {
            return self.read_cache(url);
        }

        self.establish_session().await?;
        self.throttle().await;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request to {url} failed: {e}"))?;

        let status = resp.status();
        if status.as_u16() == 404 || status.as_u16() == 500 {
            self.write_cache(url, NOT_FOUND_SENTINEL)?;
            return Ok(None);
        }
        if !status.is_success() {
            return Err(format!("{url} returned {status}"));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| format!("Failed to read body from {url}: {e}"))?;
        if html.is_empty() {
            return Err(format!(
                "Empty response from {url} (status {status}). Session cookie may have expired."
            ));
        }

        self.write_cache(url, &html)?;
        Ok(Some(html))
    }

    /// Remove all cached files.
    pub fn clear_cache(&self) -> Result<(), String> {
        let dir = std::fs::read_dir(&self.cache_dir)
            .map_err(|e| format!("Failed to list cache dir {}: {e}", self.cache_dir.display()))?;
        for dir_entry in dir {
            let dir_entry =
                dir_entry.map_err(|e| format!("Failed to read cache dir entry: {e}"))?;
            let path = dir_entry.path();
            if path.is_file() {
                std::fs::remove_file(&path)
                    .map_err(|e| format!("Failed to remove {}: {e}", path.display()))?;
            }
        }
        Ok(())
    }
}

pub fn player_url(username: &str) -> String {
    format!("{BASE_URL}/players/{username}")
}

pub fn combined_ranking_url() -> String {
    format!("{BASE_URL}/average-finish/combined/combined")
}

pub fn leaderboard_url(variant: &TrackVariant) -> String {
    variant.leaderboard_url()
}
