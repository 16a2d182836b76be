//! NHS TRUD client: login, latest release lookup and download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{redirect, Client};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};

/// TRUD host.
pub const TRUD_BASE_URL: &str = "https://isd.digital.nhs.uk";

const SESSION_COOKIE: &str = "JSESSIONID";

/// A downloadable release archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArchive {
    /// Signed download URL.
    pub url: String,
    /// Last path segment of the URL, without the query string.
    pub file_name: String,
}

impl ReleaseArchive {
    /// Builds an archive from its download URL.
    pub fn from_url(url: &str) -> Self {
        let file_name = url
            .rsplit('/')
            .next()
            .unwrap_or(url)
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            url: url.to_string(),
            file_name,
        }
    }
}

/// Extracts the download links from a TRUD releases page, newest first.
pub fn parse_release_links(html: &str, base_url: &str) -> PipelineResult<Vec<ReleaseArchive>> {
    let pattern = format!(r#"{}/download[^"]+"#, regex::escape(base_url.trim_end_matches('/')));
    let links = Regex::new(&pattern).map_err(|e| PipelineError::Trud(e.to_string()))?;
    Ok(links
        .find_iter(html)
        .map(|link| ReleaseArchive::from_url(link.as_str()))
        .collect())
}

/// Pulls the session cookie out of a `Set-Cookie` value.
fn session_cookie(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    pair.starts_with(SESSION_COOKIE).then(|| pair.to_string())
}

/// Authenticated TRUD session.
pub struct TrudClient {
    client: Client,
    base_url: String,
    cookie: Option<String>,
}

impl TrudClient {
    /// Creates a client for the public TRUD site.
    pub fn new() -> PipelineResult<Self> {
        Self::with_base_url(TRUD_BASE_URL)
    }

    /// Creates a client against another host.
    pub fn with_base_url(base_url: &str) -> PipelineResult<Self> {
        // Login answers with a redirect that carries the session cookie.
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(600))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: None,
        })
    }

    /// True once [`login`](Self::login) has stored a session.
    pub fn is_logged_in(&self) -> bool {
        self.cookie.is_some()
    }

    /// Logs in and keeps the session cookie. A no-op when already logged in.
    pub async fn login(&mut self, email: &str, password: &str) -> PipelineResult<()> {
        if self.is_logged_in() {
            return Ok(());
        }
        info!("Logging in to TRUD");

        let response = self
            .client
            .post(format!("{}/trud/security/j_spring_security_check", self.base_url))
            .form(&[
                ("j_username", email),
                ("j_password", password),
                ("commit", "LOG+IN"),
            ])
            .send()
            .await?;

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_cookie)
            .ok_or_else(|| {
                PipelineError::Trud(format!(
                    "login returned no {SESSION_COOKIE} cookie (status {})",
                    response.status()
                ))
            })?;

        self.cookie = Some(cookie);
        info!("Logged in, session cookie cached");
        Ok(())
    }

    fn session(&self) -> PipelineResult<&str> {
        self.cookie
            .as_deref()
            .ok_or_else(|| PipelineError::Trud("not logged in".to_string()))
    }

    /// Finds the newest release archive of a TRUD item.
    pub async fn latest_release(&self, item: u32) -> PipelineResult<ReleaseArchive> {
        let url = format!(
            "{}/trud/users/authenticated/filters/0/categories/8/items/{}/releases",
            self.base_url, item
        );
        let response = self.client.get(url).header(COOKIE, self.session()?).send().await?;

        if !response.status().is_success() {
            return Err(PipelineError::Trud(format!(
                "releases page for item {item} returned status {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        parse_release_links(&html, &self.base_url)?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Trud(format!("no download links for item {item}")))
    }

    /// Downloads `archive` into `zip_dir` unless a file of that name is
    /// already there. Returns the local path either way.
    pub async fn download_if_absent(
        &self,
        archive: &ReleaseArchive,
        zip_dir: &Path,
    ) -> PipelineResult<PathBuf> {
        let target = zip_dir.join(&archive.file_name);
        info!("Target zip file on TRUD is {}", archive.file_name);

        if target.exists() {
            info!("The zip file already exists, skipping download");
            return Ok(target);
        }

        let mut response = self
            .client
            .get(&archive.url)
            .header(COOKIE, self.session()?)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PipelineError::Trud(format!(
                "download of {} returned status {}",
                archive.file_name,
                response.status()
            )));
        }

        tokio::fs::create_dir_all(zip_dir).await?;
        let partial = zip_dir.join(format!("{}.partial", archive.file_name));
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, &target).await?;

        info!(
            "Downloaded {} ({})",
            archive.file_name,
            pcd_loader::format_bytes(written)
        );
        Ok(target)
    }
}
