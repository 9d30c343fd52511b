//! Remote calls scoped to one project of one organisation.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::client::{CloudClient, SEARCH_PAGE_SIZE};
use crate::error::RemoteResult;
use crate::model::{BuildInfo, ShareExpiry, ShareLink};

/// Explicit session handed to the query and share services.
#[derive(Debug, Clone)]
pub struct SessionContext {
    client: CloudClient,
    project_id: String,
}

impl SessionContext {
    /// Bind `client` to a remote project.
    #[must_use]
    pub fn new(client: CloudClient, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
        }
    }

    /// Remote project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Underlying organisation client.
    #[must_use]
    pub const fn client(&self) -> &CloudClient {
        &self.client
    }

    /// Raw build target records of the project.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn list_build_target_records(&self) -> RemoteResult<Vec<Value>> {
        let url = self.project_url(&["buildtargets"], &[])?;
        self.client.get_records(url).await
    }

    /// Build target ids of the project, in service order.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn list_build_targets(&self) -> RemoteResult<Vec<String>> {
        let records = self.list_build_target_records().await?;
        Ok(records
            .iter()
            .filter_map(|record| record.get("buildtargetid").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Latest build of `target`, decoded from the first record of the
    /// latest-per-platform listing. `None` when the listing is empty.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn latest_build(&self, target: &str) -> RemoteResult<Option<BuildInfo>> {
        let url = self.project_url(
            &["buildtargets", target, "builds"],
            &[("latestBuildPerPlatformOnly", "true")],
        )?;
        let records = self.client.get_records(url).await?;
        Ok(records
            .first()
            .and_then(|record| BuildInfo::from_record(record, target)))
    }

    /// First page of builds of `target`, at most [`SEARCH_PAGE_SIZE`] records.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn builds_page(&self, target: &str) -> RemoteResult<Vec<BuildInfo>> {
        let page_size = SEARCH_PAGE_SIZE.to_string();
        let url = self.project_url(
            &["buildtargets", target, "builds"],
            &[("per_page", page_size.as_str()), ("page", "1")],
        )?;
        let records = self.client.get_records(url).await?;
        Ok(records
            .iter()
            .filter_map(|record| BuildInfo::from_record(record, target))
            .collect())
    }

    /// Existing share link of a build. Every failure, not-found included, reads as `None`.
    pub async fn build_share(&self, target: &str, build: u64) -> Option<ShareLink> {
        let url = match self.share_url(target, build) {
            Ok(url) => url,
            Err(err) => {
                debug!(error = %err, build_target = target, build, "share lookup skipped");
                return None;
            }
        };
        match self.client.send(Method::GET, url, None).await {
            Ok(body) => share_from_body(&body),
            Err(err) => {
                debug!(error = %err, build_target = target, build, "no share link");
                None
            }
        }
    }

    /// Create a share link for a build expiring at `expiry`.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn create_share(
        &self,
        target: &str,
        build: u64,
        expiry: &ShareExpiry,
    ) -> RemoteResult<Option<ShareLink>> {
        let url = self.share_url(target, build)?;
        let payload = json!({ "shareExpiry": expiry.to_rfc3339() });
        let body = self.client.send(Method::POST, url, Some(&payload)).await?;
        Ok(share_from_body(&body))
    }

    /// Revoke the share link of a build.
    ///
    /// # Errors
    ///
    /// Propagates transport and status failures.
    pub async fn delete_share(&self, target: &str, build: u64) -> RemoteResult<()> {
        let url = self.share_url(target, build)?;
        self.client.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    fn share_url(&self, target: &str, build: u64) -> RemoteResult<Url> {
        let build = build.to_string();
        self.project_url(
            &["buildtargets", target, "builds", build.as_str(), "share"],
            &[],
        )
    }

    fn project_url(&self, tail: &[&str], query: &[(&str, &str)]) -> RemoteResult<Url> {
        let mut segments = vec![
            "orgs",
            self.client.org_id(),
            "projects",
            self.project_id.as_str(),
        ];
        segments.extend_from_slice(tail);
        self.client.url(&segments, query)
    }
}

/// Share responses are either a single record or an array holding one.
fn share_from_body(body: &Value) -> Option<ShareLink> {
    match body {
        Value::Array(records) => records.first().and_then(ShareLink::from_record),
        Value::Object(_) => ShareLink::from_record(body),
        _ => None,
    }
}
