//! Share-link creation and revocation for selected builds.

use tracing::info;

use crate::error::RemoteResult;
use crate::model::{BuildSelector, LinkSelector, ShareExpiry};
use crate::query::BuildQueryService;
use crate::session::SessionContext;

/// Creates or deletes share links for the builds a [`LinkSelector`] picks.
///
/// Calls run sequentially in target order; the first failure stops the batch
/// and links already created stay in place.
#[derive(Debug, Clone)]
pub struct ShareLinkService {
    builds: BuildQueryService,
}

impl ShareLinkService {
    /// Bind the service to a session.
    #[must_use]
    pub const fn new(session: SessionContext) -> Self {
        Self {
            builds: BuildQueryService::new(session),
        }
    }

    /// Issue one create call per selected build. Returns the number of links created.
    ///
    /// # Errors
    ///
    /// Returns the first remote failure encountered.
    pub async fn create_links(
        &self,
        target_ids: &[String],
        expiry: &ShareExpiry,
        selector: &LinkSelector,
    ) -> RemoteResult<usize> {
        let selector: BuildSelector = selector.clone().into();
        let session = self.builds.session();
        let mut created = 0;
        for target in target_ids {
            for build in self.builds.select_builds(target, &selector).await? {
                let link = session
                    .create_share(target, build.build_number, expiry)
                    .await?;
                info!(
                    build_target = %target,
                    build = build.build_number,
                    share_id = link.as_ref().map_or("", |l| l.share_id.as_str()),
                    %expiry,
                    "share link created"
                );
                created += 1;
            }
        }
        Ok(created)
    }

    /// Issue one delete call per selected build. Returns the number of links deleted.
    ///
    /// # Errors
    ///
    /// Returns the first remote failure encountered.
    pub async fn delete_links(
        &self,
        target_ids: &[String],
        selector: &LinkSelector,
    ) -> RemoteResult<usize> {
        let selector: BuildSelector = selector.clone().into();
        let session = self.builds.session();
        let mut deleted = 0;
        for target in target_ids {
            for build in self.builds.select_builds(target, &selector).await? {
                session.delete_share(target, build.build_number).await?;
                info!(
                    build_target = %target,
                    build = build.build_number,
                    "share link deleted"
                );
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
