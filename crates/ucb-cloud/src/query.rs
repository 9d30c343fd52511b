//! Build lookup across the targets of a group.

use tracing::{debug, warn};

use crate::error::RemoteResult;
use crate::model::{BuildInfo, BuildSelector};
use crate::session::SessionContext;

/// Resolves target ids into build records, one target at a time.
#[derive(Debug, Clone)]
pub struct BuildQueryService {
    session: SessionContext,
    share_links: bool,
}

impl BuildQueryService {
    /// Service without share-link resolution.
    #[must_use]
    pub const fn new(session: SessionContext) -> Self {
        Self {
            session,
            share_links: false,
        }
    }

    /// Toggle the per-build share-link lookup.
    #[must_use]
    pub const fn with_share_links(mut self, enabled: bool) -> Self {
        self.share_links = enabled;
        self
    }

    /// Session the service talks through.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Builds selected by `selector` for every id in `target_ids`, concatenated
    /// in target order.
    ///
    /// A target without any build contributes nothing. With share links enabled
    /// every returned build carries `share_link`, empty when the lookup found none.
    ///
    /// # Errors
    ///
    /// The first transport, status or decode failure of a build listing aborts
    /// the query.
    pub async fn query(
        &self,
        target_ids: &[String],
        selector: &BuildSelector,
    ) -> RemoteResult<Vec<BuildInfo>> {
        let mut results = Vec::new();
        for target in target_ids {
            let mut builds = self.select_builds(target, selector).await?;
            if self.share_links {
                for build in &mut builds {
                    let link = self.session.build_share(target, build.build_number).await;
                    build.attach_share_link(link);
                }
            }
            results.extend(builds);
        }
        debug!(
            targets = target_ids.len(),
            builds = results.len(),
            %selector,
            "build query finished"
        );
        Ok(results)
    }

    pub(crate) async fn select_builds(
        &self,
        target: &str,
        selector: &BuildSelector,
    ) -> RemoteResult<Vec<BuildInfo>> {
        if *selector == BuildSelector::Latest {
            return Ok(match self.session.latest_build(target).await? {
                Some(build) => vec![build],
                None => {
                    warn!(build_target = target, "no builds found; skipping target");
                    Vec::new()
                }
            });
        }

        let page = self.session.builds_page(target).await?;
        Ok(page
            .into_iter()
            .filter(|build| selector.matches(build))
            .collect())
    }
}
