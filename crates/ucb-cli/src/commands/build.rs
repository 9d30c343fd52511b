use ucb_cloud::{BuildInfo, BuildQueryService, BuildSelector};

use crate::cli::{BuildQueryArgs, OutputFormat};
use crate::client::{AppContext, CliResult};
use crate::output::{format_builds_markdown, format_json, render_builds, render_builds_markdown};

pub(crate) async fn handle_build_show(
    ctx: &mut AppContext,
    args: BuildQueryArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let markdown = args.markdown;
    let (builds, selector) = query_builds(ctx, args).await?;
    if markdown {
        render_builds_markdown(&builds, &selector);
        Ok(())
    } else {
        render_builds(&builds, format)
    }
}

/// Same selection as `build show`, printed as JSON records unless `--markdown` is set.
pub(crate) async fn handle_build_get(ctx: &mut AppContext, args: BuildQueryArgs) -> CliResult<()> {
    let markdown = args.markdown;
    let (builds, selector) = query_builds(ctx, args).await?;
    print!("{}", format_build_records(&builds, &selector, markdown)?);
    Ok(())
}

fn format_build_records(
    builds: &[BuildInfo],
    selector: &BuildSelector,
    markdown: bool,
) -> CliResult<String> {
    if markdown {
        Ok(format_builds_markdown(builds, selector))
    } else {
        format_json(builds).map(|text| text + "\n")
    }
}

async fn query_builds(
    ctx: &mut AppContext,
    args: BuildQueryArgs,
) -> CliResult<(Vec<BuildInfo>, BuildSelector)> {
    let session = ctx.session()?;
    let target_ids = ctx.resolve_group(&args.group)?;
    let selector = BuildSelector::from_flags(args.hash, args.branch, args.label);
    let builds = BuildQueryService::new(session)
        .with_share_links(!args.no_share)
        .query(&target_ids, &selector)
        .await?;
    Ok((builds, selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::context_with_group;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn args(group: &str) -> BuildQueryArgs {
        BuildQueryArgs {
            group: group.into(),
            hash: None,
            branch: None,
            label: None,
            markdown: false,
            no_share: false,
        }
    }

    #[tokio::test]
    async fn latest_query_resolves_group_and_share_links() -> Result<()> {
        let server = MockServer::start_async().await;
        let mut latest = Vec::new();
        let mut shares = Vec::new();
        for (target, build) in [("t1", 3), ("t2", 5)] {
            latest.push(server.mock(|when, then| {
                when.method(GET)
                    .path(format!("/orgs/acme/projects/R1/buildtargets/{target}/builds"))
                    .query_param("latestBuildPerPlatformOnly", "true");
                then.status(200).json_body(json!([{"build": build}]));
            }));
            shares.push(server.mock(|when, then| {
                when.method(GET).path(format!(
                    "/orgs/acme/projects/R1/buildtargets/{target}/builds/{build}/share"
                ));
                then.status(404);
            }));
        }
        let dir = TempDir::new()?;
        let mut ctx = context_with_group(&server, &dir)?;

        let mut markdown = args("android");
        markdown.markdown = true;
        handle_build_show(&mut ctx, markdown, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        for mock in latest.iter().chain(shares.iter()) {
            mock.assert_calls(1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn no_share_skips_lookups_and_hash_wins_over_label() -> Result<()> {
        let server = MockServer::start_async().await;
        let mut pages = Vec::new();
        let mut shares = Vec::new();
        for target in ["t1", "t2"] {
            pages.push(server.mock(|when, then| {
                when.method(GET)
                    .path(format!("/orgs/acme/projects/R1/buildtargets/{target}/builds"))
                    .query_param("per_page", "500");
                then.status(200).json_body(json!([
                    {"build": 2, "label": "rc1", "lastBuiltRevision": "abc"},
                    {"build": 1, "label": "rc1", "lastBuiltRevision": "def"}
                ]));
            }));
            shares.push(server.mock(|when, then| {
                when.method(GET).path(format!(
                    "/orgs/acme/projects/R1/buildtargets/{target}/builds/1/share"
                ));
                then.status(200).json_body(json!({"shareid": "x"}));
            }));
        }
        let dir = TempDir::new()?;
        let mut ctx = context_with_group(&server, &dir)?;

        let mut query = args("android");
        query.hash = Some("def".into());
        query.label = Some("rc1".into());
        query.no_share = true;
        let (builds, selector) = query_builds(&mut ctx, query)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(selector, BuildSelector::ByHash("def".into()));
        assert_eq!(builds.len(), 2);
        assert!(builds.iter().all(|b| b.build_number == 1));
        for page in &pages {
            page.assert_calls(1);
        }
        for share in &shares {
            share.assert_calls(0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn build_get_honours_markdown_flag() -> Result<()> {
        let server = MockServer::start_async().await;
        let mut latest = Vec::new();
        for (target, build) in [("t1", 1), ("t2", 7)] {
            latest.push(server.mock(|when, then| {
                when.method(GET)
                    .path(format!("/orgs/acme/projects/R1/buildtargets/{target}/builds"))
                    .query_param("latestBuildPerPlatformOnly", "true");
                then.status(200).json_body(json!([{"build": build}]));
            }));
        }
        let dir = TempDir::new()?;
        let mut ctx = context_with_group(&server, &dir)?;

        let mut query = args("android");
        query.markdown = true;
        query.no_share = true;
        handle_build_get(&mut ctx, query)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        let mut query = args("android");
        query.no_share = true;
        let (builds, selector) = query_builds(&mut ctx, query)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        let markdown = format_build_records(&builds, &selector, true)
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(markdown, "latest\n[t1#1]()\n[t2#7]()\n");

        let records = format_build_records(&builds, &selector, false)
            .map_err(|err| anyhow!(err.display_message()))?;
        let parsed: serde_json::Value = serde_json::from_str(&records)?;
        assert_eq!(parsed[0]["targetId"], "t1");
        assert_eq!(parsed[1]["buildNumber"], 7);
        for mock in &latest {
            mock.assert_calls(2);
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_group_is_rejected_before_any_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let any = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!([]));
        });
        let dir = TempDir::new()?;
        let mut ctx = context_with_group(&server, &dir)?;

        let err = handle_build_get(&mut ctx, args("ios"))
            .await
            .expect_err("unknown group");
        assert_eq!(err.exit_code(), 2);
        any.assert_calls(0);
        Ok(())
    }
}
