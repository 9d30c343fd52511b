use ucb_config::ProjectRegistry;

use crate::cli::{OutputFormat, ProjectAddArgs, ProjectNameArgs, RawListArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_project_listing, render_raw_records, render_remote_projects};

pub(crate) fn handle_project_add(ctx: &mut AppContext, args: &ProjectAddArgs) -> CliResult<()> {
    let mut projects = ProjectRegistry::new(&mut ctx.store);
    let project = projects.add_project(&args.name, &args.id)?;
    println!("Project {} added (id: {}).", project.name, project.id);
    if projects.current_name().as_deref() == Some(project.name.as_str()) {
        println!("Current project: {}", project.name);
    }
    Ok(())
}

pub(crate) fn handle_project_remove(ctx: &mut AppContext, args: &ProjectNameArgs) -> CliResult<()> {
    ProjectRegistry::new(&mut ctx.store).remove_project(&args.name)?;
    println!("Project {} removed.", args.name);
    Ok(())
}

pub(crate) fn handle_project_use(ctx: &mut AppContext, args: &ProjectNameArgs) -> CliResult<()> {
    ProjectRegistry::new(&mut ctx.store).use_project(&args.name)?;
    println!("Current project: {}", args.name);
    Ok(())
}

pub(crate) async fn handle_project_list(
    ctx: &AppContext,
    args: &RawListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let cloud = ctx.cloud()?;
    if args.raw {
        let records = cloud.list_project_records().await?;
        render_raw_records(&records)
    } else {
        let projects = cloud.list_projects().await?;
        render_remote_projects(&projects, format)
    }
}

pub(crate) fn handle_project_show(ctx: &mut AppContext, format: OutputFormat) -> CliResult<()> {
    let listing = ProjectRegistry::new(&mut ctx.store).list_projects();
    render_project_listing(&listing, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::context_with;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn add(ctx: &mut AppContext, name: &str, id: &str) -> Result<()> {
        handle_project_add(
            ctx,
            &ProjectAddArgs {
                name: name.into(),
                id: id.into(),
            },
        )
        .map_err(|err| anyhow!(err.display_message()))
    }

    fn name(value: &str) -> ProjectNameArgs {
        ProjectNameArgs { name: value.into() }
    }

    #[tokio::test]
    async fn first_project_becomes_current_and_is_protected() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = TempDir::new()?;
        let mut ctx = context_with(&server, &dir)?;
        add(&mut ctx, "demo", "R1")?;
        add(&mut ctx, "next", "R2")?;

        let err = handle_project_remove(&mut ctx, &name("demo")).expect_err("current project");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("current project"));

        handle_project_use(&mut ctx, &name("next")).map_err(|err| anyhow!(err.display_message()))?;
        handle_project_remove(&mut ctx, &name("demo"))
            .map_err(|err| anyhow!(err.display_message()))?;

        let listing = ProjectRegistry::new(&mut ctx.store).list_projects();
        assert_eq!(listing.current.as_deref(), Some("next"));
        assert_eq!(listing.projects.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_and_unknown_names_are_validation_errors() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = TempDir::new()?;
        let mut ctx = context_with(&server, &dir)?;
        add(&mut ctx, "demo", "R1")?;

        let err = handle_project_add(
            &mut ctx,
            &ProjectAddArgs {
                name: "demo".into(),
                id: "R9".into(),
            },
        )
        .expect_err("duplicate");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            ProjectRegistry::new(&mut ctx.store)
                .project("demo")
                .map(|p| p.id)
                .as_deref(),
            Some("R1")
        );

        let err = handle_project_use(&mut ctx, &name("ghost")).expect_err("unknown");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn project_list_queries_the_organisation() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/orgs/acme/projects")
                .header("authorization", "Basic key");
            then.status(200)
                .json_body(json!([{"name": "Game", "projectid": "p-1"}]));
        });
        let dir = TempDir::new()?;
        let ctx = context_with(&server, &dir)?;

        handle_project_list(&ctx, &RawListArgs { raw: false }, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        handle_project_list(&ctx, &RawListArgs { raw: true }, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert_calls(2);
        Ok(())
    }

    #[tokio::test]
    async fn remote_failures_exit_with_operational_code() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/orgs/acme/projects");
            then.status(401).body("unauthorised");
        });
        let dir = TempDir::new()?;
        let ctx = context_with(&server, &dir)?;

        let err = handle_project_list(&ctx, &RawListArgs { raw: false }, OutputFormat::Json)
            .await
            .expect_err("unauthorised");
        assert_eq!(err.exit_code(), 3);
        let message = err.display_message();
        assert!(message.starts_with("GET "));
        assert!(message.contains("/orgs/acme/projects"));
        Ok(())
    }
}
