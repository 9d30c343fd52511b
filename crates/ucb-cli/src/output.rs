//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;
use ucb_cloud::{BuildInfo, BuildSelector, RemoteProject};
use ucb_config::{ProjectListing, TargetGroup};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", format_json(value)?);
    Ok(())
}

pub(crate) fn render_config_dump(path: &Path, raw: Option<&str>) {
    print!("{}", format_config_dump(path, raw));
}

pub(crate) fn render_project_listing(
    listing: &ProjectListing,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(listing)?,
        OutputFormat::Table => {
            if listing.projects.is_empty() {
                eprintln!("No project");
                return Ok(());
            }
            print!("{}", format_project_listing(listing));
        }
    }
    Ok(())
}

pub(crate) fn render_remote_projects(
    projects: &[RemoteProject],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(projects)?,
        OutputFormat::Table => {
            println!("{:<36} NAME", "PROJECT ID");
            for project in projects {
                println!("{:<36} {}", project.project_id, project.name);
            }
        }
    }
    Ok(())
}

pub(crate) fn render_target_ids(ids: &[String], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(ids)?,
        OutputFormat::Table => {
            for id in ids {
                println!("{id}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_target_groups(groups: &[TargetGroup], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(groups)?,
        OutputFormat::Table => print!("{}", format_target_groups(groups)),
    }
    Ok(())
}

pub(crate) fn render_raw_records(records: &[Value]) -> CliResult<()> {
    render_json(records)
}

pub(crate) fn render_builds(builds: &[BuildInfo], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(builds)?,
        OutputFormat::Table => print!("{}", format_build_table(builds)),
    }
    Ok(())
}

pub(crate) fn render_builds_markdown(builds: &[BuildInfo], selector: &BuildSelector) {
    print!("{}", format_builds_markdown(builds, selector));
}

pub(crate) fn format_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn format_config_dump(path: &Path, raw: Option<&str>) -> String {
    let mut out = format!("path: {}\n", path.display());
    if let Some(raw) = raw {
        out.push_str(raw);
        if !raw.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

pub(crate) fn format_project_listing(listing: &ProjectListing) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "current: {}", listing.current.as_deref().unwrap_or(""));
    for project in &listing.projects {
        let _ = writeln!(out, "{} ({})", project.name, project.id);
        for group in &project.target_groups {
            let _ = writeln!(out, "  {}: {}", group.name, group.targets.join(", "));
        }
    }
    out
}

pub(crate) fn format_target_groups(groups: &[TargetGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        if group.targets.is_empty() {
            let _ = writeln!(out, "{}: <empty>", group.name);
        } else {
            let _ = writeln!(out, "{}: {}", group.name, group.targets.join(", "));
        }
    }
    out
}

pub(crate) fn format_build_table(builds: &[BuildInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>6} {:<12} {:<12} {:<16} {:<12} {:<20} SHARE",
        "TARGET", "BUILD", "PLATFORM", "LABEL", "BRANCH", "HASH", "FINISHED"
    );
    for build in builds {
        let finished = build
            .finished
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let hash: String = build.source_hash.chars().take(12).collect();
        let favorite = if build.favorited { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:<24} {:>6} {:<12} {:<12} {:<16} {:<12} {:<20} {}",
            format!("{}{favorite}", build.target_id),
            build.build_number,
            or_dash(&build.platform),
            or_dash(&build.label),
            or_dash(&build.branch),
            or_dash(&hash),
            finished,
            build.share_link.as_deref().map_or("-", or_dash)
        );
    }
    out
}

pub(crate) fn format_builds_markdown(builds: &[BuildInfo], selector: &BuildSelector) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{selector}");
    for build in builds {
        let _ = writeln!(
            out,
            "[{}#{}]({})",
            build.target_id,
            build.build_number,
            build.share_link.as_deref().unwrap_or("")
        );
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
