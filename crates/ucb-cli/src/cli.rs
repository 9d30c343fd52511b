//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::{Instrument, debug, info_span};
use ucb_cloud::{DEFAULT_ENDPOINT, ShareExpiry};
use ucb_config::{ConfigStore, SettingKey, UpdateMode, default_path};
use ucb_telemetry::{
    LogFormat, LoggingConfig, client_version, init_logging, level_for_verbosity,
};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliDependencies, CliResult, CredentialOverrides};
use crate::commands::build::{handle_build_get, handle_build_show};
use crate::commands::config::{handle_config_dump, handle_config_set};
use crate::commands::project::{
    handle_project_add, handle_project_list, handle_project_remove, handle_project_show,
    handle_project_use,
};
use crate::commands::share::{handle_share_create, handle_share_delete};
use crate::commands::target::{
    handle_target_clear, handle_target_list, handle_target_remove, handle_target_show,
    handle_target_update,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parses CLI arguments, executes the requested command, and reports failures.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: level_for_verbosity(cli.verbose, cli.quiet),
        format: cli.log_format,
        version: env!("CARGO_PKG_VERSION"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let deps = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let span = info_span!("ucb", command = command_name, trace_id = %trace_id);
    match dispatch(cli, &deps).instrument(span).await {
        Ok(()) => {
            debug!(command = command_name, version = client_version(), "command finished");
            0
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli, deps: &CliDependencies) -> CliResult<()> {
    let store_path = match cli.config {
        Some(path) => path,
        None => default_path()?,
    };
    let mut ctx = AppContext {
        store: ConfigStore::open(store_path),
        client: deps.client.clone(),
        api_url: cli.api_url,
        overrides: CredentialOverrides {
            api_key: cli.apikey,
            org_id: cli.orgid,
        },
    };
    let format = cli.output;

    match cli.command {
        Command::Config(config) => match config {
            ConfigCommand::Set(args) => handle_config_set(&mut ctx, &args),
            ConfigCommand::Dump => handle_config_dump(&ctx),
        },
        Command::Project(project) => match project {
            ProjectCommand::Add(args) => handle_project_add(&mut ctx, &args),
            ProjectCommand::Remove(args) => handle_project_remove(&mut ctx, &args),
            ProjectCommand::Use(args) => handle_project_use(&mut ctx, &args),
            ProjectCommand::List(args) => handle_project_list(&ctx, &args, format).await,
            ProjectCommand::Show => handle_project_show(&mut ctx, format),
        },
        Command::Target(target) => match target.command.unwrap_or(TargetCommand::Show) {
            TargetCommand::Add(args) => handle_target_update(&mut ctx, &args, UpdateMode::Append),
            TargetCommand::Update(args) => {
                handle_target_update(&mut ctx, &args, UpdateMode::Replace)
            }
            TargetCommand::Remove(args) => handle_target_remove(&mut ctx, &args),
            TargetCommand::Clear(args) => handle_target_clear(&mut ctx, &args),
            TargetCommand::List(args) => handle_target_list(&mut ctx, &args, format).await,
            TargetCommand::Show => handle_target_show(&mut ctx, format),
        },
        Command::Build(build) => match build {
            BuildCommand::Show(args) => handle_build_show(&mut ctx, args, format).await,
            BuildCommand::Get(args) => handle_build_get(&mut ctx, args).await,
        },
        Command::Share(share) => match share {
            ShareCommand::Create(args) => handle_share_create(&mut ctx, args).await,
            ShareCommand::Delete(args) => handle_share_delete(&mut ctx, args).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "ucb", version, about = "Command-line client for Unity Cloud Build")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "UCB_CONFIG",
        help = "Path of the configuration document"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, global = true, env = "UCB_APIKEY", hide_env_values = true)]
    pub(crate) apikey: Option<String>,
    #[arg(long, global = true, env = "UCB_ORGID")]
    pub(crate) orgid: Option<String>,
    #[arg(
        long,
        global = true,
        env = "UCB_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_ENDPOINT
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "UCB_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub(crate) verbose: u8,
    #[arg(short, long, global = true, help = "Only log errors")]
    pub(crate) quiet: bool,
    #[arg(long, global = true, env = "UCB_LOG_FORMAT", default_value = "pretty")]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configure global settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage registered projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage target groups of the current project
    Target(TargetArgs),
    /// Show build results of a target group
    #[command(subcommand)]
    Build(BuildCommand),
    /// Create or delete share links
    #[command(subcommand)]
    Share(ShareCommand),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// Store a setting
    Set(ConfigSetArgs),
    /// Print the configuration path and raw contents
    Dump,
}

#[derive(Subcommand)]
pub(crate) enum ProjectCommand {
    /// Register a project under a local name
    Add(ProjectAddArgs),
    /// Forget a registered project
    #[command(visible_alias = "delete")]
    Remove(ProjectNameArgs),
    /// Select the current project
    Use(ProjectNameArgs),
    /// List projects of the organisation
    List(RawListArgs),
    /// Print registered projects
    Show,
}

#[derive(Args)]
pub(crate) struct TargetArgs {
    #[command(subcommand)]
    pub(crate) command: Option<TargetCommand>,
}

#[derive(Subcommand)]
pub(crate) enum TargetCommand {
    /// Create a group or append ids to it
    Add(TargetIdsArgs),
    /// Create a group or replace its ids
    Update(TargetIdsArgs),
    /// Delete a group
    Remove(TargetGroupArgs),
    /// Empty a group, keeping it defined
    Clear(TargetGroupArgs),
    /// List build targets of the current project
    List(RawListArgs),
    /// Print target groups of the current project
    Show,
}

#[derive(Subcommand)]
pub(crate) enum BuildCommand {
    /// Show builds of a target group
    Show(BuildQueryArgs),
    /// Print build records of a target group as JSON
    Get(BuildQueryArgs),
}

#[derive(Subcommand)]
pub(crate) enum ShareCommand {
    /// Create share links for the selected builds
    Create(ShareCreateArgs),
    /// Delete share links of the selected builds
    Delete(ShareDeleteArgs),
}

#[derive(Args)]
pub(crate) struct ConfigSetArgs {
    pub(crate) key: SettingKey,
    pub(crate) value: String,
}

#[derive(Args)]
pub(crate) struct ProjectAddArgs {
    pub(crate) name: String,
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct ProjectNameArgs {
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct RawListArgs {
    #[arg(long, help = "Print the records exactly as returned by the service")]
    pub(crate) raw: bool,
}

#[derive(Args)]
pub(crate) struct TargetIdsArgs {
    pub(crate) group: String,
    #[arg(required = true, num_args = 1..)]
    pub(crate) ids: Vec<String>,
}

#[derive(Args)]
pub(crate) struct TargetGroupArgs {
    pub(crate) group: String,
}

#[derive(Args)]
pub(crate) struct BuildQueryArgs {
    pub(crate) group: String,
    #[arg(long)]
    pub(crate) hash: Option<String>,
    #[arg(long)]
    pub(crate) branch: Option<String>,
    #[arg(long)]
    pub(crate) label: Option<String>,
    #[arg(short, long, help = "Print one markdown link per build")]
    pub(crate) markdown: bool,
    #[arg(long, help = "Skip the share-link lookup")]
    pub(crate) no_share: bool,
}

#[derive(Args)]
pub(crate) struct ShareCreateArgs {
    pub(crate) group: String,
    #[arg(help = "Expiry date (YYYY-MM-DD or RFC 3339)")]
    pub(crate) expiry: ShareExpiry,
    #[arg(long)]
    pub(crate) label: Option<String>,
}

#[derive(Args)]
pub(crate) struct ShareDeleteArgs {
    pub(crate) group: String,
    #[arg(long)]
    pub(crate) label: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Config(ConfigCommand::Set(_)) => "config_set",
        Command::Config(ConfigCommand::Dump) => "config_dump",
        Command::Project(ProjectCommand::Add(_)) => "project_add",
        Command::Project(ProjectCommand::Remove(_)) => "project_remove",
        Command::Project(ProjectCommand::Use(_)) => "project_use",
        Command::Project(ProjectCommand::List(_)) => "project_list",
        Command::Project(ProjectCommand::Show) => "project_show",
        Command::Target(args) => match &args.command {
            Some(TargetCommand::Add(_)) => "target_add",
            Some(TargetCommand::Update(_)) => "target_update",
            Some(TargetCommand::Remove(_)) => "target_remove",
            Some(TargetCommand::Clear(_)) => "target_clear",
            Some(TargetCommand::List(_)) => "target_list",
            Some(TargetCommand::Show) | None => "target_show",
        },
        Command::Build(BuildCommand::Show(_)) => "build_show",
        Command::Build(BuildCommand::Get(_)) => "build_get",
        Command::Share(ShareCommand::Create(_)) => "share_create",
        Command::Share(ShareCommand::Delete(_)) => "share_delete",
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use clap::CommandFactory;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Cli> {
        Ok(Cli::try_parse_from(
            std::iter::once("ucb").chain(args.iter().copied()),
        )?)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_url_rejects_invalid_input() {
        let err = parse_url("not-a-url").expect_err("invalid URL should fail");
        assert!(err.contains("invalid URL"));
    }

    #[test]
    fn bare_target_command_shows_groups() -> Result<()> {
        let cli = parse(&["target"])?;
        assert_eq!(command_label(&cli.command), "target_show");
        Ok(())
    }

    #[test]
    fn selector_flags_and_expiry_are_parsed() -> Result<()> {
        let cli = parse(&["build", "show", "android", "--label", "rc1", "-m"])?;
        let Command::Build(BuildCommand::Show(args)) = cli.command else {
            anyhow::bail!("expected build show");
        };
        assert_eq!(args.label.as_deref(), Some("rc1"));
        assert!(args.markdown);

        let cli = parse(&["share", "create", "android", "2025-06-30"])?;
        let Command::Share(ShareCommand::Create(args)) = cli.command else {
            anyhow::bail!("expected share create");
        };
        assert_eq!(args.expiry.to_rfc3339(), "2025-06-30T00:00:00Z");

        assert!(parse(&["share", "create", "android", "tomorrow"]).is_err());
        Ok(())
    }

    #[test]
    fn config_keys_are_restricted() {
        assert!(parse(&["config", "set", "apikey", "k"]).is_ok());
        assert!(parse(&["config", "set", "token", "k"]).is_err());
    }

    #[test]
    fn target_add_requires_ids() {
        assert!(parse(&["target", "add", "android"]).is_err());
        assert!(parse(&["target", "add", "android", "t1", "t2"]).is_ok());
    }

    #[test]
    fn command_label_matches_variants() -> Result<()> {
        assert_eq!(
            command_label(&parse(&["project", "delete", "demo"])?.command),
            "project_remove"
        );
        assert_eq!(
            command_label(&parse(&["build", "get", "android"])?.command),
            "build_get"
        );
        assert_eq!(
            command_label(&parse(&["share", "delete", "android", "--label", "rc1"])?.command),
            "share_delete"
        );
        Ok(())
    }

    #[tokio::test]
    async fn dispatch_runs_local_commands_against_the_given_store() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = TempDir::new()?;
        let config = dir.path().join("nested").join("config.json");
        let config_arg = config.to_string_lossy().into_owned();
        let api_url = server.base_url();
        let deps = CliDependencies {
            client: reqwest::Client::new(),
        };

        for args in [
            vec!["project", "add", "demo", "R1"],
            vec!["target", "add", "android", "t1", "t2"],
        ] {
            let mut argv = args.clone();
            argv.extend(["--config", config_arg.as_str(), "--api-url", api_url.as_str()]);
            dispatch(parse(&argv)?, &deps)
                .await
                .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        }

        let raw = std::fs::read_to_string(&config)?;
        assert!(raw.contains("\"current\": \"demo\""));
        assert!(raw.contains("\"t2\""));
        Ok(())
    }

    #[tokio::test]
    async fn remote_commands_require_credentials() -> Result<()> {
        let dir = TempDir::new()?;
        let config = dir.path().join("config.json");
        let deps = CliDependencies {
            client: reqwest::Client::new(),
        };
        let cli = parse(&[
            "project",
            "list",
            "--config",
            config.to_string_lossy().as_ref(),
            "--apikey",
            "",
            "--orgid",
            "",
        ])?;
        let err = dispatch(cli, &deps).await.expect_err("no credentials");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().starts_with("No apikey defined"));
        Ok(())
    }
}
