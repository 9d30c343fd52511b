//! Shared context, credential resolution, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use reqwest::Client;
use ucb_cloud::{CloudClient, Credentials, RemoteError, SessionContext};
use ucb_config::{ConfigError, ConfigStore, ProjectRegistry, SettingKey, TargetGroupRegistry};
use url::Url;

use crate::cli::Cli;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        if err.is_rule_violation() || matches!(err, ConfigError::NoConfigDir) {
            Self::Validation(err.to_string())
        } else {
            Self::Failure(err.into())
        }
    }
}

impl From<RemoteError> for CliError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::InvalidEndpoint { .. } => Self::Validation(err.to_string()),
            other => Self::Failure(other.into()),
        }
    }
}

/// Dependencies constructed from environment flags and CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
}

impl CliDependencies {
    /// Construct the HTTP client shared by every remote call of this run.
    pub(crate) fn from_env(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let client = CloudClient::build_http_client(Duration::from_secs(cli.timeout), trace_id)
            .map_err(CliError::failure)?;
        Ok(Self { client })
    }
}

/// Credentials given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub(crate) struct CredentialOverrides {
    pub(crate) api_key: Option<String>,
    pub(crate) org_id: Option<String>,
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) store: ConfigStore,
    pub(crate) client: Client,
    pub(crate) api_url: Url,
    pub(crate) overrides: CredentialOverrides,
}

impl AppContext {
    /// Resolve credentials: flag or environment first, then the stored setting.
    pub(crate) fn credentials(&self) -> CliResult<Credentials> {
        let api_key = self.setting(self.overrides.api_key.as_deref(), SettingKey::ApiKey);
        let org_id = self.setting(self.overrides.org_id.as_deref(), SettingKey::OrgId);
        match (api_key, org_id) {
            (None, _) => Err(CliError::validation(
                "No apikey defined (pass --apikey, set UCB_APIKEY, or run `ucb config set apikey <key>`)",
            )),
            (_, None) => Err(CliError::validation(
                "No orgid defined (pass --orgid, set UCB_ORGID, or run `ucb config set orgid <id>`)",
            )),
            (Some(api_key), Some(org_id)) => Ok(Credentials::new(api_key, org_id)),
        }
    }

    /// Organisation client built from the resolved credentials.
    pub(crate) fn cloud(&self) -> CliResult<CloudClient> {
        let credentials = self.credentials()?;
        Ok(CloudClient::new(
            self.client.clone(),
            self.api_url.clone(),
            credentials,
        )?)
    }

    /// Session bound to the current project.
    pub(crate) fn session(&mut self) -> CliResult<SessionContext> {
        let cloud = self.cloud()?;
        let project = ProjectRegistry::new(&mut self.store)
            .current_project()
            .ok_or(ConfigError::NoCurrentProject)?;
        Ok(cloud.for_project(project.id))
    }

    /// Target ids of `group`, rejecting names the current project does not define.
    pub(crate) fn resolve_group(&mut self, group: &str) -> CliResult<Vec<String>> {
        let groups = TargetGroupRegistry::new(&mut self.store);
        let names = groups.list_group_names();
        if !names.iter().any(|name| name == group) {
            let choices = if names.is_empty() {
                "none defined".to_string()
            } else {
                names.join(", ")
            };
            return Err(CliError::validation(format!(
                "invalid value '{group}' for <GROUP> (possible values: {choices})"
            )));
        }
        Ok(groups.target_ids(group))
    }

    fn setting(&self, flag: Option<&str>, key: SettingKey) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| Some(self.store.get(key.as_str(), String::new())))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::Result;
    use httpmock::MockServer;
    use reqwest::Client;
    use tempfile::TempDir;
    use ucb_config::{ConfigStore, ProjectRegistry, TargetGroupRegistry, UpdateMode};

    use super::{AppContext, CredentialOverrides};

    /// Context with an empty store and credentials pointing at `server`.
    pub(crate) fn context_with(server: &MockServer, dir: &TempDir) -> Result<AppContext> {
        Ok(AppContext {
            store: ConfigStore::open(dir.path().join("config.json")),
            client: Client::new(),
            api_url: server.base_url().parse()?,
            overrides: CredentialOverrides {
                api_key: Some("key".to_string()),
                org_id: Some("acme".to_string()),
            },
        })
    }

    /// Context holding project `demo` (remote id `R1`) with group `android` = `[t1, t2]`.
    pub(crate) fn context_with_group(server: &MockServer, dir: &TempDir) -> Result<AppContext> {
        let mut ctx = context_with(server, dir)?;
        ProjectRegistry::new(&mut ctx.store).add_project("demo", "R1")?;
        TargetGroupRegistry::new(&mut ctx.store).add_or_update_targets(
            "android",
            &["t1".to_string(), "t2".to_string()],
            UpdateMode::Append,
        )?;
        Ok(ctx)
    }
}
