//! Run settings, resolved once at startup

use anyhow::{Context, Result, bail};
use issue_manager_config::{ConfigFormat, PolicySet, load_config, parse_config};
use issue_manager_core::{ExecutionMode, Trigger};
use issue_manager_github::{GithubConfig, GithubToken, RepoRef};
use std::time::Duration;
use tracing::info;

use crate::Args;
use crate::event::trigger_from_event;

/// Everything a run needs. Nothing below `main` reads the environment.
#[derive(Debug)]
pub struct Settings {
    pub policies: PolicySet,
    pub github: GithubConfig,
    pub trigger: Trigger,
    pub mode: ExecutionMode,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        let policies = load_policies(args)?;

        let repo = RepoRef::parse(&args.repository).context("Invalid GITHUB_REPOSITORY")?;

        let token = match args.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => GithubToken::new(token),
            _ => bail!("No API token given (set INPUT_TOKEN or pass --token)"),
        };

        let trigger = trigger_from_event(args.event_path.as_deref(), args.event_name.as_deref())?;

        let mode = if args.dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Live
        };

        info!(
            repo = %repo,
            policy_count = policies.len(),
            trigger = ?trigger,
            dry_run = args.dry_run,
            "Settings resolved"
        );

        Ok(Self {
            policies,
            github: GithubConfig {
                api_base: args.api_url.clone(),
                token,
                repo,
                request_timeout: Duration::from_secs(args.request_timeout_secs),
            },
            trigger,
            mode,
        })
    }

    /// Owner part of the repository, allowed to close by directive
    pub fn owner(&self) -> &str {
        &self.github.repo.owner
    }
}

/// A config file takes precedence over inline JSON
fn load_policies(args: &Args) -> Result<PolicySet> {
    if let Some(path) = &args.config_file {
        let policies = load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?;
        info!(config_path = %path.display(), "Configuration loaded");
        return Ok(policies);
    }

    match args.config.as_deref().map(str::trim) {
        Some(inline) if !inline.is_empty() => {
            let policies = parse_config(inline, ConfigFormat::Json)
                .context("Failed to parse inline configuration")?;
            info!("Inline configuration loaded");
            Ok(policies)
        }
        _ => bail!("No configuration given (set INPUT_CONFIG or pass --config-file)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "issue-manager",
            "--repository",
            "octo-org/hello-world",
            "--token",
            "ghp_test",
            "--event-path",
            "/nonexistent/event.json",
        ];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn inline_config() {
        let args = parse(&["--config", r#"{"waiting": {"delay": "P3D"}}"#]);
        let settings = Settings::from_args(&args).unwrap();

        assert_eq!(settings.policies.len(), 1);
        assert_eq!(settings.owner(), "octo-org");
        assert_eq!(settings.trigger, Trigger::Sweep);
        assert_eq!(settings.mode, ExecutionMode::Live);
    }

    #[test]
    fn config_file_wins() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[waiting]\ndelay = \"P3D\"\n\n[question]\ndelay = 3600").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = parse(&[
            "--config",
            r#"{"only-inline": {}}"#,
            "--config-file",
            &path,
            "--dry-run",
        ]);
        let settings = Settings::from_args(&args).unwrap();

        let keywords: Vec<_> = settings.policies.keywords().map(|k| k.to_string()).collect();
        assert_eq!(keywords, vec!["waiting", "question"]);
        assert_eq!(settings.mode, ExecutionMode::DryRun);
    }

    #[test]
    fn missing_config_is_an_error() {
        let args = parse(&[]);
        assert!(Settings::from_args(&args).is_err());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let args = parse(&[
            "--config",
            r#"{"waiting": {"delay": "P1D", "reminder": {"delay": "P2D"}}}"#,
        ]);
        assert!(Settings::from_args(&args).is_err());
    }

    #[test]
    fn token_is_not_printed() {
        let args = parse(&["--config", r#"{"waiting": {}}"#]);
        let settings = Settings::from_args(&args).unwrap();
        assert!(!format!("{:?}", settings).contains("ghp_test"));
    }

    #[test]
    fn settings_build_a_tracker() {
        use issue_manager_github::GithubTracker;
        use issue_manager_tracker_api::Tracker;
        use std::sync::Arc;

        let args = parse(&["--config", r#"{"waiting": {}}"#, "--api-url", "http://localhost:9"]);
        let settings = Settings::from_args(&args).unwrap();

        let github = GithubTracker::new(settings.github).unwrap();
        assert_eq!(github.repo().to_string(), "octo-org/hello-world");
        let _tracker: Arc<dyn Tracker> = Arc::new(github);
    }
}
