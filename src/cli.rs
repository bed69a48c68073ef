use std::path::PathBuf;

use anyhow::Result;
use chrono::Duration;
use clap::Parser;

use trail_k8s::KubeOptions;
use trail_loki::{QueryInput, DEFAULT_LIMIT};

use crate::config::Config;
use crate::duration::parse_duration;

const DEFAULT_SINCE: &str = "15m";

/// kubectl-trail - Query Loki logs through the Kubernetes API
#[derive(Parser, Debug, Default)]
#[command(name = "kubectl-trail")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// LogQL stream selector (`{...}`) or pipeline stages appended to the query
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Namespace to filter logs
    #[arg(short, long, default_value = "")]
    pub namespace: String,

    /// App/service to filter logs
    #[arg(short, long, default_value = "")]
    pub service: String,

    /// Maximum number of log lines [default: 100]
    #[arg(long)]
    pub limit: Option<u32>,

    /// Minimum level: warn or error narrow the set, anything else shows info and up
    #[arg(long)]
    pub level: Option<String>,

    /// Only show logs newer than this (e.g. 15m, 1h30m; 0 = no window) [default: 15m]
    #[arg(long, value_parser = parse_duration, allow_hyphen_values = true)]
    pub since: Option<Duration>,

    /// Loki URL, or namespace/service to reach through the API proxy
    /// (discovered when omitted)
    #[arg(long)]
    pub url: Option<String>,

    /// Path to kubeconfig
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context
    #[arg(long)]
    pub context: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Increase diagnostic output on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Command-line flags merged over the config file
#[derive(Clone, Debug)]
pub struct Settings {
    pub query: QueryInput,
    pub limit: u32,
    pub since: Duration,
    pub url: String,
    pub kube: KubeOptions,
}

impl Settings {
    pub fn resolve(args: Args, config: Config) -> Result<Self> {
        let since = match (args.since, config.since.as_deref()) {
            (Some(since), _) => since,
            (None, Some(since)) => parse_duration(since).map_err(anyhow::Error::msg)?,
            (None, None) => parse_duration(DEFAULT_SINCE).map_err(anyhow::Error::msg)?,
        };

        Ok(Self {
            query: QueryInput::new(
                args.namespace,
                args.service,
                args.level.or(config.level).unwrap_or_default(),
                args.query.unwrap_or_default(),
            ),
            limit: args.limit.or(config.limit).unwrap_or(DEFAULT_LIMIT),
            since,
            url: args.url.or(config.url).unwrap_or_default(),
            kube: KubeOptions {
                kubeconfig: args.kubeconfig.or(config.kubeconfig),
                context: args.context.or(config.context),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_loki::QueryRangeOptions;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["kubectl-trail"]).unwrap();
        let settings = Settings::resolve(args, Config::default()).unwrap();

        assert_eq!(settings.limit, 100);
        assert_eq!(settings.since, Duration::minutes(15));
        assert_eq!(settings.url, "");
        assert_eq!(settings.query.raw, "");
        assert_eq!(settings.query.level, "");
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "kubectl-trail",
            "--service=api",
            "--level=error",
            "--since=1h",
            "--url",
            "monitoring/loki",
        ])
        .unwrap();
        let config = Config {
            url: Some("http://loki:3100".to_string()),
            limit: Some(500),
            since: Some("5m".to_string()),
            level: Some("warn".to_string()),
            context: Some("prod".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(args, config).unwrap();

        assert_eq!(settings.query.service, "api");
        assert_eq!(settings.query.level, "error");
        assert_eq!(settings.since, Duration::hours(1));
        assert_eq!(settings.url, "monitoring/loki");
        assert_eq!(settings.limit, 500);
        assert_eq!(settings.kube.context.as_deref(), Some("prod"));
    }

    #[test]
    fn test_negative_since_leaves_window_open() {
        let args = Args::try_parse_from(["kubectl-trail", "--since", "-5m"]).unwrap();
        let settings = Settings::resolve(args, Config::default()).unwrap();
        assert_eq!(settings.since, Duration::minutes(-5));

        let options = QueryRangeOptions::new().with_since(settings.since, chrono::Utc::now());
        assert!(options.start.is_none() && options.end.is_none());
    }

    #[test]
    fn test_too_many_positionals() {
        assert!(Args::try_parse_from(["kubectl-trail", "{app=\"a\"}", "extra"]).is_err());
    }

    #[test]
    fn test_bad_config_since() {
        let config = Config {
            since: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(Args::default(), config).is_err());
    }
}
