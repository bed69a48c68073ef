//! LogQL query synthesis from command-line filters.

use tracing::debug;

use crate::error::{Error, Result};

/// Selector matching every stream that carries a namespace label, used when no
/// other matcher is given. Loki rejects queries without a non-empty matcher.
pub const CATCH_ALL_SELECTOR: &str = r#"namespace=~".+""#;

/// Severities in ascending order; `fatal` and `critical` rank with `error`.
/// `debug` is never selected by a level filter.
const SEVERITIES: [&str; 6] = ["debug", "info", "warn", "error", "fatal", "critical"];

/// Structured filters collected from the command line
#[derive(Clone, Debug, Default)]
pub struct QueryInput {
    pub namespace: String,
    pub service: String,
    pub level: String,
    /// Positional argument: a full `{...}` selector or a pipeline fragment
    pub raw: String,
}

impl QueryInput {
    pub fn new(
        namespace: impl Into<String>,
        service: impl Into<String>,
        level: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service: service.into(),
            level: level.into(),
            raw: raw.into(),
        }
    }

    /// Build the LogQL expression for these filters
    pub fn build(&self) -> Result<String> {
        build_query(&self.namespace, &self.service, &self.level, &self.raw)
    }
}

/// Build a LogQL query from namespace, service, level and a raw fragment.
///
/// A raw fragment containing `{` or `}` is treated as the stream selector and
/// cannot be combined with `namespace` or `service`. Any other fragment is
/// appended as an extra pipeline stage.
pub fn build_query(namespace: &str, service: &str, level: &str, raw: &str) -> Result<String> {
    let raw = match raw.trim() {
        "" | "{}" => "",
        _ => raw,
    };
    let raw_is_selector = is_selector(raw);

    let mut selectors = Vec::new();
    let mut filters = Vec::new();

    if !namespace.is_empty() {
        selectors.push(exact_match("namespace", namespace));
    }

    if !service.is_empty() {
        selectors.push(exact_match("service_name", service));
    }

    if selectors.is_empty() && !raw_is_selector {
        selectors.push(CATCH_ALL_SELECTOR.to_string());
    }

    if let Some(filter) = level_filter(level) {
        filters.push(filter);
    }

    let mut query = if raw_is_selector {
        if !selectors.is_empty() {
            return Err(Error::InvalidInput(
                "cannot mix a {...} selector with --namespace or --service".to_string(),
            ));
        }
        raw.to_string()
    } else if selectors.is_empty() {
        String::new()
    } else {
        format!("{{ {} }}", selectors.join(", "))
    };

    if !filters.is_empty() {
        query.push_str(" | ");
        query.push_str(&filters.join(" | "));
    }

    if !raw.is_empty() && !raw_is_selector {
        query.push_str(" | ");
        query.push_str(raw.trim_start_matches(['|', ' ']));
    }

    debug!(%query, "built query");
    Ok(query)
}

/// Severities included when filtering at `level`, or `None` for no filter.
/// Only `warn` and `error` narrow the set; any other level starts at `info`.
pub fn included_levels(level: &str) -> Option<&'static [&'static str]> {
    let start = match level {
        "" => return None,
        "warn" => 2,
        "error" => 3,
        _ => 1,
    };
    Some(&SEVERITIES[start..])
}

fn level_filter(level: &str) -> Option<String> {
    included_levels(level).map(|levels| format!(r#"detected_level=~"{}""#, levels.join("|")))
}

fn is_selector(fragment: &str) -> bool {
    fragment.contains(['{', '}'])
}

fn exact_match(label: &str, value: &str) -> String {
    let escaped = value.replace('\\', r"\\").replace('"', r#"\""#);
    format!(r#"{label}="{escaped}""#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_only() {
        let q = build_query("prod", "", "", "").unwrap();
        assert_eq!(q, r#"{ namespace="prod" }"#);
        assert!(!q.contains(CATCH_ALL_SELECTOR));
    }

    #[test]
    fn test_catch_all_when_empty() {
        assert_eq!(build_query("", "", "", "").unwrap(), r#"{ namespace=~".+" }"#);
        assert_eq!(build_query("", "", "", "{}").unwrap(), r#"{ namespace=~".+" }"#);
    }

    #[test]
    fn test_service_and_level() {
        let q = build_query("", "api", "error", "").unwrap();
        assert_eq!(
            q,
            r#"{ service_name="api" } | detected_level=~"error|fatal|critical""#
        );

        let q = build_query("prod", "api", "", "").unwrap();
        assert_eq!(q, r#"{ namespace="prod", service_name="api" }"#);
    }

    #[test]
    fn test_level_filters() {
        let warn = build_query("ns", "", "warn", "").unwrap();
        assert!(warn.ends_with(r#" | detected_level=~"warn|error|fatal|critical""#));

        let info = build_query("ns", "", "info", "").unwrap();
        assert!(info.ends_with(r#" | detected_level=~"info|warn|error|fatal|critical""#));

        let none = build_query("ns", "", "", "").unwrap();
        assert!(!none.contains("detected_level"));
    }

    #[test]
    fn test_debug_level_starts_at_info() {
        assert_eq!(
            build_query("ns", "", "debug", "").unwrap(),
            r#"{ namespace="ns" } | detected_level=~"info|warn|error|fatal|critical""#
        );
    }

    #[test]
    fn test_other_levels_start_at_info() {
        for level in ["loud", "WARN", "trace"] {
            assert_eq!(
                build_query("ns", "", level, "").unwrap(),
                r#"{ namespace="ns" } | detected_level=~"info|warn|error|fatal|critical""#,
                "level {level}"
            );
        }
    }

    #[test]
    fn test_raw_selector_used_verbatim() {
        let q = build_query("", "", "warn", r#"{app="web"} |= "timeout""#).unwrap();
        assert_eq!(
            q,
            r#"{app="web"} |= "timeout" | detected_level=~"warn|error|fatal|critical""#
        );
    }

    #[test]
    fn test_raw_selector_conflicts_with_flags() {
        assert!(matches!(
            build_query("prod", "", "", r#"{app="web"}"#),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            build_query("", "api", "", r#"{app="web"}"#),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_raw_pipeline_appended() {
        let q = build_query("prod", "", "", "| json").unwrap();
        assert_eq!(q, r#"{ namespace="prod" } | json"#);

        let q = build_query("", "", "error", r#"json | status >= 500"#).unwrap();
        assert_eq!(
            q,
            r#"{ namespace=~".+" } | detected_level=~"error|fatal|critical" | json | status >= 500"#
        );
    }

    #[test]
    fn test_label_values_escaped() {
        let q = build_query(r#"we"ird"#, "", "", "").unwrap();
        assert_eq!(q, r#"{ namespace="we\"ird" }"#);
    }
}
