use std::collections::BTreeMap;

use regex::Regex;

/// Matched environment variables, keyed and ordered by variable name.
pub type EnvironmentMapping = BTreeMap<String, String>;

/// Scans the process environment for variables whose names match `pattern`.
pub fn discover(pattern: &str) -> EnvironmentMapping {
    let vars = std::env::vars_os().filter_map(|(key, value)| {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                tracing::debug!("Skipping {} with a non UTF-8 value", key);
                None
            }
            (Err(key), _) => {
                tracing::debug!("Skipping non UTF-8 variable {:?}", key);
                None
            }
        }
    });
    discover_in(pattern, vars)
}

/// Same as [`discover`] over an explicit environment snapshot.
pub fn discover_in<I>(pattern: &str, vars: I) -> EnvironmentMapping
where
    I: IntoIterator<Item = (String, String)>,
{
    let matcher = match wildcard_regex(pattern) {
        Ok(matcher) => matcher,
        Err(err) => {
            tracing::warn!("Invalid pattern {:?}: {}", pattern, err);
            return EnvironmentMapping::new();
        }
    };

    vars.into_iter()
        .filter(|(key, _)| matcher.is_match(key))
        .collect()
}

/// Builds an anchored regex where `*` matches any run of characters and
/// everything else is literal.
fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body))
}
