//!
//! Utility functions shared by the configuration layer.
//!
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//!

use {
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
};

/// Matches `{{ VAR_NAME }}` references with optional inner whitespace.
/// Variable names are restricted to uppercase letters, digits and underscores.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// Replaces every `{{ VAR_NAME }}` in `input` with the value of the
/// corresponding environment variable.
///
/// Unset variables are replaced by an empty string and a warning is logged.
///
/// ```
/// use axum_conduit::replace_handlebars_with_env;
///
/// unsafe { std::env::set_var("CONDUIT_DOC_LIMIT", "2MiB") };
/// let toml = replace_handlebars_with_env("max_payload_size_bytes = \"{{ CONDUIT_DOC_LIMIT }}\"");
/// assert_eq!(toml, "max_payload_size_bytes = \"2MiB\"");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}
