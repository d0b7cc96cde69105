use regex::Regex;
use std::sync::OnceLock;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Expand `${VAR}` references against the process environment before YAML
/// parsing. A missing variable collapses to an empty string rather than
/// failing outright — `validate()` is responsible for catching the
/// resulting empty required field.
pub fn expand_env(raw: &str) -> String {
    var_pattern()
        .replace_all(raw, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_variable() {
        std::env::set_var("PINGUIN_TEST_VAR", "hello");
        assert_eq!(expand_env("value: ${PINGUIN_TEST_VAR}"), "value: hello");
    }

    #[test]
    fn unknown_variable_collapses_to_empty() {
        std::env::remove_var("PINGUIN_TEST_MISSING");
        assert_eq!(expand_env("value: ${PINGUIN_TEST_MISSING}"), "value: ");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(expand_env("value: plain"), "value: plain");
    }
}
