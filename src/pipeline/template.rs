//! Prompt-template variable cleanup for persisted answers.

use std::sync::LazyLock;

use regex::Regex;

/// `{{name}}` placeholders: identifiers up to 30 chars plus the reserved
/// `#histories#`, `#query#` and `#context#` slots.
static TEMPLATE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]{0,29}|#histories#|#query#|#context#)\}\}")
        .expect("Invalid template variable regex")
});

/// Rewrites every `{{name}}` placeholder to `{name}` so a stored answer is
/// never re-interpreted as a template.
pub fn remove_template_variables(text: &str) -> String {
    TEMPLATE_VARIABLE.replace_all(text, "{$1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_known_placeholders() {
        assert_eq!(
            remove_template_variables("Hi {{name}}, see {{#context#}}."),
            "Hi {name}, see {#context#}."
        );
    }

    #[test]
    fn leaves_other_braces_alone() {
        let text = "{{1abc}} {{#other#}} {{}} {single}";
        assert_eq!(remove_template_variables(text), text);

        let too_long = format!("{{{{{}}}}}", "a".repeat(31));
        assert_eq!(remove_template_variables(&too_long), too_long);
    }
}
