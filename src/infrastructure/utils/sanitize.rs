use crate::errors::AppError;

const MAX_TEXT_LENGTH: usize = 10_000;

/// Trims whitespace, strips `<` and `>` and truncates to 10k characters.
/// Defends free-text fields against naive markup injection.
pub fn sanitize_text(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_TEXT_LENGTH)
        .collect()
}

/// Parses a list field that may arrive either as a JSON-encoded array or
/// as a comma-separated string. JSON is attempted first; on failure the
/// value is split on commas with trimming and empty entries dropped.
pub fn parse_string_list(field: &str, raw: &str) -> Result<Vec<String>, AppError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
        return match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Ok(s),
                    _ => Err(AppError::validation(
                        field,
                        "Must be an array of strings or a comma-separated string",
                    )),
                })
                .collect(),
            // Valid JSON but not a list (e.g. a bare number or object).
            _ => Err(AppError::validation(
                field,
                "Must be an array of strings or a comma-separated string",
            )),
        };
    }

    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn is_well_formed_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_markup_and_trims() {
        assert_eq!(sanitize_text("  <b>hello</b>  "), "bhello/b");
        assert_eq!(sanitize_text("plain text"), "plain text");
    }

    #[test]
    fn sanitize_truncates_long_input() {
        let long = "a".repeat(20_000);
        assert_eq!(sanitize_text(&long).len(), 10_000);
    }

    #[test]
    fn list_parses_json_first() {
        let parsed = parse_string_list("technologies", r#"["React","Node.js"]"#).unwrap();
        assert_eq!(parsed, vec!["React", "Node.js"]);
    }

    #[test]
    fn list_falls_back_to_csv() {
        let parsed = parse_string_list("technologies", "React, Node.js").unwrap();
        assert_eq!(parsed, vec!["React", "Node.js"]);

        let parsed = parse_string_list("skills", "a,, b ,").unwrap();
        assert_eq!(parsed, vec!["a", "b"]);
    }

    #[test]
    fn list_rejects_non_list_json() {
        assert!(parse_string_list("skills", "42").is_err());
        assert!(parse_string_list("skills", r#"{"a":1}"#).is_err());
    }

    #[test]
    fn url_check() {
        assert!(is_well_formed_url("https://example.com/x"));
        assert!(!is_well_formed_url("not a url"));
    }
}
