// NoteGit - Atomic Note Publishing for Git Hosts
// Copyright (C) 2026 NoteGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Front-matter composition
//!
//! Merges the user-configured metadata template with per-publish
//! placeholders and prepends it to the document body. Any metadata block the
//! editor already emitted is stripped first so the published file never
//! carries two conflicting blocks.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static TITLE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)<TITLE>").unwrap()
});

static DATE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)<DATE>").unwrap()
});

/// Compose the final document text from a body and a front-matter template
///
/// An empty template returns the body unchanged. Otherwise the body's
/// existing leading metadata block is stripped, `<TITLE>` and `<DATE>` are
/// substituted case-insensitively (date as `YYYY-MM-DD`, today), the
/// template is fenced with `---` lines unless it already is, and the result
/// is joined to the body with a blank line.
pub fn compose(body: &str, template: &str, title: &str) -> String {
    compose_at(body, template, title, chrono::Utc::now().date_naive())
}

/// [`compose`] with an explicit date, for deterministic output
pub fn compose_at(body: &str, template: &str, title: &str, date: NaiveDate) -> String {
    if template.trim().is_empty() {
        return body.to_string();
    }

    let stripped = strip_front_matter(body);
    let substituted = substitute_placeholders(template.trim(), title, date);

    let fenced = if substituted.starts_with("---") && substituted.ends_with("---") {
        substituted
    } else {
        format!("---\n{substituted}\n---")
    };

    format!("{fenced}\n\n{stripped}")
}

/// Replace `<TITLE>` and `<DATE>` placeholders, case-insensitively
pub fn substitute_placeholders(template: &str, title: &str, date: NaiveDate) -> String {
    let with_title = TITLE_PLACEHOLDER.replace_all(template, title);
    DATE_PLACEHOLDER
        .replace_all(&with_title, date.format("%Y-%m-%d").to_string())
        .into_owned()
}

/// Remove a leading `---`-delimited metadata block, if present
///
/// The block is a run starting at the very first line being exactly `---`,
/// ending at the next such line, followed by any blank line. Text without a
/// leading block is returned unchanged.
pub fn strip_front_matter(text: &str) -> String {
    let mut lines = text.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return text.to_string();
    }

    let mut rest = lines;
    for line in rest.by_ref() {
        if line.trim_end() == "---" {
            let remainder: Vec<&str> = rest.collect();
            let skip_blank = usize::from(remainder.first().is_some_and(|l| l.trim().is_empty()));
            return remainder[skip_blank..].join("\n");
        }
    }

    // Opening fence without a closing one is not a metadata block.
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).expect("valid date")
    }

    #[test]
    fn test_empty_template_is_identity() {
        assert_eq!(compose_at("# Body", "", "T", date()), "# Body");
        assert_eq!(compose_at("# Body", "   ", "T", date()), "# Body");
    }

    #[test]
    fn test_unfenced_template_gets_wrapped() {
        let result = compose_at("# Body", "title: <TITLE>\ndate: <DATE>", "My Note", date());
        assert_eq!(
            result,
            "---\ntitle: My Note\ndate: 2026-08-29\n---\n\n# Body"
        );
    }

    #[test]
    fn test_fenced_template_used_as_is() {
        let template = "---\ntitle: <title>\n---";
        let result = compose_at("# Body", template, "My Note", date());
        assert_eq!(result, "---\ntitle: My Note\n---\n\n# Body");
    }

    #[test]
    fn test_placeholders_are_case_insensitive() {
        let result = substitute_placeholders("a: <Title>, b: <dAtE>", "X", date());
        assert_eq!(result, "a: X, b: 2026-08-29");
    }

    #[test]
    fn test_existing_front_matter_is_replaced_not_duplicated() {
        let body = "---\nexported: true\n---\n\n# Body";
        let result = compose_at(body, "title: <TITLE>", "T", date());
        assert_eq!(result, "---\ntitle: T\n---\n\n# Body");
    }

    #[test]
    fn test_strip_without_block_is_identity() {
        assert_eq!(strip_front_matter("# Just a doc"), "# Just a doc");
        // A fence later in the document is not a leading block.
        let text = "intro\n---\nnot metadata";
        assert_eq!(strip_front_matter(text), text);
    }

    #[test]
    fn test_strip_unclosed_fence_is_identity() {
        let text = "---\ndangling";
        assert_eq!(strip_front_matter(text), text);
    }

    #[test]
    fn test_compose_then_strip_round_trip() {
        let bodies = ["# Hi\nline two", "plain", "multi\n\nparagraph\ntext"];
        let templates = ["title: <TITLE>", "---\na: 1\n---", "k: v\ndate: <DATE>"];
        for body in bodies {
            for template in templates {
                let composed = compose_at(body, template, "T", date());
                assert_eq!(strip_front_matter(&composed), body, "template {template:?}");
            }
        }
    }
}
