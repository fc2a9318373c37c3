//! Per-row text work for the mail merge: token substitution and recipient parsing.

use regex::{NoExpand, Regex};
use std::collections::HashSet;

/// Replacement for `[link]` when the folder holds no file named after the row.
pub const NO_FILE_FOUND: &str = "No file found with the matching name.";

/// Compiled `[name]` / `[link]` matchers, built once per run.
pub struct Personalizer {
    name_re: Regex,
    link_re: Regex,
}

impl Personalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            name_re: Regex::new(r"(?i)\[name\]")?,
            link_re: Regex::new(r"(?i)\[link\]")?,
        })
    }

    /// Replaces every `[name]`, in any letter case, with `name` taken literally.
    pub fn fill_name(&self, text: &str, name: &str) -> String {
        self.name_re.replace_all(text, NoExpand(name)).into_owned()
    }

    /// Replaces every `[link]`, in any letter case, with `replacement` taken literally.
    pub fn fill_link(&self, text: &str, replacement: &str) -> String {
        self.link_re.replace_all(text, NoExpand(replacement)).into_owned()
    }
}

/// The clickable anchor put in place of `[link]`. Opens in a new tab.
pub fn link_anchor(url: &str) -> String {
    format!("<a href=\"{}\" target=\"_blank\">Link</a>", url)
}

/// Splits a comma-separated address list, trims each entry, drops blanks and
/// keeps the first occurrence of each address.
pub fn parse_recipients(emails: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    emails
        .split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .filter(|email| seen.insert(*email))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_substitution_is_global_and_case_insensitive() {
        let p = Personalizer::new().unwrap();
        assert_eq!(p.fill_name("[Name] and [NAME]", "Rose"), "Rose and Rose");
        assert_eq!(p.fill_name("Hi [name], [nAmE]!", "Sue"), "Hi Sue, Sue!");
        assert_eq!(p.fill_name("no tokens", "Sue"), "no tokens");
    }

    #[test]
    fn names_are_plain_text() {
        let p = Personalizer::new().unwrap();
        assert_eq!(p.fill_name("[name]", "$1 & ${0} .*"), "$1 & ${0} .*");
    }

    #[test]
    fn link_substitution_leaves_name_tokens_alone() {
        let p = Personalizer::new().unwrap();
        let out = p.fill_link("[LINK] for [name]", &link_anchor("https://x/y"));
        assert_eq!(
            out,
            "<a href=\"https://x/y\" target=\"_blank\">Link</a> for [name]"
        );
    }

    #[test]
    fn recipients_are_trimmed_and_deduplicated() {
        let got: HashSet<String> = parse_recipients("a@x.com, a@x.com,b@x.com").into_iter().collect();
        let want: HashSet<String> = ["a@x.com", "b@x.com"].iter().map(|s| s.to_string()).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn recipients_keep_first_seen_order() {
        assert_eq!(
            parse_recipients(" c@x.com ,a@x.com,c@x.com "),
            vec!["c@x.com".to_string(), "a@x.com".to_string()]
        );
    }

    #[test]
    fn blank_entries_are_dropped() {
        assert!(parse_recipients(" , ,").is_empty());
        assert_eq!(parse_recipients("a@x.com,"), vec!["a@x.com".to_string()]);
    }
}
