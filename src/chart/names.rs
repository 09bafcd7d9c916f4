/// Compact display labels for chart lines.
///
/// `John Robert /Smith/` becomes `John R.Smith`. Middle names collapse to
/// initials, except the name following a Batak title or clan prefix such as
/// `Ompu` or `Raja`, which is part of the title.
use std::sync::LazyLock;

use regex::Regex;

/// First tokens whose following token is never abbreviated.
pub const HONORIFIC_PREFIXES: &[&str] = &[
    "Ompu", "O.", "Amani", "A.", "Aman", "Datu", "Nai", "Apa", "Pu", "Na", "Boru", "Raja",
];

/// Stands in for a name recorded as unknown, e.g. `(unknown) /Siboro/`.
pub const UNKNOWN_NAME: &str = "(....) ";

static UNKNOWN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(.+\)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameFormatter {
    /// Abbreviate middle names to initials.
    pub initials: bool,
}

impl Default for NameFormatter {
    fn default() -> Self {
        Self { initials: true }
    }
}

impl NameFormatter {
    #[must_use]
    pub fn new(initials: bool) -> Self {
        Self { initials }
    }

    /// Build the compact label for a raw GEDCOM name.
    #[must_use]
    pub fn format(&self, raw: &str) -> String {
        let joined: String = raw
            .split('/')
            .map(|segment| {
                if UNKNOWN_RE.is_match(segment) {
                    UNKNOWN_NAME
                } else {
                    segment
                }
            })
            .collect();

        let mut tokens: Vec<String> = joined.split_whitespace().map(str::to_string).collect();
        if self.initials {
            abbreviate_middle(&mut tokens);
        }
        join_tokens(&tokens)
    }
}

/// The name as written, with the surname slashes removed.
#[must_use]
pub fn plain_name(raw: &str) -> String {
    raw.chars().filter(|&c| c != '/').collect()
}

fn is_honorific(token: &str) -> bool {
    HONORIFIC_PREFIXES.contains(&token)
}

fn abbreviate_middle(tokens: &mut [String]) {
    let count = tokens.len();
    if count <= 2 {
        return;
    }
    let titled = is_honorific(&tokens[0]);
    for (i, token) in tokens.iter_mut().enumerate().take(count - 1).skip(1) {
        if i == 1 && titled {
            continue;
        }
        if let Some(first) = token.chars().next() {
            *token = format!("{}.", first.to_uppercase());
        }
    }
}

/// Initials attach to the next token. A leading title such as `O.` does not.
fn join_tokens(tokens: &[String]) -> String {
    let mut label = String::new();
    for (i, token) in tokens.iter().enumerate() {
        label.push_str(token);
        let glued = token.ends_with('.') && !(i == 0 && is_honorific(token));
        if i + 1 < tokens.len() && !glued {
            label.push(' ');
        }
    }
    label
}
