use std::collections::HashSet;

/// Canonical form of a venue name for comparison purposes.
///
/// Lowercases, drops apostrophes entirely (so "O'Malley's" and "omalleys"
/// agree), expands "&" to "and", turns every other non-alphanumeric char
/// into a space, and collapses runs of whitespace. The result contains only
/// lowercase alphanumerics and single spaces, which makes the function
/// idempotent.
pub fn normalize(name: &str) -> String {
    let mut expanded = String::with_capacity(name.len() + 8);
    for c in name.to_lowercase().chars() {
        match c {
            '\'' | '\u{2019}' | '\u{02BC}' => {}
            '&' => expanded.push_str(" and "),
            c if c.is_alphanumeric() => expanded.push(c),
            _ => expanded.push(' '),
        }
    }
    expanded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokens of the normalized name longer than two characters.
///
/// Short fragments ("of", "st", "a") carry no matching signal and would
/// inflate similarity between unrelated names.
pub fn token_set(name: &str) -> HashSet<String> {
    normalize(name)
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Whether a media title plausibly refers to the venue.
///
/// Passes when the normalized title contains the whole normalized name as a
/// substring, or when it shares at least `max(2, ceil(n/2))` of the venue's
/// n significant tokens. Single-token names can only pass on the substring
/// path; two shared tokens is the floor for everything else.
pub fn title_is_relevant(title: &str, venue_name: &str) -> bool {
    let name = normalize(venue_name);
    if name.is_empty() {
        return false;
    }
    if normalize(title).contains(&name) {
        return true;
    }

    let name_tokens = token_set(venue_name);
    if name_tokens.is_empty() {
        return false;
    }
    let title_tokens = token_set(title);
    let shared = name_tokens.intersection(&title_tokens).count();
    let required = ((name_tokens.len() as f64) / 2.0).ceil() as usize;
    shared >= required.max(2)
}

/// Jaccard similarity over significant tokens, in 0.0..=1.0.
///
/// A name with no significant token scores 0 against everything; names made
/// of short fragments are still caught by the exact-match branch of the
/// duplicate check, which compares whole normalized strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);

    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let intersection = ta.intersection(&tb).count() as f64;
    let union = ta.union(&tb).count() as f64;
    intersection / union
}
