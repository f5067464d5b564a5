//! Player name normalization

use serde::{Deserialize, Serialize};

/// Which part of a ledger name line becomes the player name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamePolicy {
    /// Every token before the `@ ID` marker
    #[default]
    FullName,
    /// Only the first whitespace-separated token
    FirstToken,
}

impl NamePolicy {
    /// Pick the raw player name out of the tokens preceding the numbers
    pub fn extract<'a>(&self, tokens: &[&'a str]) -> Vec<&'a str> {
        let name = match tokens.iter().rposition(|t| *t == "@") {
            Some(at) => &tokens[..at],
            None => tokens,
        };

        match self {
            NamePolicy::FullName => name.to_vec(),
            NamePolicy::FirstToken => name.iter().take(1).copied().collect(),
        }
    }
}

/// Normalize a player name to Title Case with single spaces.
///
/// Letters following another letter are lowercased; every other letter is
/// uppercased, so `"john SMITH"` and `"John Smith"` both become
/// `"John Smith"` and `"o'NEIL"` becomes `"O'Neil"`.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, word) in raw.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut prev_is_letter = false;
        for c in word.chars() {
            if c.is_alphabetic() {
                if prev_is_letter {
                    out.extend(c.to_lowercase());
                } else {
                    // `ß` uppercases to "SS"; only the first char is a capital
                    let mut upper = c.to_uppercase();
                    out.extend(upper.next());
                    out.extend(upper.flat_map(char::to_lowercase));
                }
                prev_is_letter = true;
            } else {
                out.push(c);
                prev_is_letter = false;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_case_insensitive() {
        assert_eq!(normalize_name("JOHN"), "John");
        assert_eq!(normalize_name("john"), "John");
        assert_eq!(normalize_name("john SMITH"), normalize_name("John Smith"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "  mary-JANE   watson ",
            "o'neil",
            "x2y",
            "ÉLODIE",
            "ßenkel",
            "ﬁona",
            "",
        ] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
        assert_eq!(normalize_name("  mary-JANE   watson "), "Mary-Jane Watson");
        assert_eq!(normalize_name("o'neil"), "O'Neil");
        assert_eq!(normalize_name("x2y"), "X2Y");
        assert_eq!(normalize_name("ßenkel"), "Ssenkel");
        assert_eq!(normalize_name("ﬁona"), "Fiona");
    }

    #[test]
    fn test_name_policy_strips_id_marker() {
        let tokens = ["john", "smith", "@", "abc123DETAILS"];
        assert_eq!(NamePolicy::FullName.extract(&tokens), vec!["john", "smith"]);
        assert_eq!(NamePolicy::FirstToken.extract(&tokens), vec!["john"]);

        let no_marker = ["john", "smith"];
        assert_eq!(NamePolicy::FullName.extract(&no_marker), vec!["john", "smith"]);
    }
}
