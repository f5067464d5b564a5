//! Cash-out ledger parsing
//!
//! The poker client's ledger pastes in one of two shapes depending on the
//! browser it was copied from. Some browsers put each player on two lines:
//!
//! ```text
//! PLAYERNAME @ SOMEID
//! BUYIN BUYOUT STACK NET
//! ```
//!
//! others put everything on one line:
//!
//! ```text
//! PLAYERNAME @ SOMEID BUYIN BUYOUT STACK NET
//! ```
//!
//! The ID may carry a trailing `DETAILS` picked up from a button label; it
//! is never used.

use bigdecimal::{BigDecimal, Zero};
use log::{debug, warn};
use std::str::FromStr;

use crate::ledger::names::{normalize_name, NamePolicy};
use crate::types::*;

/// Number of numeric fields per player: buy-in, buy-out, stack, net
const DATA_FIELDS: usize = 4;

/// How the players are laid out in the pasted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerLayout {
    /// A name line followed by a line of four numbers
    TwoLine,
    /// Name and four numbers on the same line
    SingleLine,
}

impl LedgerLayout {
    /// Detect the layout from the first non-empty line.
    ///
    /// Fewer than four tokens can only be a name line. Four or more tokens
    /// mean single-line layout, unless the trailing four are not numbers,
    /// in which case the line is a long name line (`Alice @ xid DETAILS`).
    pub fn detect(first_line: &str) -> Self {
        let tokens: Vec<&str> = first_line.split_whitespace().collect();
        if tokens.len() < DATA_FIELDS {
            return LedgerLayout::TwoLine;
        }

        let trailing = &tokens[tokens.len() - DATA_FIELDS..];
        if trailing.iter().all(|t| parse_amount(t).is_some()) {
            LedgerLayout::SingleLine
        } else {
            LedgerLayout::TwoLine
        }
    }
}

/// Parser turning pasted ledger text into per-player results
#[derive(Debug, Clone, Default)]
pub struct LedgerParser {
    name_policy: NamePolicy,
}

impl LedgerParser {
    /// Create a parser that keeps full player names
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with a specific name policy
    pub fn with_name_policy(name_policy: NamePolicy) -> Self {
        Self { name_policy }
    }

    /// The name policy in use
    pub fn name_policy(&self) -> NamePolicy {
        self.name_policy
    }

    /// Parse every entry in ledger order.
    ///
    /// Fails on the first malformed group; nothing is returned for a
    /// partially valid ledger.
    pub fn parse_entries(&self, text: &str) -> TabResult<Vec<LedgerEntry>> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let first = lines
            .first()
            .ok_or_else(|| TabError::Format("ledger is empty".to_string()))?;

        let layout = LedgerLayout::detect(first);
        debug!("Detected {:?} ledger layout over {} lines", layout, lines.len());

        match layout {
            LedgerLayout::TwoLine => {
                if lines.len() % 2 != 0 {
                    return Err(TabError::Format(format!(
                        "two-line ledger has an odd number of lines ({}); last line '{}' has no data line",
                        lines.len(),
                        lines[lines.len() - 1]
                    )));
                }
                lines
                    .chunks(2)
                    .map(|pair| self.parse_two_line(pair[0], pair[1]))
                    .collect()
            }
            LedgerLayout::SingleLine => lines
                .iter()
                .map(|line| self.parse_single_line(line))
                .collect(),
        }
    }

    /// Parse a ledger into the deltas to apply.
    ///
    /// Names are normalized, so differently-cased spellings of one player
    /// collapse to one key; the last occurrence wins.
    pub fn parse(&self, text: &str) -> TabResult<DeltasMap> {
        let entries = self.parse_entries(text)?;

        let total: BigDecimal = entries.iter().map(|e| &e.net).sum();
        if !total.is_zero() {
            warn!(
                "Ledger nets sum to {} instead of zero; was a player left out of the paste?",
                total
            );
        }

        let mut deltas = DeltasMap::new();
        for entry in entries {
            if let Some(previous) = deltas.insert(entry.player.clone(), entry.net) {
                debug!("Player {} listed twice; replacing net {}", entry.player, previous);
            }
        }
        Ok(deltas)
    }

    fn parse_two_line(&self, name_line: &str, data_line: &str) -> TabResult<LedgerEntry> {
        let name_tokens: Vec<&str> = name_line.split_whitespace().collect();
        let data_tokens: Vec<&str> = data_line.split_whitespace().collect();

        if data_tokens.len() != DATA_FIELDS {
            return Err(TabError::Format(format!(
                "expected {} numbers after '{}', found '{}'",
                DATA_FIELDS, name_line, data_line
            )));
        }

        self.build_entry(&name_tokens, &data_tokens, name_line)
    }

    fn parse_single_line(&self, line: &str) -> TabResult<LedgerEntry> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() <= DATA_FIELDS {
            return Err(TabError::Format(format!(
                "line '{}' needs a player name followed by {} numbers",
                line, DATA_FIELDS
            )));
        }

        let (name_tokens, data_tokens) = tokens.split_at(tokens.len() - DATA_FIELDS);
        self.build_entry(name_tokens, data_tokens, line)
    }

    fn build_entry(
        &self,
        name_tokens: &[&str],
        data_tokens: &[&str],
        context: &str,
    ) -> TabResult<LedgerEntry> {
        let player = normalize_name(&self.name_policy.extract(name_tokens).join(" "));
        if player.is_empty() {
            return Err(TabError::Format(format!("no player name in '{}'", context)));
        }

        let amounts = data_tokens
            .iter()
            .map(|token| {
                parse_amount(token).ok_or_else(|| {
                    TabError::Format(format!("'{}' in '{}' is not a number", token, context))
                })
            })
            .collect::<TabResult<Vec<_>>>()?;

        let [buy_in, buy_out, stack, net]: [BigDecimal; DATA_FIELDS] =
            amounts.try_into().map_err(|_| {
                TabError::Format(format!(
                    "expected {} numbers in '{}'",
                    DATA_FIELDS, context
                ))
            })?;

        Ok(LedgerEntry::new(player, buy_in, buy_out, stack, net))
    }
}

/// Parse one numeric ledger field
fn parse_amount(token: &str) -> Option<BigDecimal> {
    let token = token.strip_prefix('+').unwrap_or(token);
    BigDecimal::from_str(token).ok()
}

/// Parse a ledger with the default parser
pub fn parse_ledger(text: &str) -> TabResult<DeltasMap> {
    LedgerParser::new().parse(text)
}
