//! Prescription line tokenizer.
//!
//! Turns a free-text prescription line into [`RawHerbInput`]s. This is the
//! input collaborator for the engine: it only splits items and normalizes
//! dosages to grams. Herb-name resolution happens later, against the
//! catalog, and nothing here is fatal — questionable items are passed
//! through with a note so one bad line never blocks the rest.

use crate::types::RawHerbInput;

/// Grams per qian, the traditional weight unit still common in practice.
const GRAMS_PER_QIAN: f64 = 3.0;

/// A tokenized prescription line.
#[derive(Clone, Debug, Default)]
pub struct ParsedPrescription {
    pub herbs: Vec<RawHerbInput>,
    /// Tokenizer-level notes (missing dosages, odd units).
    pub notes: Vec<String>,
}

/// Tokenize one prescription line.
///
/// Items are separated by commas, semicolons or newlines. Each item is
/// `<name words> <dosage>`, where the dosage is a number with an optional
/// `g` suffix or a trailing `g`/`qian` unit word. An item without a dosage
/// is kept at 0 g and flagged.
pub fn parse_prescription(line: &str) -> ParsedPrescription {
    let mut parsed = ParsedPrescription::default();

    for item in line.split([',', ';', '\n']) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = item.split_whitespace().collect();
        let (name_tokens, dosage) = split_dosage(&tokens);
        let name = name_tokens.join(" ");

        let dosage_grams = match dosage {
            Some(g) => g,
            None => {
                parsed
                    .notes
                    .push(format!("no dosage given for '{}'; treating as 0 g", item));
                0.0
            }
        };

        parsed.herbs.push(RawHerbInput {
            name,
            dosage_grams,
            processing: None,
        });
    }

    tracing::debug!("Tokenized {} herbs from prescription line", parsed.herbs.len());
    parsed
}

/// Split the trailing dosage off an item's tokens.
///
/// Accepts `... 9`, `... 9g`, `... 9 g` and `... 3 qian`.
fn split_dosage<'a>(tokens: &[&'a str]) -> (Vec<&'a str>, Option<f64>) {
    match tokens {
        [] => (Vec::new(), None),
        [rest @ .., amount, unit] if is_unit(unit) => {
            if let Some(value) = parse_number(amount) {
                let grams = if unit.eq_ignore_ascii_case("qian") {
                    value * GRAMS_PER_QIAN
                } else {
                    value
                };
                return (rest.to_vec(), Some(grams));
            }
            (tokens.to_vec(), None)
        }
        [rest @ .., last] => {
            if let Some(value) = parse_suffixed_number(last) {
                return (rest.to_vec(), Some(value));
            }
            (tokens.to_vec(), None)
        }
    }
}

fn is_unit(token: &str) -> bool {
    token.eq_ignore_ascii_case("g") || token.eq_ignore_ascii_case("qian")
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok()
}

/// Parse `9` or `9g` / `9G`.
fn parse_suffixed_number(token: &str) -> Option<f64> {
    let trimmed = token
        .strip_suffix('g')
        .or_else(|| token.strip_suffix('G'))
        .unwrap_or(token);
    // Reject a bare unit letter so "g" alone never reads as a dosage of 0.
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
