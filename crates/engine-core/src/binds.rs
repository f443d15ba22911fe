use crate::error::ActionError;
use std::collections::BTreeSet;

/// Rewrites positional bind placeholders (`:1`, `:2`, …) inside the given
/// clauses to their quoted form (`':1'`) so the renderer treats them as
/// string literals. Placeholders that are already quoted are left alone,
/// which makes the rewrite idempotent. The placeholder numbering across
/// all clauses must be contiguous from `:1`; gaps are a validation error.
pub fn quote_positional_binds(clauses: &mut [&mut String]) -> Result<(), ActionError> {
    let mut seen: BTreeSet<u32> = BTreeSet::new();
    for clause in clauses.iter() {
        for token in scan_placeholders(clause) {
            seen.insert(token.index);
        }
    }

    let Some(&highest) = seen.iter().next_back() else {
        return Ok(());
    };
    for expected in 1..=highest {
        if !seen.contains(&expected) {
            return Err(ActionError::NonContiguousBinds {
                found: highest,
                missing: expected,
            });
        }
    }

    for clause in clauses.iter_mut() {
        **clause = quote_in(clause);
    }
    Ok(())
}

struct Placeholder {
    index: u32,
    start: usize,
    end: usize,
    quoted: bool,
}

/// Scans a clause for `:N` tokens, recording whether each is already
/// wrapped in single quotes.
fn scan_placeholders(text: &str) -> Vec<Placeholder> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b':' {
            i += 1;
            continue;
        }
        let digits_start = i + 1;
        let mut digits_end = digits_start;
        while digits_end < bytes.len() && bytes[digits_end].is_ascii_digit() {
            digits_end += 1;
        }
        if digits_end == digits_start {
            i += 1;
            continue;
        }
        // Unparseable numbers are ignored rather than treated as binds.
        let Ok(index) = text[digits_start..digits_end].parse::<u32>() else {
            i = digits_end;
            continue;
        };
        let quoted = i > 0
            && bytes[i - 1] == b'\''
            && digits_end < bytes.len()
            && bytes[digits_end] == b'\'';
        tokens.push(Placeholder {
            index,
            start: i,
            end: digits_end,
            quoted,
        });
        i = digits_end;
    }
    tokens
}

fn quote_in(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut cursor = 0;
    for token in scan_placeholders(text) {
        out.push_str(&text[cursor..token.start]);
        if token.quoted {
            out.push_str(&text[token.start..token.end]);
        } else {
            out.push('\'');
            out.push_str(&text[token.start..token.end]);
            out.push('\'');
        }
        cursor = token.end;
    }
    out.push_str(&text[cursor..]);
    out
}
