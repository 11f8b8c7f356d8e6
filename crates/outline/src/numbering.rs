//! Legal numbering labels by outline depth.
//!
//! | depth | style                | index 0 | index 3 |
//! |-------|----------------------|---------|---------|
//! | 0     | upper Roman          | `I`     | `IV`    |
//! | 1     | capital letter       | `A`     | `D`     |
//! | 2     | arabic               | `1`     | `4`     |
//! | 3     | lowercase letter     | `a`     | `d`     |
//! | 4     | lower Roman          | `i`     | `iv`    |

/// Depths at or beyond this have no numbering style
pub const MAX_LABELLED_DEPTH: usize = 5;

const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Expected label (without the trailing period) for the child at `index` on `depth`.
///
/// Returns `None` when the depth has no numbering style or the index runs past the
/// alphabet.
#[must_use]
pub fn label_for(depth: usize, index: usize) -> Option<String> {
    let ordinal = u32::try_from(index).ok()?.checked_add(1)?;
    match depth {
        0 => Some(to_roman(ordinal)),
        1 => letter(b'A', index).map(String::from),
        2 => Some(ordinal.to_string()),
        3 => letter(b'a', index).map(String::from),
        4 => Some(to_roman(ordinal).to_lowercase()),
        _ => None,
    }
}

/// Upper-case Roman numeral, greedy over subtractive pairs
#[must_use]
pub fn to_roman(mut value: u32) -> String {
    let mut out = String::new();
    for (amount, symbol) in ROMAN_TABLE {
        while value >= amount {
            out.push_str(symbol);
            value -= amount;
        }
    }
    out
}

/// Decode a Roman numeral (either case). Only canonical spellings are accepted.
#[must_use]
pub fn parse_roman(raw: &str) -> Option<u32> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }

    let mut value = 0u32;
    let mut rest = upper.as_str();
    for (amount, symbol) in ROMAN_TABLE {
        while let Some(stripped) = rest.strip_prefix(symbol) {
            value = value.checked_add(amount)?;
            rest = stripped;
        }
    }
    if !rest.is_empty() || to_roman(value) != upper {
        return None;
    }
    Some(value)
}

fn letter(base: u8, index: usize) -> Option<char> {
    let offset = u8::try_from(index).ok().filter(|&o| o < 26)?;
    Some(char::from(base + offset))
}
