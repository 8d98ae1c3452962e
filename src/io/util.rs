use crate::model::types::{BondOrder, Element};
use std::str::FromStr;

/// V2000 formal charge from the counts-column code. Codes outside the
/// documented table (including the historic "charge 4 = radical" slot)
/// collapse to zero; spin is carried separately by `M  RAD` lines.
pub fn charge_from_code(code: i32) -> i8 {
    match code {
        3 => 1,
        2 => 2,
        1 => 3,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// Inverse of [`charge_from_code`]; charges outside -3..=3 encode as 0.
pub fn charge_to_code(charge: i8) -> i32 {
    match charge {
        1 => 3,
        2 => 2,
        3 => 1,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

/// Bond order from the CTfile code shared by V2000 and V3000 (4 = aromatic).
pub fn bond_order_from_ctfile(code: i32) -> Option<BondOrder> {
    match code {
        1 => Some(BondOrder::Single),
        2 => Some(BondOrder::Double),
        3 => Some(BondOrder::Triple),
        4 => Some(BondOrder::Aromatic),
        _ => None,
    }
}

pub fn bond_order_to_ctfile(order: BondOrder) -> i32 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

/// Element lookup tolerant of the padding and case found in real files
/// ("C  ", "CL", "br").
pub fn element_from_symbol(token: &str) -> Option<Element> {
    let token = token.trim();
    if let Ok(el) = Element::from_str(token) {
        return Some(el);
    }
    let mut normalized = String::with_capacity(token.len());
    for (i, c) in token.chars().enumerate() {
        if i == 0 {
            normalized.extend(c.to_uppercase());
        } else {
            normalized.extend(c.to_lowercase());
        }
    }
    Element::from_str(&normalized).ok()
}

/// Fixed-column slice that degrades to `""` instead of panicking when the
/// line is shorter than the field.
pub fn field(line: &str, start: usize, len: usize) -> &str {
    let bytes = line.as_bytes();
    if start >= bytes.len() {
        return "";
    }
    let end = (start + len).min(bytes.len());
    std::str::from_utf8(&bytes[start..end]).unwrap_or("")
}

/// `atoi`-style integer parse: leading whitespace, optional sign, then the
/// longest digit run. Anything unparseable yields 0, matching the legacy
/// tolerance for numeric fields.
pub fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let mut chars = s.char_indices();
    let mut end = 0;
    let mut seen_digit = false;
    for (i, c) in &mut chars {
        if i == 0 && (c == '+' || c == '-') {
            end = i + 1;
            continue;
        }
        if c.is_ascii_digit() {
            seen_digit = true;
            end = i + 1;
        } else {
            break;
        }
    }
    if !seen_digit {
        return 0;
    }
    s[..end].parse().unwrap_or(0)
}

/// `atof`-style float parse with the same degrade-to-zero policy.
pub fn atof(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        let c = bytes[end] as char;
        match c {
            '+' | '-' if end == 0 => {}
            '+' | '-' if seen_exp && matches!(bytes[end - 1] as char, 'e' | 'E') => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot && !seen_exp => seen_dot = true,
            'e' | 'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }
    // Back off a dangling exponent marker ("1.5e" or "1.5e-").
    while end > 0 && matches!(bytes[end - 1] as char, 'e' | 'E' | '+' | '-') {
        end -= 1;
    }
    s[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_code_bijection_on_domain() {
        for code in [0, 1, 2, 3, 5, 6, 7] {
            assert_eq!(charge_to_code(charge_from_code(code)), code);
        }
        for charge in -3..=3i8 {
            assert_eq!(charge_from_code(charge_to_code(charge)), charge);
        }
    }

    #[test]
    fn unknown_charge_codes_collapse_to_zero() {
        assert_eq!(charge_from_code(4), 0);
        assert_eq!(charge_from_code(99), 0);
        assert_eq!(charge_to_code(5), 0);
    }

    #[test]
    fn bond_order_wire_codes() {
        assert_eq!(bond_order_from_ctfile(4), Some(BondOrder::Aromatic));
        assert_eq!(bond_order_to_ctfile(BondOrder::Aromatic), 4);
        assert_eq!(bond_order_from_ctfile(0), None);
        assert_eq!(bond_order_from_ctfile(5), None);
    }

    #[test]
    fn element_symbol_guessing() {
        assert_eq!(element_from_symbol("C  "), Some(Element::C));
        assert_eq!(element_from_symbol("CL"), Some(Element::Cl));
        assert_eq!(element_from_symbol("br"), Some(Element::Br));
        assert_eq!(element_from_symbol("Xx"), None);
    }

    #[test]
    fn field_is_safe_on_short_lines() {
        assert_eq!(field("M  RAD", 6, 3), "");
        assert_eq!(field("M  RAD  1", 6, 3), "  1");
        assert_eq!(field("abc", 1, 10), "bc");
        assert_eq!(field("abc", 9, 3), "");
    }

    #[test]
    fn lenient_numeric_parsing() {
        assert_eq!(atoi("  12"), 12);
        assert_eq!(atoi("-3x"), -3);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
        assert_eq!(atof(" 1.25 "), 1.25);
        assert_eq!(atof("-0.5junk"), -0.5);
        assert_eq!(atof("2e3"), 2000.0);
        assert_eq!(atof("1.5e"), 1.5);
        assert_eq!(atof("nope"), 0.0);
    }
}
