//! Densely insertable order keys for slide ordering.
//!
//! Keys are strings over a base-62 alphabet whose byte order matches digit
//! order, so plain string comparison is key comparison. A key is an integer
//! part (a head character encoding its length, followed by digits) and an
//! optional fractional part that never ends in `'0'`. New keys can always be
//! generated before, after, or between existing keys without renumbering.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: usize = 62;
const ZERO: u8 = b'0';
const LAST_DIGIT: u8 = b'z';

/// Integer part of the smallest representable key. Nothing sorts below it.
const SMALLEST_INTEGER: &str = "A00000000000000000000000000";

/// The key handed out when a collection is empty.
pub const FIRST_KEY: &str = "a0";

/// Errors raised while generating or validating order keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderKeyError {
    /// Lower bound is not strictly below the upper bound. Always a caller bug.
    #[error("order violation: {lower} >= {upper}")]
    OrderViolation { lower: String, upper: String },
    #[error("invalid order key: {0:?}")]
    InvalidKey(String),
    /// The integer space is exhausted in one direction.
    #[error("order key space exhausted next to {0:?}")]
    Exhausted(String),
}

/// An opaque, totally ordered key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(String);

impl OrderKey {
    /// Parse and validate a key.
    pub fn parse(key: impl Into<String>) -> Result<Self, OrderKeyError> {
        let key = key.into();
        validate_order_key(&key)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key used for the first element of an empty collection.
    pub fn first() -> Self {
        Self(FIRST_KEY.to_string())
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn digit_value(c: u8) -> Option<usize> {
    DIGITS.iter().position(|&d| d == c)
}

fn integer_length(head: u8) -> Option<usize> {
    match head {
        b'a'..=b'z' => Some((head - b'a') as usize + 2),
        b'A'..=b'Z' => Some((b'Z' - head) as usize + 2),
        _ => None,
    }
}

fn integer_part(key: &str) -> Result<&str, OrderKeyError> {
    let head = *key
        .as_bytes()
        .first()
        .ok_or_else(|| OrderKeyError::InvalidKey(key.to_string()))?;
    let len = integer_length(head).ok_or_else(|| OrderKeyError::InvalidKey(key.to_string()))?;
    if len > key.len() {
        return Err(OrderKeyError::InvalidKey(key.to_string()));
    }
    Ok(&key[..len])
}

/// Check that `key` is well formed.
pub fn validate_order_key(key: &str) -> Result<(), OrderKeyError> {
    if key == SMALLEST_INTEGER {
        return Err(OrderKeyError::InvalidKey(key.to_string()));
    }
    if key.bytes().any(|c| digit_value(c).is_none()) {
        return Err(OrderKeyError::InvalidKey(key.to_string()));
    }
    let int = integer_part(key)?;
    let frac = &key[int.len()..];
    if frac.as_bytes().last() == Some(&ZERO) {
        return Err(OrderKeyError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Midpoint of two fractional parts, `lower < upper`, `upper = None` meaning 1.
fn midpoint(lower: &str, upper: Option<&str>) -> Result<String, OrderKeyError> {
    if let Some(upper) = upper {
        if lower >= upper {
            return Err(OrderKeyError::OrderViolation {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
    }
    let trailing_zero = |s: &str| s.as_bytes().last() == Some(&ZERO);
    if trailing_zero(lower) || upper.is_some_and(trailing_zero) {
        return Err(OrderKeyError::InvalidKey(lower.to_string()));
    }

    if let Some(upper) = upper {
        // Shared prefix, treating `lower` as right-padded with zeros.
        let lo = lower.as_bytes();
        let hi = upper.as_bytes();
        let mut n = 0;
        while n < hi.len() && lo.get(n).copied().unwrap_or(ZERO) == hi[n] {
            n += 1;
        }
        if n > 0 {
            let rest_lower = if n < lower.len() { &lower[n..] } else { "" };
            let mut out = upper[..n].to_string();
            out.push_str(&midpoint(rest_lower, Some(&upper[n..]))?);
            return Ok(out);
        }
    }

    let digit_lower = match lower.as_bytes().first() {
        Some(&c) => digit_value(c).ok_or_else(|| OrderKeyError::InvalidKey(lower.to_string()))?,
        None => 0,
    };
    let digit_upper = match upper.and_then(|u| u.as_bytes().first().copied()) {
        Some(c) => digit_value(c).ok_or_else(|| OrderKeyError::InvalidKey(lower.to_string()))?,
        None => BASE,
    };

    if digit_upper - digit_lower > 1 {
        let mid = (digit_lower + digit_upper).div_ceil(2);
        return Ok((DIGITS[mid] as char).to_string());
    }

    match upper {
        Some(upper) if upper.len() > 1 => Ok(upper[..1].to_string()),
        _ => {
            let mut out = String::with_capacity(lower.len() + 1);
            out.push(DIGITS[digit_lower] as char);
            let rest = if lower.len() > 1 { &lower[1..] } else { "" };
            out.push_str(&midpoint(rest, None)?);
            Ok(out)
        }
    }
}

fn increment_integer(int: &str) -> Option<String> {
    let bytes = int.as_bytes();
    let head = bytes[0];
    let mut digits = bytes[1..].to_vec();
    let mut carry = true;
    for d in digits.iter_mut().rev() {
        let next = digit_value(*d)? + 1;
        if next == BASE {
            *d = ZERO;
        } else {
            *d = DIGITS[next];
            carry = false;
            break;
        }
    }
    if carry {
        if head == b'Z' {
            return Some("a0".to_string());
        }
        if head == b'z' {
            return None;
        }
        let head = head + 1;
        if head > b'a' {
            digits.push(ZERO);
        } else {
            digits.pop();
        }
        return Some(assemble(head, &digits));
    }
    Some(assemble(head, &digits))
}

fn decrement_integer(int: &str) -> Option<String> {
    let bytes = int.as_bytes();
    let head = bytes[0];
    let mut digits = bytes[1..].to_vec();
    let mut borrow = true;
    for d in digits.iter_mut().rev() {
        let value = digit_value(*d)?;
        if value == 0 {
            *d = LAST_DIGIT;
        } else {
            *d = DIGITS[value - 1];
            borrow = false;
            break;
        }
    }
    if borrow {
        if head == b'a' {
            return Some(assemble(b'Z', &[LAST_DIGIT]));
        }
        if head == b'A' {
            return None;
        }
        let head = head - 1;
        if head < b'Z' {
            digits.push(LAST_DIGIT);
        } else {
            digits.pop();
        }
        return Some(assemble(head, &digits));
    }
    Some(assemble(head, &digits))
}

fn assemble(head: u8, digits: &[u8]) -> String {
    let mut out = String::with_capacity(digits.len() + 1);
    out.push(head as char);
    out.extend(digits.iter().map(|&d| d as char));
    out
}

/// Generate a key strictly between `lower` and `upper`.
///
/// `None` bounds are open: `key_between(None, Some(b)) < b` and
/// `key_between(Some(a), None) > a`. Passing `lower >= upper` returns
/// [`OrderKeyError::OrderViolation`].
pub fn key_between(
    lower: Option<&OrderKey>,
    upper: Option<&OrderKey>,
) -> Result<OrderKey, OrderKeyError> {
    key_between_str(lower.map(OrderKey::as_str), upper.map(OrderKey::as_str)).map(OrderKey)
}

fn key_between_str(lower: Option<&str>, upper: Option<&str>) -> Result<String, OrderKeyError> {
    if let Some(a) = lower {
        validate_order_key(a)?;
    }
    if let Some(b) = upper {
        validate_order_key(b)?;
    }

    match (lower, upper) {
        (Some(a), Some(b)) if a >= b => Err(OrderKeyError::OrderViolation {
            lower: a.to_string(),
            upper: b.to_string(),
        }),
        (None, None) => Ok(FIRST_KEY.to_string()),
        (None, Some(b)) => {
            let int = integer_part(b)?;
            let frac = &b[int.len()..];
            if int == SMALLEST_INTEGER {
                return Ok(format!("{int}{}", midpoint("", Some(frac))?));
            }
            if int.len() < b.len() {
                return Ok(int.to_string());
            }
            decrement_integer(int).ok_or_else(|| OrderKeyError::Exhausted(b.to_string()))
        }
        (Some(a), None) => {
            let int = integer_part(a)?;
            let frac = &a[int.len()..];
            match increment_integer(int) {
                Some(next) => Ok(next),
                None => Ok(format!("{int}{}", midpoint(frac, None)?)),
            }
        }
        (Some(a), Some(b)) => {
            let int_a = integer_part(a)?;
            let frac_a = &a[int_a.len()..];
            let int_b = integer_part(b)?;
            let frac_b = &b[int_b.len()..];
            if int_a == int_b {
                return Ok(format!("{int_a}{}", midpoint(frac_a, Some(frac_b))?));
            }
            let next = increment_integer(int_a).ok_or_else(|| OrderKeyError::Exhausted(a.to_string()))?;
            if next.as_str() < b {
                return Ok(next);
            }
            Ok(format!("{int_a}{}", midpoint(frac_a, None)?))
        }
    }
}

/// Generate `n` ascending keys strictly between `lower` and `upper`.
pub fn n_keys_between(
    lower: Option<&OrderKey>,
    upper: Option<&OrderKey>,
    n: usize,
) -> Result<Vec<OrderKey>, OrderKeyError> {
    match n {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![key_between(lower, upper)?]),
        _ => {}
    }

    if upper.is_none() {
        let mut keys = Vec::with_capacity(n);
        let mut current = key_between(lower, None)?;
        for _ in 1..n {
            let next = key_between(Some(&current), None)?;
            keys.push(std::mem::replace(&mut current, next));
        }
        keys.push(current);
        return Ok(keys);
    }

    if lower.is_none() {
        let mut keys = Vec::with_capacity(n);
        let mut current = key_between(None, upper)?;
        for _ in 1..n {
            let next = key_between(None, Some(&current))?;
            keys.push(std::mem::replace(&mut current, next));
        }
        keys.push(current);
        keys.reverse();
        return Ok(keys);
    }

    let mid = n / 2;
    let pivot = key_between(lower, upper)?;
    let mut keys = n_keys_between(lower, Some(&pivot), mid)?;
    let tail = n_keys_between(Some(&pivot), upper, n - mid - 1)?;
    keys.push(pivot);
    keys.extend(tail);
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> OrderKey {
        OrderKey::parse(s).unwrap()
    }

    #[test]
    fn test_first_key() {
        assert_eq!(key_between(None, None).unwrap().as_str(), "a0");
    }

    #[test]
    fn test_open_bounds() {
        let a0 = key("a0");
        assert_eq!(key_between(Some(&a0), None).unwrap().as_str(), "a1");
        assert_eq!(key_between(None, Some(&a0)).unwrap().as_str(), "Zz");

        let az = key("az");
        assert_eq!(key_between(Some(&az), None).unwrap().as_str(), "b00");
    }

    #[test]
    fn test_between_adjacent_integers() {
        let a1 = key("a1");
        let a2 = key("a2");
        let mid = key_between(Some(&a1), Some(&a2)).unwrap();
        assert_eq!(mid.as_str(), "a1V");
        assert!(a1 < mid && mid < a2);
    }

    #[test]
    fn test_between_distant_integers() {
        let a0 = key("a0");
        let a5 = key("a5");
        let mid = key_between(Some(&a0), Some(&a5)).unwrap();
        assert_eq!(mid.as_str(), "a1");
    }

    #[test]
    fn test_order_violation() {
        let a1 = key("a1");
        let a2 = key("a2");
        assert!(matches!(
            key_between(Some(&a2), Some(&a1)),
            Err(OrderKeyError::OrderViolation { .. })
        ));
        assert!(matches!(
            key_between(Some(&a1), Some(&a1)),
            Err(OrderKeyError::OrderViolation { .. })
        ));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(OrderKey::parse("").is_err());
        assert!(OrderKey::parse("a10").is_err());
        assert!(OrderKey::parse("a").is_err());
        assert!(OrderKey::parse("a!").is_err());
        assert!(OrderKey::parse(SMALLEST_INTEGER).is_err());
        assert!(OrderKey::parse("a1V").is_ok());
    }

    #[test]
    fn test_repeated_insertion_keeps_total_order() {
        // Keep inserting just above the lower bound, the worst case for key growth.
        let lower = key("a1");
        let mut upper = key("a2");
        let mut all = vec![lower.clone(), upper.clone()];
        for _ in 0..50 {
            let next = key_between(Some(&lower), Some(&upper)).unwrap();
            assert!(lower < next && next < upper);
            all.push(next.clone());
            upper = next;
        }
        let mut sorted = all.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
    }

    #[test]
    fn test_repeated_insertion_upwards() {
        let mut lower = key("a1");
        let upper = key("a2");
        for _ in 0..50 {
            let next = key_between(Some(&lower), Some(&upper)).unwrap();
            assert!(lower < next && next < upper);
            lower = next;
        }
    }

    #[test]
    fn test_n_keys_between() {
        let keys = n_keys_between(None, None, 5).unwrap();
        assert_eq!(keys.len(), 5);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let a0 = key("a0");
        let a1 = key("a1");
        let keys = n_keys_between(Some(&a0), Some(&a1), 10).unwrap();
        assert_eq!(keys.len(), 10);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(keys.first().unwrap() > &a0);
        assert!(keys.last().unwrap() < &a1);

        let keys = n_keys_between(None, Some(&a0), 3).unwrap();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(keys.last().unwrap() < &a0);
    }

    #[test]
    fn test_negative_integer_range() {
        let zz = key("Zz");
        let below = key_between(None, Some(&zz)).unwrap();
        assert_eq!(below.as_str(), "Zy");
        let between = key_between(Some(&below), Some(&zz)).unwrap();
        assert!(below < between && between < zz);
    }
}
