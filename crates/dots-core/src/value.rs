//! Numeric values carried by dots and the binary operators that combine them.

use std::cmp::Ordering;
use std::fmt;

// ── Value ───────────────────────────────────────────────────────

/// A number carried in a dot's value or tag register.
///
/// Values start out integral. Arithmetic that cannot stay integral
/// (inexact division, negative powers, overflow) promotes to `Float`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Exact integer.
    Int(i64),
    /// Floating point result of an inexact operation.
    Float(f64),
}

impl Default for Value {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl Value {
    /// The integer zero.
    pub const ZERO: Value = Value::Int(0);

    /// Boolean encoding used by comparison and logic operators.
    pub fn from_bool(b: bool) -> Self {
        Self::Int(i64::from(b))
    }

    /// Whether the value counts as true (non-zero).
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Int(v) => v != 0,
            Self::Float(v) => v != 0.0,
        }
    }

    /// Lossy conversion to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Whether the value is exactly zero.
    pub fn is_zero(self) -> bool {
        !self.is_truthy()
    }

    /// Interpret the value as a Unicode scalar, for character output.
    pub fn to_char(self) -> Option<char> {
        let code = match self {
            Self::Int(v) => u32::try_from(v).ok()?,
            Self::Float(v) if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 => v as u32,
            Self::Float(_) => return None,
        };
        char::from_u32(code)
    }

    /// Parse an input line: integer first, then float.
    ///
    /// Surrounding whitespace is ignored and an empty line reads as zero.
    pub fn parse(text: &str) -> Option<Value> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Self::ZERO);
        }
        if let Ok(v) = text.parse::<i64>() {
            return Some(Self::Int(v));
        }
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Float)
    }

    /// Append a decimal digit (`self * 10 + digit`), used while reading
    /// `#123` literals.
    pub fn push_digit(self, digit: u8) -> Value {
        match self {
            Self::Int(v) => v
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(digit)))
                .map(Self::Int)
                .unwrap_or(Self::Float(v as f64 * 10.0 + f64::from(digit))),
            Self::Float(v) => Self::Float(v * 10.0 + f64::from(digit)),
        }
    }

    fn compare(self, rhs: Value) -> Option<Ordering> {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

// ── Operator ────────────────────────────────────────────────────

/// Binary operator glyphs usable inside `[ ]` and `{ }` brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` true division.
    Div,
    /// `÷` floor division.
    FloorDiv,
    /// `%` floor modulo.
    Rem,
    /// `^`
    Pow,
    /// `&` logical and.
    And,
    /// `o` logical or.
    Or,
    /// `x` logical xor.
    Xor,
    /// `=`
    Eq,
    /// `≠`
    Ne,
    /// `<`
    Lt,
    /// `≤`
    Le,
    /// `>`
    Gt,
    /// `≥`
    Ge,
}

impl Operator {
    /// Operator for a glyph, if the glyph names one.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        let op = match glyph {
            '+' => Self::Add,
            '-' => Self::Sub,
            '*' => Self::Mul,
            '/' => Self::Div,
            '÷' => Self::FloorDiv,
            '%' => Self::Rem,
            '^' => Self::Pow,
            '&' => Self::And,
            'o' => Self::Or,
            'x' => Self::Xor,
            '=' => Self::Eq,
            '≠' => Self::Ne,
            '<' => Self::Lt,
            '≤' => Self::Le,
            '>' => Self::Gt,
            '≥' => Self::Ge,
            _ => return None,
        };
        Some(op)
    }

    /// The glyph this operator is written with.
    pub fn glyph(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::FloorDiv => '÷',
            Self::Rem => '%',
            Self::Pow => '^',
            Self::And => '&',
            Self::Or => 'o',
            Self::Xor => 'x',
            Self::Eq => '=',
            Self::Ne => '≠',
            Self::Lt => '<',
            Self::Le => '≤',
            Self::Gt => '>',
            Self::Ge => '≥',
        }
    }

    /// Compute `lhs op rhs`.
    ///
    /// Returns `None` only for division or modulo by zero.
    pub fn apply(self, lhs: Value, rhs: Value) -> Option<Value> {
        use Value::{Float, Int};

        let out = match self {
            Self::Add => int_or_float(lhs, rhs, i64::checked_add, |a, b| a + b),
            Self::Sub => int_or_float(lhs, rhs, i64::checked_sub, |a, b| a - b),
            Self::Mul => int_or_float(lhs, rhs, i64::checked_mul, |a, b| a * b),
            Self::Div => {
                if rhs.is_zero() {
                    return None;
                }
                match (lhs, rhs) {
                    (Int(a), Int(b)) if a.checked_rem(b) == Some(0) => {
                        a.checked_div(b).map(Int).unwrap_or(Float(a as f64 / b as f64))
                    }
                    (a, b) => Float(a.as_f64() / b.as_f64()),
                }
            }
            Self::FloorDiv => {
                if rhs.is_zero() {
                    return None;
                }
                match (lhs, rhs) {
                    (Int(a), Int(b)) => floor_div(a, b)
                        .map(Int)
                        .unwrap_or(Float((a as f64 / b as f64).floor())),
                    (a, b) => Float((a.as_f64() / b.as_f64()).floor()),
                }
            }
            Self::Rem => {
                if rhs.is_zero() {
                    return None;
                }
                match (lhs, rhs) {
                    (Int(a), Int(b)) => Int(floor_rem(a, b)),
                    (a, b) => {
                        let (a, b) = (a.as_f64(), b.as_f64());
                        Float(a - b * (a / b).floor())
                    }
                }
            }
            Self::Pow => match (lhs, rhs) {
                (Int(a), Int(b)) if b >= 0 => u32::try_from(b)
                    .ok()
                    .and_then(|e| a.checked_pow(e))
                    .map(Int)
                    .unwrap_or(Float((a as f64).powf(b as f64))),
                (a, b) => Float(a.as_f64().powf(b.as_f64())),
            },
            Self::And => Value::from_bool(lhs.is_truthy() && rhs.is_truthy()),
            Self::Or => Value::from_bool(lhs.is_truthy() || rhs.is_truthy()),
            Self::Xor => Value::from_bool(lhs.is_truthy() != rhs.is_truthy()),
            Self::Eq => Value::from_bool(lhs.compare(rhs) == Some(Ordering::Equal)),
            Self::Ne => Value::from_bool(lhs.compare(rhs) != Some(Ordering::Equal)),
            Self::Lt => Value::from_bool(lhs.compare(rhs) == Some(Ordering::Less)),
            Self::Le => Value::from_bool(matches!(
                lhs.compare(rhs),
                Some(Ordering::Less | Ordering::Equal)
            )),
            Self::Gt => Value::from_bool(lhs.compare(rhs) == Some(Ordering::Greater)),
            Self::Ge => Value::from_bool(matches!(
                lhs.compare(rhs),
                Some(Ordering::Greater | Ordering::Equal)
            )),
        };
        Some(out)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

fn int_or_float(
    lhs: Value,
    rhs: Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(a, b)
            .map(Value::Int)
            .unwrap_or(Value::Float(float_op(a as f64, b as f64))),
        (a, b) => Value::Float(float_op(a.as_f64(), b.as_f64())),
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn floor_rem(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn int(v: i64) -> Value {
        Value::Int(v)
    }

    #[test]
    fn exact_division_stays_integral() {
        assert_eq!(Operator::Div.apply(int(12), int(4)), Some(int(3)));
        assert_eq!(Operator::Div.apply(int(7), int(2)), Some(Value::Float(3.5)));
    }

    #[test]
    fn division_by_zero_is_none() {
        assert_eq!(Operator::Div.apply(int(1), int(0)), None);
        assert_eq!(Operator::FloorDiv.apply(int(1), int(0)), None);
        assert_eq!(Operator::Rem.apply(int(1), Value::Float(0.0)), None);
    }

    #[test]
    fn floor_semantics_for_negatives() {
        assert_eq!(Operator::FloorDiv.apply(int(-7), int(2)), Some(int(-4)));
        assert_eq!(Operator::Rem.apply(int(-7), int(2)), Some(int(1)));
        assert_eq!(Operator::Rem.apply(int(7), int(-2)), Some(int(-1)));
    }

    #[test]
    fn overflow_promotes_to_float() {
        let out = Operator::Add.apply(int(i64::MAX), int(1)).unwrap();
        assert!(matches!(out, Value::Float(_)));
        let out = Operator::Pow.apply(int(2), int(64)).unwrap();
        assert!(matches!(out, Value::Float(_)));
    }

    #[test]
    fn comparisons_yield_one_or_zero() {
        assert_eq!(Operator::Lt.apply(int(1), int(2)), Some(int(1)));
        assert_eq!(Operator::Ge.apply(int(1), int(2)), Some(int(0)));
        assert_eq!(Operator::Eq.apply(int(2), Value::Float(2.0)), Some(int(1)));
        assert_eq!(Operator::Ne.apply(int(2), int(2)), Some(int(0)));
    }

    #[test]
    fn logic_uses_truthiness() {
        assert_eq!(Operator::And.apply(int(3), int(0)), Some(int(0)));
        assert_eq!(Operator::Or.apply(int(3), int(0)), Some(int(1)));
        assert_eq!(Operator::Xor.apply(int(3), int(5)), Some(int(0)));
    }

    #[test]
    fn parse_input_lines() {
        assert_eq!(Value::parse(""), Some(int(0)));
        assert_eq!(Value::parse("  42\n"), Some(int(42)));
        assert_eq!(Value::parse("-3"), Some(int(-3)));
        assert_eq!(Value::parse("2.5"), Some(Value::Float(2.5)));
        assert_eq!(Value::parse("abc"), None);
        assert_eq!(Value::parse("inf"), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(int(7).to_string(), "7");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
    }

    #[test]
    fn char_conversion() {
        assert_eq!(int(65).to_char(), Some('A'));
        assert_eq!(int(-1).to_char(), None);
        assert_eq!(Value::Float(66.0).to_char(), Some('B'));
        assert_eq!(Value::Float(66.5).to_char(), None);
    }

    #[test]
    fn glyph_round_trip_for_every_operator() {
        for glyph in "+-*/÷%^&ox=≠<≤>≥".chars() {
            let op = Operator::from_glyph(glyph).unwrap();
            assert_eq!(op.glyph(), glyph);
        }
        assert_eq!(Operator::from_glyph('a'), None);
    }

    proptest! {
        #[test]
        fn floor_rem_sign_follows_divisor(a in -1000i64..1000, b in -50i64..50) {
            prop_assume!(b != 0);
            let Some(Value::Int(r)) = Operator::Rem.apply(int(a), int(b)) else {
                panic!("integer remainder expected");
            };
            prop_assert!(r == 0 || (r < 0) == (b < 0));
            let Some(Value::Int(q)) = Operator::FloorDiv.apply(int(a), int(b)) else {
                panic!("integer quotient expected");
            };
            prop_assert_eq!(q * b + r, a);
        }

        #[test]
        fn push_digit_builds_decimal(digits in proptest::collection::vec(0u8..10, 1..12)) {
            let mut v = Value::ZERO;
            let mut expected = 0i64;
            for d in &digits {
                v = v.push_digit(*d);
                expected = expected * 10 + i64::from(*d);
            }
            prop_assert_eq!(v, int(expected));
        }
    }
}
