//! Value coercion: loosely-typed input values into statically-typed slots.
//!
//! Rules, in priority order:
//!
//! 1. identity when the input already has the slot's shape;
//! 2. numeric conversion that must round-trip exactly (`3.0` fits an `i32`,
//!    `3.5` does not); numeral strings are accepted as numbers;
//! 3. structural conversion of an object into a record (see [`crate::record!`]),
//!    where keys the record does not map are governed by [`UnknownKeys`].

use serde_json::{Number, Value};

use crate::error::PatchError;
use crate::graph::Node;

/// Conversion from the input representation into `Self`.
pub trait Coerce: Node + Sized {
    fn coerce(value: &Value, coercion: &Coercion) -> Result<Self, PatchError>;

    /// Overwrite `self` with `value`. Content the input cannot set (read-only
    /// record members) keeps its current state. On error `self` is untouched.
    fn coerce_in_place(&mut self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        *self = Self::coerce(value, coercion)?;
        Ok(())
    }

    /// Whether `value`, coerced into `Self`, equals the current content.
    /// Read-only record members are compared only when `value` names them.
    fn coerced_eq(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError> {
        Ok(Self::coerce(value, coercion)?.to_value() == self.to_value())
    }
}

/// What structural coercion does with object keys that name no record
/// member. Keys naming read-only members are always accepted and never
/// written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Fail with `TypeMismatch`.
    #[default]
    Reject,
    /// Drop the key.
    Ignore,
}

/// Coercion policy shared by every write of one apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coercion {
    pub unknown_keys: UnknownKeys,
}

impl Coercion {
    pub fn strict() -> Self {
        Self { unknown_keys: UnknownKeys::Reject }
    }

    pub fn lenient() -> Self {
        Self { unknown_keys: UnknownKeys::Ignore }
    }

    /// Called by structural coercion for every key `target` cannot map.
    pub fn unmapped_key(&self, target: &str, key: &str) -> Result<(), PatchError> {
        match self.unknown_keys {
            UnknownKeys::Reject => Err(PatchError::TypeMismatch(format!(
                "{target} has no member {key:?}"
            ))),
            UnknownKeys::Ignore => {
                tracing::debug!(target_type = target, key, "dropping unmapped key");
                Ok(())
            }
        }
    }
}

// ── Helpers used by the provided implementations and `record!` ────────────

/// Borrow `value` as an object or fail with `TypeMismatch`.
pub fn expect_object<'a>(
    value: &'a Value,
    target: &str,
) -> Result<&'a serde_json::Map<String, Value>, PatchError> {
    value.as_object().ok_or_else(|| PatchError::mismatch(target, value))
}

/// Borrow `value` as an array or fail with `TypeMismatch`.
pub fn expect_array<'a>(value: &'a Value, target: &str) -> Result<&'a Vec<Value>, PatchError> {
    value.as_array().ok_or_else(|| PatchError::mismatch(target, value))
}

fn parse_numeral(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(i.into());
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(u.into());
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn numeral(value: &Value, target: &str) -> Result<Number, PatchError> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        Value::String(s) => parse_numeral(s).ok_or_else(|| {
            PatchError::TypeMismatch(format!("{s:?} is not a valid numeral for {target}"))
        }),
        other => Err(PatchError::mismatch(target, other)),
    }
}

fn out_of_range(number: &Number, target: &str) -> PatchError {
    PatchError::TypeMismatch(format!("{number} does not fit {target}"))
}

// 2^63 as f64; the largest magnitude an i64/u64 conversion may start from.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

fn integral<T>(value: &Value, target: &str) -> Result<T, PatchError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let number = numeral(value, target)?;
    if let Some(i) = number.as_i64() {
        return <T as TryFrom<i64>>::try_from(i).map_err(|_| out_of_range(&number, target));
    }
    if let Some(u) = number.as_u64() {
        return <T as TryFrom<u64>>::try_from(u).map_err(|_| out_of_range(&number, target));
    }
    let f = number.as_f64().ok_or_else(|| out_of_range(&number, target))?;
    if f.fract() != 0.0 || !(-TWO_POW_63..TWO_POW_63 * 2.0).contains(&f) {
        return Err(out_of_range(&number, target));
    }
    if f < 0.0 {
        <T as TryFrom<i64>>::try_from(f as i64).map_err(|_| out_of_range(&number, target))
    } else {
        <T as TryFrom<u64>>::try_from(f as u64).map_err(|_| out_of_range(&number, target))
    }
}

fn float(value: &Value, target: &str) -> Result<f64, PatchError> {
    let number = numeral(value, target)?;
    if let Some(i) = number.as_i64() {
        let f = i as f64;
        // i64 → f64 is exact only within ±2^53 and a few sparse values.
        if f >= TWO_POW_63 || f as i64 != i {
            return Err(out_of_range(&number, target));
        }
        return Ok(f);
    }
    if let Some(u) = number.as_u64() {
        let f = u as f64;
        if f >= TWO_POW_63 * 2.0 || f as u64 != u {
            return Err(out_of_range(&number, target));
        }
        return Ok(f);
    }
    number.as_f64().ok_or_else(|| out_of_range(&number, target))
}

macro_rules! coerce_integral {
    ($($ty:ty),* $(,)?) => {$(
        impl Coerce for $ty {
            fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
                integral(value, stringify!($ty))
            }
        }
    )*};
}

coerce_integral!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Coerce for f64 {
    fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
        float(value, "f64")
    }
}

impl Coerce for f32 {
    fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
        let wide = float(value, "f32")?;
        let narrow = wide as f32;
        if !narrow.is_finite() || f64::from(narrow) != wide {
            return Err(PatchError::TypeMismatch(format!("{wide} does not fit f32")));
        }
        Ok(narrow)
    }
}

impl Coerce for bool {
    fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            other => Err(PatchError::mismatch("bool", other)),
        }
    }
}

impl Coerce for String {
    fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(PatchError::mismatch("string", other)),
        }
    }
}

impl Coerce for Value {
    fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
        Ok(value.clone())
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn coerce(value: &Value, coercion: &Coercion) -> Result<Self, PatchError> {
        match value {
            Value::Null => Ok(None),
            other => T::coerce(other, coercion).map(Some),
        }
    }

    fn coerce_in_place(&mut self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        if let (Some(inner), false) = (self.as_mut(), value.is_null()) {
            return inner.coerce_in_place(value, coercion);
        }
        *self = Self::coerce(value, coercion)?;
        Ok(())
    }

    fn coerced_eq(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError> {
        match (self, value) {
            (_, Value::Null) => Ok(self.is_none()),
            (Some(inner), other) => inner.coerced_eq(other, coercion),
            (None, other) => T::coerce(other, coercion).map(|_| false),
        }
    }
}

impl<T: Coerce> Coerce for Box<T> {
    fn coerce(value: &Value, coercion: &Coercion) -> Result<Self, PatchError> {
        T::coerce(value, coercion).map(Box::new)
    }

    fn coerce_in_place(&mut self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        (**self).coerce_in_place(value, coercion)
    }

    fn coerced_eq(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError> {
        (**self).coerced_eq(value, coercion)
    }
}

impl<T: Coerce> Coerce for Vec<T> {
    fn coerce(value: &Value, coercion: &Coercion) -> Result<Self, PatchError> {
        expect_array(value, "sequence")?
            .iter()
            .map(|item| T::coerce(item, coercion))
            .collect()
    }

    fn coerced_eq(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError> {
        // Every element must coerce before any comparison short-circuits.
        Self::coerce(value, coercion)?;
        let items = expect_array(value, "sequence")?;
        if items.len() != self.len() {
            return Ok(false);
        }
        for (current, item) in self.iter().zip(items) {
            if !current.coerced_eq(item, coercion)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
