//! Numeric, boolean and string decoders.

use serde_json::Value;

use super::{FlagValue, Separators, Shape};
use crate::cursor::Cursor;
use crate::error::ValueError;

// Integers parse at full width, then must fit the destination.
macro_rules! signed_value {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FlagValue for $ty {
            fn shape() -> Shape {
                Shape::Signed($name)
            }

            fn zero() -> Self {
                0
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
                let wide: i64 = text.parse().map_err(|source| ValueError::Int {
                    text: text.to_string(),
                    ty: $name.to_string(),
                    source,
                })?;
                *self = <$ty>::try_from(wide).map_err(|_| ValueError::Overflow {
                    value: wide.to_string(),
                    ty: $name.to_string(),
                })?;
                Ok(())
            }

            fn flag_string(&self) -> String {
                self.to_string()
            }

            fn to_json(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

macro_rules! unsigned_value {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FlagValue for $ty {
            fn shape() -> Shape {
                Shape::Unsigned($name)
            }

            fn zero() -> Self {
                0
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
                let wide: u64 = text.parse().map_err(|source| ValueError::Int {
                    text: text.to_string(),
                    ty: $name.to_string(),
                    source,
                })?;
                *self = <$ty>::try_from(wide).map_err(|_| ValueError::Overflow {
                    value: wide.to_string(),
                    ty: $name.to_string(),
                })?;
                Ok(())
            }

            fn flag_string(&self) -> String {
                self.to_string()
            }

            fn to_json(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

macro_rules! float_value {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FlagValue for $ty {
            fn shape() -> Shape {
                Shape::Float($name)
            }

            fn zero() -> Self {
                0.0
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }

            fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
                let value: $ty = text.parse().map_err(|source| ValueError::Float {
                    text: text.to_string(),
                    ty: $name.to_string(),
                    source,
                })?;
                if value.is_infinite() && !is_infinity_literal(text) {
                    return Err(ValueError::Overflow {
                        value: text.to_string(),
                        ty: $name.to_string(),
                    });
                }
                *self = value;
                Ok(())
            }

            fn flag_string(&self) -> String {
                self.to_string()
            }

            fn to_json(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

/// `inf` or `infinity` in any case, optionally signed.
fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

signed_value!(i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64", isize => "isize");
unsigned_value!(u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64", usize => "usize");
float_value!(f32 => "f32", f64 => "f64");

impl FlagValue for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn zero() -> Self {
        false
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    /// Presence alone sets `true` unless the value is aligned, in which case
    /// the token must spell out `true` or `false`.
    fn decode(&mut self, input: &mut Cursor<'_>, _separators: &Separators) -> Result<(), ValueError> {
        if !input.is_aligned() {
            *self = true;
            return Ok(());
        }
        let text = input.value()?;
        self.parse_flag(text)
    }

    fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
        *self = match text {
            "true" => true,
            "false" => false,
            other => return Err(ValueError::InvalidBool(other.to_string())),
        };
        Ok(())
    }

    fn flag_string(&self) -> String {
        self.to_string()
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FlagValue for String {
    fn shape() -> Shape {
        Shape::Str
    }

    fn zero() -> Self {
        String::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
        text.clone_into(self);
        Ok(())
    }

    fn flag_string(&self) -> String {
        format!("{self:?}")
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}
