//! Primitive kinds and the explicit conversions between them.

use std::any::TypeId;

use crate::key::TypeKey;
use crate::value::Value;

/// Built-in scalar types that convert into one another.
///
/// Conversion is explicit and per pair: integers are range checked,
/// floats round half to even when narrowed to integers, text parses into
/// numbers and booleans, and every kind renders into `String`. A failed
/// conversion is a non-match, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
}

/// Intermediate representation shared by every conversion pair.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Bool(bool),
    Char(char),
    Int(i128),
    Float(f64),
    Text(String),
}

pub(crate) const ALL_PRIMITIVES: [PrimitiveKind; 15] = [
    PrimitiveKind::Bool,
    PrimitiveKind::Char,
    PrimitiveKind::I8,
    PrimitiveKind::I16,
    PrimitiveKind::I32,
    PrimitiveKind::I64,
    PrimitiveKind::Isize,
    PrimitiveKind::U8,
    PrimitiveKind::U16,
    PrimitiveKind::U32,
    PrimitiveKind::U64,
    PrimitiveKind::Usize,
    PrimitiveKind::F32,
    PrimitiveKind::F64,
    PrimitiveKind::String,
];

macro_rules! primitive_table {
    ($($kind:ident => $ty:ty),* $(,)?) => {
        impl PrimitiveKind {
            /// The primitive kind identified by `key`, if any.
            pub fn of(key: TypeKey) -> Option<Self> {
                let id = key.id();
                $(
                    if id == TypeId::of::<$ty>() {
                        return Some(PrimitiveKind::$kind);
                    }
                )*
                None
            }

            /// Key of the Rust type backing this kind.
            pub fn type_key(self) -> TypeKey {
                match self {
                    $(PrimitiveKind::$kind => TypeKey::of::<$ty>(),)*
                }
            }

            /// Zero value of the kind (`false`, `'\0'`, `0`, `0.0`, `""`).
            pub fn default_value(self) -> Value {
                match self {
                    $(PrimitiveKind::$kind => Value::new(<$ty>::default()),)*
                }
            }
        }
    };
}

primitive_table! {
    Bool => bool,
    Char => char,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    Isize => isize,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    Usize => usize,
    F32 => f32,
    F64 => f64,
    String => String,
}

macro_rules! read_int {
    ($value:expr, $ty:ty) => {
        $value.downcast_ref::<$ty>().map(|v| Scalar::Int(*v as i128))
    };
}

macro_rules! write_int {
    ($scalar:expr, $ty:ty) => {
        scalar_to_int($scalar).and_then(|v| <$ty>::try_from(v).ok()).map(Value::new)
    };
}

impl PrimitiveKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::String)
    }

    fn read(self, value: &Value) -> Option<Scalar> {
        match self {
            PrimitiveKind::Bool => value.downcast_ref::<bool>().map(|v| Scalar::Bool(*v)),
            PrimitiveKind::Char => value.downcast_ref::<char>().map(|v| Scalar::Char(*v)),
            PrimitiveKind::I8 => read_int!(value, i8),
            PrimitiveKind::I16 => read_int!(value, i16),
            PrimitiveKind::I32 => read_int!(value, i32),
            PrimitiveKind::I64 => read_int!(value, i64),
            PrimitiveKind::Isize => read_int!(value, isize),
            PrimitiveKind::U8 => read_int!(value, u8),
            PrimitiveKind::U16 => read_int!(value, u16),
            PrimitiveKind::U32 => read_int!(value, u32),
            PrimitiveKind::U64 => read_int!(value, u64),
            PrimitiveKind::Usize => read_int!(value, usize),
            PrimitiveKind::F32 => value.downcast_ref::<f32>().map(|v| Scalar::Float(f64::from(*v))),
            PrimitiveKind::F64 => value.downcast_ref::<f64>().map(|v| Scalar::Float(*v)),
            PrimitiveKind::String => value.downcast_ref::<String>().map(|v| Scalar::Text(v.clone())),
        }
    }

    fn write(self, scalar: Scalar) -> Option<Value> {
        match self {
            PrimitiveKind::Bool => scalar_to_bool(scalar).map(Value::new),
            PrimitiveKind::Char => scalar_to_char(scalar).map(Value::new),
            PrimitiveKind::I8 => write_int!(scalar, i8),
            PrimitiveKind::I16 => write_int!(scalar, i16),
            PrimitiveKind::I32 => write_int!(scalar, i32),
            PrimitiveKind::I64 => write_int!(scalar, i64),
            PrimitiveKind::Isize => write_int!(scalar, isize),
            PrimitiveKind::U8 => write_int!(scalar, u8),
            PrimitiveKind::U16 => write_int!(scalar, u16),
            PrimitiveKind::U32 => write_int!(scalar, u32),
            PrimitiveKind::U64 => write_int!(scalar, u64),
            PrimitiveKind::Usize => write_int!(scalar, usize),
            PrimitiveKind::F32 => scalar_to_float(scalar).map(|v| Value::new(v as f32)),
            PrimitiveKind::F64 => scalar_to_float(scalar).map(Value::new),
            PrimitiveKind::String => Some(Value::new(scalar_to_text(scalar))),
        }
    }
}

fn scalar_to_bool(scalar: Scalar) -> Option<bool> {
    match scalar {
        Scalar::Bool(v) => Some(v),
        Scalar::Int(v) => Some(v != 0),
        Scalar::Float(v) => Some(v != 0.0),
        Scalar::Text(text) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") {
                Some(true)
            } else if text.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        Scalar::Char(_) => None,
    }
}

fn scalar_to_char(scalar: Scalar) -> Option<char> {
    match scalar {
        Scalar::Char(v) => Some(v),
        Scalar::Int(v) => u32::try_from(v).ok().and_then(char::from_u32),
        Scalar::Text(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        Scalar::Bool(_) | Scalar::Float(_) => None,
    }
}

fn scalar_to_int(scalar: Scalar) -> Option<i128> {
    match scalar {
        Scalar::Int(v) => Some(v),
        Scalar::Bool(v) => Some(i128::from(v)),
        Scalar::Char(v) => Some(i128::from(u32::from(v))),
        Scalar::Float(v) => {
            if !v.is_finite() {
                return None;
            }
            let rounded = v.round_ties_even();
            if rounded < i128::MIN as f64 || rounded >= i128::MAX as f64 {
                return None;
            }
            Some(rounded as i128)
        }
        Scalar::Text(text) => text.trim().parse::<i128>().ok(),
    }
}

fn scalar_to_float(scalar: Scalar) -> Option<f64> {
    match scalar {
        Scalar::Float(v) => Some(v),
        Scalar::Int(v) => Some(v as f64),
        Scalar::Bool(v) => Some(if v { 1.0 } else { 0.0 }),
        Scalar::Text(text) => text.trim().parse::<f64>().ok(),
        Scalar::Char(_) => None,
    }
}

fn scalar_to_text(scalar: Scalar) -> String {
    match scalar {
        Scalar::Bool(v) => v.to_string(),
        Scalar::Char(v) => v.to_string(),
        Scalar::Int(v) => v.to_string(),
        Scalar::Float(v) => v.to_string(),
        Scalar::Text(v) => v,
    }
}

/// Converts a primitive value into another primitive kind.
///
/// Returns `None` when `value` is not a primitive or the conversion does
/// not fit (out of range, unparsable text, unsupported pair).
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{convert, PrimitiveKind, Value};
///
/// let parsed = convert(&Value::from("42"), PrimitiveKind::U8).unwrap();
/// assert_eq!(parsed.cloned::<u8>(), Some(42));
///
/// assert!(convert(&Value::from(300i32), PrimitiveKind::U8).is_none());
/// assert!(convert(&Value::from("a"), PrimitiveKind::I32).is_none());
/// ```
pub fn convert(value: &Value, target: PrimitiveKind) -> Option<Value> {
    let source = PrimitiveKind::of(value.type_key())?;
    let scalar = source.read(value)?;
    target.write(scalar)
}
