use core::any::type_name;

use serde_json::{Number, Value};

use crate::CodecError;
use crate::coerce::{AttrContext, Attribute};

/// Narrows a JSON number to an integer type.
///
/// Floats are accepted only when integral. Anything out of range is an
/// [`UnknownNumberKind`](CodecError::UnknownNumberKind) error.
pub(crate) fn integer_from_number<T>(number: &Number) -> Result<T, CodecError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let out_of_range = || CodecError::UnknownNumberKind {
        number: number.to_string(),
        target: type_name::<T>(),
    };

    if let Some(value) = number.as_i64() {
        T::try_from(value).map_err(|_| out_of_range())
    } else if let Some(value) = number.as_u64() {
        T::try_from(value).map_err(|_| out_of_range())
    } else {
        let value = number.as_f64().ok_or_else(out_of_range)?;
        let integral = value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64;
        if !integral {
            return Err(out_of_range());
        }
        T::try_from(value as i64).map_err(|_| out_of_range())
    }
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl Attribute for $ty {
            #[inline]
            fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
                Ok(Some(Value::from(*self)))
            }

            fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
                match &value {
                    Value::Number(number) => integer_from_number(number),
                    other => Err(CodecError::mismatch("number", other)),
                }
            }

            #[inline]
            fn is_empty_value(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Attribute for f64 {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::from(*self)))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        match &value {
            Value::Number(number) => number.as_f64().ok_or_else(|| CodecError::UnknownNumberKind {
                number: number.to_string(),
                target: "f64",
            }),
            other => Err(CodecError::mismatch("number", other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }
}

impl Attribute for f32 {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::from(*self)))
    }

    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        let wide = f64::decode(value, cx)?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(CodecError::UnknownNumberKind {
                number: wide.to_string(),
                target: "f32",
            });
        }
        Ok(wide as f32)
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }
}
