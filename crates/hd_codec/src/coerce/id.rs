use core::any::type_name;
use core::str::FromStr;

use crate::CodecError;

/// A field holding a resource key: `primary`, `type` or `client_id`.
///
/// Keys are strings on the wire whatever their Rust type.
pub trait Identifier {
    /// The wire form, or `None` when the key is unset.
    fn to_id(&self) -> Option<String>;

    /// Replaces the key from its wire form.
    fn set_id(&mut self, id: &str) -> Result<(), CodecError>;
}

impl Identifier for String {
    #[inline]
    fn to_id(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.clone())
    }

    #[inline]
    fn set_id(&mut self, id: &str) -> Result<(), CodecError> {
        id.clone_into(self);
        Ok(())
    }
}

impl Identifier for Option<String> {
    #[inline]
    fn to_id(&self) -> Option<String> {
        self.clone()
    }

    #[inline]
    fn set_id(&mut self, id: &str) -> Result<(), CodecError> {
        *self = Some(id.to_owned());
        Ok(())
    }
}

fn parse_id<T: FromStr>(id: &str) -> Result<T, CodecError> {
    id.parse().map_err(|_| CodecError::BadIdentifier {
        value: id.to_owned(),
        target: type_name::<T>(),
    })
}

macro_rules! impl_numeric_id {
    ($($ty:ty),* $(,)?) => {$(
        impl Identifier for $ty {
            #[inline]
            fn to_id(&self) -> Option<String> {
                Some(self.to_string())
            }

            #[inline]
            fn set_id(&mut self, id: &str) -> Result<(), CodecError> {
                *self = parse_id(id)?;
                Ok(())
            }
        }

        impl Identifier for Option<$ty> {
            #[inline]
            fn to_id(&self) -> Option<String> {
                self.map(|id| id.to_string())
            }

            #[inline]
            fn set_id(&mut self, id: &str) -> Result<(), CodecError> {
                *self = Some(parse_id(id)?);
                Ok(())
            }
        }
    )*};
}

impl_numeric_id!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// The nil UUID counts as unset.
#[cfg(feature = "uuid")]
impl Identifier for uuid::Uuid {
    #[inline]
    fn to_id(&self) -> Option<String> {
        (!self.is_nil()).then(|| self.to_string())
    }

    #[inline]
    fn set_id(&mut self, id: &str) -> Result<(), CodecError> {
        *self = parse_id(id)?;
        Ok(())
    }
}

#[cfg(feature = "uuid")]
impl Identifier for Option<uuid::Uuid> {
    #[inline]
    fn to_id(&self) -> Option<String> {
        self.map(|id| id.to_string())
    }

    #[inline]
    fn set_id(&mut self, id: &str) -> Result<(), CodecError> {
        *self = Some(parse_id(id)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Identifier;
    use crate::CodecError;

    #[test]
    fn strings() {
        let mut id = String::new();
        assert_eq!(id.to_id(), None);
        id.set_id("abc").unwrap();
        assert_eq!(id.to_id().as_deref(), Some("abc"));

        let mut maybe: Option<String> = None;
        maybe.set_id("").unwrap();
        assert_eq!(maybe.to_id().as_deref(), Some(""));
    }

    #[test]
    fn numbers() {
        let mut id = 0u64;
        assert_eq!(id.to_id().as_deref(), Some("0"));
        id.set_id("42").unwrap();
        assert_eq!(id, 42);

        let err = id.set_id("forty-two").unwrap_err();
        assert!(matches!(
            err,
            CodecError::BadIdentifier { ref value, target: "u64" } if value == "forty-two"
        ));
        assert!(matches!(0u8.set_id("300"), Err(CodecError::BadIdentifier { .. })));

        let mut maybe: Option<i32> = None;
        assert_eq!(maybe.to_id(), None);
        maybe.set_id("-7").unwrap();
        assert_eq!(maybe, Some(-7));
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn uuids() {
        let mut id = uuid::Uuid::nil();
        assert_eq!(id.to_id(), None);
        let fresh = uuid::Uuid::new_v4();
        id.set_id(&fresh.to_string()).unwrap();
        assert_eq!(id, fresh);
        assert!(matches!(id.set_id("nope"), Err(CodecError::BadIdentifier { .. })));
    }
}
