//! Single value against single target type.

use super::hooks::ValueMatchingArgs;
use super::Matcher;
use crate::catalog::{convert, PrimitiveKind, TypeKind};
use crate::error::DiResult;
use crate::key::TypeKey;
use crate::value::Value;

impl<'a> Matcher<'a> {
    /// Whether `value` can satisfy `target`, and as what.
    ///
    /// First success wins: the value itself when its type is `target` or
    /// `target` is the dynamic type; its declared upcast; a primitive
    /// conversion; the "value matching" hook. A failed conversion is
    /// `Ok(None)`; only a misbehaving hook produces an error.
    pub fn match_value(&self, target: TypeKey, value: &Value) -> DiResult<Option<Value>> {
        let source = value.type_key();
        if source == target || self.catalog.kind(target) == Some(TypeKind::Dynamic) {
            return Ok(Some(value.clone()));
        }
        if let Some(upcast) = self.catalog.upcast(value, target) {
            return Ok(Some(upcast));
        }

        if let (Some(to), Some(_)) = (PrimitiveKind::of(target), PrimitiveKind::of(source)) {
            if let Some(converted) = convert(value, to) {
                return Ok(Some(converted));
            }
        }

        let mut args = ValueMatchingArgs::new(target, value);
        self.hooks.fire_value_matching(&mut args)?;
        Ok(args.into_value())
    }
}
