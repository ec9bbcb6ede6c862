//! Coercion of scalars and sequences into array or list parameters.

use super::Matcher;
use crate::catalog::TypeKind;
use crate::error::DiResult;
use crate::key::TypeKey;
use crate::value::Value;

impl<'a> Matcher<'a> {
    /// Builds the collection type `target` from `value`.
    ///
    /// A value matching the element type becomes a one-element collection.
    /// Otherwise an enumerable value contributes every element that
    /// matches; the rest are dropped. An empty result only succeeds with
    /// `allow_empty`. Non-collection targets never match.
    pub fn coerce_to_collection(&self, value: &Value, target: TypeKey, allow_empty: bool) -> DiResult<Option<Value>> {
        let Some(info) = self.catalog.collection(target) else {
            return Ok(None);
        };
        let element = info.element();

        let mut elements = Vec::new();
        if let Some(single) = self.match_element(element, value)? {
            elements.push(single);
        } else if let Some(items) = self.enumerate(value) {
            for item in &items {
                if let Some(matched) = self.match_element(element, item)? {
                    elements.push(matched);
                }
            }
        }

        if elements.is_empty() && !allow_empty {
            return Ok(None);
        }
        Ok(info.build(&elements))
    }

    /// Matches one collection element.
    ///
    /// A value hook may hand back a value of another type; such a value
    /// cannot be stored and counts as no match, unless the element type is
    /// dynamic.
    pub(crate) fn match_element(&self, element: TypeKey, value: &Value) -> DiResult<Option<Value>> {
        let matched = self.match_value(element, value)?;
        if self.catalog.kind(element) == Some(TypeKind::Dynamic) {
            return Ok(matched);
        }
        Ok(matched.filter(|m| m.type_key() == element))
    }

    /// Elements of an array or list value; `None` for anything else.
    pub(crate) fn enumerate(&self, value: &Value) -> Option<Vec<Value>> {
        self.catalog.collection(value.type_key())?.items(value)
    }
}
