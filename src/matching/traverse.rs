//! Consumption tracking over positional candidates.

use smallvec::SmallVec;

use crate::error::DiResult;
use crate::value::Value;

/// Positional candidates with a parallel "used" set and a shrinking search
/// window.
///
/// The window `[start, end)` always starts and ends at unused slots, so
/// repeated scans for the same parameter list skip consumed prefixes and
/// suffixes instead of re-walking them.
#[derive(Debug)]
pub struct ArgumentTraverseContext<'a> {
    values: &'a [Value],
    used: SmallVec<[bool; 8]>,
    start: usize,
    end: usize,
    cursor: usize,
}

impl<'a> ArgumentTraverseContext<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self {
            values,
            used: SmallVec::from_elem(false, values.len()),
            start: 0,
            end: values.len(),
            cursor: 0,
        }
    }

    /// All candidates, used or not.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(true)
    }

    /// Unused candidates with their positions.
    pub fn remaining(&self) -> impl Iterator<Item = (usize, &'a Value)> + '_ {
        let values = self.values;
        (self.start..self.end)
            .filter(move |&i| !self.used[i])
            .map(move |i| (i, &values[i]))
    }

    /// Rewinds the cursor to the first unused slot.
    pub fn reset(&mut self) {
        self.cursor = self.start;
    }

    /// Examines the next unused slot.
    ///
    /// Returns `Ok(false)` once the window is exhausted. Otherwise calls
    /// `predicate(value, index)`; on `true` the slot is consumed and the
    /// window tightened. The cursor always moves past the examined slot.
    pub fn advance<F>(&mut self, mut predicate: F) -> DiResult<bool>
    where
        F: FnMut(&'a Value, usize) -> DiResult<bool>,
    {
        while self.cursor < self.end && self.used[self.cursor] {
            self.cursor += 1;
        }
        if self.cursor >= self.end {
            return Ok(false);
        }

        let index = self.cursor;
        if predicate(&self.values[index], index)? {
            self.consume(index);
        }
        self.cursor += 1;
        Ok(true)
    }

    /// Consumes the first unused slot satisfying `predicate`, scanning from
    /// the start of the window. Returns its index.
    pub fn find_and_consume<F>(&mut self, mut predicate: F) -> DiResult<Option<usize>>
    where
        F: FnMut(&'a Value, usize) -> DiResult<bool>,
    {
        self.reset();
        let mut found = None;
        while found.is_none() {
            let more = self.advance(|value, index| {
                let hit = predicate(value, index)?;
                if hit {
                    found = Some(index);
                }
                Ok(hit)
            })?;
            if !more {
                break;
            }
        }
        Ok(found)
    }

    /// Consumes the unused slot holding `value` itself, if any.
    pub(crate) fn consume_identical(&mut self, value: &Value) -> bool {
        let hit = (self.start..self.end).find(|&i| !self.used[i] && self.values[i].ptr_eq(value));
        match hit {
            Some(index) => {
                self.consume(index);
                true
            }
            None => false,
        }
    }

    fn consume(&mut self, index: usize) {
        self.used[index] = true;
        while self.start < self.end && self.used[self.start] {
            self.start += 1;
        }
        while self.end > self.start && self.used[self.end - 1] {
            self.end -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<Value> {
        vec![Value::from(1), Value::from("two"), Value::from(3), Value::from(4)]
    }

    #[test]
    fn window_shrinks_from_both_ends() {
        let values = values();
        let mut ctx = ArgumentTraverseContext::new(&values);

        assert_eq!(ctx.find_and_consume(|_, i| Ok(i == 0)).unwrap(), Some(0));
        assert_eq!(ctx.find_and_consume(|_, i| Ok(i == 3)).unwrap(), Some(3));
        assert_eq!((ctx.start, ctx.end), (1, 3));

        let left: Vec<usize> = ctx.remaining().map(|(i, _)| i).collect();
        assert_eq!(left, vec![1, 2]);
    }

    #[test]
    fn advance_skips_used_slots_and_stops_at_window_end() {
        let values = values();
        let mut ctx = ArgumentTraverseContext::new(&values);
        ctx.find_and_consume(|_, i| Ok(i == 1)).unwrap();

        ctx.reset();
        let mut seen = Vec::new();
        while ctx.advance(|_, i| {
            seen.push(i);
            Ok(false)
        })
        .unwrap()
        {}
        assert_eq!(seen, vec![0, 2, 3]);
    }

    #[test]
    fn consumed_slots_are_never_offered_again() {
        let values = values();
        let mut ctx = ArgumentTraverseContext::new(&values);
        let ints = |v: &Value, _| Ok(v.is::<i32>());

        assert_eq!(ctx.find_and_consume(ints).unwrap(), Some(0));
        assert_eq!(ctx.find_and_consume(ints).unwrap(), Some(2));
        assert_eq!(ctx.find_and_consume(ints).unwrap(), Some(3));
        assert_eq!(ctx.find_and_consume(ints).unwrap(), None);
        assert!(!ctx.is_used(1));
    }

    #[test]
    fn identical_value_is_consumed_once() {
        let values = values();
        let mut ctx = ArgumentTraverseContext::new(&values);
        let picked = values[2].clone();
        assert!(ctx.consume_identical(&picked));
        assert!(!ctx.consume_identical(&picked));
        assert!(!ctx.consume_identical(&Value::from(3)));
    }

    #[test]
    fn empty_context_is_exhausted_immediately() {
        let mut ctx = ArgumentTraverseContext::new(&[]);
        assert!(!ctx.advance(|_, _| Ok(true)).unwrap());
    }
}
