//! # Styled Properties
//!
//! Every styleable value on an element lives in a [`Styled`] slot that
//! remembers *who* wrote it. Writers are ranked by [`Priority`]; a write only
//! lands when its priority is at least the current one, so a direct builder
//! call always beats a keyed style, which always beats a type-wide style.
//! Equal priorities favour the newer write.

use serde::{Deserialize, Deserializer};

/// Who wrote a property value, lowest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// The type default. Nobody has touched the slot.
    #[default]
    Default,
    /// Written by a style registered for the whole element kind.
    ImplicitStyle,
    /// Written by a style the element opted into by key.
    ExplicitStyle,
    /// Written directly by the document author.
    Local,
}

/// A value slot arbitrated by [`Priority`].
#[derive(Debug, Clone, PartialEq)]
pub struct Styled<T> {
    value: T,
    priority: Priority,
}

impl<T> Styled<T> {
    /// A slot holding `value` at `Default` priority.
    pub fn new(value: T) -> Self {
        Self {
            value,
            priority: Priority::Default,
        }
    }

    /// A slot holding `value` as if the author had set it directly.
    pub fn local(value: T) -> Self {
        Self {
            value,
            priority: Priority::Local,
        }
    }

    /// Write `value` at `priority`. Returns `true` if the write landed.
    pub fn set(&mut self, value: T, priority: Priority) -> bool {
        if priority >= self.priority {
            self.value = value;
            self.priority = priority;
            true
        } else {
            false
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// True while no writer above the type default has touched the slot.
    pub fn is_default(&self) -> bool {
        self.priority == Priority::Default
    }

    /// The slot's value, or `fallback` when the slot is still at `Default`.
    ///
    /// Page defaults are read through this; they are never written back.
    pub fn get_or<'a>(&'a self, fallback: &'a T) -> &'a T {
        if self.is_default() {
            fallback
        } else {
            &self.value
        }
    }

    /// Overwrite unconditionally at `Local`.
    pub fn freeze(&mut self, value: T) {
        self.value = value;
        self.priority = Priority::Local;
    }
}

impl<T: Clone> Styled<T> {
    /// Pin the current value at `Local`.
    pub fn pin(&mut self) {
        self.priority = Priority::Local;
    }

    /// Pin the effective value (page fallback applied) at `Local`.
    pub fn pin_with(&mut self, fallback: &T) {
        let value = self.get_or(fallback).clone();
        self.freeze(value);
    }
}

impl<T: Default> Default for Styled<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Values present in the input document were written by its author.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Styled<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Styled::local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering() {
        assert!(Priority::Default < Priority::ImplicitStyle);
        assert!(Priority::ImplicitStyle < Priority::ExplicitStyle);
        assert!(Priority::ExplicitStyle < Priority::Local);
    }

    #[test]
    fn lower_priority_write_is_ignored() {
        let mut p = Styled::new(12.0);
        assert!(p.set(20.0, Priority::ExplicitStyle));
        assert!(!p.set(15.0, Priority::ImplicitStyle));
        assert_eq!(*p.value(), 20.0);
        assert_eq!(p.priority(), Priority::ExplicitStyle);
    }

    #[test]
    fn monotonic_writes_always_land() {
        let mut p = Styled::new(0);
        for (i, prio) in [
            Priority::Default,
            Priority::ImplicitStyle,
            Priority::ExplicitStyle,
            Priority::Local,
        ]
        .into_iter()
        .enumerate()
        {
            assert!(p.set(i, prio));
            assert_eq!(*p.value(), i);
        }
    }

    #[test]
    fn equal_priority_newer_write_wins() {
        let mut p = Styled::new("a");
        p.set("b", Priority::ExplicitStyle);
        p.set("c", Priority::ExplicitStyle);
        assert_eq!(*p.value(), "c");
    }

    #[test]
    fn local_beats_every_style() {
        let mut p = Styled::local(10.0);
        p.set(15.0, Priority::ImplicitStyle);
        p.set(20.0, Priority::ExplicitStyle);
        assert_eq!(*p.value(), 10.0);
    }

    #[test]
    fn get_or_reads_fallback_only_at_default() {
        let fallback = 9.0;
        let mut p = Styled::new(12.0);
        assert_eq!(*p.get_or(&fallback), 9.0);
        p.set(14.0, Priority::ImplicitStyle);
        assert_eq!(*p.get_or(&fallback), 14.0);
    }

    #[test]
    fn pin_with_materialises_fallback() {
        let mut p = Styled::new(String::from("Helvetica"));
        p.pin_with(&String::from("Times"));
        assert_eq!(p.value(), "Times");
        assert_eq!(p.priority(), Priority::Local);
    }

    #[test]
    fn deserialized_values_are_local() {
        let p: Styled<f64> = serde_json::from_str("14").unwrap();
        assert_eq!(p.priority(), Priority::Local);
        assert_eq!(*p.value(), 14.0);
    }
}
