//! Time-derived record identifiers.
//!
//! Ids are the current Unix time in milliseconds rendered as a decimal string.
//! The generator never hands out the same value twice and skips any value
//! already taken in the target collection, so ids stay unique within a
//! collection even when several records are created in the same millisecond.
//! Uniqueness across separate devices is not guaranteed.

use std::cell::Cell;
use std::collections::HashSet;

use chrono::Utc;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Cell<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id distinct from every entry of `taken`.
    pub fn next_id<'a, I>(&self, taken: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let taken: HashSet<&str> = taken.into_iter().collect();
        let mut candidate = Utc::now().timestamp_millis().max(self.last.get() + 1);
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        self.last.set(candidate);
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing() {
        let generator = IdGenerator::new();
        let first: i64 = generator.next_id(std::iter::empty()).parse().unwrap();
        let second: i64 = generator.next_id(std::iter::empty()).parse().unwrap();
        let third: i64 = generator.next_id(std::iter::empty()).parse().unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn skips_taken_values() {
        let generator = IdGenerator::new();
        let now = Utc::now().timestamp_millis();
        let taken: Vec<String> = (now..now + 50).map(|v| v.to_string()).collect();

        let id = generator.next_id(taken.iter().map(String::as_str));
        assert!(!taken.contains(&id));
    }
}
