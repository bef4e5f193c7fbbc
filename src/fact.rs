use serde::{Deserialize, Serialize};

/// A multiplication fact in presentation order.
///
/// Identity for mastery tracking ignores order: `3 × 4` and `4 × 3` share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub a: u32,
    pub b: u32,
}

impl Fact {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn answer(&self) -> u32 {
        self.a * self.b
    }

    pub fn display(&self) -> String {
        format!("{} × {} = ?", self.a, self.b)
    }

    pub fn key(&self) -> String {
        fact_key(self.a, self.b)
    }

    /// Smaller operand first.
    pub fn canonical(&self) -> Self {
        Self {
            a: self.a.min(self.b),
            b: self.a.max(self.b),
        }
    }

    pub fn swapped(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }
}

pub fn fact_key(a: u32, b: u32) -> String {
    format!("{}x{}", a.min(b), a.max(b))
}

/// Every unordered pair `1 <= a <= b <= max_number`, row by row.
pub fn canonical_facts(max_number: u32) -> Vec<Fact> {
    let mut facts = Vec::new();
    for a in 1..=max_number {
        for b in a..=max_number {
            facts.push(Fact::new(a, b));
        }
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_ignores_order() {
        for a in 1..=12 {
            for b in 1..=12 {
                assert_eq!(fact_key(a, b), fact_key(b, a));
            }
        }
        assert_eq!(fact_key(7, 3), "3x7");
    }

    #[test]
    fn keys_do_not_collide() {
        // 1x12 and 11x2 would collide without a separator
        let keys: HashSet<String> = canonical_facts(12).iter().map(Fact::key).collect();
        assert_eq!(keys.len(), 12 * 13 / 2);
    }

    #[test]
    fn canonical_enumeration_order() {
        let facts = canonical_facts(3);
        let pairs: Vec<(u32, u32)> = facts.iter().map(|f| (f.a, f.b)).collect();
        assert_eq!(pairs, vec![(1, 1), (1, 2), (1, 3), (2, 2), (2, 3), (3, 3)]);
        assert_eq!(Fact::new(4, 3).canonical(), Fact::new(3, 4));
        assert_eq!(Fact::new(4, 3).answer(), 12);
    }
}
