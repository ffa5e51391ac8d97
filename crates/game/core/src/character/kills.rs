use std::collections::BTreeMap;

/// Identifier of a monster species.
pub type MonsterTypeId = u16;

/// Per-species kill tally. Counts only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KillCounts {
    counts: BTreeMap<MonsterTypeId, u32>,
}

impl KillCounts {
    pub fn increment(&mut self, monster: MonsterTypeId) {
        let count = self.counts.entry(monster).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Zero for species never killed.
    pub fn get(&self, monster: MonsterTypeId) -> u32 {
        self.counts.get(&monster).copied().unwrap_or(0)
    }

    /// Restores a persisted tally.
    pub(crate) fn restore(&mut self, monster: MonsterTypeId, count: u32) {
        self.counts.insert(monster, count);
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonsterTypeId, u32)> + '_ {
        self.counts.iter().map(|(monster, count)| (*monster, *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_start_at_zero_and_accumulate() {
        let mut kills = KillCounts::default();
        assert_eq!(kills.get(4), 0);

        kills.increment(4);
        kills.increment(4);
        kills.increment(9);

        assert_eq!(kills.get(4), 2);
        assert_eq!(kills.get(9), 1);
        assert_eq!(kills.iter().count(), 2);
    }
}
