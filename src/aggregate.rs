//! Group aggregator: partitions normalized cards by group key.

use std::collections::HashMap;

use crate::models::NormalizedCard;

/// All cards sharing one group key. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: String,
    pub members: Vec<NormalizedCard>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Positive prices in member order.
    pub fn valid_prices(&self) -> Vec<f64> {
        self.members
            .iter()
            .filter(|c| c.has_valid_price())
            .map(|c| c.price)
            .collect()
    }

    /// Members with a positive price, in member order.
    pub fn priced_members(&self) -> impl Iterator<Item = &NormalizedCard> {
        self.members.iter().filter(|c| c.has_valid_price())
    }
}

/// Groups keyed by group key, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl GroupSet {
    /// Partition `cards` by group key. Groups appear in the order their first
    /// card appears; members keep input order.
    pub fn from_cards(cards: impl IntoIterator<Item = NormalizedCard>) -> Self {
        let mut set = Self::default();
        for card in cards {
            match set.index.get(&card.group_key) {
                Some(&i) => set.groups[i].members.push(card),
                None => {
                    set.index.insert(card.group_key.clone(), set.groups.len());
                    set.groups.push(Group {
                        key: card.group_key.clone(),
                        members: vec![card],
                    });
                }
            }
        }
        set
    }

    /// Drop groups with fewer than `min_size` members. Returns how many were dropped.
    pub fn retain_min_size(&mut self, min_size: usize) -> usize {
        let before = self.groups.len();
        self.groups.retain(|g| g.len() >= min_size);
        self.index = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.key.clone(), i))
            .collect();
        before - self.groups.len()
    }

    pub fn get(&self, key: &str) -> Option<&Group> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}
