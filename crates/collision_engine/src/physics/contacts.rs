//! Frame-to-frame contact bookkeeping
//!
//! Each frame the collision system fills a [`ContactSet`] and diffs it
//! against the previous frame's set to find contacts that began or ended.

use crate::foundation::entity::ColliderId;
use crate::foundation::math::Vec2;
use crate::physics::collision_layers::CollisionLayers;
use std::collections::BTreeMap;

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Participant {
    /// Collider identity
    pub id: ColliderId,
    /// Collider layers at the time of contact
    pub layers: CollisionLayers,
    /// Whether the collider is a trigger
    pub is_trigger: bool,
}

/// Unordered pair of colliders, stored smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactKey {
    a: ColliderId,
    b: ColliderId,
}

impl ContactKey {
    /// Create a key (always stores the smaller collider first)
    pub fn new(first: ColliderId, second: ColliderId) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// Smaller collider
    pub fn a(&self) -> ColliderId {
        self.a
    }

    /// Larger collider
    pub fn b(&self) -> ColliderId {
        self.b
    }
}

/// A contact between two colliders in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    /// Smaller collider
    pub a: Participant,
    /// Larger collider
    pub b: Participant,
    /// Contact point in world space
    pub point: Vec2,
    /// Unit normal pointing from `b` toward `a`
    pub normal: Vec2,
    /// Penetration depth, zero for touching or swept contacts
    pub depth: f32,
}

impl ContactRecord {
    /// Create a record; `normal` points from `second` toward `first`
    pub fn new(first: Participant, second: Participant, point: Vec2, normal: Vec2, depth: f32) -> Self {
        if first.id <= second.id {
            Self {
                a: first,
                b: second,
                point,
                normal,
                depth,
            }
        } else {
            Self {
                a: second,
                b: first,
                point,
                normal: -normal,
                depth,
            }
        }
    }

    /// Pair key
    pub fn key(&self) -> ContactKey {
        ContactKey { a: self.a.id, b: self.b.id }
    }
}

/// Contacts that began and ended between two frames, in key order
#[derive(Debug, Clone, Default)]
pub struct ContactDiff {
    /// Present now, absent before
    pub entered: Vec<ContactRecord>,
    /// Present before, absent now
    pub exited: Vec<ContactRecord>,
}

/// Set of contacts keyed by collider pair
#[derive(Debug, Clone, Default)]
pub struct ContactSet {
    records: BTreeMap<ContactKey, ContactRecord>,
}

impl ContactSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the pair is already present; returns whether it was added
    pub fn insert(&mut self, record: ContactRecord) -> bool {
        match self.records.entry(record.key()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Move every record from `other` that is not already present
    pub fn absorb(&mut self, other: &mut ContactSet) {
        for (_, record) in std::mem::take(&mut other.records) {
            self.insert(record);
        }
    }

    /// Whether a pair is present
    pub fn contains(&self, key: &ContactKey) -> bool {
        self.records.contains_key(key)
    }

    /// Record for a pair
    pub fn get(&self, key: &ContactKey) -> Option<&ContactRecord> {
        self.records.get(key)
    }

    /// Records in key order
    pub fn iter(&self) -> impl Iterator<Item = &ContactRecord> {
        self.records.values()
    }

    /// Number of contacts
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all contacts
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Keep only the contacts for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&ContactRecord) -> bool) {
        self.records.retain(|_, record| keep(record));
    }

    /// Contacts that began or ended relative to `previous`
    pub fn diff(&self, previous: &ContactSet) -> ContactDiff {
        ContactDiff {
            entered: self
                .records
                .iter()
                .filter(|(key, _)| !previous.contains(key))
                .map(|(_, record)| *record)
                .collect(),
            exited: previous
                .records
                .iter()
                .filter(|(key, _)| !self.contains(key))
                .map(|(_, record)| *record)
                .collect(),
        }
    }
}
