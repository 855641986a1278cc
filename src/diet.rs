//! Citation diet: how many citing works appeared in which venue, grouped by venue type.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::venue::kind::VenueType;

pub const ROOT_NAME: &str = "Citation Diet";

/// Per-venue counts of citing works. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DietCounts {
    counts: BTreeMap<String, u32>,
}

impl DietCounts {
    pub fn record(&mut self, venue: String) {
        *self.counts.entry(venue).or_insert(0) += 1;
    }

    #[cfg(test)]
    pub fn get(&self, venue: &str) -> Option<u32> {
        self.counts.get(venue).copied()
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Bucket every venue under its type, largest venues first within each bucket.
    pub fn hierarchy(&self) -> DietHierarchy {
        let mut buckets: BTreeMap<VenueType, Vec<DietLeaf>> = BTreeMap::new();
        for (venue, &value) in &self.counts {
            buckets
                .entry(VenueType::classify(venue))
                .or_default()
                .push(DietLeaf {
                    name: venue.clone(),
                    value,
                });
        }

        let children = buckets
            .into_iter()
            .map(|(kind, mut leaves)| {
                leaves.sort_by(|a, b| b.value.cmp(&a.value));
                DietBucket {
                    name: kind.name().to_string(),
                    children: leaves,
                }
            })
            .collect();

        DietHierarchy {
            name: ROOT_NAME.to_string(),
            children,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for DietCounts {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        let mut diet = DietCounts::default();
        for (venue, count) in iter {
            *diet.counts.entry(venue.into()).or_insert(0) += count;
        }
        diet
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DietHierarchy {
    pub name: String,
    pub children: Vec<DietBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DietBucket {
    pub name: String,
    pub children: Vec<DietLeaf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DietLeaf {
    pub name: String,
    pub value: u32,
}

impl DietHierarchy {
    #[cfg(test)]
    pub fn leaf_total(&self) -> u32 {
        self.children
            .iter()
            .flat_map(|b| &b.children)
            .map(|l| l.value)
            .sum()
    }
}
