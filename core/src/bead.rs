use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

/// Identifies one placement of a bead. Two placements of the same catalog
/// item get distinct instance ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bead {
    pub instance_id: InstanceId,
    pub catalog_id: String,
    pub name: String,
    pub price_cents: u64,
    pub diameter_mm: f32,
    pub color: String,
    pub in_stock: bool,
}

impl Bead {
    pub fn from_catalog(instance_id: InstanceId, item: &CatalogItem) -> Self {
        Self {
            instance_id,
            catalog_id: item.id.clone(),
            name: item.name.clone(),
            price_cents: item.price_cents,
            diameter_mm: item.diameter_mm,
            color: item.color.clone(),
            in_stock: item.in_stock,
        }
    }
}

/// Ordered beads around the ring, clockwise from 12 o'clock.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composition {
    beads: Vec<Bead>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_beads(beads: Vec<Bead>) -> Self {
        Self { beads }
    }

    pub fn beads(&self) -> &[Bead] {
        &self.beads
    }

    pub fn len(&self) -> usize {
        self.beads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beads.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bead> {
        self.beads.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bead> {
        self.beads.iter()
    }

    pub fn append(&mut self, bead: Bead) {
        self.beads.push(bead);
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Bead> {
        if index < self.beads.len() {
            Some(self.beads.remove(index))
        } else {
            None
        }
    }

    /// Exchanges two entries in place. Returns false when either index is out
    /// of range; swapping an entry with itself is a no-op that succeeds.
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        let len = self.beads.len();
        if i >= len || j >= len {
            return false;
        }
        self.beads.swap(i, j);
        true
    }

    pub fn clear(&mut self) {
        self.beads.clear();
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.beads.iter().map(|bead| bead.instance_id).collect()
    }

    pub fn total_price_cents(&self) -> u64 {
        self.beads
            .iter()
            .fold(0u64, |total, bead| total.saturating_add(bead.price_cents))
    }
}

impl<'a> IntoIterator for &'a Composition {
    type Item = &'a Bead;
    type IntoIter = std::slice::Iter<'a, Bead>;

    fn into_iter(self) -> Self::IntoIter {
        self.beads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bead(id: u64) -> Bead {
        Bead {
            instance_id: InstanceId(id),
            catalog_id: format!("bead-{id}"),
            name: format!("Bead {id}"),
            price_cents: 100 * id,
            diameter_mm: 8.0,
            color: "#fff".to_string(),
            in_stock: true,
        }
    }

    #[test]
    fn swap_out_of_range_leaves_order() {
        let mut composition = Composition::from_beads(vec![bead(1), bead(2)]);
        assert!(!composition.swap(0, 5));
        assert_eq!(composition.instance_ids(), vec![InstanceId(1), InstanceId(2)]);
        assert!(composition.swap(0, 1));
        assert_eq!(composition.instance_ids(), vec![InstanceId(2), InstanceId(1)]);
    }

    #[test]
    fn remove_at_keeps_relative_order() {
        let mut composition = Composition::from_beads(vec![bead(1), bead(2), bead(3)]);
        let removed = composition.remove_at(1).map(|bead| bead.instance_id);
        assert_eq!(removed, Some(InstanceId(2)));
        assert_eq!(composition.instance_ids(), vec![InstanceId(1), InstanceId(3)]);
        assert!(composition.remove_at(2).is_none());
    }

    #[test]
    fn total_price_sums_entries() {
        let composition = Composition::from_beads(vec![bead(1), bead(2), bead(3)]);
        assert_eq!(composition.total_price_cents(), 600);
    }
}
