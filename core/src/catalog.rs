use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub struct BeadCatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub price_cents: u64,
    pub diameter_mm: f32,
    pub color: &'static str,
    pub in_stock: bool,
}

include!(concat!(env!("OUT_DIR"), "/bead_catalog.rs"));

/// What the designer needs to know about a catalog item to place it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price_cents: u64,
    pub diameter_mm: f32,
    pub color: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl BeadCatalogEntry {
    pub fn to_item(&self) -> CatalogItem {
        CatalogItem {
            id: self.id.to_string(),
            name: self.name.to_string(),
            price_cents: self.price_cents,
            diameter_mm: self.diameter_mm,
            color: self.color.to_string(),
            in_stock: self.in_stock,
        }
    }
}

pub fn bead_by_id(id: &str) -> Option<&'static BeadCatalogEntry> {
    let trimmed = id.trim();
    BEAD_CATALOG
        .iter()
        .find(|entry| entry.id.eq_ignore_ascii_case(trimmed))
}

pub trait CatalogLookup {
    fn lookup(&self, catalog_id: &str) -> Option<CatalogItem>;
}

/// The catalog compiled into the crate from `catalog/beads.toml`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCatalog;

impl CatalogLookup for BuiltinCatalog {
    fn lookup(&self, catalog_id: &str) -> Option<CatalogItem> {
        bead_by_id(catalog_id).map(BeadCatalogEntry::to_item)
    }
}

/// Catalog fed by a collaborator at runtime, e.g. from a storefront listing.
#[derive(Clone, Debug, Default)]
pub struct CatalogMap {
    items: HashMap<String, CatalogItem>,
}

impl CatalogMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: CatalogItem) -> Option<CatalogItem> {
        self.items.insert(item.id.clone(), item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<CatalogItem> for CatalogMap {
    fn from_iter<I: IntoIterator<Item = CatalogItem>>(iter: I) -> Self {
        let mut map = Self::new();
        for item in iter {
            map.insert(item);
        }
        map
    }
}

impl CatalogLookup for CatalogMap {
    fn lookup(&self, catalog_id: &str) -> Option<CatalogItem> {
        self.items.get(catalog_id).cloned()
    }
}

impl<C: CatalogLookup + ?Sized> CatalogLookup for &C {
    fn lookup(&self, catalog_id: &str) -> Option<CatalogItem> {
        (**self).lookup(catalog_id)
    }
}
