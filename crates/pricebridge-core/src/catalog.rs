//! # Product Catalog Index
//!
//! O(1) lookup structures over the priced-product snapshot: by record id and
//! by owning category. Built once per resolution pass; the per-category
//! lists keep snapshot encounter order so resolution output ordering is
//! deterministic.

use std::collections::HashMap;

use crate::types::PricedProduct;

/// Immutable lookup index over one priced-product snapshot.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    /// The snapshot, in encounter order.
    products: Vec<PricedProduct>,

    /// Index into `products` by record id (first occurrence wins).
    by_record_id: HashMap<i64, usize>,

    /// Indices into `products` per owning category, in encounter order.
    by_category: HashMap<i64, Vec<usize>>,
}

impl ProductCatalog {
    /// Builds the index from a priced-product snapshot.
    pub fn build(products: Vec<PricedProduct>) -> Self {
        let mut by_record_id = HashMap::with_capacity(products.len());
        let mut by_category: HashMap<i64, Vec<usize>> = HashMap::new();

        for (idx, product) in products.iter().enumerate() {
            by_record_id.entry(product.record_id).or_insert(idx);
            by_category.entry(product.category_id).or_default().push(idx);
        }

        ProductCatalog {
            products,
            by_record_id,
            by_category,
        }
    }

    /// Looks up a product by record id.
    #[inline]
    pub fn by_record_id(&self, id: i64) -> Option<&PricedProduct> {
        self.by_record_id.get(&id).map(|idx| &self.products[*idx])
    }

    /// Iterates the products of one category, in snapshot encounter order.
    pub fn in_category(&self, category_id: i64) -> impl Iterator<Item = &PricedProduct> + '_ {
        self.by_category
            .get(&category_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |idx| &self.products[*idx])
    }

    /// Iterates the whole snapshot in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &PricedProduct> + '_ {
        self.products.iter()
    }

    /// Number of products in the snapshot.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True when the snapshot was empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
