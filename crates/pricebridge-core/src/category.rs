//! # Category Index
//!
//! Lookup structures over the category forest: by-id map, children-of map,
//! and a cached root-to-leaf display path per category.
//!
//! The index is built once per resolution pass and passed by reference into
//! every component that needs it; there is no process-wide category state.
//! The display paths feed attribute enrichment only; the pricing algorithm
//! never reads them.

use std::collections::{HashMap, HashSet};

use crate::types::Category;

// =============================================================================
// Constants
// =============================================================================

/// Backend name of the channel hierarchy root. Ancestors carrying this name
/// are displayed as [`ROOT_DISPLAY_NAME`] in category paths.
pub const ROOT_SENTINEL_NAME: &str = "Channel Product Hierarchy";

/// Display name substituted for the sentinel root in category paths.
pub const ROOT_DISPLAY_NAME: &str = "Default Category";

/// Separator between path segments.
const PATH_SEPARATOR: &str = "/";

// =============================================================================
// Category Index
// =============================================================================

/// Immutable lookup index over one category snapshot.
///
/// - `get`/`contains`: O(1) by record id
/// - `children_of`: O(1), children kept in snapshot encounter order
/// - `path`: O(1), precomputed at build time
///
/// A node whose parent id is absent from the snapshot is treated as its own
/// root. A cycle in the parent chain truncates that node's path walk;
/// construction itself never fails.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    /// Category records by id (first occurrence wins on duplicates).
    by_id: HashMap<i64, Category>,

    /// Child ids per parent, in snapshot encounter order.
    children: HashMap<i64, Vec<i64>>,

    /// Cached root-to-leaf display path per category.
    paths: HashMap<i64, String>,
}

impl CategoryIndex {
    /// Builds the index from a category snapshot.
    pub fn build(categories: &[Category]) -> Self {
        let mut by_id: HashMap<i64, Category> = HashMap::with_capacity(categories.len());
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();

        for category in categories {
            by_id.entry(category.record_id).or_insert_with(|| category.clone());

            if let Some(parent_id) = category.parent_id() {
                children.entry(parent_id).or_default().push(category.record_id);
            }
        }

        let mut paths = HashMap::with_capacity(by_id.len());
        for category in by_id.values() {
            paths.insert(category.record_id, Self::build_path(category, &by_id));
        }

        CategoryIndex { by_id, children, paths }
    }

    /// Walks the parent chain of one node collecting display names,
    /// root first. Ancestors named like the sentinel hierarchy root are
    /// shown as the display default. A missing parent ends the walk (the
    /// node chain is rooted there); a revisited id ends it too so a
    /// malformed cycle cannot loop.
    fn build_path(category: &Category, by_id: &HashMap<i64, Category>) -> String {
        let mut names = vec![category.name.clone()];
        let mut seen: HashSet<i64> = HashSet::from([category.record_id]);
        let mut parent_id = category.parent_id();

        while let Some(id) = parent_id {
            let Some(parent) = by_id.get(&id) else {
                break;
            };
            if !seen.insert(id) {
                break;
            }

            if parent.name == ROOT_SENTINEL_NAME {
                names.push(ROOT_DISPLAY_NAME.to_string());
            } else {
                names.push(parent.name.clone());
            }

            parent_id = parent.parent_id();
        }

        names.reverse();
        names.join(PATH_SEPARATOR)
    }

    /// Looks up a category by record id.
    #[inline]
    pub fn get(&self, id: i64) -> Option<&Category> {
        self.by_id.get(&id)
    }

    /// Checks whether the snapshot contains a record id.
    #[inline]
    pub fn contains(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Returns the direct children of a category, in encounter order.
    #[inline]
    pub fn children_of(&self, id: i64) -> &[i64] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the recorded parent id of a category, if it has one.
    #[inline]
    pub fn parent_of(&self, id: i64) -> Option<i64> {
        self.by_id.get(&id).and_then(Category::parent_id)
    }

    /// Returns the cached root-to-leaf display path of a category.
    #[inline]
    pub fn path(&self, id: i64) -> Option<&str> {
        self.paths.get(&id).map(String::as_str)
    }

    /// Number of indexed categories.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when the snapshot was empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
