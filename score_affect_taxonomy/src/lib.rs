// Shared musical-feature taxonomy crate.
//
// Provides the fixed category -> effect-tag table as a programmatic resource
// for `score_affect_engine` (feature detection and affect scoring). The
// category hierarchy is flat data: each leaf category names its parent class,
// each class names its parent, and `MusicalFeature` is the root. Dispatch on
// a category is a table lookup, never a type-hierarchy walk.
//
// Architecture:
// - `types.rs`: `FeatureClass`, `FeatureCategory`, `EffectTag`
// - `lib.rs` (this file): `Taxonomy`, which loads, validates and queries the table
//
// The table is loaded from `data/feature_taxonomy.json` via
// `Taxonomy::from_json()` (JSON string in, typed struct out). The
// `default_taxonomy()` convenience function uses `include_str!` to embed the
// default table at compile time.
//
// A `Taxonomy` is immutable once built. The engine shares one instance
// read-only across tracks, including across rayon worker threads.

pub mod types;

// Re-export key types at crate root for convenience.
pub use types::{EffectTag, FeatureCategory, FeatureClass};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors raised while building a taxonomy from JSON.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("taxonomy JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} names parent class {parent:?}, which is not declared")]
    UnknownParent { name: String, parent: FeatureClass },
    #[error("parent chain of {name} never reaches MusicalFeature")]
    ParentCycle { name: String },
    #[error("category {0} is declared more than once")]
    DuplicateCategory(FeatureCategory),
    #[error("class {0:?} is declared more than once")]
    DuplicateClass(FeatureClass),
    #[error("MusicalFeature is the root and cannot be declared as a class")]
    RootDeclared,
}

/// An inner class declaration: `name` sits directly under `parent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: FeatureClass,
    pub parent: FeatureClass,
}

/// One row of the category table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub category: FeatureCategory,
    /// The class this category sits directly under.
    pub parent: FeatureClass,
    /// Effect tags the category triggers. May be empty (e.g. undulating melody).
    #[serde(default)]
    pub triggers: Vec<EffectTag>,
    /// Frequency ratio, only present for interval categories.
    #[serde(default)]
    pub ratio: Option<String>,
}

/// The top-level JSON structure for the taxonomy file.
#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    classes: Vec<ClassDef>,
    categories: Vec<CategoryDef>,
}

/// A loaded, validated feature taxonomy.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    class_parents: BTreeMap<FeatureClass, FeatureClass>,
    categories: BTreeMap<FeatureCategory, CategoryDef>,
}

impl Taxonomy {
    /// Parse and validate a taxonomy from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = serde_json::from_str(json)?;
        Self::build(file.classes, file.categories)
    }

    /// Build a taxonomy from already-parsed rows.
    ///
    /// Every parent must be declared (or be the root), every class chain must
    /// reach `MusicalFeature`, and no class or category may appear twice.
    /// The root itself is implicit and may not be declared.
    pub fn build(
        classes: Vec<ClassDef>,
        categories: Vec<CategoryDef>,
    ) -> Result<Self, TaxonomyError> {
        let mut class_parents = BTreeMap::new();
        for def in &classes {
            if def.name == FeatureClass::MusicalFeature {
                return Err(TaxonomyError::RootDeclared);
            }
            if class_parents.insert(def.name, def.parent).is_some() {
                return Err(TaxonomyError::DuplicateClass(def.name));
            }
        }

        // Each chain is at most as long as the number of declared classes.
        for &start in class_parents.keys() {
            let mut current = start;
            let mut steps = 0;
            while current != FeatureClass::MusicalFeature {
                let Some(&parent) = class_parents.get(&current) else {
                    break;
                };
                if parent != FeatureClass::MusicalFeature && !class_parents.contains_key(&parent) {
                    return Err(TaxonomyError::UnknownParent {
                        name: format!("{current:?}"),
                        parent,
                    });
                }
                current = parent;
                steps += 1;
                if steps > class_parents.len() {
                    return Err(TaxonomyError::ParentCycle {
                        name: format!("{start:?}"),
                    });
                }
            }
        }

        let mut table = BTreeMap::new();
        for def in categories {
            if def.parent != FeatureClass::MusicalFeature
                && !class_parents.contains_key(&def.parent)
            {
                return Err(TaxonomyError::UnknownParent {
                    name: def.category.to_string(),
                    parent: def.parent,
                });
            }
            let category = def.category;
            if table.insert(category, def).is_some() {
                return Err(TaxonomyError::DuplicateCategory(category));
            }
        }

        Ok(Taxonomy {
            class_parents,
            categories: table,
        })
    }

    /// Number of leaf categories in the table.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The table row for a category, or None if the table does not know it.
    pub fn entry(&self, category: FeatureCategory) -> Option<&CategoryDef> {
        self.categories.get(&category)
    }

    /// Effect tags a category triggers, or None if the category is absent.
    pub fn triggers(&self, category: FeatureCategory) -> Option<&[EffectTag]> {
        self.entry(category).map(|def| def.triggers.as_slice())
    }

    /// Frequency ratio of an interval category ("3:2" for a perfect fifth).
    pub fn ratio(&self, category: FeatureCategory) -> Option<&str> {
        self.entry(category).and_then(|def| def.ratio.as_deref())
    }

    /// Parent classes of a category, nearest first, ending at `MusicalFeature`.
    /// Empty if the category is absent.
    pub fn ancestors(&self, category: FeatureCategory) -> Vec<FeatureClass> {
        let mut chain = Vec::new();
        let Some(def) = self.entry(category) else {
            return chain;
        };
        let mut current = def.parent;
        loop {
            chain.push(current);
            if current == FeatureClass::MusicalFeature {
                break;
            }
            match self.class_parents.get(&current) {
                Some(&parent) => current = parent,
                None => break,
            }
        }
        chain
    }

    /// True if `class` appears anywhere in the category's parent chain.
    pub fn is_a(&self, category: FeatureCategory, class: FeatureClass) -> bool {
        self.ancestors(category).contains(&class)
    }

    /// All rows, ordered by category.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryDef> {
        self.categories.values()
    }
}

/// Load the default taxonomy embedded at compile time.
///
/// Uses `include_str!` to embed `data/feature_taxonomy.json`. Panics if
/// the embedded JSON is malformed (should never happen in a released build).
pub fn default_taxonomy() -> Taxonomy {
    let json = include_str!("../../data/feature_taxonomy.json");
    Taxonomy::from_json(json).expect("embedded feature_taxonomy.json is malformed")
}
