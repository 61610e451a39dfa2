//! Class hierarchy used to decide subtype relations between stamps.
//!
//! Stamps describe reference values in terms of declared classes. Deciding
//! whether two stamps are compatible (join) or what covers both (meet)
//! requires subtype and least-common-ancestor queries, which this module
//! answers from a single-inheritance class arena.
//!
//! The hierarchy is immutable once compilation starts and is shared between
//! all graphs of a compilation session behind an [`std::sync::Arc`]; graphs
//! never mutate it.

use std::collections::HashMap;
use std::fmt;

use crate::{Error, Result};

/// Unique identifier for a class in a [`TypeHierarchy`].
///
/// This is a lightweight handle into the class arena, providing O(1) access
/// to class metadata. The identifier is only meaningful for the hierarchy
/// that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

impl ClassId {
    /// Creates a new class identifier from an arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A single class record in the hierarchy.
#[derive(Debug, Clone)]
struct ClassInfo {
    /// Fully qualified class name, unique within the hierarchy.
    name: String,
    /// Direct superclass, `None` for a root class.
    superclass: Option<ClassId>,
}

/// A single-inheritance class hierarchy.
///
/// Classes are registered once by the frontend and then queried by the
/// stamp lattice. Multiple independent roots are allowed; classes under
/// different roots are unrelated.
///
/// # Examples
///
/// ```rust
/// use seagraph::stamp::TypeHierarchy;
///
/// let mut types = TypeHierarchy::new();
/// let object = types.define_class("Object", None)?;
/// let list = types.define_class("List", Some(object))?;
/// let array_list = types.define_class("ArrayList", Some(list))?;
///
/// assert!(types.is_subtype(array_list, object));
/// assert!(!types.is_subtype(object, list));
/// assert_eq!(types.least_common_ancestor(array_list, list), Some(list));
/// # Ok::<(), seagraph::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    /// Class records indexed by [`ClassId`].
    classes: Vec<ClassInfo>,
    /// Name lookup index.
    by_name: HashMap<String, ClassId>,
}

impl TypeHierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new class and returns its identifier.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique class name.
    /// * `superclass` - Direct superclass, `None` for a root class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateClass`] if a class with the same name is
    /// already registered.
    ///
    /// # Panics
    ///
    /// Panics if `superclass` is not an identifier issued by this hierarchy;
    /// that is a programming error in the frontend.
    pub fn define_class(&mut self, name: &str, superclass: Option<ClassId>) -> Result<ClassId> {
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateClass(name.to_string()));
        }
        if let Some(sup) = superclass {
            assert!(
                sup.index() < self.classes.len(),
                "superclass {sup} is not part of this hierarchy"
            );
        }

        let id = ClassId::new(self.classes.len());
        self.classes.push(ClassInfo {
            name: name.to_string(),
            superclass,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a class by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassNotFound`] if no class with that name exists.
    pub fn class_named(&self, name: &str) -> Result<ClassId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::ClassNotFound(name.to_string()))
    }

    /// Returns the name of a class.
    #[must_use]
    pub fn name(&self, class: ClassId) -> &str {
        &self.classes[class.index()].name
    }

    /// Returns the direct superclass of a class, `None` for roots.
    #[must_use]
    pub fn superclass(&self, class: ClassId) -> Option<ClassId> {
        self.classes[class.index()].superclass
    }

    /// Returns the number of registered classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if `sub` is `sup` or a (transitive) subclass of it.
    #[must_use]
    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut current = Some(sub);
        while let Some(class) = current {
            if class == sup {
                return true;
            }
            current = self.superclass(class);
        }
        false
    }

    /// Computes the most specific common superclass of two classes.
    ///
    /// Returns `None` when the classes live under unrelated roots, in which
    /// case no class constrains both values.
    #[must_use]
    pub fn least_common_ancestor(&self, a: ClassId, b: ClassId) -> Option<ClassId> {
        // Depths are bounded by the chain length, so two upward walks are
        // cheaper than materializing an ancestor set.
        let depth_a = self.depth(a);
        let depth_b = self.depth(b);

        let (mut high, mut low, mut skip) = if depth_a >= depth_b {
            (b, a, depth_a - depth_b)
        } else {
            (a, b, depth_b - depth_a)
        };
        while skip > 0 {
            low = self.superclass(low)?;
            skip -= 1;
        }
        loop {
            if high == low {
                return Some(high);
            }
            match (self.superclass(high), self.superclass(low)) {
                (Some(h), Some(l)) => {
                    high = h;
                    low = l;
                }
                _ => return None,
            }
        }
    }

    /// Number of superclass links above `class`.
    fn depth(&self, class: ClassId) -> usize {
        let mut depth = 0;
        let mut current = self.superclass(class);
        while let Some(next) = current {
            depth += 1;
            current = self.superclass(next);
        }
        depth
    }
}
