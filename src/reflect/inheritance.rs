//! Method ownership across an inheritance chain.
//!
//! Given the flattened method list of a class, [`resolve_ownership`] puts
//! every method into the bucket of the ancestor that declares it, root
//! ancestor first and the class itself last.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{ClassInfo, Introspector, MethodInfo, ReflectError};

/// Methods declared by one class in the chain, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipBucket {
    pub class: String,
    pub methods: BTreeMap<String, MethodInfo>,
}

/// Ownership buckets from the root ancestor down to the queried class.
///
/// The last bucket always belongs to the queried class and holds every
/// method no ancestor claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ownership {
    buckets: Vec<OwnershipBucket>,
}

impl Ownership {
    pub fn buckets(&self) -> &[OwnershipBucket] {
        &self.buckets
    }

    /// Bucket for a class name, if it is part of the chain.
    pub fn bucket(&self, class: &str) -> Option<&OwnershipBucket> {
        self.buckets.iter().find(|b| b.class == class)
    }

    /// Bucket of the queried class itself.
    pub fn own(&self) -> &OwnershipBucket {
        // Built with at least the queried class's bucket
        &self.buckets[self.buckets.len() - 1]
    }

    /// Class that owns `method`, if the method is known.
    pub fn owner_of(&self, method: &str) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.methods.contains_key(method))
            .map(|b| b.class.as_str())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<'a> IntoIterator for &'a Ownership {
    type Item = &'a OwnershipBucket;
    type IntoIter = std::slice::Iter<'a, OwnershipBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Group `class`'s methods by declaring ancestor.
///
/// `parents` is nearest-parent first, as returned by
/// [`Introspector::parent_chain`]; buckets come out root first.
pub fn resolve_ownership(class: &ClassInfo, parents: &[String]) -> Ownership {
    let mut unclaimed = class.methods.clone();
    let mut buckets = Vec::with_capacity(parents.len() + 1);

    for parent in parents.iter().rev() {
        let claimed: Vec<String> = unclaimed
            .values()
            .filter(|m| m.declaring_class == *parent)
            .map(|m| m.name.clone())
            .collect();

        let mut methods = BTreeMap::new();
        for name in claimed {
            if let Some(method) = unclaimed.remove(&name) {
                methods.insert(name, method);
            }
        }

        buckets.push(OwnershipBucket {
            class: parent.clone(),
            methods,
        });
    }

    buckets.push(OwnershipBucket {
        class: class.name.clone(),
        methods: unclaimed,
    });

    Ownership { buckets }
}

/// First of `class`'s interfaces, in reported order, that declares `method`.
///
/// Interfaces the introspector does not know are skipped.
pub fn find_declaring_interface<I: Introspector + ?Sized>(
    introspector: &I,
    class: &ClassInfo,
    method: &str,
) -> Result<Option<String>, ReflectError> {
    for interface in &class.interfaces {
        let info = match introspector.class(interface) {
            Ok(info) => info,
            Err(ReflectError::UnknownClass(name)) => {
                tracing::debug!(interface = %name, "skipping unknown interface");
                continue;
            }
            Err(e) => return Err(e),
        };

        if info.has_method(method) {
            return Ok(Some(interface.clone()));
        }
    }

    Ok(None)
}
