//! Code for handling entity IDs.
//!
//! Every catalog entity carries a unique integer ID within its type. IDs are wrapped in per-type
//! newtypes so that, say, a [`crate::network::NodeId`] cannot be passed where a
//! [`crate::vehicle::TechVehicleId`] is expected.
use anyhow::{Result, bail};
use indexmap::IndexMap;

/// Define an integer ID newtype.
macro_rules! define_id_type {
    ($name:ident) => {
        /// An integer ID type
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            std::hash::Hash,
            Debug,
            serde::Deserialize,
            serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                $name(id)
            }
        }
    };
}
pub(crate) use define_id_type;

#[cfg(test)]
define_id_type!(GenericID);

/// Indicates that the struct has an ID field
pub trait HasId {
    /// The ID type for this entity
    type Id: Copy + Eq + std::hash::Hash + Ord + std::fmt::Display;

    /// Get the entity's ID
    fn id(&self) -> Self::Id;
}

/// Implement the `HasId` trait for the given type, assuming it has a field called `id`
macro_rules! define_id_getter {
    ($t:ty, $id_ty:ty) => {
        impl crate::id::HasId for $t {
            type Id = $id_ty;

            fn id(&self) -> $id_ty {
                self.id
            }
        }
    };
}
pub(crate) use define_id_getter;

/// Collect entities into a map keyed by ID, sorted ascending.
///
/// The returned map iterates in ascending ID order, which is what makes catalog iteration (and
/// everything derived from it) reproducible between runs.
///
/// # Arguments
///
/// * `entity_name` - Entity type name for error messages
/// * `items` - The entities to collect
///
/// # Returns
///
/// An ID-keyed map, or an error if two entities share an ID.
pub fn into_id_map<T: HasId>(entity_name: &str, items: Vec<T>) -> Result<IndexMap<T::Id, T>> {
    let mut items = items;
    items.sort_by_key(HasId::id);

    let mut map = IndexMap::with_capacity(items.len());
    for item in items {
        let id = item.id();
        if map.insert(id, item).is_some() {
            bail!("Duplicate {entity_name} ID {id}");
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy {
        id: GenericID,
    }
    define_id_getter!(Dummy, GenericID);

    #[test]
    fn test_into_id_map_sorts_by_id() {
        let items = vec![
            Dummy { id: GenericID(3) },
            Dummy { id: GenericID(1) },
            Dummy { id: GenericID(2) },
        ];
        let map = into_id_map("dummy", items).unwrap();
        assert_eq!(
            map.keys().copied().collect::<Vec<_>>(),
            [GenericID(1), GenericID(2), GenericID(3)]
        );
    }

    #[test]
    fn test_into_id_map_duplicate() {
        let items = vec![Dummy { id: GenericID(1) }, Dummy { id: GenericID(1) }];
        assert_eq!(
            into_id_map("dummy", items).unwrap_err().to_string(),
            "Duplicate dummy ID 1"
        );
    }
}
