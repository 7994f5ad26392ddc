//! Entity trait: records that keep their identity while their fields change.

/// A catalog record with a serial identifier.
///
/// Ids are ordered: a lower id was created earlier.
pub trait Entity {
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Whether `self` was created before `other`.
    fn created_before(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() < other.id()
    }
}
