//! Entity trait: identity that survives state changes (e.g. a cart line whose
//! quantity changes but whose id does not).

pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
