//! Component and tag vocabularies.
//!
//! A [`World`](crate::world::World) is generic over two closed vocabularies
//! supplied by the game:
//!
//! - a component sum type implementing [`Component`], whose [`Component::Kind`]
//!   discriminant is the storage key (at most one value per kind per entity);
//! - a tag type implementing [`Tag`], a payload-free marker that an entity
//!   either carries or not.
//!
//! Payload types that make up the variants of the component sum type
//! implement [`Variant`] so callers can use typed accessors
//! (`world.get::<Gold>(entity)`) instead of matching on the sum type.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A value that can be attached to an entity.
///
/// Two values with the same [`kind`](Component::kind) occupy the same slot:
/// setting one replaces the other.
pub trait Component: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + 'static {
    /// Discriminant identifying which slot a value occupies.
    type Kind: Copy + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + 'static;

    /// The slot this value occupies.
    fn kind(&self) -> Self::Kind;
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// A payload-free marker attachable to an entity.
///
/// Tags are totally ordered so tag sets serialize deterministically.
pub trait Tag: Clone + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + 'static {}

impl<T> Tag for T where T: Clone + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + 'static
{}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// A concrete payload type stored as one variant of the component sum type `C`.
pub trait Variant<C: Component>: Sized {
    /// The kind every value of this type maps to.
    const KIND: C::Kind;

    /// Wrap into the sum type.
    fn into_component(self) -> C;

    /// Unwrap an owned component, if it holds this variant.
    fn from_component(component: C) -> Option<Self>;

    /// Borrow the payload, if `component` holds this variant.
    fn from_ref(component: &C) -> Option<&Self>;

    /// Mutably borrow the payload, if `component` holds this variant.
    fn from_mut(component: &mut C) -> Option<&mut Self>;
}

/// Implement [`Variant`] for payload types that map one-to-one onto
/// variants of a component enum, together with the enum's [`Component`]
/// impl.
///
/// ```
/// use gridkeep_ecs::component_enum;
///
/// #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// pub struct Gold(pub i64);
///
/// #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// pub struct Name(pub String);
///
/// component_enum! {
///     /// Everything an entity can hold.
///     pub enum Component / ComponentKind {
///         Gold(Gold),
///         Name(Name),
///     }
/// }
///
/// use gridkeep_ecs::component::{Component as _, Variant};
/// assert_eq!(Gold(3).into_component().kind(), ComponentKind::Gold);
/// ```
#[macro_export]
macro_rules! component_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident / $kind:ident {
            $( $variant:ident($payload:ty) ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $( $variant($payload), )*
        }

        /// Storage slot discriminant for each component variant.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        $vis enum $kind {
            $( $variant, )*
        }

        impl $crate::component::Component for $name {
            type Kind = $kind;

            fn kind(&self) -> $kind {
                match self {
                    $( $name::$variant(_) => $kind::$variant, )*
                }
            }
        }

        $(
            impl $crate::component::Variant<$name> for $payload {
                const KIND: $kind = $kind::$variant;

                fn into_component(self) -> $name {
                    $name::$variant(self)
                }

                #[allow(unreachable_patterns)]
                fn from_component(component: $name) -> Option<Self> {
                    match component {
                        $name::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                #[allow(unreachable_patterns)]
                fn from_ref(component: &$name) -> Option<&Self> {
                    match component {
                        $name::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                #[allow(unreachable_patterns)]
                fn from_mut(component: &mut $name) -> Option<&mut Self> {
                    match component {
                        $name::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}
