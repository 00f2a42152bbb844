//! # Component Types
//!
//! Components are plain data. Each registered type gets a small integer id,
//! which is also its bit in an entity's [`Signature`].

use std::fmt;

/// Maximum number of distinct component types per world.
pub const MAX_COMPONENTS: usize = 32;

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust
/// use ledge_core::Component;
///
/// struct Health {
///     hitpoints: i32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: 'static {}

/// Id of a registered component type (0-31).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(u8);

impl ComponentType {
    /// Creates a component type id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below [`MAX_COMPONENTS`].
    #[must_use]
    pub fn new(id: u8) -> Self {
        assert!(
            usize::from(id) < MAX_COMPONENTS,
            "Component id must be less than MAX_COMPONENTS"
        );
        Self(id)
    }

    /// Returns the id as an index into per-type arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    const fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Bitset with one bit per registered component type.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u32);

impl Signature {
    /// The empty signature.
    pub const EMPTY: Self = Self(0);

    /// Builds a signature from a list of component types.
    #[must_use]
    pub fn of(types: &[ComponentType]) -> Self {
        types.iter().fold(Self::EMPTY, |mut sig, ty| {
            sig.set(*ty);
            sig
        })
    }

    /// Sets the bit for `ty`.
    #[inline]
    pub fn set(&mut self, ty: ComponentType) {
        self.0 |= ty.bit();
    }

    /// Clears the bit for `ty`.
    #[inline]
    pub fn clear(&mut self, ty: ComponentType) {
        self.0 &= !ty.bit();
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Checks the bit for `ty`.
    #[inline]
    #[must_use]
    pub const fn contains(self, ty: ComponentType) -> bool {
        self.0 & ty.bit() != 0
    }

    /// True if every bit of `required` is also set here.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// True if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#034b})", self.0)
    }
}
