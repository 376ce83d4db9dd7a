//! The voxel type registry.
//!
//! `VoxelTypeTable` is process-wide, immutable after construction, and safe
//! to share across threads by reference: every mesh worker reads it, none
//! ever write it.

/// A cell type id. `0` is reserved for [`AIR`].
pub type VoxelId = u8;

/// The reserved id for empty space.
pub const AIR: VoxelId = 0;

/// Packed 8-bit-per-channel color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent black, used for unregistered/AIR entries.
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };
}

/// Static properties of a voxel type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Properties {
    /// Human-readable name.
    pub name: &'static str,
    /// Base color used for vertex shading in the fallback (no-atlas) path.
    pub color: Rgba,
    /// Whether this type fully occludes light/visibility on any face it
    /// covers.
    pub opaque: bool,
    /// Whether this type is solid (occupies space, blocks the mesher's
    /// "is there a neighbor" test).
    pub solid: bool,
    /// Whether this type emits light.
    pub emissive: bool,
    /// Mining/breaking hardness, in arbitrary game-defined units.
    pub hardness: u16,
}

impl Properties {
    /// The sentinel returned for `AIR` and for any id absent from the
    /// table's explicit registrations that falls outside its configured
    /// range — but note unknown ids *within* range use
    /// [`Properties::UNKNOWN_OPAQUE`], not this constant.
    pub const AIR: Self = Self {
        name: "air",
        color: Rgba::TRANSPARENT,
        opaque: false,
        solid: false,
        emissive: false,
        hardness: 0,
    };

    /// The sentinel returned for ids that are in range but were never
    /// registered: unknown types are treated as opaque solids, so an
    /// unrecognized id never causes a hole to render through terrain.
    pub const UNKNOWN_OPAQUE: Self = Self {
        name: "unknown",
        color: Rgba::rgb(255, 0, 255),
        opaque: true,
        solid: true,
        emissive: false,
        hardness: u16::MAX,
    };
}

/// Process-wide immutable registry mapping [`VoxelId`] to [`Properties`].
///
/// Constructed once at startup via [`VoxelTypeTable::builder`] and never
/// mutated afterward. Every lookup is a total function — ids with no
/// explicit registration resolve to [`Properties::UNKNOWN_OPAQUE`] (or
/// [`Properties::AIR`] for id `0`).
#[derive(Debug)]
pub struct VoxelTypeTable {
    entries: Vec<Option<Properties>>,
}

impl VoxelTypeTable {
    /// Starts building a new table. Id `0` (`AIR`) is registered
    /// automatically; registering over it is a programmer error and will
    /// panic (this only happens at startup, never in the hot path).
    #[must_use]
    pub fn builder() -> VoxelTypeTableBuilder {
        VoxelTypeTableBuilder::new()
    }

    /// Returns the properties registered for `id`, or a sentinel if `id`
    /// was never registered. Total function — never panics.
    #[must_use]
    pub fn properties_of(&self, id: VoxelId) -> &Properties {
        match self.entries.get(id as usize).and_then(Option::as_ref) {
            Some(props) => props,
            None if id == AIR => &Properties::AIR,
            None => &Properties::UNKNOWN_OPAQUE,
        }
    }

    /// Returns whether `id` fully occludes light/visibility.
    #[must_use]
    pub fn is_opaque(&self, id: VoxelId) -> bool {
        self.properties_of(id).opaque
    }

    /// Returns whether `id` occupies space.
    #[must_use]
    pub fn is_solid(&self, id: VoxelId) -> bool {
        self.properties_of(id).solid
    }

    /// Returns the fallback vertex color for `id`.
    #[must_use]
    pub fn color_of(&self, id: VoxelId) -> Rgba {
        self.properties_of(id).color
    }
}

/// Builder for [`VoxelTypeTable`].
#[derive(Debug, Default)]
pub struct VoxelTypeTableBuilder {
    entries: Vec<Option<Properties>>,
}

impl VoxelTypeTableBuilder {
    fn new() -> Self {
        let mut entries = vec![None; 256];
        entries[AIR as usize] = Some(Properties::AIR);
        Self { entries }
    }

    /// Registers `id` with the given properties.
    ///
    /// # Panics
    ///
    /// Panics if `id` is [`AIR`] — air's properties are fixed.
    #[must_use]
    pub fn register(mut self, id: VoxelId, properties: Properties) -> Self {
        assert_ne!(id, AIR, "AIR's properties cannot be overridden");
        self.entries[id as usize] = Some(properties);
        self
    }

    /// Finalizes the table.
    #[must_use]
    pub fn build(self) -> VoxelTypeTable {
        VoxelTypeTable { entries: self.entries }
    }
}
