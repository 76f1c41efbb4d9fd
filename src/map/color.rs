//! Color mapping for map overlays.

use crate::types::{FillCategory, Rgb};

/// Marker fill color for a fill-level bucket.
pub fn fill_color(category: FillCategory) -> Rgb {
    match category {
        FillCategory::Empty => Rgb::from_u32(0x22c55e),
        FillCategory::Low => Rgb::from_u32(0x84cc16),
        FillCategory::Medium => Rgb::from_u32(0xeab308),
        FillCategory::High => Rgb::from_u32(0xf97316),
        FillCategory::Critical => Rgb::from_u32(0xef4444),
    }
}

/// Marker fill color for a raw fill level (percent).
#[inline]
pub fn fill_level_color(level: u8) -> Rgb { fill_color(FillCategory::from_fill_level(level)) }

/// Palette cycled through as zones are created.
pub const ZONE_PALETTE: [Rgb; 6] = [
    Rgb::from_u32(0x3b82f6),
    Rgb::from_u32(0x8b5cf6),
    Rgb::from_u32(0x06b6d4),
    Rgb::from_u32(0x10b981),
    Rgb::from_u32(0xf59e0b),
    Rgb::from_u32(0xef4444),
];

/// Palette cycled through as routes are created.
pub const ROUTE_PALETTE: [Rgb; 5] = [
    Rgb::from_u32(0x3b82f6),
    Rgb::from_u32(0x8b5cf6),
    Rgb::from_u32(0xec4899),
    Rgb::from_u32(0x10b981),
    Rgb::from_u32(0xf59e0b),
];

pub const BLOCKED_ROAD: Rgb = Rgb::from_u32(0xef4444);
pub const MARKER_BORDER: Rgb = Rgb::from_u32(0xffffff);
pub const ZONE_DRAFT: Rgb = Rgb::from_u32(0x8b5cf6);
pub const ROUTE_DRAFT: Rgb = Rgb::from_u32(0x3b82f6);

/// Color for the `ordinal`-th record created from a palette.
#[inline]
pub fn palette_color(palette: &[Rgb], ordinal: usize) -> Rgb { palette[ordinal % palette.len()] }
