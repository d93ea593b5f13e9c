//! Field geometry: carpet bands, basket parts, and the hollow rim mesh.
//!
//! Everything here is derived from `ArenaConstants` alone and carries no ECS
//! state, so a rebuilt scene always gets identical geometry. The world is
//! Z-up; the carpet lies in the XY plane at z = 0.

use arena_events::{ArenaConstants, Basket};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use std::f32::consts::TAU;

/// Radial resolution of the basket rim.
pub const RIM_SEGMENTS: u32 = 32;

/// Material slots used by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    CarpetOrange,
    CarpetBlack,
    CarpetWhite,
    Backboard,
    MagentaRim,
    BlueRim,
    Ball,
    Robot,
}

impl Surface {
    pub const ALL: [Surface; 8] = [
        Surface::CarpetOrange,
        Surface::CarpetBlack,
        Surface::CarpetWhite,
        Surface::Backboard,
        Surface::MagentaRim,
        Surface::BlueRim,
        Surface::Ball,
        Surface::Robot,
    ];

    pub fn color(self) -> Color {
        match self {
            Surface::CarpetOrange => Color::srgb_u8(0xDD, 0x67, 0x43),
            Surface::CarpetBlack => Color::srgb_u8(0x2D, 0x2C, 0x28),
            Surface::CarpetWhite => Color::srgb_u8(0xC0, 0xBD, 0xB6),
            Surface::Backboard => Color::srgb_u8(0xCF, 0xCF, 0xC5),
            Surface::MagentaRim => Color::srgb_u8(0xA3, 0x33, 0x57),
            Surface::BlueRim => Color::srgb_u8(0x11, 0x42, 0x66),
            Surface::Ball => Color::srgb_u8(0x58, 0x92, 0x52),
            Surface::Robot => Color::srgb_u8(0x44, 0x44, 0x44),
        }
    }

    /// Matte material for this surface. Robot bodies render both faces.
    pub fn material(self) -> StandardMaterial {
        let double_sided = matches!(self, Surface::Robot);
        StandardMaterial {
            base_color: self.color(),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            reflectance: 0.1,
            double_sided,
            cull_mode: if double_sided {
                None
            } else {
                Some(bevy::render::render_resource::Face::Back)
            },
            ..default()
        }
    }

    pub fn rim(basket: Basket) -> Self {
        match basket {
            Basket::Magenta => Surface::MagentaRim,
            Basket::Blue => Surface::BlueRim,
        }
    }
}

/// One flat rectangle of carpet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarpetPiece {
    pub center: Vec2,
    pub size: Vec2,
    pub surface: Surface,
}

impl CarpetPiece {
    fn new(center: Vec2, size: Vec2, surface: Surface) -> Self {
        Self {
            center,
            size,
            surface,
        }
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.center - self.size / 2.0, self.center + self.size / 2.0)
    }
}

/// A rectangular band: `outer` with a centered `inner` hole.
///
/// Built from four pieces: two full-height side bands and two bands spanning
/// the hole's width above and below it.
pub fn hollow_rect(outer: Vec2, inner: Vec2, surface: Surface) -> [CarpetPiece; 4] {
    let side_width = (outer.x - inner.x) / 2.0;
    let cap_height = (outer.y - inner.y) / 2.0;
    let side_x = (outer.x + inner.x) / 4.0;
    let cap_y = (outer.y + inner.y) / 4.0;

    [
        CarpetPiece::new(Vec2::new(side_x, 0.0), Vec2::new(side_width, outer.y), surface),
        CarpetPiece::new(Vec2::new(-side_x, 0.0), Vec2::new(side_width, outer.y), surface),
        CarpetPiece::new(Vec2::new(0.0, cap_y), Vec2::new(inner.x, cap_height), surface),
        CarpetPiece::new(Vec2::new(0.0, -cap_y), Vec2::new(inner.x, cap_height), surface),
    ]
}

/// Every carpet piece, from the outermost band inward.
pub fn carpet_layout(c: &ArenaConstants) -> Vec<CarpetPiece> {
    let lw = c.line_width;
    let area = Vec2::new(c.area_width, c.area_height);
    let play = Vec2::new(c.play_area_width, c.play_area_height);
    let competition = Vec2::new(c.competition_area_width, c.competition_area_height);
    let border_inner = competition - Vec2::splat(lw * 2.0);
    let field = competition - Vec2::splat(lw * 4.0);

    let mut pieces = Vec::with_capacity(19);
    // Outer dark floor, padding band, black then white competition borders.
    pieces.extend(hollow_rect(area, play, Surface::CarpetBlack));
    pieces.extend(hollow_rect(play, competition, Surface::CarpetOrange));
    pieces.extend(hollow_rect(competition, border_inner, Surface::CarpetBlack));
    pieces.extend(hollow_rect(border_inner, field, Surface::CarpetWhite));

    pieces.push(CarpetPiece::new(
        Vec2::ZERO,
        Vec2::new(lw, field.y),
        Surface::CarpetWhite,
    ));

    let half_width = (c.competition_area_width - lw * 5.0) / 2.0;
    let half_x = c.competition_area_width / 4.0 - lw * 3.0 / 4.0;
    for side in [-1.0, 1.0] {
        pieces.push(CarpetPiece::new(
            Vec2::new(side * half_x, 0.0),
            Vec2::new(half_width, field.y),
            Surface::CarpetOrange,
        ));
    }

    pieces
}

/// Where a basket group sits on the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketPlacement {
    pub basket: Basket,
    pub translation: Vec3,
    /// Rotation about Z, radians.
    pub heading: f32,
}

impl BasketPlacement {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.translation)
            .with_rotation(Quat::from_rotation_z(self.heading))
    }
}

/// The two baskets, mirrored across the field's center line.
pub fn basket_placements(c: &ArenaConstants) -> [BasketPlacement; 2] {
    Basket::ALL.map(|basket| BasketPlacement {
        basket,
        translation: Vec3::new(basket.backboard_x(c), 0.0, 0.0),
        heading: basket.heading(),
    })
}

/// Backboard box dimensions (depth along X, width along Y, height along Z).
pub fn backboard_size(c: &ArenaConstants) -> Vec3 {
    Vec3::new(c.backboard_depth, c.backboard_width, c.backboard_height)
}

/// Backboard center in the basket's local frame; the front face sits at x = 0.
pub fn backboard_center(c: &ArenaConstants) -> Vec3 {
    Vec3::new(-c.backboard_depth / 2.0, 0.0, c.backboard_height / 2.0)
}

/// Rim center in the basket's local frame, touching the backboard.
pub fn rim_center(c: &ArenaConstants) -> Vec3 {
    Vec3::new(c.basket_outer_radius, 0.0, c.basket_height / 2.0)
}

/// Open-ended hollow cylinder along Z, centered on the origin.
///
/// Equivalent to subtracting a cylinder of radius `inner` from one of radius
/// `outer`: an outer wall facing out, an inner wall facing in, and flat rings
/// closing the top and bottom.
pub fn tube_mesh(outer: f32, inner: f32, height: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let ring = segments as usize + 1;
    let half = height / 2.0;

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(ring * 8);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(ring * 8);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(ring * 8);
    let mut indices: Vec<u32> = Vec::with_capacity(segments as usize * 24);

    let angle = |i: usize| i as f32 / segments as f32 * TAU;

    // Walls: (bottom, top) pairs per angle.
    for (radius, facing) in [(outer, 1.0), (inner, -1.0)] {
        for i in 0..ring {
            let (sin, cos) = angle(i).sin_cos();
            let u = i as f32 / segments as f32;
            for (z, v) in [(-half, 0.0), (half, 1.0)] {
                positions.push([radius * cos, radius * sin, z]);
                normals.push([facing * cos, facing * sin, 0.0]);
                uvs.push([u, v]);
            }
        }
    }

    // Caps: (outer, inner) pairs per angle.
    for (z, facing) in [(half, 1.0), (-half, -1.0)] {
        for i in 0..ring {
            let (sin, cos) = angle(i).sin_cos();
            let u = i as f32 / segments as f32;
            for (radius, v) in [(outer, 0.0), (inner, 1.0)] {
                positions.push([radius * cos, radius * sin, z]);
                normals.push([0.0, 0.0, facing]);
                uvs.push([u, v]);
            }
        }
    }

    let section = (ring * 2) as u32;
    for i in 0..segments {
        let a = 2 * i;
        let b = 2 * (i + 1);

        // Outer wall, counter-clockwise seen from outside.
        let base = 0;
        indices.extend([base + a, base + b, base + b + 1, base + a, base + b + 1, base + a + 1]);
        // Inner wall, counter-clockwise seen from the axis.
        let base = section;
        indices.extend([base + a, base + b + 1, base + b, base + a, base + a + 1, base + b + 1]);
        // Top ring, seen from above.
        let base = section * 2;
        indices.extend([base + a + 1, base + a, base + b, base + a + 1, base + b, base + b + 1]);
        // Bottom ring, seen from below.
        let base = section * 3;
        indices.extend([base + a + 1, base + b, base + a, base + a + 1, base + b + 1, base + b]);
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn overlap(a: &CarpetPiece, b: &CarpetPiece) -> bool {
        let (a_min, a_max) = a.bounds();
        let (b_min, b_max) = b.bounds();
        let eps = 1e-5;
        a_min.x < b_max.x - eps
            && b_min.x < a_max.x - eps
            && a_min.y < b_max.y - eps
            && b_min.y < a_max.y - eps
    }

    #[test]
    fn test_hollow_rect_covers_band() {
        let pieces = hollow_rect(Vec2::new(10.0, 6.0), Vec2::new(8.0, 4.0), Surface::CarpetBlack);

        let area: f32 = pieces.iter().map(|p| p.size.x * p.size.y).sum();
        assert!((area - (60.0 - 32.0)).abs() < 1e-4);

        assert_eq!(pieces[0].center, Vec2::new(4.5, 0.0));
        assert_eq!(pieces[0].size, Vec2::new(1.0, 6.0));
        assert_eq!(pieces[2].center, Vec2::new(0.0, 2.5));
        assert_eq!(pieces[2].size, Vec2::new(8.0, 1.0));
    }

    #[test]
    fn test_carpet_pieces_do_not_overlap() {
        let pieces = carpet_layout(&ArenaConstants::default());
        assert_eq!(pieces.len(), 19);

        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                assert!(!overlap(a, b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_carpet_tiles_outer_area() {
        let constants = ArenaConstants::default();
        let area: f32 = carpet_layout(&constants)
            .iter()
            .map(|p| p.size.x * p.size.y)
            .sum();
        let expected = constants.area_width * constants.area_height;
        assert!((area - expected).abs() < 1e-3, "{} != {}", area, expected);
    }

    #[test]
    fn test_middle_line_is_centered() {
        let constants = ArenaConstants::default();
        let pieces = carpet_layout(&constants);
        let line = pieces[16];

        assert_eq!(line.center, Vec2::ZERO);
        assert_eq!(line.surface, Surface::CarpetWhite);
        assert_eq!(line.size.x, constants.line_width);
    }

    #[test]
    fn test_basket_placements_mirror() {
        let constants = ArenaConstants {
            competition_area_width: 10.0,
            competition_area_height: 6.0,
            play_area_width: 12.0,
            play_area_height: 8.0,
            area_width: 14.0,
            area_height: 10.0,
            ..Default::default()
        };
        let [magenta, blue] = basket_placements(&constants);

        assert_eq!(magenta.basket, Basket::Magenta);
        assert_eq!(magenta.translation.x, -5.0);
        assert_eq!(blue.translation.x, 5.0);
        assert_eq!(magenta.heading, 0.0);
        assert_eq!(blue.heading, std::f32::consts::PI);

        // The blue rim mirrors onto the field side of its backboard.
        let rim = blue.transform().transform_point(rim_center(&constants));
        assert!((rim.x - (5.0 - constants.basket_outer_radius)).abs() < 1e-5);
    }

    #[test]
    fn test_backboard_front_face_on_line() {
        let constants = ArenaConstants::default();
        let center = backboard_center(&constants);
        let size = backboard_size(&constants);
        assert!((center.x + size.x / 2.0).abs() < 1e-6);
        assert!((center.z - size.z / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tube_mesh_shape() {
        let mesh = tube_mesh(0.08, 0.074, 0.5, 32);

        assert_eq!(mesh.count_vertices(), 4 * 2 * 33);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(32 * 24));

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        for [x, y, z] in positions {
            let r = (x * x + y * y).sqrt();
            assert!((r - 0.08).abs() < 1e-5 || (r - 0.074).abs() < 1e-5);
            assert!((z.abs() - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tube_indices_in_range() {
        let mesh = tube_mesh(1.0, 0.5, 1.0, 8);
        let count = mesh.count_vertices() as u32;
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert!(indices.iter().all(|&i| i < count));
    }
}
