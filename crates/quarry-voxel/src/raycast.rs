//! Ray-voxel picking using the DDA (Amanatides & Woo) traversal.
//!
//! Walks the grid one cell at a time from the ray origin, always crossing
//! the nearest cell boundary next, and reports the first solid cell along
//! with the face that was entered. Used for both break and place targeting.

use glam::{IVec3, Vec3};

use crate::grid::WorldGrid;
use crate::registry::BlockId;

/// Read-only cell access needed by [`pick_first_solid`].
pub trait SolidQuery {
    /// World extents in cells; valid cells lie in `[0, bounds)`.
    fn bounds(&self) -> IVec3;
    /// Block at `pos`, Air when out of bounds.
    fn block_at(&self, pos: IVec3) -> BlockId;
    /// Whether the block at `pos` stops rays.
    fn is_solid(&self, pos: IVec3) -> bool;
}

impl SolidQuery for WorldGrid {
    fn bounds(&self) -> IVec3 {
        self.size()
    }

    fn block_at(&self, pos: IVec3) -> BlockId {
        self.get_block(pos)
    }

    fn is_solid(&self, pos: IVec3) -> bool {
        WorldGrid::is_solid(self, pos)
    }
}

/// Result of a successful pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockHit {
    /// The solid cell that was hit.
    pub cell: IVec3,
    /// Outward normal of the entered face; zero when the ray starts inside `cell`.
    pub face_normal: IVec3,
    /// Ray parameter at the entry face, in cells.
    pub distance: f32,
    /// Block ID of the hit cell.
    pub block: BlockId,
}

impl BlockHit {
    /// The cell in front of the entered face, where a placed block would go.
    pub fn adjacent(&self) -> IVec3 {
        self.cell + self.face_normal
    }
}

/// Casts a ray and returns the first solid cell within `max_distance`.
///
/// `direction` need not be normalised; a zero direction only inspects the
/// origin cell. If the origin cell is already solid it is returned with a
/// zero normal and zero distance. Traversal stops early once the ray is
/// outside the world and moving away from it on some axis.
pub fn pick_first_solid<W: SolidQuery + ?Sized>(
    world: &W,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<BlockHit> {
    let mut cell = origin.floor().as_ivec3();

    if world.is_solid(cell) {
        return Some(BlockHit {
            cell,
            face_normal: IVec3::ZERO,
            distance: 0.0,
            block: world.block_at(cell),
        });
    }

    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return None;
    }

    let step = IVec3::new(axis_step(dir.x), axis_step(dir.y), axis_step(dir.z));
    let t_delta = Vec3::new(inv_abs(dir.x), inv_abs(dir.y), inv_abs(dir.z));
    let sub = origin - origin.floor();
    let mut t_max = Vec3::new(
        initial_t_max(sub.x, dir.x, t_delta.x),
        initial_t_max(sub.y, dir.y, t_delta.y),
        initial_t_max(sub.z, dir.z, t_delta.z),
    );

    let bounds = world.bounds();
    if left_for_good(cell, step, bounds) {
        return None;
    }

    loop {
        let (t, normal);
        if t_max.x < t_max.y && t_max.x < t_max.z {
            t = t_max.x;
            t_max.x += t_delta.x;
            cell.x += step.x;
            normal = IVec3::new(-step.x, 0, 0);
        } else if t_max.y < t_max.z {
            t = t_max.y;
            t_max.y += t_delta.y;
            cell.y += step.y;
            normal = IVec3::new(0, -step.y, 0);
        } else {
            t = t_max.z;
            t_max.z += t_delta.z;
            cell.z += step.z;
            normal = IVec3::new(0, 0, -step.z);
        }

        if t > max_distance || left_for_good(cell, step, bounds) {
            return None;
        }

        if world.is_solid(cell) {
            return Some(BlockHit {
                cell,
                face_normal: normal,
                distance: t,
                block: world.block_at(cell),
            });
        }
    }
}

fn axis_step(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// `1 / |d|`, or infinity for a zero component so that axis never advances.
fn inv_abs(d: f32) -> f32 {
    if d == 0.0 { f32::INFINITY } else { 1.0 / d.abs() }
}

fn initial_t_max(sub: f32, d: f32, t_delta: f32) -> f32 {
    if d > 0.0 {
        (1.0 - sub) * t_delta
    } else if d < 0.0 {
        sub * t_delta
    } else {
        f32::INFINITY
    }
}

/// True when the cell is outside the world on an axis the ray can no longer
/// bring back inside.
fn left_for_good(cell: IVec3, step: IVec3, bounds: IVec3) -> bool {
    (0..3).any(|axis| {
        (cell[axis] < 0 && step[axis] <= 0) || (cell[axis] >= bounds[axis] && step[axis] >= 0)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Sparse test world: listed cells are solid, everything else is air.
    struct TestWorld {
        bounds: IVec3,
        solid: HashSet<IVec3>,
    }

    impl TestWorld {
        fn new(bounds: IVec3) -> Self {
            Self {
                bounds,
                solid: HashSet::new(),
            }
        }

        fn with_solid(mut self, pos: IVec3) -> Self {
            self.solid.insert(pos);
            self
        }
    }

    impl SolidQuery for TestWorld {
        fn bounds(&self) -> IVec3 {
            self.bounds
        }

        fn block_at(&self, pos: IVec3) -> BlockId {
            if self.solid.contains(&pos) { BlockId(1) } else { BlockId::AIR }
        }

        fn is_solid(&self, pos: IVec3) -> bool {
            self.solid.contains(&pos)
        }
    }

    #[test]
    fn test_hit_along_positive_x() {
        let world = TestWorld::new(IVec3::splat(16)).with_solid(IVec3::new(3, 4, 5));
        let hit = pick_first_solid(&world, Vec3::new(0.5, 4.5, 5.5), Vec3::X, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(3, 4, 5));
        assert_eq!(hit.face_normal, IVec3::new(-1, 0, 0));
        assert!((hit.distance - 2.5).abs() < 1e-5, "distance = {}", hit.distance);
        assert_eq!(hit.block, BlockId(1));
        assert_eq!(hit.adjacent(), IVec3::new(2, 4, 5));
    }

    #[test]
    fn test_origin_inside_solid() {
        let world = TestWorld::new(IVec3::splat(16)).with_solid(IVec3::new(2, 2, 2));
        let hit = pick_first_solid(&world, Vec3::new(2.3, 2.7, 2.1), Vec3::Y, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(2, 2, 2));
        assert_eq!(hit.face_normal, IVec3::ZERO);
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_hit_from_above() {
        let world = TestWorld::new(IVec3::splat(16)).with_solid(IVec3::new(4, 1, 4));
        let hit = pick_first_solid(&world, Vec3::new(4.5, 8.5, 4.5), -Vec3::Y, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(4, 1, 4));
        assert_eq!(hit.face_normal, IVec3::Y);
        assert!((hit.distance - 6.5).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_ray_normal_matches_last_crossing() {
        let world = TestWorld::new(IVec3::splat(16)).with_solid(IVec3::new(3, 3, 0));
        let dir = Vec3::new(1.0, 1.0, 0.0);
        let hit = pick_first_solid(&world, Vec3::new(0.5, 0.4, 0.5), dir, 20.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(3, 3, 0));
        assert!(hit.face_normal == IVec3::NEG_X || hit.face_normal == IVec3::NEG_Y);
    }

    #[test]
    fn test_miss_beyond_max_distance() {
        let world = TestWorld::new(IVec3::splat(16)).with_solid(IVec3::new(10, 0, 0));
        assert!(pick_first_solid(&world, Vec3::new(0.5, 0.5, 0.5), Vec3::X, 5.0).is_none());
    }

    #[test]
    fn test_ray_leaving_world_stops() {
        let world = TestWorld::new(IVec3::splat(4));
        assert!(pick_first_solid(&world, Vec3::new(1.5, 1.5, 1.5), Vec3::NEG_X, 1.0e6).is_none());
    }

    #[test]
    fn test_ray_entering_world_from_outside() {
        let world = TestWorld::new(IVec3::splat(8)).with_solid(IVec3::new(0, 2, 2));
        let hit = pick_first_solid(&world, Vec3::new(-3.5, 2.5, 2.5), Vec3::X, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(0, 2, 2));
        assert_eq!(hit.face_normal, IVec3::NEG_X);
    }

    #[test]
    fn test_zero_direction_only_checks_origin() {
        let world = TestWorld::new(IVec3::splat(8)).with_solid(IVec3::new(1, 0, 0));
        assert!(pick_first_solid(&world, Vec3::new(0.5, 0.5, 0.5), Vec3::ZERO, 10.0).is_none());
    }

    #[test]
    fn test_grid_implements_query() {
        use crate::registry::{BlockCatalog, BlockTypeDef, MiningCategory};
        use std::sync::Arc;

        let mut catalog = BlockCatalog::new();
        let stone = catalog
            .register(BlockTypeDef::solid("stone", 6.0, MiningCategory::Compact))
            .unwrap();
        let mut grid = WorldGrid::new(IVec3::splat(8), 4, Arc::new(catalog)).unwrap();
        grid.set_block(IVec3::new(2, 0, 5), stone);

        let hit = pick_first_solid(&grid, Vec3::new(2.5, 0.5, 0.5), Vec3::Z, 8.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(2, 0, 5));
        assert_eq!(hit.block, stone);
        assert_eq!(hit.face_normal, IVec3::NEG_Z);
    }
}
