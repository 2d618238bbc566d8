//! Bounded-radius periodic ticking: per-block behaviour and gravity migration.
//!
//! Ticking every cell of a large world is unaffordable, so each pass only
//! visits an axis-aligned box around a moving reference point (usually the
//! player). Far-away cells tick late, or not at all until the reference point
//! comes back. All mutations go through [`WorldGrid::set_block`], so every
//! change leaves the right chunks dirty.

use glam::IVec3;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::grid::WorldGrid;
use crate::registry::TickBehavior;

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Accumulates frame time and fires once per configured interval.
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    interval: f32,
    accumulator: f32,
}

impl IntervalTimer {
    /// An interval of 0 fires on every call to [`advance`](Self::advance).
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            accumulator: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Adds `dt` and, once the interval is reached, returns the total time
    /// accumulated since the last firing and starts over.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        self.accumulator += dt;
        if self.accumulator >= self.interval {
            let elapsed = self.accumulator;
            self.accumulator = 0.0;
            Some(elapsed)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// Inclusive box of cells visited by one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickRegion {
    pub min: IVec3,
    pub max: IVec3,
}

impl TickRegion {
    /// Box of half-extent `radius` around `center`, clamped to `[0, bounds)`.
    ///
    /// Returns `None` when the clamped box is empty (the reference point is
    /// too far outside the world).
    pub fn around(center: IVec3, radius: i32, bounds: IVec3) -> Option<Self> {
        let reach = IVec3::splat(radius.max(0));
        let min = center.saturating_sub(reach).max(IVec3::ZERO);
        let max = center.saturating_add(reach).min(bounds - IVec3::ONE);
        min.cmple(max).all().then_some(Self { min, max })
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(self.min).all() && pos.cmple(self.max).all()
    }

    /// Number of cells in the box.
    pub fn volume(&self) -> usize {
        let extent = (self.max - self.min + IVec3::ONE).as_i64vec3();
        (extent.x * extent.y * extent.z) as usize
    }
}

// ---------------------------------------------------------------------------
// Block behaviour
// ---------------------------------------------------------------------------

impl TickBehavior {
    /// Runs the behaviour for the cell at `pos`. Returns `true` if the world changed.
    pub fn on_tick(self, grid: &mut WorldGrid, pos: IVec3) -> bool {
        match self {
            TickBehavior::Inert => false,
            TickBehavior::Uncover { surface } => {
                if grid.is_solid(pos + IVec3::Y) {
                    return false;
                }
                grid.set_block(pos, surface).is_some()
            }
        }
    }
}

/// Visits every cell in `region` and calls `apply` for cells whose type is
/// tickable, passing the behaviour and the time since the last pass.
///
/// Returns how many calls reported a change.
pub fn schedule_tick<F>(grid: &mut WorldGrid, region: TickRegion, elapsed: f32, mut apply: F) -> usize
where
    F: FnMut(&mut WorldGrid, IVec3, TickBehavior, f32) -> bool,
{
    let mut changed = 0;
    for y in region.min.y..=region.max.y {
        for z in region.min.z..=region.max.z {
            for x in region.min.x..=region.max.x {
                let pos = IVec3::new(x, y, z);
                let behavior = grid.block_type(pos).tick;
                if behavior != TickBehavior::Inert && apply(grid, pos, behavior, elapsed) {
                    changed += 1;
                }
            }
        }
    }
    changed
}

/// Runs each tickable cell's own behaviour over `region`.
pub fn run_block_ticks(grid: &mut WorldGrid, region: TickRegion, elapsed: f32) -> usize {
    schedule_tick(grid, region, elapsed, |grid, pos, behavior, _| {
        behavior.on_tick(grid, pos)
    })
}

/// Moves every gravity-affected block in `region` down by one cell when the
/// cell below is not solid.
///
/// Scans top-down. A block moves at most once per pass. Blocks on layer 0
/// never move, since the cell below is out of bounds. Returns the number of
/// blocks moved.
pub fn gravity_pass(grid: &mut WorldGrid, region: TickRegion) -> usize {
    let mut landed: FxHashSet<IVec3> = FxHashSet::default();
    let floor = region.min.y.max(1);

    for y in (floor..=region.max.y).rev() {
        for z in region.min.z..=region.max.z {
            for x in region.min.x..=region.max.x {
                let pos = IVec3::new(x, y, z);
                if landed.contains(&pos) || !grid.block_type(pos).affected_by_gravity {
                    continue;
                }
                let below = pos - IVec3::Y;
                if grid.is_solid(below) {
                    continue;
                }

                let falling = grid.get_block(pos);
                let displaced = grid.get_block(below);
                grid.set_block(below, falling);
                grid.set_block(pos, displaced);
                landed.insert(below);
                trace!("Block {:?} fell from {} to {}", falling, pos, below);
            }
        }
    }

    landed.len()
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Intervals and radii for the two bounded passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerSettings {
    pub block_tick_interval: f32,
    pub block_tick_radius: i32,
    /// 0 runs gravity on every update.
    pub gravity_interval: f32,
    pub gravity_radius: i32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            block_tick_interval: 180.0,
            block_tick_radius: 8,
            gravity_interval: 0.0,
            gravity_radius: 24,
        }
    }
}

/// What one [`BoundedTickScheduler::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// `Some(changed)` if the block-behaviour pass ran.
    pub block_ticks: Option<usize>,
    /// `Some(moved)` if the gravity pass ran.
    pub gravity_moves: Option<usize>,
}

/// Drives the block-behaviour and gravity passes on independent timers.
#[derive(Clone, Debug)]
pub struct BoundedTickScheduler {
    settings: SchedulerSettings,
    block_timer: IntervalTimer,
    gravity_timer: IntervalTimer,
}

impl BoundedTickScheduler {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self {
            settings,
            block_timer: IntervalTimer::new(settings.block_tick_interval),
            gravity_timer: IntervalTimer::new(settings.gravity_interval),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Advances both timers by `dt` and runs whichever passes are due.
    /// The block-behaviour pass always runs before the gravity pass.
    pub fn update(&mut self, dt: f32, center: IVec3, grid: &mut WorldGrid) -> TickReport {
        let mut report = TickReport::default();
        let bounds = grid.size();

        if let Some(elapsed) = self.block_timer.advance(dt) {
            let changed = TickRegion::around(center, self.settings.block_tick_radius, bounds)
                .map_or(0, |region| run_block_ticks(grid, region, elapsed));
            tracing::debug!("Block tick pass around {} changed {} cells", center, changed);
            report.block_ticks = Some(changed);
        }

        if self.gravity_timer.advance(dt).is_some() {
            let moved = TickRegion::around(center, self.settings.gravity_radius, bounds)
                .map_or(0, |region| gravity_pass(grid, region));
            report.gravity_moves = Some(moved);
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
