//! # Fragment Grid
//!
//! The growable 2D grid of placed map fragments and the expansion
//! algorithm that stitches new fragments onto their neighbors.
//!
//! Cells are stored in a flat buffer indexed `y * extent + x`. The grid
//! only ever grows: when a placement scan finds no empty cell, the extent
//! is incremented, the buffer reallocated, and every fragment copied to the
//! same coordinates, which always exposes fresh empty cells along the new
//! edge.

use crate::game::{FragmentVariant, GridPos, VariantCatalog, WorldPoint};
use crate::hooks::Spawner;
use crate::map::{Fragment, Side};
use crate::{ForageError, ForageResult};
use rand::rngs::StdRng;
use rand::Rng;

/// The sparse grid of placed fragments plus the session-global spawn-point
/// lists accumulated from them.
#[derive(Debug, Default)]
pub struct MapGrid {
    extent: usize,
    cells: Vec<Option<Fragment>>,
    item_spawn_points: Vec<WorldPoint>,
    npc_waypoints: Vec<WorldPoint>,
    start_point: Option<WorldPoint>,
    placed: usize,
}

impl MapGrid {
    /// Creates an empty 1x1 grid.
    pub fn new() -> Self {
        Self {
            extent: 1,
            cells: vec![None],
            item_spawn_points: Vec::new(),
            npc_waypoints: Vec::new(),
            start_point: None,
            placed: 0,
        }
    }

    /// Current side length of the grid. Never decreases.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Number of fragments placed so far.
    pub fn placed_count(&self) -> usize {
        self.placed
    }

    /// All item spawn positions contributed by placed fragments, in
    /// placement order. Append-only; indices stay valid for the session.
    pub fn item_spawn_points(&self) -> &[WorldPoint] {
        &self.item_spawn_points
    }

    /// All NPC patrol waypoints contributed by placed fragments, in
    /// placement order. Append-only; indices stay valid for the session.
    pub fn npc_waypoints(&self) -> &[WorldPoint] {
        &self.npc_waypoints
    }

    /// The player start anchor, set when the first fragment is placed.
    pub fn start_point(&self) -> Option<WorldPoint> {
        self.start_point
    }

    /// The fragment at `(x, y)`, if that cell is occupied.
    pub fn fragment_at(&self, x: usize, y: usize) -> Option<&Fragment> {
        if x >= self.extent || y >= self.extent {
            return None;
        }
        self.cells[self.index(x, y)].as_ref()
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.extent + x
    }

    fn occupied(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)].is_some()
    }

    /// Places one new fragment in the first empty cell, growing the grid
    /// first if it is full, and returns the cell that was filled.
    ///
    /// The first fragment ever placed becomes the start fragment: its
    /// anchor is recorded as the player start point and no stitching
    /// happens. Every later fragment is stitched against at most one
    /// neighbor per axis, preferring left over right and bottom over top
    /// in the scan.
    pub fn expand(
        &mut self,
        is_first: bool,
        catalog: &VariantCatalog,
        spawner: &mut dyn Spawner,
        rng: &mut StdRng,
    ) -> ForageResult<GridPos> {
        debug_assert_eq!(is_first, self.placed == 0);

        let mut grew = false;
        loop {
            if let Some((x, y)) = self.first_empty_cell() {
                self.place_at(x, y, is_first, catalog, spawner, rng)?;
                return Ok(GridPos::new(x, y));
            }
            if grew {
                // A freshly grown grid always has empty edge cells.
                return Err(ForageError::InvalidState(
                    "grid growth produced no empty cell".to_string(),
                ));
            }
            self.grow();
            grew = true;
        }
    }

    /// Scans columns left to right, each bottom to top, for the first
    /// unoccupied cell.
    fn first_empty_cell(&self) -> Option<(usize, usize)> {
        for x in 0..self.extent {
            for y in 0..self.extent {
                if !self.occupied(x, y) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    fn grow(&mut self) {
        let old_extent = self.extent;
        self.extent += 1;
        let mut cells = vec![None; self.extent * self.extent];
        for x in 0..old_extent {
            for y in 0..old_extent {
                cells[y * self.extent + x] = self.cells[y * old_extent + x].take();
            }
        }
        self.cells = cells;
        log::debug!("map grid grown to {0}x{0}", self.extent);
    }

    fn place_at(
        &mut self,
        x: usize,
        y: usize,
        is_first: bool,
        catalog: &VariantCatalog,
        spawner: &mut dyn Spawner,
        rng: &mut StdRng,
    ) -> ForageResult<()> {
        let variant = FragmentVariant(rng.gen_range(0..catalog.fragment_variants));
        let spawn = spawner.spawn_fragment(variant, GridPos::new(x, y))?;
        let mut fragment = Fragment::new(variant, spawn.handle, spawn.connectors);

        if is_first {
            self.start_point = Some(spawn.anchor);
        } else {
            self.stitch(x, y, &mut fragment, spawner);
        }

        self.item_spawn_points.extend(spawn.item_spawn_points);
        self.npc_waypoints.extend(spawn.npc_waypoints);

        let index = self.index(x, y);
        self.cells[index] = Some(fragment);
        self.placed += 1;
        log::debug!(
            "placed fragment {:?} at ({x}, {y}), {} fragments total",
            variant,
            self.placed
        );
        Ok(())
    }

    /// Opens passages between the new fragment and at most one neighbor
    /// per axis: the facing pair of connectors is destroyed on both sides.
    fn stitch(&mut self, x: usize, y: usize, fragment: &mut Fragment, spawner: &mut dyn Spawner) {
        if x > 0 && self.occupied(x - 1, y) {
            self.open_passage(fragment, Side::Left, x - 1, y, spawner);
        } else if x + 1 < self.extent && self.occupied(x + 1, y) {
            self.open_passage(fragment, Side::Right, x + 1, y, spawner);
        }

        if y > 0 && self.occupied(x, y - 1) {
            self.open_passage(fragment, Side::Bottom, x, y - 1, spawner);
        } else if y + 1 < self.extent && self.occupied(x, y + 1) {
            self.open_passage(fragment, Side::Top, x, y + 1, spawner);
        }
    }

    fn open_passage(
        &mut self,
        fragment: &mut Fragment,
        side: Side,
        neighbor_x: usize,
        neighbor_y: usize,
        spawner: &mut dyn Spawner,
    ) {
        if let Some(connector) = fragment.take_connector(side) {
            spawner.despawn_connector(connector);
        }
        let index = self.index(neighbor_x, neighbor_y);
        if let Some(neighbor) = self.cells[index].as_mut() {
            if let Some(connector) = neighbor.take_connector(side.opposite()) {
                spawner.despawn_connector(connector);
            }
        }
    }
}
