//! # Map Module
//!
//! Map fragments and the growable fragment grid.
//!
//! A fragment is one pre-authored tile of the playable map. The core never
//! sees its geometry; it only tracks the four optional boundary connectors
//! (walls shared with neighboring cells) and the spawn points the fragment
//! contributes to the global lists.

pub mod grid;

pub use grid::*;

use crate::game::{ConnectorHandle, FragmentHandle, FragmentVariant, WorldPoint};
use serde::{Deserialize, Serialize};

/// One of the four sides of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// The side facing this one on a neighboring fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use forage::Side;
    ///
    /// assert_eq!(Side::Left.opposite(), Side::Right);
    /// assert_eq!(Side::Top.opposite(), Side::Bottom);
    /// ```
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

/// The four optional boundary connectors of a fragment.
///
/// A present handle means the wall still stands; stitching takes the handle
/// out and asks the spawner to destroy the wall, opening a passage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connectors {
    pub left: Option<ConnectorHandle>,
    pub right: Option<ConnectorHandle>,
    pub top: Option<ConnectorHandle>,
    pub bottom: Option<ConnectorHandle>,
}

impl Connectors {
    /// Connectors on every side, for fragments authored fully walled.
    pub fn full() -> Self {
        Self {
            left: Some(ConnectorHandle::new()),
            right: Some(ConnectorHandle::new()),
            top: Some(ConnectorHandle::new()),
            bottom: Some(ConnectorHandle::new()),
        }
    }

    /// The connector on `side`, if it still stands.
    pub fn get(&self, side: Side) -> Option<ConnectorHandle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    /// Removes and returns the connector on `side`.
    pub fn take(&mut self, side: Side) -> Option<ConnectorHandle> {
        match side {
            Side::Left => self.left.take(),
            Side::Right => self.right.take(),
            Side::Top => self.top.take(),
            Side::Bottom => self.bottom.take(),
        }
    }
}

/// Everything the spawn collaborator reports about a freshly instantiated
/// fragment.
///
/// Spawn points and waypoints are in world coordinates; the collaborator
/// has already offset the fragment's local points by its grid position.
#[derive(Debug, Clone)]
pub struct FragmentSpawn {
    /// Handle to the instantiated fragment
    pub handle: FragmentHandle,
    /// Designated anchor; becomes the player start for the first fragment
    pub anchor: WorldPoint,
    /// Boundary walls the fragment was authored with
    pub connectors: Connectors,
    /// Local item spawn positions, in placement order
    pub item_spawn_points: Vec<WorldPoint>,
    /// Local NPC patrol waypoints, in placement order
    pub npc_waypoints: Vec<WorldPoint>,
}

/// A fragment placed in the grid.
///
/// Once placed it is never removed or replaced; only its connectors may be
/// destroyed when a neighbor stitches against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    variant: FragmentVariant,
    handle: FragmentHandle,
    connectors: Connectors,
}

impl Fragment {
    /// Creates a placed fragment from a spawn report.
    pub fn new(variant: FragmentVariant, handle: FragmentHandle, connectors: Connectors) -> Self {
        Self {
            variant,
            handle,
            connectors,
        }
    }

    /// The visual variant this fragment was instantiated from.
    pub fn variant(&self) -> FragmentVariant {
        self.variant
    }

    /// Handle to the instantiated fragment.
    pub fn handle(&self) -> FragmentHandle {
        self.handle
    }

    /// Whether the wall on `side` still stands.
    pub fn has_connector(&self, side: Side) -> bool {
        self.connectors.get(side).is_some()
    }

    /// Removes and returns the wall on `side`, if it still stands.
    pub fn take_connector(&mut self, side: Side) -> Option<ConnectorHandle> {
        self.connectors.take(side)
    }
}
