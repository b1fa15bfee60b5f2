//! The library context that owns generated cells.

use std::collections::HashSet;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use super::cell::Cell;
use crate::deps::arcstr::{self, ArcStr};
use crate::log::debug;
use crate::pdk::Pdk;

new_key_type! {
    /// A unique identifier for cells registered in a [`Library`].
    pub struct CellKey;
}

/// Owns the cells generated for one mask, along with the process they target.
///
/// Each library hands out its own cell identifiers, so independent
/// libraries produce identical, deterministic layouts.
pub struct Library {
    pdk: Arc<dyn Pdk>,
    cells: SlotMap<CellKey, Arc<Cell>>,
    names: HashSet<ArcStr>,
    next_id: u64,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("pdk", &self.pdk.name())
            .field("cells", &self.cells.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Library {
    /// Creates an empty library targeting `pdk`.
    pub fn new(pdk: impl Pdk + 'static) -> Self {
        Self::from_arc(Arc::new(pdk))
    }

    pub fn from_arc(pdk: Arc<dyn Pdk>) -> Self {
        Self {
            pdk,
            cells: SlotMap::with_key(),
            names: HashSet::new(),
            next_id: 0,
        }
    }

    #[inline]
    pub fn pdk(&self) -> Arc<dyn Pdk> {
        self.pdk.clone()
    }

    /// Returns `base` if no cell has claimed it yet, or `base_1`, `base_2`, ... otherwise.
    ///
    /// The returned name is reserved.
    pub fn alloc_name(&mut self, base: impl Into<ArcStr>) -> ArcStr {
        let base = base.into();
        let name = if self.names.contains(&base) {
            let mut i = 1;
            loop {
                let candidate = arcstr::format!("{}_{}", base, i);
                if !self.names.contains(&candidate) {
                    debug!("cell name {} already in use; using {}", base, candidate);
                    break candidate;
                }
                i += 1;
            }
        } else {
            base
        };
        self.names.insert(name.clone());
        name
    }

    /// Returns the next value of the library's monotonically increasing counter.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Freezes `cell` and takes shared ownership of it.
    pub fn add_cell(&mut self, cell: Cell) -> Arc<Cell> {
        self.names.insert(cell.name().clone());
        let cell = cell.freeze();
        self.cells.insert(cell.clone());
        cell
    }

    pub fn cell(&self, key: CellKey) -> Option<&Arc<Cell>> {
        self.cells.get(key)
    }

    /// Looks up a registered cell by name.
    pub fn cell_named(&self, name: &str) -> Option<&Arc<Cell>> {
        self.cells.values().find(|c| c.name() == name)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Arc<Cell>> {
        self.cells.values()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }
}
