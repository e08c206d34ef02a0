use crate::{
    algos::{find_path, path_cost},
    dungeon::Dungeon,
    grid::Grid,
    types::{Position, Size},
};

use std::{collections::HashMap, sync::Arc};

use tracing::{Level, event};

/// Walkability of a dungeon plus live per-cell penalties.
///
/// Walls are fixed once built. Penalties only make a cell more expensive to
/// enter, they never block it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavGrid {
    walls: Arc<Grid>,
    costs: HashMap<Position, u32>,
}

impl NavGrid {
    pub fn build(dungeon: &Dungeon) -> Self {
        NavGrid::from_walls(dungeon.grid().clone())
    }

    pub fn from_walls(walls: Grid) -> Self {
        NavGrid {
            walls: Arc::new(walls),
            costs: HashMap::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.walls.size()
    }

    pub fn walkable(&self, position: Position) -> bool {
        !self.walls.blocked(position)
    }

    pub fn extra_cost(&self, position: Position) -> u32 {
        self.costs.get(&position).copied().unwrap_or(0)
    }

    /// Adds `amount` on top of whatever penalty the cell already carries.
    pub fn add_cost(&mut self, position: Position, amount: u32) {
        if amount == 0 {
            return;
        }

        let cost = self.costs.entry(position).or_insert(0);
        *cost = cost.saturating_add(amount);
    }

    /// Takes `amount` back off a cell, forgetting it once nothing is left.
    pub fn remove_cost(&mut self, position: Position, amount: u32) {
        if let Some(cost) = self.costs.get_mut(&position) {
            *cost = cost.saturating_sub(amount);

            if *cost == 0 {
                self.costs.remove(&position);
            }
        }
    }

    pub fn clear_cost(&mut self, position: Position) {
        self.costs.remove(&position);
    }

    pub fn penalised_cells(&self) -> usize {
        self.costs.len()
    }

    pub fn find_path(&self, from: Position, to: Position) -> Vec<Position> {
        find_logged_path(&self.walls, &self.costs, from, to)
    }

    pub fn path_cost(&self, path: &[Position]) -> u64 {
        path_cost(&self.costs, path)
    }

    /// Freezes the current penalties for a query that runs later.
    pub fn snapshot(&self) -> NavSnapshot {
        NavSnapshot {
            walls: Arc::clone(&self.walls),
            costs: self.costs.clone(),
        }
    }
}

/// Walls and penalties of a [`NavGrid`] as they were at one moment.
#[derive(Debug, Clone)]
pub struct NavSnapshot {
    walls: Arc<Grid>,
    costs: HashMap<Position, u32>,
}

impl NavSnapshot {
    pub fn find_path(&self, from: Position, to: Position) -> Vec<Position> {
        find_logged_path(&self.walls, &self.costs, from, to)
    }
}

fn find_logged_path(
    walls: &Grid,
    costs: &HashMap<Position, u32>,
    from: Position,
    to: Position,
) -> Vec<Position> {
    let search_start = std::time::Instant::now();
    let path = find_path(walls, costs, from, to);

    event!(
        Level::DEBUG,
        "Path {} -> {} has {} cells, found in {}us",
        from,
        to,
        path.len(),
        search_start.elapsed().as_micros()
    );

    path
}
