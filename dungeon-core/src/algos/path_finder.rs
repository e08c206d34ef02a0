use crate::{
    constants::{BASE_COST, DIAGONAL_COST},
    grid::Grid,
    types::Position,
};

use std::{cmp::Reverse, collections::HashMap};

use priority_queue::PriorityQueue;

// Octile distance, never above the real cost of reaching `to`
fn heuristic(from: Position, to: Position) -> u64 {
    let dx = from.x.abs_diff(to.x) as u64;
    let dy = from.y.abs_diff(to.y) as u64;

    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;

    diagonal * DIAGONAL_COST as u64 + straight * BASE_COST as u64
}

// Open cells reachable in one step, with the cost of the step itself.
// Diagonal steps need both orthogonal cells they pass between to be open
fn moves(walls: &Grid, from: Position) -> impl Iterator<Item = (Position, u64)> + '_ {
    from.neighbours().into_iter().filter_map(move |next| {
        if walls.blocked(next) {
            return None;
        }

        let is_diagonal = next.x != from.x && next.y != from.y;
        if !is_diagonal {
            return Some((next, BASE_COST as u64));
        }

        let cuts_corner = walls.blocked(Position::new(next.x, from.y))
            || walls.blocked(Position::new(from.x, next.y));

        (!cuts_corner).then_some((next, DIAGONAL_COST as u64))
    })
}

// Entering a cell costs the step plus whatever `costs` holds for it. Empty
// when either end is blocked or no route exists
pub(crate) fn find_path(
    walls: &Grid,
    costs: &HashMap<Position, u32>,
    from: Position,
    to: Position,
) -> Vec<Position> {
    if walls.blocked(from) || walls.blocked(to) {
        return Vec::new();
    }

    if from == to {
        return vec![from];
    }

    let mut move_queue = PriorityQueue::new();
    let mut best_cost = HashMap::new();
    let mut came_from = HashMap::new();
    let mut sequence = 0_u64;

    best_cost.insert(from, 0_u64);
    move_queue.push(from, Reverse((heuristic(from, to), sequence)));

    while let Some((node, _)) = move_queue.pop() {
        if node == to {
            return rebuild_path(&came_from, from, to);
        }

        let node_cost = best_cost.get(&node).copied().unwrap_or(u64::MAX);

        for (next, step_cost) in moves(walls, node) {
            let extra_cost = costs.get(&next).copied().unwrap_or(0) as u64;
            let next_cost = node_cost.saturating_add(step_cost + extra_cost);

            let improves = best_cost
                .get(&next)
                .is_none_or(|known_cost| next_cost < *known_cost);

            if improves {
                best_cost.insert(next, next_cost);
                came_from.insert(next, node);

                sequence += 1;
                move_queue.push_increase(
                    next,
                    Reverse((next_cost + heuristic(next, to), sequence)),
                );
            }
        }
    }

    Vec::new()
}

fn rebuild_path(
    came_from: &HashMap<Position, Position>,
    from: Position,
    to: Position,
) -> Vec<Position> {
    let mut path = vec![to];
    let mut current = to;

    while current != from {
        match came_from.get(&current) {
            Some(previous) => {
                current = *previous;
                path.push(current);
            }
            None => return Vec::new(),
        }
    }

    path.reverse();
    path
}

pub(crate) fn path_cost(costs: &HashMap<Position, u32>, path: &[Position]) -> u64 {
    path.windows(2)
        .map(|step| {
            let is_diagonal = step[0].x != step[1].x && step[0].y != step[1].y;
            let step_cost = if is_diagonal { DIAGONAL_COST } else { BASE_COST };

            step_cost as u64 + costs.get(&step[1]).copied().unwrap_or(0) as u64
        })
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{constants::OBJECT_PENALTY, types::Size};

    // Builds a wall grid from rows of `#` and `.`
    fn walls_from(rows: &[&str]) -> Grid {
        let mut walls = Grid::new(Size::new(rows[0].len() as u32, rows.len() as u32), true);

        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                walls.set(Position::new(x as i32, y as i32), cell == '#');
            }
        }

        walls
    }

    fn assert_is_walkable_path(walls: &Grid, path: &[Position]) {
        for cell in path {
            assert!(!walls.blocked(*cell), "{} is blocked", cell);
        }
        for step in path.windows(2) {
            assert!(step[0].is_adjacent_to(&step[1]), "{} -> {}", step[0], step[1]);
        }
    }

    #[test]
    fn test_path_to_itself() {
        let walls = walls_from(&["...", "...", "..."]);
        let costs = HashMap::new();

        assert_eq!(
            find_path(&walls, &costs, Position::new(1, 1), Position::new(1, 1)),
            vec![Position::new(1, 1)]
        );
    }

    #[test]
    fn test_blocked_ends_give_no_path() {
        let walls = walls_from(&["..#", "...", "..."]);
        let costs = HashMap::new();

        assert!(find_path(&walls, &costs, Position::new(0, 0), Position::new(2, 0)).is_empty());
        assert!(find_path(&walls, &costs, Position::new(2, 0), Position::new(2, 0)).is_empty());
        assert!(find_path(&walls, &costs, Position::new(0, 0), Position::new(5, 5)).is_empty());
    }

    #[test]
    fn test_diagonal_path() {
        let walls = walls_from(&["....", "....", "....", "...."]);
        let costs = HashMap::new();

        let path = find_path(&walls, &costs, Position::new(0, 0), Position::new(3, 3));

        assert_eq!(path.len(), 4);
        assert_eq!(path_cost(&costs, &path), 3 * DIAGONAL_COST as u64);
        assert_is_walkable_path(&walls, &path);
    }

    #[test]
    fn test_no_corner_cutting() {
        let walls = walls_from(&[".#", ".."]);
        let costs = HashMap::new();

        let path = find_path(&walls, &costs, Position::new(0, 0), Position::new(1, 1));

        assert_eq!(
            path,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );
    }

    #[test]
    fn test_unreachable_target() {
        let walls = walls_from(&[".#.", ".#.", ".#."]);
        let costs = HashMap::new();

        assert!(find_path(&walls, &costs, Position::new(0, 0), Position::new(2, 2)).is_empty());
    }

    #[test]
    fn test_penalty_causes_detour() {
        let walls = walls_from(&[".....", ".....", "....."]);
        let mut costs = HashMap::new();

        let from = Position::new(0, 1);
        let to = Position::new(4, 1);

        let direct = find_path(&walls, &costs, from, to);
        assert_eq!(direct.len(), 5);
        assert!(direct.contains(&Position::new(2, 1)));

        costs.insert(Position::new(2, 1), OBJECT_PENALTY);
        let detour = find_path(&walls, &costs, from, to);

        assert!(!detour.contains(&Position::new(2, 1)));
        assert!(detour.len() >= direct.len());
        assert_is_walkable_path(&walls, &detour);
    }

    #[test]
    fn test_penalty_never_blocks() {
        let walls = walls_from(&["#####", ".....", "#####"]);
        let mut costs = HashMap::new();
        costs.insert(Position::new(2, 1), OBJECT_PENALTY);

        let path = find_path(&walls, &costs, Position::new(0, 1), Position::new(4, 1));

        assert_eq!(path.len(), 5);
        assert!(path.contains(&Position::new(2, 1)));
        assert_eq!(
            path_cost(&costs, &path),
            4 * BASE_COST as u64 + OBJECT_PENALTY as u64
        );
    }

    #[test]
    fn test_path_is_deterministic() {
        let walls = walls_from(&["......", "..##..", "......", "......"]);
        let costs = HashMap::new();

        let first = find_path(&walls, &costs, Position::new(0, 0), Position::new(5, 3));
        let second = find_path(&walls, &costs, Position::new(0, 0), Position::new(5, 3));

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
