use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::env::MapOracle;
use crate::state::{EntityId, GameState, Position};

/// Parameters of a single path query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathRequest {
    /// Unit that would walk the path; decides which occupants are hostile.
    pub entity: EntityId,
    pub from: Position,
    pub to: Position,
    /// Maximum number of steps (path length minus one).
    pub max_steps: u32,
}

/// Black-box path search. Returned paths start at `from` and end at `to`.
///
/// Implementations must be deterministic: the same state and request always
/// yield the same path.
pub trait Pathfinder: Send + Sync {
    fn find_path(
        &self,
        map: &dyn MapOracle,
        state: &GameState,
        request: &PathRequest,
    ) -> Option<Vec<Position>>;
}

/// Breadth-first search over the orthogonal grid.
///
/// Hostile units block. Allied units may be walked through; whether the
/// goal itself may be occupied is left to the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridPathfinder;

impl GridPathfinder {
    pub fn new() -> Self {
        Self
    }
}

impl Pathfinder for GridPathfinder {
    fn find_path(
        &self,
        map: &dyn MapOracle,
        state: &GameState,
        request: &PathRequest,
    ) -> Option<Vec<Position>> {
        let dimensions = map.dimensions();
        if !dimensions.contains(request.from) || !dimensions.contains(request.to) {
            return None;
        }
        if request.from == request.to {
            return Some(vec![request.from]);
        }

        let max_steps = request.max_steps.min(GameConfig::MAX_PATH_LEN as u32);
        if request.from.manhattan(request.to) > max_steps {
            return None;
        }

        let width = dimensions.width as usize;
        let index = |p: Position| p.y as usize * width + p.x as usize;

        // Per-call scratch: parent links and BFS depth.
        let mut parent: Vec<Option<usize>> = vec![None; dimensions.area()];
        let mut depth: Vec<u32> = vec![u32::MAX; dimensions.area()];
        let mut frontier = VecDeque::new();

        depth[index(request.from)] = 0;
        frontier.push_back(request.from);

        while let Some(current) = frontier.pop_front() {
            let current_depth = depth[index(current)];
            if current_depth >= max_steps {
                continue;
            }
            for next in current.neighbors() {
                if !dimensions.contains(next) {
                    continue;
                }
                let next_index = index(next);
                if depth[next_index] != u32::MAX {
                    continue;
                }
                let passable = map.tile(next).is_some_and(|tile| tile.is_passable());
                if !passable {
                    continue;
                }
                if next != request.to
                    && let Some(occupant) = state.world.tile_map.occupant(&next)
                    && state.are_hostile(request.entity, occupant)
                {
                    continue;
                }

                depth[next_index] = current_depth + 1;
                parent[next_index] = Some(index(current));
                if next == request.to {
                    return Some(rebuild(&parent, next_index, width, request.from));
                }
                frontier.push_back(next);
            }
        }

        None
    }
}

fn rebuild(parent: &[Option<usize>], goal: usize, width: usize, from: Position) -> Vec<Position> {
    let to_position = |i: usize| Position::new((i % width) as i32, (i / width) as i32);
    let mut path = vec![to_position(goal)];
    let mut cursor = goal;
    while let Some(previous) = parent[cursor] {
        path.push(to_position(previous));
        cursor = previous;
    }
    debug_assert_eq!(path.last(), Some(&from));
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Fixture};

    #[test]
    fn straight_line_includes_origin() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        let scout = fixtures::place(&mut state, &fixture, 5, fixtures::RED, fixtures::SCOUT, (1, 1));

        let path = GridPathfinder
            .find_path(
                &fixture.map,
                &state,
                &PathRequest {
                    entity: scout,
                    from: Position::new(1, 1),
                    to: Position::new(1, 3),
                    max_steps: 4,
                },
            )
            .unwrap();

        assert_eq!(
            path,
            vec![Position::new(1, 1), Position::new(1, 2), Position::new(1, 3)]
        );
    }

    #[test]
    fn hostile_units_block_but_allies_do_not() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        let mover = fixtures::place(&mut state, &fixture, 5, fixtures::RED, fixtures::INFANTRY, (0, 0));
        fixtures::place(&mut state, &fixture, 6, fixtures::RED, fixtures::INFANTRY, (1, 0));

        let request = PathRequest {
            entity: mover,
            from: Position::new(0, 0),
            to: Position::new(2, 0),
            max_steps: 2,
        };
        let through_ally = GridPathfinder.find_path(&fixture.map, &state, &request);
        assert_eq!(through_ally.map(|p| p.len()), Some(3));

        let mut blocked = fixture.state();
        let mover = fixtures::place(&mut blocked, &fixture, 5, fixtures::RED, fixtures::INFANTRY, (0, 0));
        fixtures::place(&mut blocked, &fixture, 9, fixtures::BLUE, fixtures::INFANTRY, (1, 0));
        let request = PathRequest { entity: mover, ..request };
        assert!(GridPathfinder.find_path(&fixture.map, &blocked, &request).is_none());
    }

    #[test]
    fn respects_step_budget_and_walls() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        let mover = fixtures::place(&mut state, &fixture, 5, fixtures::RED, fixtures::INFANTRY, (0, 0));

        let far = PathRequest {
            entity: mover,
            from: Position::new(0, 0),
            to: Position::new(3, 0),
            max_steps: 2,
        };
        assert!(GridPathfinder.find_path(&fixture.map, &state, &far).is_none());

        // (4, 4) is a wall in the skirmish map.
        let wall = PathRequest {
            to: fixtures::WALL,
            max_steps: 20,
            ..far
        };
        assert!(GridPathfinder.find_path(&fixture.map, &state, &wall).is_none());
    }

    #[test]
    fn search_is_deterministic() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        let mover = fixtures::place(&mut state, &fixture, 5, fixtures::RED, fixtures::INFANTRY, (0, 0));
        let request = PathRequest {
            entity: mover,
            from: Position::new(0, 0),
            to: Position::new(2, 2),
            max_steps: 4,
        };

        let first = GridPathfinder.find_path(&fixture.map, &state, &request);
        let second = GridPathfinder.find_path(&fixture.map, &state, &request);
        assert_eq!(first, second);
        // North before east before south before west.
        assert_eq!(first.unwrap()[1], Position::new(1, 0));
    }
}
