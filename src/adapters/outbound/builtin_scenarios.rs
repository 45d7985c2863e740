use crate::common::{DomainError, DomainResult};
use crate::domains::mapf::{Cell, Grid, Scenario, ScenarioSource};

type Endpoints = &'static [((i32, i32), (i32, i32))];

struct Builtin {
    name: &'static str,
    map: &'static [&'static str],
    agents: Endpoints,
}

const OPEN_7: &[&str] = &[
    ".......", ".......", ".......", ".......", ".......", ".......", ".......",
];

const BUILTINS: &[Builtin] = &[
    // Two agents trading places on an open row.
    Builtin {
        name: "head-on",
        map: OPEN_7,
        agents: &[((1, 1), (1, 5)), ((1, 5), (1, 1))],
    },
    // A parks on (6,6) at t=8, right where B's shortest route runs.
    Builtin {
        name: "goal-blocking",
        map: &[
            "......###",
            "......###",
            "......###",
            "......###",
            "......###",
            "......###",
            ".........",
            ".........",
            ".........",
        ],
        agents: &[((2, 2), (6, 6)), ((2, 0), (6, 8))],
    },
    Builtin {
        name: "crossing",
        map: OPEN_7,
        agents: &[((3, 0), (3, 6)), ((0, 3), (6, 3))],
    },
    // One-wide corridor, no room to pass.
    Builtin {
        name: "corridor",
        map: &["####", "#..#", "####"],
        agents: &[((1, 1), (1, 2)), ((1, 2), (1, 1))],
    },
    // A starts inside a walled pocket.
    Builtin {
        name: "enclosed",
        map: &[".....", ".###.", ".#.#.", ".###.", "....."],
        agents: &[((2, 2), (0, 0)), ((4, 4), (4, 0))],
    },
    Builtin {
        name: "warehouse",
        map: &[
            ".........",
            ".#.#.#.#.",
            ".........",
            ".#.#.#.#.",
            ".........",
            ".#.#.#.#.",
            ".........",
            ".#.#.#.#.",
            ".........",
        ],
        agents: &[
            ((0, 1), (8, 5)),
            ((6, 1), (0, 4)),
            ((0, 7), (8, 4)),
            ((6, 7), (8, 3)),
            ((6, 3), (8, 7)),
        ],
    },
];

/// Reference instances compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinScenarios;

impl BuiltinScenarios {
    pub fn new() -> Self {
        Self
    }
}

impl ScenarioSource for BuiltinScenarios {
    fn load_scenario(&self, name: &str) -> DomainResult<Scenario> {
        let builtin = BUILTINS
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| DomainError::ScenarioNotFound {
                name: name.to_string(),
            })?;
        Scenario::new(
            builtin.name,
            Grid::from_rows(builtin.map)?,
            builtin
                .agents
                .iter()
                .map(|&(start, goal)| (Cell::from(start), Cell::from(goal))),
        )
    }

    fn list_scenarios(&self) -> DomainResult<Vec<String>> {
        let mut names: Vec<String> = BUILTINS.iter().map(|b| b.name.to_string()).collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_is_a_valid_instance() {
        let source = BuiltinScenarios::new();
        for name in source.list_scenarios().unwrap() {
            let scenario = source.load_scenario(&name).unwrap();
            assert_eq!(scenario.name, name);
        }
    }

    #[test]
    fn unknown_names_are_not_found() {
        match BuiltinScenarios::new().load_scenario("maze") {
            Err(DomainError::ScenarioNotFound { name }) => assert_eq!(name, "maze"),
            other => panic!("Expected ScenarioNotFound, got {:?}", other),
        }
    }
}
