use crate::stats::{Entity, StatTable};
use std::collections::HashSet;

/// Indices of the entities worth labelling: the top and bottom `n` by each
/// metric, in that order, with repeats removed (first occurrence wins).
///
/// Ties keep table order, so the earlier entity wins for both the largest and
/// the smallest values and the result is stable across runs.
pub fn select_extremes(table: &StatTable, n: usize) -> Vec<usize> {
    let entities = table.entities();
    let by_x = |e: &Entity| e.x;
    let by_y = |e: &Entity| e.y;

    let groups = [
        ranked(entities, by_x, Direction::Largest, n),
        ranked(entities, by_x, Direction::Smallest, n),
        ranked(entities, by_y, Direction::Largest, n),
        ranked(entities, by_y, Direction::Smallest, n),
    ];

    let mut seen = HashSet::new();
    groups
        .into_iter()
        .flatten()
        .filter(|idx| seen.insert(*idx))
        .collect()
}

#[derive(Clone, Copy)]
enum Direction {
    Largest,
    Smallest,
}

fn ranked(
    entities: &[Entity],
    metric: impl Fn(&Entity) -> f64,
    direction: Direction,
    n: usize,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entities.len()).collect();
    // sort_by is stable, which is what keeps ties in table order.
    order.sort_by(|&a, &b| {
        let (va, vb) = (metric(&entities[a]), metric(&entities[b]));
        match direction {
            Direction::Largest => vb.total_cmp(&va),
            Direction::Smallest => va.total_cmp(&vb),
        }
    });
    order.truncate(n);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::MetricPair;

    fn table(points: &[(f64, f64)]) -> StatTable {
        let entities = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Entity {
                name: format!("P{i}"),
                team: "TST".to_string(),
                x,
                y,
                weight: 600.0,
            })
            .collect();
        StatTable::from_entities(MetricPair::new("A", "B"), entities)
    }

    #[test]
    fn corner_scenario_with_stable_ties() {
        let t = table(&[(10.0, 5.0), (1.0, 5.0), (10.0, 1.0), (1.0, 1.0)]);
        // top A -> 0, bottom A -> 1, top B -> 0 (tie with 1), bottom B -> 2 (tie with 3)
        assert_eq!(select_extremes(&t, 1), vec![0, 1, 2]);
    }

    #[test]
    fn n_larger_than_table_returns_everything_once() {
        let t = table(&[(3.0, 1.0), (2.0, 2.0), (1.0, 3.0)]);
        let mut picked = select_extremes(&t, 17);
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1, 2]);
    }

    #[test]
    fn disjoint_extremes_reach_four_n() {
        // x extremes and y extremes come from different entities.
        let t = table(&[
            (100.0, 50.0),
            (0.0, 50.0),
            (50.0, 100.0),
            (50.0, 0.0),
            (50.0, 50.0),
        ]);
        assert_eq!(select_extremes(&t, 1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_extremes_selects_nothing() {
        let t = table(&[(1.0, 1.0)]);
        assert!(select_extremes(&t, 0).is_empty());
    }
}
