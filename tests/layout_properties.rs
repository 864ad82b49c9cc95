use proptest::prelude::*;
use std::collections::HashSet;

use statscatter::config::LabelLayoutConfig;
use statscatter::stats::{Entity, MetricPair, PopulationAverages, StatTable};
use statscatter::text_metrics::TextExtent;
use statscatter::{
    Anchoring, HorizontalAlign, LabelBox, LabelLayoutEngine, VerticalAlign, classify, select_extremes,
};

const BOUNDS: (f32, f32, f32, f32) = (0.0, 0.0, 1200.0, 800.0);

fn anchoring_strategy() -> impl Strategy<Value = Anchoring> {
    (any::<bool>(), any::<bool>()).prop_map(|(left, bottom)| Anchoring {
        horizontal: if left {
            HorizontalAlign::Left
        } else {
            HorizontalAlign::Right
        },
        vertical: if bottom {
            VerticalAlign::Bottom
        } else {
            VerticalAlign::Top
        },
    })
}

fn table(values: &[(f64, f64)]) -> StatTable {
    let entities = values
        .iter()
        .enumerate()
        .map(|(idx, &(x, y))| Entity {
            name: format!("Player {idx}"),
            team: "TST".into(),
            x,
            y,
            weight: 600.0,
        })
        .collect();
    StatTable::from_entities(MetricPair::new("A", "B"), entities)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn layout_stops_within_the_round_budget(
        raw in proptest::collection::vec(
            (50.0f32..1150.0, 50.0f32..750.0, 10.0f32..90.0, anchoring_strategy()),
            0..200
        ),
        max_rounds in 1usize..120,
        seed in any::<u64>(),
    ) {
        let anchors: Vec<(f32, f32)> = raw.iter().map(|(x, y, _, _)| (*x, *y)).collect();
        let boxes: Vec<LabelBox> = raw
            .iter()
            .enumerate()
            .map(|(idx, (x, y, w, anchoring))| {
                LabelBox::new(idx, format!("L{idx}"), (*x, *y), TextExtent { width: *w, height: 12.0 }, *anchoring)
            })
            .collect();
        let engine = LabelLayoutEngine::new(LabelLayoutConfig {
            max_rounds,
            seed,
            ..LabelLayoutConfig::default()
        });
        let outcome = engine.layout(boxes, &anchors, BOUNDS);

        prop_assert!(outcome.rounds <= max_rounds);
        prop_assert_eq!(outcome.labels.len(), raw.len());
        for placed in &outcome.labels {
            prop_assert!(placed.label.center.0.is_finite() && placed.label.center.1.is_finite());
        }
    }

    #[test]
    fn separated_labels_keep_their_home(
        cells in proptest::collection::hash_set((0usize..6, 0usize..4), 1..12),
        anchorings in proptest::collection::vec(anchoring_strategy(), 12),
        widths in proptest::collection::vec(20.0f32..70.0, 12),
    ) {
        // Anchors on a 200 px lattice cannot reach one another.
        let cells: Vec<(usize, usize)> = cells.into_iter().collect();
        let anchors: Vec<(f32, f32)> = cells
            .iter()
            .map(|&(cx, cy)| (100.0 + cx as f32 * 200.0, 100.0 + cy as f32 * 200.0))
            .collect();
        let boxes: Vec<LabelBox> = anchors
            .iter()
            .enumerate()
            .map(|(idx, &anchor)| {
                LabelBox::new(idx, format!("L{idx}"), anchor, TextExtent { width: widths[idx], height: 12.0 }, anchorings[idx])
            })
            .collect();
        let outcome = LabelLayoutEngine::default().layout(boxes, &anchors, BOUNDS);

        prop_assert!(outcome.converged);
        prop_assert_eq!(outcome.rounds, 1);
        for placed in &outcome.labels {
            prop_assert_eq!(placed.label.center, placed.label.home);
            prop_assert!(placed.leader.is_none());
        }
    }

    #[test]
    fn quadrant_matches_the_averages(
        x in -10.0f64..10.0,
        y in -10.0f64..10.0,
        ax in -10.0f64..10.0,
        ay in -10.0f64..10.0,
    ) {
        let anchoring = classify(x, y, &PopulationAverages::new(ax, ay));
        prop_assert_eq!(anchoring.horizontal == HorizontalAlign::Left, x >= ax);
        prop_assert_eq!(anchoring.vertical == VerticalAlign::Bottom, y >= ay);
    }

    #[test]
    fn selection_is_bounded_distinct_and_stable(
        values in proptest::collection::vec((0i32..20, 0i32..20), 1..60),
        n in 0usize..25,
    ) {
        let values: Vec<(f64, f64)> = values.into_iter().map(|(x, y)| (x as f64, y as f64)).collect();
        let table = table(&values);
        let picked = select_extremes(&table, n);

        let unique: HashSet<usize> = picked.iter().copied().collect();
        prop_assert_eq!(unique.len(), picked.len());
        prop_assert!(picked.len() >= n.min(table.len()));
        prop_assert!(picked.len() <= (4 * n).min(table.len()));
        prop_assert!(picked.iter().all(|&idx| idx < table.len()));
        prop_assert_eq!(select_extremes(&table, n), picked);
    }
}

#[test]
fn four_corner_population_is_classified_per_quadrant() {
    let table = table(&[(10.0, 5.0), (1.0, 5.0), (10.0, 1.0), (1.0, 1.0)]);
    let averages = PopulationAverages::new(5.5, 3.0);
    let anchorings: Vec<(HorizontalAlign, VerticalAlign)> = table
        .entities()
        .iter()
        .map(|e| {
            let a = classify(e.x, e.y, &averages);
            (a.horizontal, a.vertical)
        })
        .collect();
    assert_eq!(
        anchorings,
        vec![
            (HorizontalAlign::Left, VerticalAlign::Bottom),
            (HorizontalAlign::Right, VerticalAlign::Bottom),
            (HorizontalAlign::Left, VerticalAlign::Top),
            (HorizontalAlign::Right, VerticalAlign::Top),
        ]
    );

    let mut picked = select_extremes(&table, 1);
    picked.sort_unstable();
    assert_eq!(picked, vec![0, 1, 2]);
}
