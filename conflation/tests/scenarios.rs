//! End-to-end conflation on small hand-built maps.

use std::collections::BTreeSet;

use conflation::{
    check_lanes, conflate, finalize_map, Chain, ConflationOptions, ConflationResult, LaneColor,
    Match, RouteSegment, TagChanges,
};
use fusion_util::{Tags, Timer};
use geom::Pt3D;
use lanelet_map::{BoundRef, LaneletID, LaneletMap, PointID};

struct Builder {
    map: LaneletMap,
}

impl Builder {
    fn new() -> Builder {
        Builder {
            map: LaneletMap::new(),
        }
    }

    fn pt(&mut self, x: f64, y: f64) -> PointID {
        self.map.add_point(Pt3D::new(x, y, 0.0), Tags::empty())
    }

    /// A lanelet traveling in +x from x1 to x2, between y_right and y_left, through a vertex at
    /// every 10m.
    fn eastbound(&mut self, x1: f64, x2: f64, y_left: f64, y_right: f64) -> LaneletID {
        let left = self.line(x1, x2, y_left);
        let right = self.line(x1, x2, y_right);
        self.join(left, right)
    }

    fn line(&mut self, x1: f64, x2: f64, y: f64) -> Vec<PointID> {
        let mut pts = Vec::new();
        let mut x = x1;
        while x < x2 {
            pts.push(self.pt(x, y));
            x += 10.0;
        }
        pts.push(self.pt(x2, y));
        pts
    }

    fn join(&mut self, left: Vec<PointID>, right: Vec<PointID>) -> LaneletID {
        let left = self.map.add_curve(left, Tags::empty()).unwrap();
        let right = self.map.add_curve(right, Tags::empty()).unwrap();
        self.map
            .add_lanelet(BoundRef::new(left), BoundRef::new(right), Tags::empty())
            .unwrap()
    }
}

fn reference_seg(x1: f64, x2: f64, chain: Chain) -> RouteSegment {
    RouteSegment::with_chain(vec![Pt3D::new(x1, 0.0, 0.0), Pt3D::new(x2, 0.0, 0.0)], chain)
}

fn target_seg(x1: f64, x2: f64, tags: Vec<(&str, &str)>) -> RouteSegment {
    RouteSegment::new(
        vec![Pt3D::new(x1, 0.3, 0.0), Pt3D::new(x2, 0.3, 0.0)],
        Tags::new(tags),
    )
}

fn chain_lengths(m: &Match) -> Vec<(usize, usize)> {
    m.reference
        .iter()
        .map(|seg| (seg.chain.forward.len(), seg.chain.backward.len()))
        .collect()
}

#[test]
fn highway_change_splits_and_classifies() {
    let mut b = Builder::new();
    let lanelet = b.eastbound(0.0, 20.0, 1.5, -1.5);
    let untouched = b.eastbound(0.0, 20.0, 40.0, 37.0);
    let mut map = b.map;

    // The lanelet spans both reference segments. The road class changes at x=12.
    let mut matches = vec![Match::new(
        vec![
            reference_seg(0.0, 10.0, Chain::new(vec![lanelet], Vec::new())),
            reference_seg(10.0, 20.0, Chain::new(vec![lanelet], Vec::new())),
        ],
        vec![
            target_seg(0.0, 12.0, vec![("highway", "motorway"), ("maxspeed", "100")]),
            target_seg(12.0, 20.0, vec![("highway", "primary"), ("maxspeed", "100")]),
        ],
    )];
    let num_lanelets = map.all_lanelets().len();
    let result = conflate(
        &mut map,
        &mut matches,
        &ConflationOptions::default(),
        &mut Timer::throwaway(),
    );

    assert_eq!(map.all_lanelets().len(), num_lanelets + 1);
    let m = &matches[0];
    assert_eq!(m.reference[0].chain.forward, vec![lanelet]);
    let downstream = m.reference[1].chain.forward[0];
    assert_ne!(downstream, lanelet);
    assert!(map.follows(lanelet, downstream));

    // The split happened at the change point
    let left = map.bound_polyline(map.get_l(lanelet).left).unwrap();
    assert_eq!(left.last_pt().x(), 12.0);

    let before = &map.get_l(lanelet).tags;
    assert!(before.is("subtype", "highway"));
    assert!(before.is("location", "nonurban"));
    assert!(before.is("speed_limit", "100"));
    let after = &map.get_l(downstream).tags;
    assert!(after.is("subtype", "road"));
    assert!(after.is("location", "urban"));
    assert!(after.is("speed_limit", "100"));

    // No lanes tag anywhere
    assert_eq!(result.color(lanelet), Some(LaneColor::Unknown));
    assert_eq!(result.color(downstream), Some(LaneColor::Unknown));
    assert_eq!(result.color(untouched), Some(LaneColor::NoMatch));
    assert!(result.deleted.is_empty());
}

#[test]
fn shoulders_count_as_lanes() {
    let mut b = Builder::new();
    let forward = vec![b.eastbound(0.0, 20.0, 3.0, 0.0), b.eastbound(0.0, 20.0, 6.0, 3.0)];
    let backward = vec![b.eastbound(0.0, 20.0, -3.0, -6.0), b.eastbound(0.0, 20.0, 0.0, -3.0)];
    let map = b.map;

    let mut m = Match::new(
        vec![reference_seg(0.0, 20.0, Chain::new(forward, backward))],
        vec![target_seg(0.0, 20.0, vec![("lanes", "2"), ("shoulder", "both")])],
    );
    let lanes = TagChanges::detect(&m.target, "lanes");
    let shoulder = TagChanges::detect(&m.target, "shoulder");
    let mut result = ConflationResult::new();
    check_lanes(&map, &mut m, &lanes, &shoulder, &mut result);

    assert_eq!(result.colors.len(), 4);
    assert!(result.colors.iter().all(|(_, c)| *c == LaneColor::Match));
    assert!(result.deleted.is_empty());
    assert_eq!(chain_lengths(&m), vec![(2, 2)]);
}

#[test]
fn lonely_lanelet_is_removed() {
    let mut b = Builder::new();
    // `connected` continues into `next`; `lonely` touches nothing end to end
    let left = b.line(0.0, 20.0, 1.5);
    let right = b.line(0.0, 20.0, -1.5);
    let (left_end, right_end) = (left[left.len() - 1], right[right.len() - 1]);
    let connected = b.join(left, right);
    let next_left = vec![left_end, b.pt(30.0, 1.5)];
    let next_right = vec![right_end, b.pt(30.0, -1.5)];
    let next = b.join(next_left, next_right);
    let lonely = b.eastbound(0.0, 20.0, 4.5, 1.5);
    let mut map = b.map;
    assert!(map.follows(connected, next));

    let mut matches = vec![Match::new(
        vec![reference_seg(
            0.0,
            20.0,
            Chain::new(vec![connected, lonely], Vec::new()),
        )],
        vec![target_seg(0.0, 20.0, vec![("lanes", "1")])],
    )];
    let result = conflate(
        &mut map,
        &mut matches,
        &ConflationOptions::default(),
        &mut Timer::throwaway(),
    );

    assert_eq!(result.deleted, vec![lonely].into_iter().collect::<BTreeSet<_>>());
    assert_eq!(matches[0].reference[0].chain.forward, vec![connected]);
    assert_eq!(result.color(connected), Some(LaneColor::Mismatch));

    // Checking again, the count agrees
    let mut recheck = ConflationResult::new();
    let target = matches[0].target.clone();
    check_lanes(
        &map,
        &mut matches[0],
        &TagChanges::detect(&target, "lanes"),
        &TagChanges::detect(&target, "shoulder"),
        &mut recheck,
    );
    assert_eq!(recheck.colors, vec![(connected, LaneColor::Match)]);
    assert!(recheck.deleted.is_empty());

    // And the deleted lanelet doesn't make it into the output
    let finalized = finalize_map(&map, &result.deleted, &mut Timer::throwaway()).unwrap();
    assert!(finalized.maybe_get_l(lonely).is_none());
    assert!(finalized.maybe_get_l(connected).is_some());
    assert!(finalized.maybe_get_l(next).is_some());
}

#[test]
fn no_removal_when_every_lanelet_is_connected() {
    let mut b = Builder::new();
    let left = b.line(0.0, 20.0, 1.5);
    let mid = b.line(0.0, 20.0, -1.5);
    let right = b.line(0.0, 20.0, -4.5);
    let (l_end, m_end, r_end) = (left[2], mid[2], right[2]);
    let a = b.join(left, mid.clone());
    let c = b.join(mid, right);
    let next_l = vec![l_end, b.pt(30.0, 1.5)];
    let next_m = vec![m_end, b.pt(30.0, -1.5)];
    let next_r = vec![r_end, b.pt(30.0, -4.5)];
    b.join(next_l, next_m.clone());
    b.join(next_m, next_r);
    let map = b.map;

    let mut m = Match::new(
        vec![reference_seg(0.0, 20.0, Chain::new(vec![a, c], Vec::new()))],
        vec![target_seg(0.0, 20.0, vec![("lanes", "1")])],
    );
    let target = m.target.clone();
    let mut result = ConflationResult::new();
    check_lanes(
        &map,
        &mut m,
        &TagChanges::detect(&target, "lanes"),
        &TagChanges::detect(&target, "shoulder"),
        &mut result,
    );
    assert!(result.deleted.is_empty());
    assert_eq!(chain_lengths(&m), vec![(2, 0)]);
    assert_eq!(result.color(a), Some(LaneColor::Mismatch));
}

#[test]
fn opposite_routes_line_up_values() {
    let mut b = Builder::new();
    let lanelet = b.eastbound(0.0, 20.0, 1.5, -1.5);
    let mut map = b.map;

    // Traced from x=20 back to x=0
    let mut matches = vec![Match::new(
        vec![
            reference_seg(0.0, 10.0, Chain::new(vec![lanelet], Vec::new())),
            reference_seg(10.0, 20.0, Chain::new(vec![lanelet], Vec::new())),
        ],
        vec![
            target_seg(20.0, 12.0, vec![("name", "Bahnhofstraße")]),
            target_seg(12.0, 0.0, vec![("name", "Arcisstraße")]),
        ],
    )];
    assert!(!matches[0].same_direction());
    conflate(
        &mut map,
        &mut matches,
        &ConflationOptions::default(),
        &mut Timer::throwaway(),
    );

    let downstream = matches[0].reference[1].chain.forward[0];
    assert!(map.get_l(lanelet).tags.is("road_name", "Arcisstraße"));
    assert!(map.get_l(downstream).tags.is("road_name", "Bahnhofstraße"));
}

#[test]
fn empty_matches_are_skipped() {
    let mut b = Builder::new();
    let lanelet = b.eastbound(0.0, 20.0, 1.5, -1.5);
    let mut map = b.map;
    let mut matches = vec![Match::new(
        vec![reference_seg(0.0, 20.0, Chain::new(vec![lanelet], Vec::new()))],
        Vec::new(),
    )];
    let opts = ConflationOptions {
        color_unmatched: false,
        ..Default::default()
    };
    let result = conflate(&mut map, &mut matches, &opts, &mut Timer::throwaway());
    assert!(result.colors.is_empty());
    assert!(map.get_l(lanelet).tags.is_empty());
}

#[test]
fn missing_values_clear_stale_tags() {
    let mut b = Builder::new();
    let lanelet = b.eastbound(0.0, 20.0, 1.5, -1.5);
    let mut map = b.map;
    let tags = &mut map.maybe_get_l_mut(lanelet).unwrap().tags;
    tags.insert("road_name", "Old");
    tags.insert("subtype", "crosswalk");

    // Past x=12, the street network has an unknown road class and no name
    let mut matches = vec![Match::new(
        vec![
            reference_seg(0.0, 10.0, Chain::new(vec![lanelet], Vec::new())),
            reference_seg(10.0, 20.0, Chain::new(vec![lanelet], Vec::new())),
        ],
        vec![
            target_seg(0.0, 12.0, vec![("highway", "primary"), ("name", "Arcisstraße")]),
            target_seg(12.0, 20.0, vec![("highway", "footway")]),
        ],
    )];
    conflate(
        &mut map,
        &mut matches,
        &ConflationOptions::default(),
        &mut Timer::throwaway(),
    );

    let before = &map.get_l(lanelet).tags;
    assert!(before.is("road_name", "Arcisstraße"));
    assert!(before.is("subtype", "road"));
    let downstream = matches[0].reference[1].chain.forward[0];
    let after = &map.get_l(downstream).tags;
    assert!(after.is("road_name", ""));
    assert!(after.is("subtype", ""));
    assert!(after.is("location", ""));
}

#[test]
fn lanes_and_shoulders_change_independently() {
    // Each reference segment gets its own stack of lanelets
    fn stack(b: &mut Builder, x: f64, count: usize) -> Vec<LaneletID> {
        (0..count)
            .map(|i| b.eastbound(x, x + 10.0, 3.0 * (i + 1) as f64, 3.0 * i as f64))
            .collect()
    }
    let mut b = Builder::new();
    let chains = vec![
        stack(&mut b, 0.0, 2),
        stack(&mut b, 10.0, 3),
        stack(&mut b, 20.0, 2),
        stack(&mut b, 30.0, 1),
    ];
    let map = b.map;

    // The lane count goes up at x=12; the shoulder disappears later, at x=25
    let mut m = Match::new(
        chains
            .iter()
            .enumerate()
            .map(|(idx, ids)| {
                let x = 10.0 * idx as f64;
                reference_seg(x, x + 10.0, Chain::new(ids.clone(), Vec::new()))
            })
            .collect(),
        vec![
            target_seg(0.0, 12.0, vec![("lanes", "1"), ("shoulder", "yes")]),
            target_seg(12.0, 25.0, vec![("lanes", "2"), ("shoulder", "yes")]),
            target_seg(25.0, 40.0, vec![("lanes", "2"), ("shoulder", "no")]),
        ],
    );
    let lanes = TagChanges::detect(&m.target, "lanes");
    let shoulder = TagChanges::detect(&m.target, "shoulder");
    assert_eq!(lanes.values, vec!["1", "2"]);
    assert_eq!(shoulder.values, vec!["yes", "no"]);
    let mut result = ConflationResult::new();
    check_lanes(&map, &mut m, &lanes, &shoulder, &mut result);

    // Expecting 1+1, 2+1, 2, 2 lanelets
    let colors: Vec<LaneColor> = chains
        .iter()
        .map(|ids| result.color(ids[0]).unwrap())
        .collect();
    assert_eq!(
        colors,
        vec![
            LaneColor::Match,
            LaneColor::Match,
            LaneColor::Match,
            LaneColor::Mismatch,
        ]
    );
    assert!(result.deleted.is_empty());
    assert_eq!(chain_lengths(&m), vec![(2, 0), (3, 0), (2, 0), (1, 0)]);
}
