use std::collections::BTreeSet;

use anyhow::Result;

use fusion_util::Timer;
use lanelet_map::{LaneletID, LaneletMap};

/// Builds a fresh map with every lanelet that wasn't deleted, plus all areas, regulatory elements,
/// and polygons. Points and curves only come along when something kept uses them.
pub fn finalize_map(
    map: &LaneletMap,
    deleted: &BTreeSet<LaneletID>,
    timer: &mut Timer,
) -> Result<LaneletMap> {
    timer.start("build the finalized map");
    let mut result = LaneletMap::new();
    for id in map.all_lanelets().keys() {
        if !deleted.contains(id) {
            result.copy_lanelet_from(map, *id)?;
        }
    }
    for id in map.all_areas().keys() {
        result.copy_area_from(map, *id)?;
    }
    // After lanelets and areas, so members can be checked against what's kept
    for id in map.all_regulatory_elements().keys() {
        result.copy_regulatory_element_from(map, *id)?;
    }
    for id in map.all_polygons().keys() {
        result.copy_polygon_from(map, *id)?;
    }
    timer.note(format!(
        "Finalized map has {} of {} lanelets",
        result.all_lanelets().len(),
        map.all_lanelets().len()
    ));
    timer.stop("build the finalized map");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_util::Tags;
    use geom::Pt3D;
    use lanelet_map::{
        BoundRef, MapPolygon, Member, PolygonID, RegulatoryElement, RegulatoryElementID,
    };

    #[test]
    fn deleted_lanelets_and_their_own_geometry_are_dropped() {
        let mut map = LaneletMap::new();
        let mut line = |y: f64| {
            let pts = vec![
                map.add_point(Pt3D::new(0.0, y, 0.0), Tags::empty()),
                map.add_point(Pt3D::new(10.0, y, 0.0), Tags::empty()),
            ];
            map.add_curve(pts, Tags::empty()).unwrap()
        };
        let (a, b, c) = (line(0.0), line(3.0), line(6.0));
        let keep = map
            .add_lanelet(BoundRef::new(b), BoundRef::new(a), Tags::empty())
            .unwrap();
        let delete = map
            .add_lanelet(BoundRef::new(c), BoundRef::new(b), Tags::empty())
            .unwrap();
        let sign_pt = map.add_point(Pt3D::new(5.0, -2.0, 1.0), Tags::empty());
        map.insert_regulatory_element(RegulatoryElement {
            id: RegulatoryElementID(500),
            members: vec![
                ("refers".to_string(), Member::Point(sign_pt)),
                ("yield".to_string(), Member::Lanelet(keep)),
                ("right_of_way".to_string(), Member::Lanelet(delete)),
            ],
            tags: Tags::new(vec![("subtype", "right_of_way")]),
        });
        let corner = map.add_point(Pt3D::new(-5.0, -5.0, 0.0), Tags::empty());
        map.insert_polygon(MapPolygon {
            id: PolygonID(600),
            points: vec![corner, sign_pt],
            tags: Tags::empty(),
        });

        let deleted: BTreeSet<LaneletID> = vec![delete].into_iter().collect();
        let result = finalize_map(&map, &deleted, &mut Timer::throwaway()).unwrap();
        result.validate().unwrap();

        assert!(result.maybe_get_l(keep).is_some());
        assert!(result.maybe_get_l(delete).is_none());
        // Curve c only belonged to the deleted lanelet
        assert!(result.maybe_get_c(c).is_none());
        assert_eq!(result.all_curves().len(), 2);
        // 4 points from the kept lanelet, the sign, and the polygon corner
        assert_eq!(result.all_points().len(), 6);

        let re = &result.all_regulatory_elements()[&RegulatoryElementID(500)];
        assert_eq!(re.members.len(), 2);
        assert_eq!(result.all_polygons().len(), 1);
    }
}
