use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use fusion_util::{deserialize_btreemap, prettyprint_usize, serialize_btreemap, Tags};
use geom::{PolyLine, Pt3D};

use crate::{
    Area, AreaID, BoundRef, Curve, CurveID, Lanelet, LaneletID, MapPolygon, Member, Point,
    PointID, PolygonID, RegulatoryElement, RegulatoryElementID,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LaneletMap {
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    points: BTreeMap<PointID, Point>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    curves: BTreeMap<CurveID, Curve>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    lanelets: BTreeMap<LaneletID, Lanelet>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap",
        default
    )]
    areas: BTreeMap<AreaID, Area>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap",
        default
    )]
    regulatory_elements: BTreeMap<RegulatoryElementID, RegulatoryElement>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap",
        default
    )]
    polygons: BTreeMap<PolygonID, MapPolygon>,

    // Lazily recomputed after loading
    #[serde(skip)]
    next_id: Option<i64>,
}

impl LaneletMap {
    pub fn new() -> LaneletMap {
        LaneletMap::default()
    }

    pub fn load(path: &str) -> Result<LaneletMap> {
        let map: LaneletMap = fusion_util::read_json(path)?;
        map.validate()?;
        Ok(map)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        fusion_util::write_json(path, self)
    }

    /// Every reference resolves and every curve has at least two points.
    pub fn validate(&self) -> Result<()> {
        for c in self.curves.values() {
            if c.points.len() < 2 {
                bail!("{} only has {} points", c.id, c.points.len());
            }
            for pt in &c.points {
                if !self.points.contains_key(pt) {
                    bail!("{} refers to missing {}", c.id, pt);
                }
            }
        }
        for l in self.lanelets.values() {
            for bound in l.bounds() {
                if !self.curves.contains_key(&bound.curve) {
                    bail!("{} refers to missing {}", l.id, bound.curve);
                }
            }
        }
        for a in self.areas.values() {
            for bound in a.outer.iter().chain(a.inner.iter().flatten()) {
                if !self.curves.contains_key(&bound.curve) {
                    bail!("{} refers to missing {}", a.id, bound.curve);
                }
            }
        }
        for p in self.polygons.values() {
            for pt in &p.points {
                if !self.points.contains_key(pt) {
                    bail!("{} refers to missing {}", p.id, pt);
                }
            }
        }
        Ok(())
    }

    /// Allocates an ID larger than anything in any layer.
    pub fn new_id(&mut self) -> i64 {
        let id = match self.next_id {
            Some(id) => id,
            None => self.max_id() + 1,
        };
        self.next_id = Some(id + 1);
        id
    }

    fn max_id(&self) -> i64 {
        let mut max = 0;
        if let Some(id) = self.points.keys().next_back() {
            max = max.max(id.0);
        }
        if let Some(id) = self.curves.keys().next_back() {
            max = max.max(id.0);
        }
        if let Some(id) = self.lanelets.keys().next_back() {
            max = max.max(id.0);
        }
        if let Some(id) = self.areas.keys().next_back() {
            max = max.max(id.0);
        }
        if let Some(id) = self.regulatory_elements.keys().next_back() {
            max = max.max(id.0);
        }
        if let Some(id) = self.polygons.keys().next_back() {
            max = max.max(id.0);
        }
        max
    }

    fn bump_next_id(&mut self, used: i64) {
        if let Some(next) = self.next_id {
            if used >= next {
                self.next_id = Some(used + 1);
            }
        }
    }

    pub fn add_point(&mut self, pt: Pt3D, tags: Tags) -> PointID {
        let id = PointID(self.new_id());
        self.points.insert(id, Point { id, pt, tags });
        id
    }

    pub fn add_curve(&mut self, points: Vec<PointID>, tags: Tags) -> Result<CurveID> {
        let id = CurveID(self.new_id());
        self.insert_curve(Curve { id, points, tags })?;
        Ok(id)
    }

    pub fn add_lanelet(
        &mut self,
        left: BoundRef,
        right: BoundRef,
        tags: Tags,
    ) -> Result<LaneletID> {
        let id = LaneletID(self.new_id());
        self.insert_lanelet(Lanelet {
            id,
            left,
            right,
            tags,
        })?;
        Ok(id)
    }

    /// Inserts or overwrites a point, keeping its ID.
    pub fn insert_point(&mut self, point: Point) {
        self.bump_next_id(point.id.0);
        self.points.insert(point.id, point);
    }

    pub fn insert_curve(&mut self, curve: Curve) -> Result<()> {
        if curve.points.len() < 2 {
            bail!("{} needs at least two points", curve.id);
        }
        if let Some(pt) = curve.points.iter().find(|pt| !self.points.contains_key(pt)) {
            bail!("{} refers to missing {}", curve.id, pt);
        }
        self.bump_next_id(curve.id.0);
        self.curves.insert(curve.id, curve);
        Ok(())
    }

    pub fn insert_lanelet(&mut self, lanelet: Lanelet) -> Result<()> {
        for bound in lanelet.bounds() {
            if !self.curves.contains_key(&bound.curve) {
                bail!("{} refers to missing {}", lanelet.id, bound.curve);
            }
        }
        self.bump_next_id(lanelet.id.0);
        self.lanelets.insert(lanelet.id, lanelet);
        Ok(())
    }

    pub fn insert_area(&mut self, area: Area) {
        self.bump_next_id(area.id.0);
        self.areas.insert(area.id, area);
    }

    pub fn insert_regulatory_element(&mut self, re: RegulatoryElement) {
        self.bump_next_id(re.id.0);
        self.regulatory_elements.insert(re.id, re);
    }

    pub fn insert_polygon(&mut self, polygon: MapPolygon) {
        self.bump_next_id(polygon.id.0);
        self.polygons.insert(polygon.id, polygon);
    }

    pub fn all_points(&self) -> &BTreeMap<PointID, Point> {
        &self.points
    }

    pub fn all_curves(&self) -> &BTreeMap<CurveID, Curve> {
        &self.curves
    }

    pub fn all_lanelets(&self) -> &BTreeMap<LaneletID, Lanelet> {
        &self.lanelets
    }

    pub fn all_areas(&self) -> &BTreeMap<AreaID, Area> {
        &self.areas
    }

    pub fn all_regulatory_elements(&self) -> &BTreeMap<RegulatoryElementID, RegulatoryElement> {
        &self.regulatory_elements
    }

    pub fn all_polygons(&self) -> &BTreeMap<PolygonID, MapPolygon> {
        &self.polygons
    }

    pub fn mut_points(&mut self) -> impl Iterator<Item = &mut Point> {
        self.points.values_mut()
    }

    pub fn get_p(&self, id: PointID) -> &Point {
        &self.points[&id]
    }

    pub fn get_c(&self, id: CurveID) -> &Curve {
        &self.curves[&id]
    }

    pub fn get_l(&self, id: LaneletID) -> &Lanelet {
        &self.lanelets[&id]
    }

    pub fn maybe_get_p(&self, id: PointID) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn maybe_get_c(&self, id: CurveID) -> Option<&Curve> {
        self.curves.get(&id)
    }

    pub fn maybe_get_l(&self, id: LaneletID) -> Option<&Lanelet> {
        self.lanelets.get(&id)
    }

    pub fn maybe_get_a(&self, id: AreaID) -> Option<&Area> {
        self.areas.get(&id)
    }

    pub fn maybe_get_c_mut(&mut self, id: CurveID) -> Option<&mut Curve> {
        self.curves.get_mut(&id)
    }

    pub fn maybe_get_l_mut(&mut self, id: LaneletID) -> Option<&mut Lanelet> {
        self.lanelets.get_mut(&id)
    }

    /// The point IDs of a bound, in the direction the owner reads it.
    pub fn bound_point_ids(&self, bound: BoundRef) -> Option<Vec<PointID>> {
        let mut pts = self.curves.get(&bound.curve)?.points.clone();
        if bound.inverted {
            pts.reverse();
        }
        Some(pts)
    }

    pub fn bound_polyline(&self, bound: BoundRef) -> Result<PolyLine> {
        let ids = self
            .bound_point_ids(bound)
            .ok_or_else(|| anyhow!("missing {}", bound.curve))?;
        let mut pts = Vec::new();
        for id in ids {
            match self.points.get(&id) {
                Some(p) => pts.push(p.pt),
                None => bail!("{} refers to missing {}", bound.curve, id),
            }
        }
        PolyLine::new(pts)
    }

    fn bound_endpoints(&self, bound: BoundRef) -> Option<(PointID, PointID)> {
        let curve = self.curves.get(&bound.curve)?;
        let (first, last) = (curve.first_point(), curve.last_point());
        if bound.inverted {
            Some((last, first))
        } else {
            Some((first, last))
        }
    }

    /// True if `next` picks up exactly where `prev` ends: both bounds of `prev` end at the very
    /// points where the bounds of `next` start.
    pub fn follows(&self, prev: LaneletID, next: LaneletID) -> bool {
        let (prev, next) = match (self.lanelets.get(&prev), self.lanelets.get(&next)) {
            (Some(p), Some(n)) => (p, n),
            _ => return false,
        };
        let ends = |l: &Lanelet| -> Option<(PointID, PointID, PointID, PointID)> {
            let (left1, left2) = self.bound_endpoints(l.left)?;
            let (right1, right2) = self.bound_endpoints(l.right)?;
            Some((left1, left2, right1, right2))
        };
        match (ends(prev), ends(next)) {
            (Some((_, prev_left, _, prev_right)), Some((next_left, _, next_right, _))) => {
                prev_left == next_left && prev_right == next_right
            }
            _ => false,
        }
    }

    /// Any lanelet, other than `id` itself, leading into or out of `id`.
    pub fn has_neighbor_along(&self, id: LaneletID) -> bool {
        self.lanelets
            .keys()
            .filter(|other| **other != id)
            .any(|other| self.follows(*other, id) || self.follows(id, *other))
    }

    pub fn describe(&self) -> String {
        format!(
            "{} points, {} curves, {} lanelets, {} areas, {} regulatory elements, {} polygons",
            prettyprint_usize(self.points.len()),
            prettyprint_usize(self.curves.len()),
            prettyprint_usize(self.lanelets.len()),
            prettyprint_usize(self.areas.len()),
            prettyprint_usize(self.regulatory_elements.len()),
            prettyprint_usize(self.polygons.len()),
        )
    }

    /// Copies a lanelet and everything it stands on from another map, keeping all IDs.
    pub fn copy_lanelet_from(&mut self, src: &LaneletMap, id: LaneletID) -> Result<()> {
        let lanelet = src
            .maybe_get_l(id)
            .ok_or_else(|| anyhow!("can't copy missing {}", id))?;
        for bound in lanelet.bounds() {
            self.copy_curve_from(src, bound.curve)?;
        }
        self.insert_lanelet(lanelet.clone())
    }

    pub fn copy_curve_from(&mut self, src: &LaneletMap, id: CurveID) -> Result<()> {
        if self.curves.contains_key(&id) {
            return Ok(());
        }
        let curve = src
            .maybe_get_c(id)
            .ok_or_else(|| anyhow!("can't copy missing {}", id))?;
        for pt in &curve.points {
            self.copy_point_from(src, *pt)?;
        }
        self.insert_curve(curve.clone())
    }

    pub fn copy_point_from(&mut self, src: &LaneletMap, id: PointID) -> Result<()> {
        if self.points.contains_key(&id) {
            return Ok(());
        }
        let point = src
            .maybe_get_p(id)
            .ok_or_else(|| anyhow!("can't copy missing {}", id))?;
        self.insert_point(point.clone());
        Ok(())
    }

    pub fn copy_area_from(&mut self, src: &LaneletMap, id: AreaID) -> Result<()> {
        let area = src
            .maybe_get_a(id)
            .ok_or_else(|| anyhow!("can't copy missing {}", id))?;
        for bound in area.outer.iter().chain(area.inner.iter().flatten()) {
            self.copy_curve_from(src, bound.curve)?;
        }
        self.insert_area(area.clone());
        Ok(())
    }

    pub fn copy_polygon_from(&mut self, src: &LaneletMap, id: PolygonID) -> Result<()> {
        let polygon = src
            .polygons
            .get(&id)
            .ok_or_else(|| anyhow!("can't copy missing {}", id))?;
        for pt in &polygon.points {
            self.copy_point_from(src, *pt)?;
        }
        self.insert_polygon(polygon.clone());
        Ok(())
    }

    /// Copies a regulatory element and the primitives it refers to. Lanelet members must already
    /// be present in this map; ones that aren't are dropped from the copy, with a warning.
    pub fn copy_regulatory_element_from(
        &mut self,
        src: &LaneletMap,
        id: RegulatoryElementID,
    ) -> Result<()> {
        let mut re = src
            .regulatory_elements
            .get(&id)
            .ok_or_else(|| anyhow!("can't copy missing {}", id))?
            .clone();
        let mut members = Vec::new();
        for (role, member) in re.members.drain(..) {
            match member {
                Member::Point(pt) => self.copy_point_from(src, pt)?,
                Member::Curve(c) => self.copy_curve_from(src, c)?,
                Member::Area(a) => {
                    if !self.areas.contains_key(&a) {
                        self.copy_area_from(src, a)?;
                    }
                }
                Member::Lanelet(l) => {
                    if !self.lanelets.contains_key(&l) {
                        warn!("{} refers to {}, which isn't kept. Dropping that member.", id, l);
                        continue;
                    }
                }
            }
            members.push((role, member));
        }
        re.members = members;
        self.insert_regulatory_element(re);
        Ok(())
    }
}
