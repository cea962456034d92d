use geom::Pt3D;

use crate::RouteSegment;

/// Where one tag changes value along a target route.
#[derive(Clone, Debug, PartialEq)]
pub struct TagChanges {
    pub key: String,
    /// The first point of every segment whose value differs from the segment before it
    pub points: Vec<Pt3D>,
    /// The value before any change, then the value after each change. Always one longer than
    /// `points`. A missing tag is the empty string.
    pub values: Vec<String>,
}

impl TagChanges {
    /// Scans a target route for changes of one key.
    pub fn detect(target: &[RouteSegment], key: &str) -> TagChanges {
        let mut current = target
            .first()
            .map(|seg| seg.tags.get_or_empty(key).to_string())
            .unwrap_or_default();
        let mut points = Vec::new();
        let mut values = vec![current.clone()];
        for seg in target.iter().skip(1) {
            let value = seg.tags.get_or_empty(key);
            if value != current {
                current = value.to_string();
                points.push(seg.first_pt());
                values.push(current.clone());
            }
        }
        TagChanges {
            key: key.to_string(),
            points,
            values,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.points.is_empty()
    }

    /// The values in the opposite order, for routes traced against each other. The change points
    /// stay as they are.
    pub fn reversed_values(&self) -> Vec<String> {
        let mut values = self.values.clone();
        values.reverse();
        values
    }
}

/// All change points across several keys, without duplicates, in the order first seen.
pub fn merge_points<'a, I: IntoIterator<Item = &'a TagChanges>>(changes: I) -> Vec<Pt3D> {
    let mut merged: Vec<Pt3D> = Vec::new();
    for change in changes {
        for pt in &change.points {
            if !merged.contains(pt) {
                merged.push(*pt);
            }
        }
    }
    merged
}

/// Which of `values` applies to reference segment `seg`, given the reference segment where each
/// change happens. Every change whose segment is at or before `seg` is considered, and the last
/// one listed wins.
pub fn active_value_idx(change_segments: &[usize], seg: usize) -> usize {
    let mut idx = 0;
    for (j, change) in change_segments.iter().enumerate() {
        if seg >= *change {
            idx = j + 1;
        }
    }
    idx
}
