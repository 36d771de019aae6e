//! Path manager: records per-label reconstructible paths as a registry of
//! opaque segment ids, sidestepping the cyclic-ownership issue of a label
//! holding a back-pointer to its own ancestor label.

use hashbrown::HashMap;

use crate::label::{Label, PathToken};

/// Tag on a recorded path segment, naming which kind of step produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Walking,
    CyclingWalking,
    DrivingWalking,
    PublicTransport,
}

/// A single recorded segment: the step that produced it, its raw tokens, and
/// optional metadata (the label's `values`/`hidden_values` at segment end,
/// used for diagnostics/serialisation).
#[derive(Debug, Clone)]
pub struct Segment {
    pub path_type: PathType,
    pub tokens: Vec<PathToken>,
    pub meta: Option<SegmentMeta>,
}

#[derive(Debug, Clone)]
pub struct SegmentMeta {
    pub values: Vec<i64>,
    pub hidden_values: Vec<i64>,
}

/// A public-transport segment decodes to `(start_stop, trip_id, end_stop)`
/// rather than a node sequence. `values`/`hidden_values` are the label's
/// cumulative vectors at the moment the leg ended, the same bookkeeping
/// [`SegmentMeta`] carries for mobility segments, so a caller can compute a
/// leg's own travel time as the delta against the previous leg's end values
/// without caring which kind of segment it is.
#[derive(Debug, Clone, PartialEq)]
pub struct GtfsPath {
    pub start_stop_id: String,
    pub trip_id: String,
    pub end_stop_id: String,
    pub values: Vec<i64>,
    pub hidden_values: Vec<i64>,
}

/// One leg of a reconstructed journey, covering both kinds of segment a
/// [`PathManager`] can hold.
#[derive(Debug, Clone)]
pub enum ReconstructedLeg<'a> {
    Mobility(&'a Segment),
    Transit(&'a GtfsPath),
}

impl<'a> ReconstructedLeg<'a> {
    /// The label's cumulative `values` at the end of this leg, used to
    /// compute the leg's own travel time as a delta against the previous
    /// leg's end values (or the journey's start time, for the first leg).
    pub fn end_values(&self) -> &[i64] {
        match self {
            ReconstructedLeg::Mobility(segment) => segment
                .meta
                .as_ref()
                .map(|meta| meta.values.as_slice())
                .unwrap_or(&[]),
            ReconstructedLeg::Transit(path) => &path.values,
        }
    }
}

/// Owns the segment registry. Shared-mutable only under the orchestrator's
/// single-threaded sequential schedule: no locks, one `&mut` handle threaded
/// through each step in turn.
#[derive(Debug, Default)]
pub struct PathManager {
    segments: HashMap<u32, Segment>,
    gtfs_segments: HashMap<u32, GtfsPath>,
    next_id: u32,
}

impl PathManager {
    pub fn new() -> Self {
        PathManager::default()
    }

    fn add_segment(&mut self, segment: Segment) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.segments.insert(id, segment);
        id
    }

    /// For every label in `bags`, slices the tokens accumulated since
    /// `path_index_offset`, records them as a new segment tagged
    /// `path_type`, and rewrites the label's path as the prior prefix plus
    /// the newly allocated segment id.
    pub fn extract_all_paths_from_bags(
        &mut self,
        bags: &mut HashMap<usize, crate::label::Bag>,
        path_type: PathType,
        path_index_offset: usize,
    ) {
        for bag in bags.values_mut() {
            *bag = bag.map_labels(|label| self.extract_path_from_label(label, path_type, path_index_offset));
        }
    }

    pub fn extract_path_from_label(
        &mut self,
        label: &Label,
        path_type: PathType,
        path_index_offset: usize,
    ) -> Label {
        if label.path.len() <= path_index_offset {
            return label.clone();
        }
        let prefix: Vec<PathToken> = label.path[..path_index_offset].to_vec();
        let new_tokens: Vec<PathToken> = label.path[path_index_offset..].to_vec();

        let id = self.add_segment(Segment {
            path_type,
            tokens: new_tokens,
            meta: Some(SegmentMeta {
                values: label.values.clone(),
                hidden_values: label.hidden_values.clone(),
            }),
        });

        let mut rewritten = label.clone();
        rewritten.path = prefix;
        rewritten.path.push(PathToken::Segment(id));
        rewritten
    }

    /// Follows a label's segment ids back into their token lists, in order,
    /// covering both mobility segments and public-transport legs (the two
    /// kinds a single `next_id` counter hands out ids to).
    pub fn reconstruct(&self, label: &Label) -> Vec<ReconstructedLeg<'_>> {
        label
            .path
            .iter()
            .filter_map(|token| match token {
                PathToken::Segment(id) => self
                    .segments
                    .get(id)
                    .map(ReconstructedLeg::Mobility)
                    .or_else(|| self.gtfs_segments.get(id).map(ReconstructedLeg::Transit)),
                PathToken::Node(_) => None,
            })
            .collect()
    }

    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Records a public-transport leg, which decodes to `(start_stop,
    /// trip_id, end_stop)` rather than a node-id token sequence, and returns
    /// the segment id to embed in the label's `path`.
    pub fn add_gtfs_segment(&mut self, path: GtfsPath) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.gtfs_segments.insert(id, path);
        id
    }

    pub fn gtfs_segment(&self, id: u32) -> Option<&GtfsPath> {
        self.gtfs_segments.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    #[test]
    fn extract_path_from_label_slices_and_rewrites() {
        let mut manager = PathManager::new();
        let mut label = Label::new(vec![100], vec![], 3);
        label.path = vec![
            PathToken::Node(0),
            PathToken::Node(1),
            PathToken::Node(2),
            PathToken::Node(3),
        ];

        let rewritten = manager.extract_path_from_label(&label, PathType::Walking, 1);
        assert_eq!(rewritten.path.len(), 2); // [Node(0), Segment(0)]
        assert_eq!(rewritten.path[0], PathToken::Node(0));
        match rewritten.path[1] {
            PathToken::Segment(id) => {
                let segment = manager.segment(id).unwrap();
                assert_eq!(segment.tokens.len(), 3);
            }
            _ => panic!("expected a segment token"),
        }
    }

    #[test]
    fn reconstruct_covers_both_mobility_and_transit_legs() {
        let mut manager = PathManager::new();
        let mut label = Label::new(vec![400, 0], vec![], 3);
        label.path = vec![PathToken::Node(0), PathToken::Node(1)];
        let walked = manager.extract_path_from_label(&label, PathType::Walking, 0);

        let mut label = walked;
        let transit_id = manager.add_gtfs_segment(GtfsPath {
            start_stop_id: "818".into(),
            trip_id: "T16".into(),
            end_stop_id: "317".into(),
            values: vec![700, 0],
            hidden_values: vec![],
        });
        label.path.push(PathToken::Segment(transit_id));

        let legs = manager.reconstruct(&label);
        assert_eq!(legs.len(), 2);
        assert!(matches!(legs[0], ReconstructedLeg::Mobility(_)));
        assert_eq!(legs[0].end_values(), &[400, 0]);
        assert!(matches!(legs[1], ReconstructedLeg::Transit(_)));
        assert_eq!(legs[1].end_values(), &[700, 0]);
    }
}
