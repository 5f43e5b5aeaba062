use pathfinding::prelude::bfs;

use crate::track_network::{SegmentId, TrackNetwork};

/// Breadth-first route over segment connectivity, fewest hops first.
///
/// Successors are the connecting candidates at both ends of a segment.
/// Returns `[start]` when `start == goal` and `None` when the goal is
/// unreachable or either id is unknown; callers fall back to snapping onto
/// the goal segment.
pub fn find_path(
    network: &TrackNetwork,
    start: SegmentId,
    goal: SegmentId,
) -> Option<Vec<SegmentId>> {
    network.segment(start)?;
    network.segment(goal)?;
    if start == goal {
        return Some(vec![start]);
    }
    bfs(&start, |id| network.neighbors(*id), |id| *id == goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::offset_m;
    use crate::test_harness::fixtures::*;

    #[test]
    fn test_path_to_self_is_single_element() {
        let network = chain_network(3);
        assert_eq!(
            find_path(&network, SegmentId(1), SegmentId(1)),
            Some(vec![SegmentId(1)])
        );
    }

    #[test]
    fn test_path_along_chain() {
        let network = chain_network(4);
        let path = find_path(&network, SegmentId(0), SegmentId(3)).unwrap();
        assert_eq!(
            path,
            vec![SegmentId(0), SegmentId(1), SegmentId(2), SegmentId(3)]
        );
    }

    #[test]
    fn test_path_backwards_along_chain() {
        let network = chain_network(3);
        let path = find_path(&network, SegmentId(2), SegmentId(0)).unwrap();
        assert_eq!(path, vec![SegmentId(2), SegmentId(1), SegmentId(0)]);
    }

    #[test]
    fn test_path_takes_fewest_hops_around_loop() {
        let network = loop_network();
        // 0 -> 3 is one hop across the shared corner, not three the long way.
        let path = find_path(&network, SegmentId(0), SegmentId(3)).unwrap();
        assert_eq!(path, vec![SegmentId(0), SegmentId(3)]);
        let path = find_path(&network, SegmentId(0), SegmentId(2)).unwrap();
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_path_none_when_disconnected() {
        let a = straight_segment(0, ORIGIN, 0.0, 500.0, 5);
        let b = straight_segment(1, offset_m(ORIGIN, 2_000.0, 0.0), 0.0, 500.0, 5);
        let network = network_from(vec![a, b]);
        assert_eq!(find_path(&network, SegmentId(0), SegmentId(1)), None);
    }

    #[test]
    fn test_path_none_for_unknown_ids() {
        let network = chain_network(2);
        assert_eq!(find_path(&network, SegmentId(0), SegmentId(99)), None);
        assert_eq!(find_path(&network, SegmentId(99), SegmentId(0)), None);
    }
}
