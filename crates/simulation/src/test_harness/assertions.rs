//! Assertion helpers for `TestSession` integration tests.

use std::collections::BTreeSet;

use crate::passengers::PassengerId;
use crate::track_network::SegmentId;

use super::TestSession;

impl TestSession {
    /// Assert some notification so far contained `needle`.
    pub fn assert_notified(&self, needle: &str) {
        let log = self.notifications();
        assert!(
            log.mentions(needle),
            "Expected a notification containing {needle:?}, journal: {:?}",
            log.journal.iter().map(|e| &e.text).collect::<Vec<_>>()
        );
    }

    pub fn assert_train_on(&self, segment: u32, index: usize) {
        let train = self.train();
        assert_eq!(
            (train.segment, train.path_index),
            (SegmentId(segment), index),
            "Expected train at segment {segment} index {index}"
        );
    }

    /// The standing invariants: valid path index, manifest within capacity,
    /// and every live passenger in exactly one place.
    pub fn assert_invariants(&self) {
        let train = self.train();
        let network = self.network();
        let segment = network
            .segment(train.segment)
            .unwrap_or_else(|| panic!("train on unknown segment {}", train.segment.0));
        assert!(
            train.path_index < segment.path.len(),
            "path index {} out of range ({} points)",
            train.path_index,
            segment.path.len()
        );
        assert!(
            train.manifest.len() <= train.capacity as usize,
            "manifest {} exceeds capacity {}",
            train.manifest.len(),
            train.capacity
        );

        let ledger = self.passengers();
        let waiting: BTreeSet<PassengerId> = ledger.waiting().iter().map(|p| p.id).collect();
        let riding: BTreeSet<PassengerId> = train.manifest.iter().map(|p| p.id).collect();
        assert_eq!(waiting.len(), ledger.waiting().len(), "duplicate waiting ids");
        assert_eq!(riding.len(), train.manifest.len(), "duplicate riding ids");
        assert!(
            waiting.is_disjoint(&riding),
            "passengers both waiting and riding: {:?}",
            waiting.intersection(&riding).collect::<Vec<_>>()
        );
        for id in waiting.iter().chain(riding.iter()) {
            assert!(!ledger.is_retired(*id), "retired passenger {} still live", id.0);
        }
    }
}
