//! Detector pairing topology.
//!
//! The imaging array's 32 detectors are wired as 16 two-detector trigger
//! groups. Both members of a group share one trigger line, so trigger
//! accumulators are telemetered per group in a fixed order, and the two
//! detectors of a pair share one live-time ratio.

use crate::error::{Error, Result};
use crate::{N_DETECTORS, N_TRIGGER_GROUPS};

/// A pair of detector indices sharing one trigger line.
pub type DetectorGroup = (usize, usize);

/// Trigger-group pairing of the flight detector layout.
///
/// The order matches the group axis of telemetered trigger accumulators.
pub const TRIGGER_GROUPS: [DetectorGroup; N_TRIGGER_GROUPS] = [
    (0, 1),
    (5, 6),
    (4, 10),
    (11, 12),
    (13, 14),
    (9, 15),
    (7, 8),
    (2, 3),
    (30, 31),
    (25, 26),
    (21, 27),
    (19, 20),
    (17, 18),
    (16, 22),
    (23, 24),
    (28, 29),
];

/// Fixed pairing of the 32 detectors into 16 trigger groups.
///
/// The groups partition the detector indices exactly: every detector
/// appears in exactly one group, and the derived sibling map is involutive
/// with no fixed points. Custom pairings are checked against these
/// invariants once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorTopology {
    groups: Vec<DetectorGroup>,
    siblings: [usize; N_DETECTORS],
}

impl DetectorTopology {
    /// Build a topology from an ordered list of detector pairs.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTopology`] if the pairs do not partition the
    /// 32 detector indices, contain a self-pairing, or are not exactly
    /// [`N_TRIGGER_GROUPS`] many.
    pub fn new(groups: &[DetectorGroup]) -> Result<Self> {
        if groups.len() != N_TRIGGER_GROUPS {
            return Err(Error::InvalidTopology(format!(
                "expected {N_TRIGGER_GROUPS} trigger groups, got {}",
                groups.len()
            )));
        }

        let mut siblings = [usize::MAX; N_DETECTORS];
        for &(det1, det2) in groups {
            if det1 >= N_DETECTORS || det2 >= N_DETECTORS {
                return Err(Error::InvalidTopology(format!(
                    "detector pair ({det1}, {det2}) outside 0..{N_DETECTORS}"
                )));
            }
            if det1 == det2 {
                return Err(Error::InvalidTopology(format!(
                    "detector {det1} paired with itself"
                )));
            }
            if siblings[det1] != usize::MAX || siblings[det2] != usize::MAX {
                return Err(Error::InvalidTopology(format!(
                    "detector pair ({det1}, {det2}) overlaps another group"
                )));
            }
            siblings[det1] = det2;
            siblings[det2] = det1;
        }
        // 16 disjoint pairs over 32 indices leave no gap, but keep the
        // check explicit so a partial assignment can never slip through.
        if let Some(missing) = siblings.iter().position(|&s| s == usize::MAX) {
            return Err(Error::InvalidTopology(format!(
                "detector {missing} not covered by any group"
            )));
        }

        Ok(Self {
            groups: groups.to_vec(),
            siblings,
        })
    }

    /// The flight detector pairing.
    #[must_use]
    pub fn flight() -> Self {
        // TRIGGER_GROUPS satisfies the partition invariants; asserted in tests.
        let mut siblings = [0usize; N_DETECTORS];
        for &(det1, det2) in &TRIGGER_GROUPS {
            siblings[det1] = det2;
            siblings[det2] = det1;
        }
        Self {
            groups: TRIGGER_GROUPS.to_vec(),
            siblings,
        }
    }

    /// The detector pairs in trigger-accumulator order.
    #[must_use]
    pub fn groups(&self) -> &[DetectorGroup] {
        &self.groups
    }

    /// Number of trigger groups.
    #[must_use]
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// The dead-time partner of `detector`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDetectorIndex`] if `detector` is outside
    /// 0..[`N_DETECTORS`].
    pub fn sibling(&self, detector: usize) -> Result<usize> {
        self.siblings
            .get(detector)
            .copied()
            .ok_or(Error::InvalidDetectorIndex(detector))
    }
}

impl Default for DetectorTopology {
    fn default() -> Self {
        Self::flight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_pairing_partitions_detectors() {
        let topology = DetectorTopology::flight();
        assert_eq!(topology.n_groups(), N_TRIGGER_GROUPS);

        let mut seen = [0usize; N_DETECTORS];
        for &(det1, det2) in topology.groups() {
            seen[det1] += 1;
            seen[det2] += 1;
        }
        for (detector, &count) in seen.iter().enumerate() {
            assert_eq!(count, 1, "detector {detector} appears {count} times");
        }
    }

    #[test]
    fn test_sibling_map_is_involutive() {
        let topology = DetectorTopology::flight();
        for detector in 0..N_DETECTORS {
            let sibling = topology.sibling(detector).unwrap();
            assert_ne!(sibling, detector);
            assert_eq!(topology.sibling(sibling).unwrap(), detector);
        }
    }

    #[test]
    fn test_group_order_is_stable() {
        let topology = DetectorTopology::flight();
        assert_eq!(topology.groups()[0], (0, 1));
        assert_eq!(topology.groups()[2], (4, 10));
        assert_eq!(topology.groups()[15], (28, 29));
    }

    #[test]
    fn test_sibling_rejects_out_of_range_index() {
        let topology = DetectorTopology::flight();
        assert!(matches!(
            topology.sibling(N_DETECTORS),
            Err(Error::InvalidDetectorIndex(32))
        ));
    }

    #[test]
    fn test_custom_pairing() {
        let pairs: Vec<DetectorGroup> = (0..N_TRIGGER_GROUPS).map(|g| (2 * g, 2 * g + 1)).collect();
        let topology = DetectorTopology::new(&pairs).unwrap();
        assert_eq!(topology.sibling(2).unwrap(), 3);
        assert_eq!(topology.sibling(3).unwrap(), 2);
    }

    #[test]
    fn test_rejects_wrong_group_count() {
        assert!(matches!(
            DetectorTopology::new(&[(0, 1)]),
            Err(Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_rejects_self_pairing() {
        let mut pairs: Vec<DetectorGroup> =
            (0..N_TRIGGER_GROUPS).map(|g| (2 * g, 2 * g + 1)).collect();
        pairs[4] = (8, 8);
        assert!(matches!(
            DetectorTopology::new(&pairs),
            Err(Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_rejects_overlapping_pairs() {
        let mut pairs: Vec<DetectorGroup> =
            (0..N_TRIGGER_GROUPS).map(|g| (2 * g, 2 * g + 1)).collect();
        pairs[15] = (0, 31);
        assert!(matches!(
            DetectorTopology::new(&pairs),
            Err(Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_pair() {
        let mut pairs: Vec<DetectorGroup> =
            (0..N_TRIGGER_GROUPS).map(|g| (2 * g, 2 * g + 1)).collect();
        pairs[0] = (0, 32);
        assert!(matches!(
            DetectorTopology::new(&pairs),
            Err(Error::InvalidTopology(_))
        ));
    }
}
