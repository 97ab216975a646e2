use super::centers::CenterRadiusLog;
use crate::diagnostics::TrackingTrace;
use crate::image::{LabelVolume, Volume, VolumeF32};
use crate::types::{Frame, Index3};
use std::collections::VecDeque;

/// One committed step of a branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchEntry {
    pub center: Index3,
    pub radius: f64,
    pub frame: Frame,
}

/// History of a single branch, newest entry first. Never empty.
#[derive(Clone, Debug)]
pub struct BranchState {
    entries: VecDeque<BranchEntry>,
}

impl BranchState {
    pub fn new(start: BranchEntry) -> Self {
        let mut entries = VecDeque::with_capacity(16);
        entries.push_front(start);
        Self { entries }
    }

    /// Number of entries, the starting entry included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn front(&self) -> &BranchEntry {
        &self.entries[0]
    }

    pub fn push_front(&mut self, entry: BranchEntry) {
        self.entries.push_front(entry);
    }

    pub fn radii(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.radius)
    }
}

/// State shared by every branch of one run.
#[derive(Clone, Debug)]
pub struct TrackingState {
    /// Output labels, zero where unlabelled
    pub labels: LabelVolume,
    /// Radii at centreline voxels, when requested
    pub centerline: Option<VolumeF32>,
    /// Voxels already claimed by a cross-section or bifurcation region
    pub written: Volume<bool>,
    pub log: CenterRadiusLog,
    pub trace: TrackingTrace,
    pub label: u16,
}

impl TrackingState {
    pub fn new(dims: [usize; 3], label: u16, generate_centerline: bool) -> Self {
        Self {
            labels: LabelVolume::new(dims),
            centerline: generate_centerline.then(|| VolumeF32::new(dims)),
            written: Volume::new(dims),
            log: CenterRadiusLog::new(),
            trace: TrackingTrace::default(),
            label,
        }
    }

    /// Labels `p` unless it already carries a label. Returns whether it wrote.
    #[inline]
    pub fn label_voxel(&mut self, p: Index3) -> bool {
        match self.labels.get(p) {
            Some(0) => self.labels.set(p, self.label),
            _ => false,
        }
    }

    /// Copies the non-zero voxels of `prior` into the labels.
    pub fn merge_prior(&mut self, prior: &LabelVolume) {
        for (dst, &src) in self.labels.data.iter_mut().zip(&prior.data) {
            if src != 0 {
                *dst = src;
            }
        }
    }
}
