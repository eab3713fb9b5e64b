use super::{CatalogError, ClipInfo, ClipProbe, FrameNum, FrameSpan};

/// Where a global frame lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPosition {
    pub clip: usize,
    pub local: FrameNum,
}

/// Every clip of a folder laid end to end in one frame counter.
///
/// Clip spans are contiguous and gapless: clip `i + 1` starts where clip `i`
/// ends. Zero-frame clips are kept so they still show up in listings, but
/// they own no frames.
#[derive(Debug, Clone, Default)]
pub struct ClipIndex {
    clips: Vec<ClipInfo>,
    total_frames: u64,
    total_secs: f64,
}

impl ClipIndex {
    pub fn build(probes: impl IntoIterator<Item = ClipProbe>) -> Result<Self, CatalogError> {
        let mut clips = Vec::new();
        let mut start_frame = FrameNum::ZERO;
        let mut start_secs = 0.0;

        for probe in probes {
            let duration = probe.duration_secs();
            let frame_count = probe.frame_count;
            clips.push(ClipInfo {
                path: probe.path,
                rate: probe.rate,
                frame_count,
                width: probe.width,
                height: probe.height,
                start_frame,
                start_secs,
            });
            start_frame += FrameNum(frame_count);
            start_secs += duration;
        }

        if start_frame == FrameNum::ZERO {
            return Err(CatalogError::NoFrames);
        }

        Ok(Self {
            clips,
            total_frames: start_frame.0,
            total_secs: start_secs,
        })
    }

    pub fn clip(&self, idx: usize) -> Option<&ClipInfo> {
        self.clips.get(idx)
    }

    /// Number of clips, including zero-frame ones.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// `false` only for the default, unloaded index.
    pub fn has_frames(&self) -> bool {
        self.total_frames > 0
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    pub fn last_frame(&self) -> FrameNum {
        FrameNum(self.total_frames.saturating_sub(1))
    }

    pub fn clamp(&self, frame: FrameNum) -> FrameNum {
        frame.min(self.last_frame())
    }

    /// Maps a global frame to its clip and local frame. Out-of-range input
    /// is clamped to the last frame first.
    pub fn locate(&self, frame: FrameNum) -> ClipPosition {
        let frame = self.clamp(frame);
        for (clip, info) in self.clips.iter().enumerate() {
            let span = info.span();
            if span.contains(frame) {
                return ClipPosition {
                    clip,
                    local: frame - span.from,
                };
            }
        }

        let clip = self.clips.len().saturating_sub(1);
        let local = self
            .clips
            .last()
            .map(|c| FrameNum(c.frame_count.saturating_sub(1)))
            .unwrap_or_default();
        ClipPosition { clip, local }
    }

    pub fn clip_span(&self, idx: usize) -> Option<FrameSpan> {
        self.clips.get(idx).map(ClipInfo::span)
    }

    /// First global frame after clip `idx`, `None` past the last clip.
    pub fn next_clip_start(&self, idx: usize) -> Option<FrameNum> {
        let next = self.clip_span(idx)?.to_excl;
        (next.0 < self.total_frames).then_some(next)
    }

    /// Presentation time of a global frame, in seconds since the first clip.
    pub fn time_at(&self, frame: FrameNum) -> f64 {
        let pos = self.locate(frame);
        match self.clips.get(pos.clip) {
            Some(info) => info.start_secs + pos.local.0 as f64 / info.fps().max(1.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ClipRate;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn probe(name: &str, frames: u64, fps: i32) -> ClipProbe {
        ClipProbe {
            path: PathBuf::from(name),
            rate: ClipRate::new(fps, 1),
            frame_count: frames,
            width: 1920,
            height: 1080,
        }
    }

    fn index() -> ClipIndex {
        ClipIndex::build([probe("a.mp4", 10, 30), probe("b.mp4", 5, 25), probe("c.mp4", 3, 60)])
            .unwrap()
    }

    fn pos(clip: usize, local: u64) -> ClipPosition {
        ClipPosition {
            clip,
            local: FrameNum(local),
        }
    }

    #[test]
    fn totals() {
        let idx = index();
        assert_eq!(idx.total_frames(), 18);
        assert_eq!(idx.clip_count(), 3);
        let expected = 10.0 / 30.0 + 5.0 / 25.0 + 3.0 / 60.0;
        assert!((idx.total_secs() - expected).abs() < 1e-9);
    }

    #[test]
    fn spans_are_gapless() {
        let idx = index();
        let spans: Vec<_> = (0..idx.clip_count()).map(|i| idx.clip_span(i).unwrap()).collect();
        assert_eq!(spans[0].from, FrameNum(0));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].to_excl, pair[1].from);
        }
        assert_eq!(spans[2].to_excl, FrameNum(idx.total_frames()));
    }

    #[test]
    fn locate_at_every_boundary() {
        let idx = index();
        assert_eq!(idx.locate(FrameNum(0)), pos(0, 0));
        assert_eq!(idx.locate(FrameNum(9)), pos(0, 9));
        assert_eq!(idx.locate(FrameNum(10)), pos(1, 0));
        assert_eq!(idx.locate(FrameNum(14)), pos(1, 4));
        assert_eq!(idx.locate(FrameNum(15)), pos(2, 0));
        assert_eq!(idx.locate(FrameNum(17)), pos(2, 2));
    }

    #[test]
    fn locate_clamps_out_of_range() {
        let idx = index();
        assert_eq!(idx.locate(FrameNum(18)), pos(2, 2));
        assert_eq!(idx.locate(FrameNum(u64::MAX)), pos(2, 2));
    }

    #[test]
    fn every_frame_lands_inside_its_clip() {
        let idx = index();
        for g in 0..idx.total_frames() {
            let pos = idx.locate(FrameNum(g));
            let span = idx.clip_span(pos.clip).unwrap();
            assert!(span.contains(FrameNum(g)));
            assert_eq!(span.from + pos.local, FrameNum(g));
        }
    }

    #[test]
    fn unloaded_index_has_no_frames() {
        let idx = ClipIndex::default();
        assert!(!idx.has_frames());
        assert_eq!(idx.clip_count(), 0);
        assert!(index().has_frames());
    }

    #[test]
    fn zero_frame_clips_own_nothing() {
        let idx = ClipIndex::build([
            probe("a.mp4", 4, 30),
            probe("broken.mp4", 0, 30),
            probe("c.mp4", 4, 30),
        ])
        .unwrap();
        assert_eq!(idx.clip_count(), 3);
        assert_eq!(idx.locate(FrameNum(3)), pos(0, 3));
        assert_eq!(idx.locate(FrameNum(4)), pos(2, 0));
        assert_eq!(idx.next_clip_start(0), Some(FrameNum(4)));
        assert_eq!(idx.next_clip_start(2), None);
    }

    #[test]
    fn no_frames_is_an_error() {
        let err = ClipIndex::build([probe("a.mp4", 0, 30)]).unwrap_err();
        assert!(matches!(err, CatalogError::NoFrames));
        assert!(matches!(
            ClipIndex::build(Vec::new()),
            Err(CatalogError::NoFrames)
        ));
    }

    #[test]
    fn time_uses_clip_rate() {
        let idx = index();
        assert_eq!(idx.time_at(FrameNum(0)), 0.0);
        let t = idx.time_at(FrameNum(12));
        assert!((t - (10.0 / 30.0 + 2.0 / 25.0)).abs() < 1e-9);
    }
}
