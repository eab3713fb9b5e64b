use super::FrameNum;

/// Half-open range of frames, `from..to_excl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub from: FrameNum,
    pub to_excl: FrameNum,
}

impl FrameSpan {
    pub fn starting_at(from: FrameNum, len: u64) -> Self {
        Self {
            from,
            to_excl: FrameNum(from.0 + len),
        }
    }

    pub fn contains(&self, frame: FrameNum) -> bool {
        self.from <= frame && frame < self.to_excl
    }
}
