use derive_more::{Add, AddAssign, Display, From, Into, Sub};

/// A frame position, either global (across every clip of a folder) or local
/// to a single clip depending on where it came from.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Add,
    AddAssign,
    Sub,
    From,
    Into,
    Display,
)]
pub struct FrameNum(pub u64);

impl FrameNum {
    pub const ZERO: FrameNum = FrameNum(0);

    pub fn saturating_offset(self, delta: i64) -> Self {
        Self(self.0.saturating_add_signed(delta))
    }
}
