//! Test fixtures for common arena team layouts
//!
//! Slots are in alliance station order: Red1, Red2, Red3, Blue1, Blue2, Blue3.

/// Six team slots, `None` for an unpopulated station
pub type SlotFixture = [Option<u32>; 6];

/// A full field of six teams
pub fn full_field() -> SlotFixture {
    [Some(254), Some(1114), Some(2056), Some(148), Some(1678), Some(118)]
}

/// Every station empty
pub fn empty_field() -> SlotFixture {
    [None; 6]
}

/// Blue2 left empty, the rest populated
pub fn blue2_missing() -> SlotFixture {
    [Some(101), Some(102), Some(103), Some(104), None, Some(106)]
}

/// Only the red alliance is present
pub fn red_alliance_only() -> SlotFixture {
    [Some(971), Some(973), Some(604), None, None, None]
}

/// Team numbers from one through five digits, for addressing coverage
pub fn mixed_digit_counts() -> SlotFixture {
    [Some(7), Some(42), Some(254), Some(1678), Some(12345), None]
}

/// Populated team numbers of `slots` in station order
pub fn populated(slots: &SlotFixture) -> Vec<u32> {
    slots.iter().flatten().copied().filter(|&t| t != 0).collect()
}
