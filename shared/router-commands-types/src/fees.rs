/// Tick spacing used when a fee has no entry in the lookup table.
pub const DEFAULT_TICK_SPACING: i32 = 10;

/// Pool fee tiers offered by the swap form (hundredths of a basis point).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FeeTier {
    /// 0.05%
    Low,
    /// 0.3%
    #[default]
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Low, FeeTier::Medium, FeeTier::High];

    pub fn fee(self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10_000,
        }
    }

    pub fn from_fee(fee: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.fee() == fee)
    }

    /// Unknown fees resolve to the 0.3% tier.
    pub fn from_fee_or_default(fee: u32) -> Self {
        Self::from_fee(fee).unwrap_or_default()
    }

    pub fn tick_spacing(self) -> i32 {
        tick_spacing_for_fee(self.fee())
    }
}

/// Fee → tick spacing, `{100: 1, 500: 10, 3000: 60, 10000: 200}`, else [`DEFAULT_TICK_SPACING`].
pub fn tick_spacing_for_fee(fee: u32) -> i32 {
    match fee {
        100 => 1,
        500 => 10,
        3000 => 60,
        10_000 => 200,
        _ => DEFAULT_TICK_SPACING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_tier_spacing_is_sixty() {
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(tick_spacing_for_fee(3000), 60);
    }

    #[test]
    fn unknown_fee_spacing_defaults() {
        assert_eq!(tick_spacing_for_fee(2500), DEFAULT_TICK_SPACING);
        assert_eq!(tick_spacing_for_fee(0), 10);
    }

    #[test]
    fn unknown_fee_tier_resolves_to_medium() {
        assert_eq!(FeeTier::from_fee(123), None);
        assert_eq!(FeeTier::from_fee_or_default(123), FeeTier::Medium);
        assert_eq!(FeeTier::from_fee(10_000), Some(FeeTier::High));
    }
}
