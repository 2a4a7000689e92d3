use num_bigint::BigInt;

use crate::error::{PreconditionError, Result};

/// Tick spacing of a fee tier (fee in hundredths of a bip).
pub fn tick_spacing_for_fee(fee_pips: u32) -> std::result::Result<i32, PreconditionError> {
    match fee_pips {
        100 => Ok(1),
        500 => Ok(10),
        3_000 => Ok(60),
        10_000 => Ok(200),
        other => Err(PreconditionError::UnknownFeeTier(other)),
    }
}

/// Snapshot of the pool's global state, read-only for the duration of a swap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot0 {
    pub tick_spacing: i32,
    pub fee_pips: u32,
    pub liquidity: BigInt,
    pub fee_growth_global0_x128: BigInt,
    pub fee_growth_global1_x128: BigInt,
    // the current price
    pub sqrt_price_x96: BigInt,
    // the current tick
    pub tick_current: i32,
    // oracle bookkeeping, stored only
    pub observation_index: u16,
    pub observation_cardinality: u16,
    pub observation_cardinality_next: u16,
    /// Protocol fee denominators, token0 in the low nibble and token1 in the high one.
    pub fee_protocol: u8,
}

impl Slot0 {
    /// Builds a snapshot whose tick spacing follows the fee tier.
    pub fn new(
        fee_pips: u32,
        liquidity: BigInt,
        sqrt_price_x96: BigInt,
        tick_current: i32,
    ) -> std::result::Result<Self, PreconditionError> {
        Ok(Slot0 {
            tick_spacing: tick_spacing_for_fee(fee_pips)?,
            fee_pips,
            liquidity,
            sqrt_price_x96,
            tick_current,
            ..Default::default()
        })
    }

    pub fn with_fee_protocol(mut self, fee_protocol: u8) -> Self {
        self.fee_protocol = fee_protocol;
        self
    }

    pub fn with_fee_growth(mut self, global0_x128: BigInt, global1_x128: BigInt) -> Self {
        self.fee_growth_global0_x128 = global0_x128;
        self.fee_growth_global1_x128 = global1_x128;
        self
    }
}

/// Source of the pool state a swap runs against.
pub trait PoolStateProvider {
    fn current_state(&self) -> Result<Slot0>;
}

impl PoolStateProvider for Slot0 {
    fn current_state(&self) -> Result<Slot0> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_tiers_map_to_spacing() {
        assert_eq!(tick_spacing_for_fee(100), Ok(1));
        assert_eq!(tick_spacing_for_fee(500), Ok(10));
        assert_eq!(tick_spacing_for_fee(3_000), Ok(60));
        assert_eq!(tick_spacing_for_fee(10_000), Ok(200));
    }

    #[test]
    fn unknown_fee_tier_is_rejected() {
        assert_eq!(tick_spacing_for_fee(2_500), Err(PreconditionError::UnknownFeeTier(2_500)));
        assert!(Slot0::new(0, BigInt::from(1), BigInt::from(1), 0).is_err());
    }

    #[test]
    fn snapshot_is_returned_unchanged() {
        let slot0 = Slot0::new(3_000, BigInt::from(10_000), BigInt::from(1) << 96u32, 0)
            .unwrap()
            .with_fee_protocol(0x44);
        let state = slot0.current_state().unwrap();
        assert_eq!(state, slot0);
        assert_eq!(state.tick_spacing, 60);
        assert_eq!(state.fee_protocol, 0x44);
    }
}
