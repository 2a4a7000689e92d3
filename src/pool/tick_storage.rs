use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::PreconditionError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};

/// One tick record as supplied by the data source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub index: i32,
    pub liquidity_gross: BigInt,
    pub liquidity_net: BigInt, // signed
    pub fee_growth_outside0_x128: BigInt,
    pub fee_growth_outside1_x128: BigInt,
}

impl Tick {
    pub fn new(index: i32, liquidity_gross: BigInt, liquidity_net: BigInt) -> Self {
        Tick {
            index,
            liquidity_gross,
            liquidity_net,
            ..Default::default()
        }
    }
}

/// Read access to the initialized ticks of a pool.
pub trait TickReader {
    fn is_initialized(&self, tick: i32) -> bool;

    /// Next initialized tick from `tick` in the swap direction, or the tick bound with its own
    /// initialized flag when nothing is found.
    fn next_initialized_tick(&self, tick: i32, zero_for_one: bool) -> (i32, bool);

    /// Signed liquidity delta at exactly `tick`, `None` when there is no record.
    fn get_liquidity_net(&self, tick: i32) -> Option<BigInt>;
}

/// Ticks keyed by index. Records off the spacing grid are kept but never count as initialized.
#[derive(Clone, Debug)]
pub struct TickStorage {
    ticks: BTreeMap<i32, Tick>,
    tick_spacing: i32,
}

impl TickStorage {
    pub fn new<I>(ticks: I, tick_spacing: i32) -> Result<Self, PreconditionError>
    where
        I: IntoIterator<Item = Tick>,
    {
        if tick_spacing <= 0 {
            return Err(PreconditionError::InvalidTickSpacing(tick_spacing));
        }
        let ticks = ticks.into_iter().map(|t| (t.index, t)).collect();
        Ok(TickStorage { ticks, tick_spacing })
    }

    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn get(&self, tick: i32) -> Option<&Tick> {
        self.ticks.get(&tick)
    }

    fn first_initialized<'a>(&self, mut candidates: impl Iterator<Item = (&'a i32, &'a Tick)>) -> Option<i32> {
        candidates
            .find(|(index, _)| self.is_initialized(**index))
            .map(|(index, _)| *index)
    }
}

impl TickReader for TickStorage {
    fn is_initialized(&self, tick: i32) -> bool {
        match self.ticks.get(&tick) {
            Some(record) => !record.liquidity_gross.is_zero() && tick % self.tick_spacing == 0,
            None => false,
        }
    }

    fn next_initialized_tick(&self, tick: i32, zero_for_one: bool) -> (i32, bool) {
        // compressed tick, rounded toward negative infinity
        let aligned = tick.div_euclid(self.tick_spacing) * self.tick_spacing;

        let found = if zero_for_one {
            let upper = aligned.min(MAX_TICK);
            if upper < MIN_TICK {
                None
            } else {
                self.first_initialized(self.ticks.range(MIN_TICK..=upper).rev())
            }
        } else {
            let lower = aligned.saturating_add(self.tick_spacing).max(MIN_TICK);
            if lower > MAX_TICK {
                None
            } else {
                self.first_initialized(self.ticks.range(lower..=MAX_TICK))
            }
        };

        match found {
            Some(next) => (next, true),
            None => {
                let bound = if zero_for_one { MIN_TICK } else { MAX_TICK };
                (bound, self.is_initialized(bound))
            }
        }
    }

    fn get_liquidity_net(&self, tick: i32) -> Option<BigInt> {
        self.ticks.get(&tick).map(|t| t.liquidity_net.clone())
    }
}
