// ------------------------------- Swap engine -------------------------------
//
// Runs one swap against a pool snapshot and a tick index. Nothing is written back: the
// snapshot and the ticks are borrowed read-only, all mutable state lives in SwapState.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, PreconditionError, Result};
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK,
};
use crate::pool::slot0::{PoolStateProvider, Slot0};
use crate::pool::tick_storage::TickReader;

// ------------------------------- Data types ----------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapDirection { ZeroForOne, OneForZero }

impl SwapDirection {
    pub fn zero_for_one(self) -> bool {
        matches!(self, SwapDirection::ZeroForOne)
    }

    /// Default price limit, one unit inside the valid sqrt price interval.
    pub fn default_limit(self) -> BigInt {
        match self {
            SwapDirection::ZeroForOne => &*MIN_SQRT_RATIO + BigInt::one(),
            SwapDirection::OneForZero => &*MAX_SQRT_RATIO - BigInt::one(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SwapParams {
    pub direction: SwapDirection,
    /// Positive for exact input, negative for exact output.
    pub amount_specified: BigInt,
    /// `None` or zero selects the direction's default limit.
    pub sqrt_price_limit_x96: Option<BigInt>,
}

impl SwapParams {
    pub fn exact_input(direction: SwapDirection, amount_in: BigInt) -> Self {
        SwapParams { direction, amount_specified: amount_in.abs(), sqrt_price_limit_x96: None }
    }

    pub fn exact_output(direction: SwapDirection, amount_out: BigInt) -> Self {
        SwapParams { direction, amount_specified: -amount_out.abs(), sqrt_price_limit_x96: None }
    }

    pub fn with_limit(mut self, sqrt_price_limit_x96: BigInt) -> Self {
        self.sqrt_price_limit_x96 = Some(sqrt_price_limit_x96);
        self
    }

    fn resolved_limit(&self) -> BigInt {
        match &self.sqrt_price_limit_x96 {
            Some(limit) if !limit.is_zero() => limit.clone(),
            _ => self.direction.default_limit(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapResult {
    pub amount0: BigInt,        // pool balance delta, negative when paid out
    pub amount1: BigInt,        // pool balance delta, negative when paid out
    pub fee_total: BigInt,      // sum of step fees, protocol share included
    pub sqrt_price_x96: BigInt,
    pub tick: i32,
    pub liquidity: BigInt,
    pub steps: usize,
    pub crossed_ticks: usize,
}

// Derived once per swap.
#[derive(Clone, Debug)]
#[allow(dead_code)]
struct SwapCache {
    // protocol fee denominator for the input token
    fee_protocol: u8,
    liquidity_start: BigInt,
    // oracle accumulators, never computed off-chain
    tick_cumulative: i64,
    seconds_per_liquidity_cumulative_x128: BigInt,
    computed_latest_observation: bool,
}

impl SwapCache {
    fn new(zero_for_one: bool, slot0: &Slot0) -> Self {
        let fee_protocol = if zero_for_one { slot0.fee_protocol % 16 } else { slot0.fee_protocol >> 4 };
        SwapCache {
            fee_protocol,
            liquidity_start: slot0.liquidity.clone(),
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: BigInt::zero(),
            computed_latest_observation: false,
        }
    }
}

#[derive(Clone, Debug)]
#[allow(dead_code)]
struct SwapState {
    amount_specified_remaining: BigInt,
    amount_calculated: BigInt,
    sqrt_price_x96: BigInt,
    tick: i32,
    fee_growth_global_x128: BigInt,
    // input token paid as protocol fee, kept internal
    protocol_fee: BigInt,
    liquidity: BigInt,
}

#[derive(Clone, Debug, Default)]
struct StepComputations {
    sqrt_price_start_x96: BigInt,
    tick_next: i32,
    initialized: bool,
    sqrt_price_next_x96: BigInt,
    amount_in: BigInt,
    amount_out: BigInt,
    fee_amount: BigInt,
}

impl SwapState {
    fn new(amount_specified: &BigInt, slot0: &Slot0, cache: &SwapCache) -> Self {
        SwapState {
            amount_specified_remaining: amount_specified.clone(),
            amount_calculated: BigInt::zero(),
            sqrt_price_x96: slot0.sqrt_price_x96.clone(),
            tick: slot0.tick_current,
            fee_growth_global_x128: BigInt::zero(),
            protocol_fee: BigInt::zero(),
            liquidity: cache.liquidity_start.clone(),
        }
    }

    fn apply_amounts(&mut self, exact_input: bool, step: &StepComputations) {
        if exact_input {
            self.amount_specified_remaining -= &step.amount_in + &step.fee_amount;
            self.amount_calculated -= &step.amount_out;
        } else {
            self.amount_specified_remaining += &step.amount_out;
            self.amount_calculated += &step.amount_in + &step.fee_amount;
        }
    }

    // Crosses the candidate tick when the step reached it, otherwise re-derives the tick from price.
    // Returns whether an initialized tick was crossed.
    fn update_tick_liquidity<T: TickReader + ?Sized>(
        &mut self,
        zero_for_one: bool,
        step: &StepComputations,
        ticks: &T,
    ) -> Result<bool> {
        if self.sqrt_price_x96 == step.sqrt_price_next_x96 {
            let mut crossed = false;
            if step.initialized {
                let mut liquidity_net = match ticks.get_liquidity_net(step.tick_next) {
                    Some(net) => net,
                    None => {
                        log::error!("tick {} reported initialized but has no record", step.tick_next);
                        return Err(Error::InternalConsistency { tick: step.tick_next });
                    }
                };
                if zero_for_one {
                    liquidity_net = -liquidity_net;
                }
                self.liquidity += liquidity_net;
                if self.liquidity.is_negative() {
                    return Err(PreconditionError::NegativeLiquidity {
                        tick: step.tick_next,
                        liquidity: self.liquidity.clone(),
                    }
                    .into());
                }
                crossed = true;
            }
            self.tick = if zero_for_one { step.tick_next - 1 } else { step.tick_next };
            Ok(crossed)
        } else {
            if self.sqrt_price_x96 != step.sqrt_price_start_x96 {
                self.tick = get_tick_at_sqrt_ratio(&self.sqrt_price_x96)?;
            }
            Ok(false)
        }
    }
}

// -------------------------------- Validation --------------------------------

fn ensure_positive(name: &'static str, value: &BigInt) -> Result<()> {
    if !value.is_positive() {
        return Err(PreconditionError::NonPositive { name, value: value.clone() }.into());
    }
    Ok(())
}

// The limit must sit between the current price and the far end of the valid interval.
fn check_price_limit(zero_for_one: bool, limit: &BigInt, current: &BigInt) -> Result<()> {
    let violated = if zero_for_one {
        if limit > current {
            Some(current.clone())
        } else if limit <= &*MIN_SQRT_RATIO {
            Some((*MIN_SQRT_RATIO).clone())
        } else {
            None
        }
    } else if limit < current {
        Some(current.clone())
    } else if limit >= &*MAX_SQRT_RATIO {
        Some((*MAX_SQRT_RATIO).clone())
    } else {
        None
    };

    match violated {
        Some(bound) => Err(PreconditionError::PriceLimitOutOfRange {
            limit: limit.clone(),
            current: current.clone(),
            bound,
        }
        .into()),
        None => Ok(()),
    }
}

// -------------------------------- Simulator ---------------------------------

/// Simulates a swap of `params.amount_specified` against `pool`, crossing ticks from `ticks`.
///
/// Returns the pool's balance deltas: the input token is positive, the output token negative.
/// Any error leaves nothing behind; there is no partial result.
pub fn swap<T, P>(params: &SwapParams, ticks: &T, pool: &P) -> Result<SwapResult>
where
    T: TickReader + ?Sized,
    P: PoolStateProvider + ?Sized,
{
    let slot0 = pool.current_state()?;
    ensure_positive("sqrtPriceX96", &slot0.sqrt_price_x96)?;
    ensure_positive("liquidity", &slot0.liquidity)?;

    let zero_for_one = params.direction.zero_for_one();
    let exact_input = params.amount_specified.is_positive();
    let sqrt_price_limit_x96 = params.resolved_limit();
    check_price_limit(zero_for_one, &sqrt_price_limit_x96, &slot0.sqrt_price_x96)?;

    let cache = SwapCache::new(zero_for_one, &slot0);
    let mut state = SwapState::new(&params.amount_specified, &slot0, &cache);
    let mut fee_total = BigInt::zero();
    let mut steps = 0usize;
    let mut crossed_ticks = 0usize;

    while !state.amount_specified_remaining.is_zero() && state.sqrt_price_x96 != sqrt_price_limit_x96 {
        steps += 1;
        let mut step = StepComputations {
            sqrt_price_start_x96: state.sqrt_price_x96.clone(),
            ..Default::default()
        };

        let (tick_next, initialized) = ticks.next_initialized_tick(state.tick, zero_for_one);
        step.tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        step.initialized = initialized;
        step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

        // never step past the caller's limit
        let sqrt_ratio_target_x96 = if zero_for_one {
            if step.sqrt_price_next_x96 < sqrt_price_limit_x96 { &sqrt_price_limit_x96 } else { &step.sqrt_price_next_x96 }
        } else if step.sqrt_price_next_x96 > sqrt_price_limit_x96 {
            &sqrt_price_limit_x96
        } else {
            &step.sqrt_price_next_x96
        };

        let computed = compute_swap_step(
            &state.sqrt_price_x96,
            sqrt_ratio_target_x96,
            &state.liquidity,
            &state.amount_specified_remaining,
            slot0.fee_pips,
        )?;
        state.sqrt_price_x96 = computed.sqrt_ratio_next_x96;
        step.amount_in = computed.amount_in;
        step.amount_out = computed.amount_out;
        step.fee_amount = computed.fee_amount;

        fee_total += &step.fee_amount;
        state.apply_amounts(exact_input, &step);

        if cache.fee_protocol > 0 {
            let delta = &step.fee_amount / BigInt::from(cache.fee_protocol);
            step.fee_amount -= &delta;
            state.protocol_fee += delta;
        }

        if state.update_tick_liquidity(zero_for_one, &step, ticks)? {
            crossed_ticks += 1;
        }

        log::trace!(
            "step {}: tick_next={} initialized={} price={} tick={} liquidity={} remaining={}",
            steps,
            step.tick_next,
            step.initialized,
            state.sqrt_price_x96,
            state.tick,
            state.liquidity,
            state.amount_specified_remaining
        );
    }

    let (amount0, amount1) = if zero_for_one == exact_input {
        (&params.amount_specified - &state.amount_specified_remaining, state.amount_calculated)
    } else {
        (state.amount_calculated, &params.amount_specified - &state.amount_specified_remaining)
    };

    log::debug!(
        "swap {:?} specified={} -> amount0={} amount1={} fee={} steps={} crossed={} protocol_fee={}",
        params.direction,
        params.amount_specified,
        amount0,
        amount1,
        fee_total,
        steps,
        crossed_ticks,
        state.protocol_fee
    );

    Ok(SwapResult {
        amount0,
        amount1,
        fee_total,
        sqrt_price_x96: state.sqrt_price_x96,
        tick: state.tick,
        liquidity: state.liquidity,
        steps,
        crossed_ticks,
    })
}
