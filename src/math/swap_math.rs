// ------------------------------- Swap math step -------------------------------

use num_bigint::BigInt;
use num_traits::Signed;

use crate::error::PreconditionError;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount0_delta_rounding, get_amount1_delta_rounding, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};

/// Fees are expressed in hundredths of a bip.
pub const FEE_DENOMINATOR_PPM: u32 = 1_000_000;

/// Outcome of one swap step inside a single liquidity range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStep {
    pub sqrt_ratio_next_x96: BigInt,
    pub amount_in: BigInt,
    pub amount_out: BigInt,
    pub fee_amount: BigInt,
}

/// Swap as far as `sqrt_ratio_target_x96`, or until `amount_remaining` runs out.
///
/// Direction is inferred from the two prices (current >= target means token0 in).
/// A non-negative `amount_remaining` is an exact input budget including fees, a negative one
/// is the exact output still owed. For exact input, `amount_in + fee_amount` never exceeds
/// the budget.
pub fn compute_swap_step(
    sqrt_ratio_current_x96: &BigInt,
    sqrt_ratio_target_x96: &BigInt,
    liquidity: &BigInt,
    amount_remaining: &BigInt,
    fee_pips: u32,
) -> Result<SwapStep, PreconditionError> {
    if fee_pips >= FEE_DENOMINATOR_PPM {
        return Err(PreconditionError::FeeOutOfRange(fee_pips));
    }

    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let exact_in = !amount_remaining.is_negative();

    let denominator = BigInt::from(FEE_DENOMINATOR_PPM);
    let fee = BigInt::from(fee_pips);
    let fee_complement = BigInt::from(FEE_DENOMINATOR_PPM - fee_pips);
    let amount_remaining_abs = amount_remaining.abs();

    let mut amount_in_to_target = None;
    let mut amount_out_to_target = None;

    let sqrt_ratio_next_x96 = if exact_in {
        let amount_remaining_less_fee = mul_div(amount_remaining, &fee_complement, &denominator)?;
        let amount_in = if zero_for_one {
            get_amount0_delta_rounding(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
        } else {
            get_amount1_delta_rounding(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
        };

        let next = if amount_remaining_less_fee >= amount_in {
            sqrt_ratio_target_x96.clone()
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current_x96,
                liquidity,
                &amount_remaining_less_fee,
                zero_for_one,
            )?
        };
        amount_in_to_target = Some(amount_in);
        next
    } else {
        let amount_out = if zero_for_one {
            get_amount1_delta_rounding(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, false)?
        } else {
            get_amount0_delta_rounding(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, false)?
        };

        let next = if amount_remaining_abs >= amount_out {
            sqrt_ratio_target_x96.clone()
        } else {
            get_next_sqrt_price_from_output(
                sqrt_ratio_current_x96,
                liquidity,
                &amount_remaining_abs,
                zero_for_one,
            )?
        };
        amount_out_to_target = Some(amount_out);
        next
    };

    let max = *sqrt_ratio_target_x96 == sqrt_ratio_next_x96;

    // reuse the amounts to the target when the step lands exactly on it
    let amount_in = match amount_in_to_target.filter(|_| max && exact_in) {
        Some(amount) => amount,
        None if zero_for_one => {
            get_amount0_delta_rounding(&sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, true)?
        }
        None => get_amount1_delta_rounding(sqrt_ratio_current_x96, &sqrt_ratio_next_x96, liquidity, true)?,
    };
    let mut amount_out = match amount_out_to_target.filter(|_| max && !exact_in) {
        Some(amount) => amount,
        None if zero_for_one => {
            get_amount1_delta_rounding(&sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, false)?
        }
        None => get_amount0_delta_rounding(sqrt_ratio_current_x96, &sqrt_ratio_next_x96, liquidity, false)?,
    };

    // cap the output amount to not exceed the remaining output amount
    if !exact_in && amount_out > amount_remaining_abs {
        amount_out = amount_remaining_abs;
    }

    let fee_amount = if exact_in && sqrt_ratio_next_x96 != *sqrt_ratio_target_x96 {
        // the whole budget is consumed, the remainder is taken as fee
        amount_remaining - &amount_in
    } else {
        mul_div_rounding_up(&amount_in, &fee, &fee_complement)?
    };

    log::trace!(
        "swap step: next={} in={} out={} fee={}",
        sqrt_ratio_next_x96,
        amount_in,
        amount_out,
        fee_amount
    );

    Ok(SwapStep {
        sqrt_ratio_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;
    use num_traits::Zero;

    fn step(tick_current: i32, tick_target: i32, liquidity: i64, remaining: i64, fee: u32) -> SwapStep {
        compute_swap_step(
            &get_sqrt_ratio_at_tick(tick_current).unwrap(),
            &get_sqrt_ratio_at_tick(tick_target).unwrap(),
            &BigInt::from(liquidity),
            &BigInt::from(remaining),
            fee,
        )
        .unwrap()
    }

    fn amounts(s: &SwapStep) -> (BigInt, BigInt, BigInt) {
        (s.amount_in.clone(), s.amount_out.clone(), s.fee_amount.clone())
    }

    #[test]
    fn reference_vectors() {
        let b = BigInt::from;
        assert_eq!(amounts(&step(0, 60, 10_000, 300, 10_000)), (b(31), b(29), b(1)));
        assert_eq!(amounts(&step(-60, 0, 10_000, 300, 10_000)), (b(30), b(30), b(1)));
        assert_eq!(amounts(&step(100, 200, 100_000_000, 3_000, 3_000)), (b(2_991), b(2_961), b(9)));
    }

    #[test]
    fn reaching_the_target_lands_exactly_on_it() {
        let s = step(0, 60, 10_000, 300, 10_000);
        assert_eq!(s.sqrt_ratio_next_x96, get_sqrt_ratio_at_tick(60).unwrap());
    }

    #[test]
    fn partial_exact_input_spends_the_whole_budget() {
        let s = step(100, 200, 100_000_000, 3_000, 3_000);
        assert!(s.sqrt_ratio_next_x96 < get_sqrt_ratio_at_tick(200).unwrap());
        assert_eq!(&s.amount_in + &s.fee_amount, BigInt::from(3_000));
    }

    #[test]
    fn exact_output_is_capped_by_remaining() {
        let current = get_sqrt_ratio_at_tick(0).unwrap();
        let target = get_sqrt_ratio_at_tick(-600).unwrap();
        let s = compute_swap_step(&current, &target, &BigInt::from(1_000_000), &BigInt::from(-100), 3_000).unwrap();
        assert!(s.amount_out <= BigInt::from(100));
        assert!(s.sqrt_ratio_next_x96 < current);
        assert!(s.sqrt_ratio_next_x96 > target);
        assert!(s.amount_in > BigInt::zero());
        assert!(s.fee_amount > BigInt::zero());
    }

    #[test]
    fn zero_fee_takes_nothing() {
        let s = step(0, 60, 10_000, 300, 0);
        assert_eq!(s.fee_amount, BigInt::zero());
    }

    #[test]
    fn fee_must_stay_below_one_million() {
        let p = get_sqrt_ratio_at_tick(0).unwrap();
        let result = compute_swap_step(&p, &p, &BigInt::from(1), &BigInt::from(1), FEE_DENOMINATOR_PPM);
        assert_eq!(result, Err(PreconditionError::FeeOutOfRange(FEE_DENOMINATOR_PPM)));
    }
}
