// --------------------------- SqrtPriceMath deltas ---------------------------
//
// Amount deltas between two sqrt prices and the next price after a given amount moves
// through a liquidity range. Rounding always favours the pool.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;

use crate::error::PreconditionError;
use crate::math::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::math::tick_math::MAX_UINT256;

pub const RESOLUTION: u32 = 96;

pub static Q96: Lazy<BigInt> = Lazy::new(|| BigInt::one() << RESOLUTION);

#[inline]
fn sorted<'a>(a: &'a BigInt, b: &'a BigInt) -> (&'a BigInt, &'a BigInt) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Uniswap-exact rounding:
/// amount0 =
///   if round_up: ceil( ceil( (L << 96) * (sb - sa) / sb ) / sa )
///   else:        floor( floor( (L << 96) * (sb - sa) / sb ) / sa )
pub fn get_amount0_delta_rounding(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> Result<BigInt, PreconditionError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower.is_negative() {
        return Err(PreconditionError::NegativeSqrtPrice(lower.clone()));
    }

    let numerator1: BigInt = liquidity << RESOLUTION;
    let numerator2 = upper - lower;

    if round_up {
        let amount = mul_div_rounding_up(&numerator1, &numerator2, upper)?;
        div_rounding_up(&amount, lower)
    } else {
        let amount = mul_div(&numerator1, &numerator2, upper)?;
        mul_div(&amount, &BigInt::one(), lower)
    }
}

/// Uniswap-exact rounding:
/// amount1 =
///   if round_up: ceil( L * (sb - sa) / Q96 )
///   else:        floor( L * (sb - sa) / Q96 )
pub fn get_amount1_delta_rounding(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> Result<BigInt, PreconditionError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let difference = upper - lower;

    if round_up {
        mul_div_rounding_up(liquidity, &difference, &Q96)
    } else {
        mul_div(liquidity, &difference, &Q96)
    }
}

// Signed variants: removing liquidity rounds down, adding rounds up.

pub fn get_amount0_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
) -> Result<BigInt, PreconditionError> {
    if liquidity.is_negative() {
        let amount = get_amount0_delta_rounding(sqrt_ratio_a_x96, sqrt_ratio_b_x96, &-liquidity, false)?;
        Ok(-amount)
    } else {
        get_amount0_delta_rounding(sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity, true)
    }
}

pub fn get_amount1_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
) -> Result<BigInt, PreconditionError> {
    if liquidity.is_negative() {
        let amount = get_amount1_delta_rounding(sqrt_ratio_a_x96, sqrt_ratio_b_x96, &-liquidity, false)?;
        Ok(-amount)
    } else {
        get_amount1_delta_rounding(sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity, true)
    }
}

// ----------------------------- Next price helpers -----------------------------

/// sqrtQ = ceil( (L << 96) * sqrtP / ( (L << 96) +- amount * sqrtP ) )
///
/// Exact form while `amount * sqrtP` and the sum stay inside 256 bits. Past that, adding uses
/// ceil( (L << 96) / ( (L << 96) / sqrtP + amount ) ) and removing fails.
fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_p_x96: &BigInt,
    liquidity: &BigInt,
    amount: &BigInt,
    add: bool,
) -> Result<BigInt, PreconditionError> {
    if amount.is_zero() {
        return Ok(sqrt_p_x96.clone());
    }

    let numerator1: BigInt = liquidity << RESOLUTION;
    let product = amount * sqrt_p_x96;
    let product_fits = product <= *MAX_UINT256;

    if add {
        if product_fits {
            let denominator = &numerator1 + &product;
            if denominator <= *MAX_UINT256 {
                return mul_div_rounding_up(&numerator1, sqrt_p_x96, &denominator);
            }
        }
        let quotient = mul_div(&numerator1, &BigInt::one(), sqrt_p_x96)?;
        return div_rounding_up(&numerator1, &(quotient + amount));
    }

    if !product_fits || numerator1 <= product {
        return Err(PreconditionError::Amount0DenominatorUnderflow {
            numerator: numerator1,
            product,
        });
    }
    let denominator = &numerator1 - &product;
    mul_div_rounding_up(&numerator1, sqrt_p_x96, &denominator)
}

/// sqrtQ = sqrtP +- amount * Q96 / L, rounded down overall (quotient floored when adding,
/// ceiled when removing).
fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_p_x96: &BigInt,
    liquidity: &BigInt,
    amount: &BigInt,
    add: bool,
) -> Result<BigInt, PreconditionError> {
    if add {
        let quotient = mul_div(amount, &Q96, liquidity)?;
        return Ok(sqrt_p_x96 + quotient);
    }

    let quotient = mul_div_rounding_up(amount, &Q96, liquidity)?;
    if *sqrt_p_x96 <= quotient {
        return Err(PreconditionError::PriceBelowQuotient {
            sqrt_price: sqrt_p_x96.clone(),
            quotient,
        });
    }
    Ok(sqrt_p_x96 - quotient)
}

fn ensure_positive(sqrt_p_x96: &BigInt, liquidity: &BigInt) -> Result<(), PreconditionError> {
    if !sqrt_p_x96.is_positive() {
        return Err(PreconditionError::NonPositive {
            name: "sqrtPX96",
            value: sqrt_p_x96.clone(),
        });
    }
    if !liquidity.is_positive() {
        return Err(PreconditionError::NonPositive {
            name: "liquidity",
            value: liquidity.clone(),
        });
    }
    Ok(())
}

/// Price after `amount_in` of the input token enters the range.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x96: &BigInt,
    liquidity: &BigInt,
    amount_in: &BigInt,
    zero_for_one: bool,
) -> Result<BigInt, PreconditionError> {
    ensure_positive(sqrt_p_x96, liquidity)?;

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_p_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_p_x96, liquidity, amount_in, true)
    }
}

/// Price after `amount_out` of the output token leaves the range.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x96: &BigInt,
    liquidity: &BigInt,
    amount_out: &BigInt,
    zero_for_one: bool,
) -> Result<BigInt, PreconditionError> {
    ensure_positive(sqrt_p_x96, liquidity)?;

    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_p_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_p_x96, liquidity, amount_out, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q96(v: i64) -> BigInt {
        BigInt::from(v) << 96u32
    }

    #[test]
    fn amount0_delta_rounding() {
        let liquidity = BigInt::from(10_000);
        let down = get_amount0_delta_rounding(&q96(100), &q96(300), &liquidity, false).unwrap();
        let up = get_amount0_delta_rounding(&q96(100), &q96(300), &liquidity, true).unwrap();
        assert_eq!(down, BigInt::from(66));
        assert_eq!(up, BigInt::from(67));
    }

    #[test]
    fn amount1_delta_rounding_and_bound_order() {
        let liquidity = BigInt::from(10_000);
        let exact = get_amount1_delta_rounding(&q96(100), &q96(300), &liquidity, false).unwrap();
        assert_eq!(exact, BigInt::from(2_000_000));

        let upper = q96(300) + BigInt::from(300);
        let up = get_amount1_delta_rounding(&q96(100), &upper, &liquidity, true).unwrap();
        assert_eq!(up, BigInt::from(2_000_001));

        let swapped = get_amount1_delta_rounding(&upper, &q96(100), &liquidity, true).unwrap();
        assert_eq!(swapped, up);
    }

    #[test]
    fn signed_amount0_delta() {
        let positive = get_amount0_delta(&q96(100), &q96(300), &BigInt::from(10_000)).unwrap();
        assert_eq!(positive, BigInt::from(67));

        let upper = q96(300) + BigInt::from(300);
        let negative = get_amount0_delta(&q96(100), &upper, &BigInt::from(-10_000)).unwrap();
        assert_eq!(negative, BigInt::from(-66));
    }

    #[test]
    fn signed_amount1_delta() {
        let positive = get_amount1_delta(&q96(500), &q96(400), &BigInt::from(10_000)).unwrap();
        assert_eq!(positive, BigInt::from(1_000_000));

        let upper = q96(400) + BigInt::from(300);
        let negative = get_amount1_delta(&q96(500), &upper, &BigInt::from(-10_000)).unwrap();
        assert_eq!(negative, BigInt::from(-999_999));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = get_amount0_delta_rounding(&BigInt::from(-1), &q96(1), &BigInt::from(1), true);
        assert_eq!(err, Err(PreconditionError::NegativeSqrtPrice(BigInt::from(-1))));
    }

    #[test]
    fn next_price_from_amount0() {
        let price = q96(300);
        let added = get_next_sqrt_price_from_amount0_rounding_up(&price, &BigInt::from(12_345), &BigInt::from(100), true).unwrap();
        // 12345 * 300 / (12345 + 100 * 300)
        assert_eq!(added >> 96u32, BigInt::from(87));

        let removed = get_next_sqrt_price_from_amount0_rounding_up(&price, &BigInt::from(30_300), &BigInt::from(100), false).unwrap();
        // 30300 * 300 / (30300 - 100 * 300)
        assert_eq!(removed >> 96u32, BigInt::from(30_300));
    }

    #[test]
    fn next_price_from_amount1() {
        let price = q96(300);
        let liquidity = BigInt::from(12_345);
        let amount = BigInt::from(100);
        let added = get_next_sqrt_price_from_amount1_rounding_down(&price, &liquidity, &amount, true).unwrap();
        assert_eq!(added >> 96u32, BigInt::from(300));

        let removed = get_next_sqrt_price_from_amount1_rounding_down(&price, &liquidity, &amount, false).unwrap();
        assert_eq!(removed >> 96u32, BigInt::from(299));
    }

    #[test]
    fn zero_amount_keeps_price() {
        let price = q96(1);
        let next = get_next_sqrt_price_from_input(&price, &BigInt::from(1_000), &BigInt::zero(), true).unwrap();
        assert_eq!(next, price);
    }

    #[test]
    fn removing_more_token0_than_available_fails() {
        // liquidity << 96 == amount * price
        let result = get_next_sqrt_price_from_output(&q96(300), &BigInt::from(30_000), &BigInt::from(100), false);
        assert!(matches!(result, Err(PreconditionError::Amount0DenominatorUnderflow { .. })));
    }

    #[test]
    fn removing_more_token1_than_available_fails() {
        let result = get_next_sqrt_price_from_output(&q96(1), &BigInt::from(10), &BigInt::from(10), true);
        assert!(matches!(result, Err(PreconditionError::PriceBelowQuotient { .. })));
    }

    #[test]
    fn huge_token0_input_uses_the_quotient_form() {
        let price = q96(1);
        let liquidity = BigInt::from(1_000_000);
        let amount = BigInt::one() << 200u32;
        let next = get_next_sqrt_price_from_input(&price, &liquidity, &amount, true).unwrap();
        let numerator1: BigInt = &liquidity << 96u32;
        let expected = div_rounding_up(&numerator1, &(&numerator1 / &price + &amount)).unwrap();
        assert_eq!(next, expected);
        assert!(next < price);
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let one = BigInt::one();
        assert!(matches!(
            get_next_sqrt_price_from_input(&BigInt::zero(), &one, &one, true),
            Err(PreconditionError::NonPositive { name: "sqrtPX96", .. })
        ));
        assert!(matches!(
            get_next_sqrt_price_from_output(&one, &BigInt::zero(), &one, false),
            Err(PreconditionError::NonPositive { name: "liquidity", .. })
        ));
    }
}
