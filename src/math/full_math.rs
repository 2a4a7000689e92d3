// Full-precision multiply-then-divide.
//
// BigInt end-to-end: `a * b` never wraps, so there is no 512-bit product trick to port.
// Rounding follows FullMath / UnsafeMath: floor for mul_div, ceil for the *_rounding_up pair.
// Signed operands truncate toward zero; only non-negative inputs reach the rounding paths.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::PreconditionError;

/// floor(a * b / denominator)
pub fn mul_div(a: &BigInt, b: &BigInt, denominator: &BigInt) -> Result<BigInt, PreconditionError> {
    if denominator.is_zero() {
        return Err(PreconditionError::DivisionByZero);
    }
    Ok((a * b) / denominator)
}

/// ceil(a * b / denominator)
pub fn mul_div_rounding_up(
    a: &BigInt,
    b: &BigInt,
    denominator: &BigInt,
) -> Result<BigInt, PreconditionError> {
    div_rounding_up(&(a * b), denominator)
}

/// ceil(a / b)
pub fn div_rounding_up(a: &BigInt, b: &BigInt) -> Result<BigInt, PreconditionError> {
    if b.is_zero() {
        return Err(PreconditionError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_positive() {
        Ok(quotient + BigInt::one())
    } else {
        Ok(quotient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn bi(s: &str) -> BigInt {
        BigInt::from_str(s).unwrap()
    }

    #[test]
    fn small_values() {
        let b = BigInt::from;
        assert_eq!(mul_div(&b(5), &b(10), &b(2)).unwrap(), b(25));
        assert_eq!(mul_div_rounding_up(&b(5), &b(10), &b(3)).unwrap(), b(17));
        assert_eq!(div_rounding_up(&b(5), &b(2)).unwrap(), b(3));
        assert_eq!(div_rounding_up(&b(6), &b(2)).unwrap(), b(3));
        assert_eq!(div_rounding_up(&b(0), &b(7)).unwrap(), b(0));
    }

    #[test]
    fn product_wider_than_256_bits() {
        let a = bi("12324343523453453245551232354554393884940323134234");
        let b = bi("12312343453039344948483291032493344853202340934233");
        let d = bi("93383847573820304934");
        assert_eq!(
            mul_div(&a, &b, &d).unwrap(),
            bi("1624922877310743438599627458588429791217975980864583739966581637877291143881239")
        );
        assert_eq!(
            mul_div_rounding_up(&a, &b, &d).unwrap(),
            bi("1624922877310743438599627458588429791217975980864583739966581637877291143881240")
        );
    }

    #[test]
    fn negative_operands_truncate() {
        let b = BigInt::from;
        assert_eq!(mul_div(&b(-5), &b(10), &b(2)).unwrap(), b(-25));
        assert_eq!(mul_div(&b(-7), &b(1), &b(2)).unwrap(), b(-3));

        let a = bi("-99999999999999999999999999999999999999999999432134234");
        let c = bi("123123434530393449484832910324933448532303949485302340934233");
        let d = bi("93383847573820304934");
        assert_eq!(
            mul_div_rounding_up(&a, &c, &d).unwrap(),
            bi("-131846607019553228557932428302470359356043248972505423022200290231622387584755406540021411091")
        );
    }

    #[test]
    fn zero_denominator_is_rejected() {
        let one = BigInt::one();
        let zero = BigInt::zero();
        assert_eq!(mul_div(&one, &one, &zero), Err(PreconditionError::DivisionByZero));
        assert_eq!(mul_div_rounding_up(&one, &one, &zero), Err(PreconditionError::DivisionByZero));
        assert_eq!(div_rounding_up(&one, &zero), Err(PreconditionError::DivisionByZero));
    }

    proptest! {
        #[test]
        fn rounding_up_is_floor_or_floor_plus_one(
            a in prop::collection::vec(any::<u64>(), 1..6),
            b in prop::collection::vec(any::<u64>(), 1..6),
            d in prop::collection::vec(any::<u64>(), 1..4),
        ) {
            let to_big = |limbs: &[u64]| limbs.iter().fold(BigInt::zero(), |acc, l| (acc << 64u32) + BigInt::from(*l));
            let a = to_big(&a[..]);
            let b = to_big(&b[..]);
            let d = to_big(&d[..]) + BigInt::one();

            let floor = mul_div(&a, &b, &d).unwrap();
            let ceil = mul_div_rounding_up(&a, &b, &d).unwrap();
            if ((&a * &b) % &d).is_zero() {
                prop_assert_eq!(ceil, floor);
            } else {
                prop_assert_eq!(ceil, floor + BigInt::one());
            }
        }
    }
}
