// -------------------------------- Tick Math --------------------------------
//
// Exact TickMath (Q64.96) with the canonical constants. price(tick) = 1.0001^tick,
// sqrtPriceX96 = sqrt(price) * 2^96.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use once_cell::sync::Lazy;

use crate::error::PreconditionError;

/// log base 1.0001 of 2^-128
pub const MIN_TICK: i32 = -887_272;
/// log base 1.0001 of 2^128
pub const MAX_TICK: i32 = -MIN_TICK;

/// get_sqrt_ratio_at_tick(MIN_TICK)
pub static MIN_SQRT_RATIO: Lazy<BigInt> = Lazy::new(|| BigInt::from(4_295_128_739u64));

/// get_sqrt_ratio_at_tick(MAX_TICK), 0xfffd8963efd1fc6a506488495d951d5263988d26
pub static MAX_SQRT_RATIO: Lazy<BigInt> = Lazy::new(|| {
    (BigInt::from(0xfffd_8963u32) << 128u32) + BigInt::from(0xefd1_fc6a_5064_8849_5d95_1d52_6398_8d26u128)
});

pub static MAX_UINT256: Lazy<BigInt> = Lazy::new(|| (BigInt::one() << 256u32) - BigInt::one());

/// Q128.128 ratio for |tick| with only bit 0 set.
const RATIO_ODD_TICK: u128 = 0xfffc_b933_bd6f_ad37_aa2d_162d_1a59_4001;

/// sqrt(1.0001)^-(2^i) in Q128.128, keyed by the |tick| bit that enables it.
const TICK_BIT_MULTIPLIERS: [(u32, u128); 19] = [
    (0x2, 0xfff9_7272_373d_4132_59a4_6990_580e_213a),
    (0x4, 0xfff2_e50f_5f65_6932_ef12_357c_f3c7_fdcc),
    (0x8, 0xffe5_caca_7e10_e4e6_1c36_24ea_a094_1cd0),
    (0x10, 0xffcb_9843_d60f_6159_c9db_5883_5c92_6644),
    (0x20, 0xff97_3b41_fa98_c081_472e_6896_dfb2_54c0),
    (0x40, 0xff2e_a164_66c9_6a38_43ec_78b3_26b5_2861),
    (0x80, 0xfe5d_ee04_6a99_a2a8_11c4_61f1_969c_3053),
    (0x100, 0xfcbe_86c7_900a_88ae_dcff_c83b_479a_a3a4),
    (0x200, 0xf987_a725_3ac4_1317_6f2b_074c_f781_5e54),
    (0x400, 0xf339_2b08_22b7_0005_940c_7a39_8e4b_70f3),
    (0x800, 0xe715_9475_a2c2_9b74_43b2_9c7f_a6e8_89d9),
    (0x1000, 0xd097_f3bd_fd20_22b8_845a_d8f7_92aa_5825),
    (0x2000, 0xa9f7_4646_2d87_0fdf_8a65_dc1f_90e0_61e5),
    (0x4000, 0x70d8_69a1_56d2_a1b8_90bb_3df6_2baf_32f7),
    (0x8000, 0x31be_135f_97d0_8fd9_8123_1505_542f_cfa6),
    (0x10000, 0x09aa_508b_5b7a_84e1_c677_de54_f3e9_9bc9),
    (0x20000, 0x005d_6af8_dedb_8119_6699_c329_225e_e604),
    (0x40000, 0x0000_2216_e584_f5fa_1ea9_2604_1bed_fe98),
    (0x80000, 0x0000_0000_048a_1703_91f7_dc42_444e_8fa2),
];

/// Thresholds for the most-significant-bit binary search, with the shift each one unlocks.
const MSB_MASKS: [(u128, u32); 7] = [
    (0xffff_ffff_ffff_ffff_ffff_ffff_ffff_ffff, 128),
    (0xffff_ffff_ffff_ffff, 64),
    (0xffff_ffff, 32),
    (0xffff, 16),
    (0xff, 8),
    (0xf, 4),
    (0x3, 2),
];

/// log_sqrt(1.0001)(2) in Q128.128 over the 64-bit fractional log2
const LOG_SQRT_10001: u128 = 0x3627_a301_d710_5577_4c85;
const TICK_LOW_ERROR: u128 = 0x028f_6481_ab7f_045a_5af0_12a1_9d00_3aaa;
const TICK_HIGH_ERROR: u128 = 0xdb2d_f09e_8195_9a81_455e_2607_99a0_632f;

/// Exact TickMath.getSqrtRatioAtTick.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<BigInt, PreconditionError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PreconditionError::TickOutOfRange {
            tick,
            min: MIN_TICK,
            max: MAX_TICK,
        });
    }
    let abs_tick = tick.unsigned_abs();

    // ratio is Q128.128
    let mut ratio = if abs_tick & 0x1 != 0 {
        BigInt::from(RATIO_ODD_TICK)
    } else {
        BigInt::one() << 128u32
    };

    for &(bit, multiplier) in TICK_BIT_MULTIPLIERS.iter() {
        if abs_tick & bit != 0 {
            ratio = (ratio * BigInt::from(multiplier)) >> 128u32;
        }
    }

    if tick > 0 {
        ratio = &*MAX_UINT256 / ratio;
    }

    // Q128.128 -> Q64.96, rounding up
    let round_up = !(&ratio % (BigInt::one() << 32u32)).is_zero();
    let sqrt_price_x96 = ratio >> 32u32;
    if round_up {
        Ok(sqrt_price_x96 + BigInt::one())
    } else {
        Ok(sqrt_price_x96)
    }
}

/// Exact TickMath.getTickAtSqrtRatio: the greatest tick whose ratio is <= `sqrt_price_x96`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: &BigInt) -> Result<i32, PreconditionError> {
    if *sqrt_price_x96 < *MIN_SQRT_RATIO || *sqrt_price_x96 > *MAX_SQRT_RATIO {
        return Err(out_of_range(sqrt_price_x96));
    }

    let ratio: BigInt = sqrt_price_x96 << 32u32;

    let mut r = ratio.clone();
    let mut msb: u32 = 0;
    for &(mask, shift) in MSB_MASKS.iter() {
        if r > BigInt::from(mask) {
            msb |= shift;
            r >>= shift;
        }
    }
    if r > BigInt::one() {
        msb |= 1;
    }

    // normalise so the top bit sits at position 127
    let mut r = if msb >= 128 {
        &ratio >> (msb - 127)
    } else {
        &ratio << (127 - msb)
    };

    // integer part of log2 in the upper bits, 14 fractional bits refined below
    let mut log_2 = BigInt::from(i64::from(msb) - 128) << 64u32;
    for i in 0..14u32 {
        r = (&r * &r) >> 127u32;
        let f: BigInt = &r >> 128u32;
        if !f.is_zero() {
            // bits below 2^64 are still clear, so adding is the same as or-ing
            log_2 += BigInt::one() << (63 - i);
            r >>= 1u32;
        }
    }

    let log_sqrt10001 = log_2 * BigInt::from(LOG_SQRT_10001);

    let tick_low = to_tick((&log_sqrt10001 - BigInt::from(TICK_LOW_ERROR)) >> 128u32, sqrt_price_x96)?;
    let tick_high = to_tick((&log_sqrt10001 + BigInt::from(TICK_HIGH_ERROR)) >> 128u32, sqrt_price_x96)?;

    if tick_low == tick_high {
        return Ok(tick_low);
    }
    if get_sqrt_ratio_at_tick(tick_high)? <= *sqrt_price_x96 {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

fn to_tick(value: BigInt, sqrt_price_x96: &BigInt) -> Result<i32, PreconditionError> {
    value.to_i32().ok_or_else(|| out_of_range(sqrt_price_x96))
}

fn out_of_range(sqrt_price_x96: &BigInt) -> PreconditionError {
    PreconditionError::SqrtPriceOutOfRange {
        value: sqrt_price_x96.clone(),
        min: (*MIN_SQRT_RATIO).clone(),
        max: (*MAX_SQRT_RATIO).clone(),
    }
}
