// Fixed-point math shared by the swap engine. All wide values are BigInt.

pub mod full_math;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;
