use num_bigint::BigInt;
use thiserror::Error;

/// Malformed or out-of-domain input. Always fatal to the current call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("tick {tick} out of interval [{min}, {max}]")]
    TickOutOfRange { tick: i32, min: i32, max: i32 },

    #[error("sqrtPriceX96 {value} out of interval [{min}, {max}]")]
    SqrtPriceOutOfRange { value: BigInt, min: BigInt, max: BigInt },

    #[error("division by zero")]
    DivisionByZero,

    #[error("sqrt ratio {0} must be non-negative")]
    NegativeSqrtPrice(BigInt),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: BigInt },

    #[error("amount * sqrtPX96 ({product}) must stay below liquidity << 96 ({numerator}) within 256 bits")]
    Amount0DenominatorUnderflow { numerator: BigInt, product: BigInt },

    #[error("sqrtPX96 {sqrt_price} <= quotient {quotient}")]
    PriceBelowQuotient { sqrt_price: BigInt, quotient: BigInt },

    #[error("unexpected fee tier {0}, expected one of 100, 500, 3000, 10000")]
    UnknownFeeTier(u32),

    #[error("fee {0} pips out of interval [0, 1000000)")]
    FeeOutOfRange(u32),

    #[error("tick spacing {0} must be positive")]
    InvalidTickSpacing(i32),

    #[error("sqrt price limit {limit} invalid for current price {current} (bound {bound})")]
    PriceLimitOutOfRange { limit: BigInt, current: BigInt, bound: BigInt },

    #[error("liquidity went negative ({liquidity}) after crossing tick {tick}")]
    NegativeLiquidity { tick: i32, liquidity: BigInt },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// A tick reported as initialized had no record behind it.
    #[error("internal consistency: initialized tick {tick} has no record")]
    InternalConsistency { tick: i32 },
}

pub type Result<T> = std::result::Result<T, Error>;
