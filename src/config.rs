use std::env;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::pool::swap::{SwapDirection, SwapParams};

#[derive(Debug, Clone)]
pub struct Config {
    // JSON file with the pool record and its ticks
    pub snapshot_path: String,

    // Swap request
    pub direction: SwapDirection,
    pub amount_specified: BigInt,
    pub sqrt_price_limit_x96: Option<BigInt>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load configuration files (swap request first, then local overrides)
        dotenv::from_filename("swap.env").ok();
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let amount_raw = lookup("SWAP_AMOUNT").ok_or("SWAP_AMOUNT must be set")?;
        let amount_specified: BigInt = amount_raw
            .trim()
            .parse()
            .map_err(|_| format!("SWAP_AMOUNT is not an integer: {}", amount_raw))?;
        if amount_specified.is_zero() {
            log::warn!("SWAP_AMOUNT is zero, the swap will not move the pool");
        }

        let sqrt_price_limit_x96 = match lookup("SQRT_PRICE_LIMIT_X96") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<BigInt>()
                    .map_err(|_| format!("SQRT_PRICE_LIMIT_X96 is not an integer: {}", raw))?,
            ),
            _ => None,
        };

        Ok(Config {
            snapshot_path: lookup("SNAPSHOT_PATH").ok_or("SNAPSHOT_PATH must be set")?,
            direction: parse_direction(
                &lookup("SWAP_DIRECTION").unwrap_or_else(|| "zero_for_one".to_string()),
            )?,
            amount_specified,
            sqrt_price_limit_x96,
        })
    }

    pub fn swap_params(&self) -> SwapParams {
        SwapParams {
            direction: self.direction,
            amount_specified: self.amount_specified.clone(),
            sqrt_price_limit_x96: self.sqrt_price_limit_x96.clone(),
        }
    }
}

pub fn parse_direction(raw: &str) -> Result<SwapDirection, Box<dyn std::error::Error>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "zero_for_one" | "zeroforone" | "0to1" => Ok(SwapDirection::ZeroForOne),
        "one_for_zero" | "oneforzero" | "1to0" => Ok(SwapDirection::OneForZero),
        other => Err(format!("SWAP_DIRECTION must be zero_for_one or one_for_zero, got {}", other).into()),
    }
}
