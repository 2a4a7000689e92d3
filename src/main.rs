use std::fs;

use serde_json::json;

use uniswap_swap_sim::config::Config;
use uniswap_swap_sim::pool::swap::swap;
use uniswap_swap_sim::records::PoolSnapshot;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;

    // Build pool state from the saved snapshot
    let raw = fs::read_to_string(&config.snapshot_path)
        .map_err(|e| format!("failed to read {}: {}", config.snapshot_path, e))?;
    let snapshot = PoolSnapshot::from_json(&raw)?;
    let ticks = snapshot.tick_storage()?;
    log::info!(
        "loaded pool fee={} tick={} with {} tick records from {}",
        snapshot.pool.fee_tier,
        snapshot.pool.tick,
        ticks.len(),
        config.snapshot_path
    );

    let result = swap(&config.swap_params(), &ticks, &snapshot.pool)?;

    let output = json!({
        "direction": format!("{:?}", config.direction),
        "amountSpecified": config.amount_specified.to_string(),
        "amount0": result.amount0.to_string(),
        "amount1": result.amount1.to_string(),
        "feeTotal": result.fee_total.to_string(),
        "sqrtPriceX96": result.sqrt_price_x96.to_string(),
        "tick": result.tick,
        "liquidity": result.liquidity.to_string(),
        "steps": result.steps,
        "crossedTicks": result.crossed_ticks,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
