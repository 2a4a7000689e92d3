// Pool and tick records as exported by a subgraph, already fetched and saved as JSON.
// Big numbers arrive as decimal strings.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::{PreconditionError, Result};
use crate::pool::slot0::{tick_spacing_for_fee, PoolStateProvider, Slot0};
use crate::pool::tick_storage::{Tick, TickStorage};

/// (De)serializes any `FromStr + Display` value as a JSON string.
mod string_number {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| de::Error::custom(format!("invalid number {:?}: {}", raw, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    #[serde(with = "string_number")]
    pub fee_tier: u32,
    #[serde(with = "string_number")]
    pub liquidity: BigInt,
    #[serde(with = "string_number")]
    pub sqrt_price: BigInt,
    #[serde(with = "string_number")]
    pub tick: i32,
    #[serde(default, with = "string_number")]
    pub fee_growth_global0_x128: BigInt,
    #[serde(default, with = "string_number")]
    pub fee_growth_global1_x128: BigInt,
    #[serde(default, with = "string_number")]
    pub observation_index: u16,
    #[serde(default, with = "string_number")]
    pub observation_cardinality: u16,
    #[serde(default, with = "string_number")]
    pub observation_cardinality_next: u16,
    // subgraph pools do not carry it, defaults to no protocol fee
    #[serde(default)]
    pub fee_protocol: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRecord {
    #[serde(with = "string_number")]
    pub tick_idx: i32,
    #[serde(with = "string_number")]
    pub liquidity_gross: BigInt,
    #[serde(with = "string_number")]
    pub liquidity_net: BigInt,
    #[serde(default, with = "string_number")]
    pub fee_growth_outside0_x128: BigInt,
    #[serde(default, with = "string_number")]
    pub fee_growth_outside1_x128: BigInt,
}

/// One pool with the full, already paginated set of its ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool: PoolRecord,
    #[serde(default)]
    pub ticks: Vec<TickRecord>,
}

impl PoolRecord {
    pub fn tick_spacing(&self) -> std::result::Result<i32, PreconditionError> {
        tick_spacing_for_fee(self.fee_tier)
    }

    pub fn to_slot0(&self) -> std::result::Result<Slot0, PreconditionError> {
        let mut slot0 = Slot0::new(self.fee_tier, self.liquidity.clone(), self.sqrt_price.clone(), self.tick)?
            .with_fee_growth(self.fee_growth_global0_x128.clone(), self.fee_growth_global1_x128.clone())
            .with_fee_protocol(self.fee_protocol);
        slot0.observation_index = self.observation_index;
        slot0.observation_cardinality = self.observation_cardinality;
        slot0.observation_cardinality_next = self.observation_cardinality_next;
        Ok(slot0)
    }
}

impl PoolStateProvider for PoolRecord {
    fn current_state(&self) -> Result<Slot0> {
        Ok(self.to_slot0()?)
    }
}

impl From<&TickRecord> for Tick {
    fn from(record: &TickRecord) -> Self {
        Tick {
            index: record.tick_idx,
            liquidity_gross: record.liquidity_gross.clone(),
            liquidity_net: record.liquidity_net.clone(),
            fee_growth_outside0_x128: record.fee_growth_outside0_x128.clone(),
            fee_growth_outside1_x128: record.fee_growth_outside1_x128.clone(),
        }
    }
}

impl PoolSnapshot {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Tick index with the spacing of the pool's fee tier.
    pub fn tick_storage(&self) -> Result<TickStorage> {
        let spacing = self.pool.tick_spacing()?;
        Ok(TickStorage::new(self.ticks.iter().map(Tick::from), spacing)?)
    }
}
