//! Stand-in block feed that fabricates plausible heads at each chain's block
//! time.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossbeam_channel::unbounded;
use log::{debug, info};
use rand::Rng;

use super::{BlockSource, BlockSubscription, Chain};
use crate::core::block::{BlockData, BlockHash};
use crate::error::SonifyError;

pub struct SimulatedBlockSource {
    /// Overrides every chain's block time when set.
    pub interval: Option<Duration>,
}

impl SimulatedBlockSource {
    pub fn new() -> Self {
        Self { interval: None }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
        }
    }
}

impl Default for SimulatedBlockSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough head height for a chain right now, so numbers look familiar.
fn starting_height(chain: Chain) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    now / chain.block_time().as_millis().max(1) as u64
}

pub fn random_block(rng: &mut impl Rng, number: u64, gas_limit: u64) -> BlockData {
    let mut hash = [0u8; 32];
    rng.fill(&mut hash);
    let gas_used = rng.random_range(0..=gas_limit);
    BlockData::new(number, BlockHash::from_bytes(hash.to_vec()), gas_used)
}

impl BlockSource for SimulatedBlockSource {
    fn watch(&mut self, chain: Chain) -> Result<BlockSubscription, SonifyError> {
        let (sender, receiver) = unbounded();
        let interval = self.interval.unwrap_or_else(|| chain.block_time());
        let mut number = starting_height(chain);

        thread::Builder::new()
            .name(format!("blocks-{}", chain.id()))
            .spawn(move || {
                let mut rng = rand::rng();
                loop {
                    thread::sleep(interval);
                    number += 1;
                    let block = random_block(&mut rng, number, chain.gas_limit());
                    if sender.send(block).is_err() {
                        debug!("Simulated feed for {} stopped", chain.name());
                        break;
                    }
                }
            })
            .map_err(|e| SonifyError::Subscription(e.to_string()))?;

        info!("Watching simulated {} blocks every {:?}", chain.name(), interval);
        Ok(BlockSubscription::new(chain, receiver))
    }
}
