use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::mapper::NoteEvent;

/// Messages from the engine to the audio callback
#[derive(Debug, Clone)]
pub enum SynthMessage {
    PlayNote(NoteEvent),
    SetVolume(f32),
}

/// Chains a block feed can be watched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Chain {
    #[default]
    Ethereum,
    Optimism,
    Polygon,
    Base,
    Arbitrum,
}

impl Chain {
    pub const ALL: [Chain; 5] = [
        Chain::Ethereum,
        Chain::Optimism,
        Chain::Polygon,
        Chain::Base,
        Chain::Arbitrum,
    ];

    pub fn id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Optimism => 10,
            Chain::Polygon => 137,
            Chain::Base => 8453,
            Chain::Arbitrum => 42161,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Optimism => "Optimism",
            Chain::Polygon => "Polygon",
            Chain::Base => "Base",
            Chain::Arbitrum => "Arbitrum One",
        }
    }

    /// Nominal time between block heads.
    pub fn block_time(&self) -> Duration {
        match self {
            Chain::Ethereum => Duration::from_secs(12),
            Chain::Optimism | Chain::Polygon | Chain::Base => Duration::from_secs(2),
            Chain::Arbitrum => Duration::from_millis(250),
        }
    }

    /// Typical per-block gas ceiling, used by the simulated feed.
    pub fn gas_limit(&self) -> u64 {
        match self {
            Chain::Ethereum => 30_000_000,
            Chain::Optimism | Chain::Base => 60_000_000,
            Chain::Polygon => 30_000_000,
            Chain::Arbitrum => 4_000_000,
        }
    }

    pub fn from_id(id: u64) -> Option<Chain> {
        Chain::ALL.iter().copied().find(|c| c.id() == id)
    }
}
