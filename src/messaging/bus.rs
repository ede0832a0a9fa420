use std::cell::Cell;

use crossbeam_channel::{Receiver, TryRecvError};

use super::Chain;
use crate::core::block::BlockData;
use crate::error::SonifyError;

/// A feed of block heads keyed by chain.
pub trait BlockSource {
    /// Start watching `chain`. The returned subscription stays live until
    /// dropped.
    fn watch(&mut self, chain: Chain) -> Result<BlockSubscription, SonifyError>;
}

/// Receiving end of a watched chain. Dropping it ends the watch.
pub struct BlockSubscription {
    chain: Chain,
    receiver: Receiver<BlockData>,
    disconnected: Cell<bool>,
}

impl BlockSubscription {
    pub fn new(chain: Chain, receiver: Receiver<BlockData>) -> Self {
        Self {
            chain,
            receiver,
            disconnected: Cell::new(false),
        }
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Newest head delivered since the last call, skipping any older ones
    /// still queued. `None` when nothing new arrived.
    pub fn latest(&self) -> Option<BlockData> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(block) => latest = Some(block),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected.set(true);
                    break;
                }
            }
        }
        latest
    }

    /// Whether the producing side has gone away and every queued head has
    /// been taken. Set by `latest`; never reads the channel itself.
    pub fn is_closed(&self) -> bool {
        self.disconnected.get()
    }
}
