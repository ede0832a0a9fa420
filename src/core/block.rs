//! Block metadata as delivered by a block-event source.

/// Raw hash bytes of a block, decoded from its textual `0x…` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHash(Vec<u8>);

impl BlockHash {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex hash, with or without the `0x` prefix.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() || digits.len() % 2 != 0 {
            return None;
        }

        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte at offset 1, the one the velocity is derived from.
    pub fn second_byte(&self) -> Option<u8> {
        self.0.get(1).copied()
    }

    pub fn to_hex(&self) -> String {
        let mut text = String::with_capacity(2 + self.0.len() * 2);
        text.push_str("0x");
        for byte in &self.0 {
            text.push_str(&format!("{:02x}", byte));
        }
        text
    }
}

/// One block head. Fields a source could not provide are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockData {
    pub number: Option<u64>,
    pub hash: Option<BlockHash>,
    pub gas_used: u64,
}

impl BlockData {
    pub fn new(number: u64, hash: BlockHash, gas_used: u64) -> Self {
        Self {
            number: Some(number),
            hash: Some(hash),
            gas_used,
        }
    }

    /// A block that can be mapped to a note: number and a hash of at least
    /// two bytes are both present.
    pub fn validated(&self) -> Option<ValidBlock> {
        let number = self.number?;
        let hash = self.hash.as_ref()?;
        let hash_byte = hash.second_byte()?;
        Some(ValidBlock {
            number,
            hash_byte,
            gas_used: self.gas_used,
        })
    }
}

/// The parts of a block the note mapping reads, once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidBlock {
    pub number: u64,
    pub hash_byte: u8,
    pub gas_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_from_hex_strips_prefix() {
        let hash = BlockHash::from_hex("0x000aff").unwrap();
        assert_eq!(hash.as_bytes(), &[0x00, 0x0a, 0xff]);
        assert_eq!(hash.second_byte(), Some(0x0a));
        assert_eq!(hash.to_hex(), "0x000aff");
    }

    #[test]
    fn test_hash_from_hex_rejects_garbage() {
        assert!(BlockHash::from_hex("0x").is_none());
        assert!(BlockHash::from_hex("0xabc").is_none());
        assert!(BlockHash::from_hex("0xzz11").is_none());
    }

    #[test]
    fn test_validation_requires_number_and_hash() {
        let hash = BlockHash::from_bytes(vec![1, 2, 3]);
        assert!(BlockData::new(7, hash.clone(), 0).validated().is_some());

        let missing_number = BlockData { number: None, hash: Some(hash), gas_used: 0 };
        assert!(missing_number.validated().is_none());

        let missing_hash = BlockData { number: Some(7), hash: None, gas_used: 0 };
        assert!(missing_hash.validated().is_none());

        let short_hash = BlockData::new(7, BlockHash::from_bytes(vec![9]), 0);
        assert!(short_hash.validated().is_none());
    }
}
