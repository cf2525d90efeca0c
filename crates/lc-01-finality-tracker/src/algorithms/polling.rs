//! # Finalized Block Walk
//!
//! Polling support: collect the blocks finalized since the last check by
//! walking parent hashes back from the new head, then search them for the
//! submitted transaction.

use crate::domain::{hash_hex, Block, ChainHead, Hash, TransportError};
use crate::ports::TransportPort;

/// Blocks with height in `(last_checked, head.number]`, in ascending order.
pub async fn fetch_new_blocks<T>(
    transport: &T,
    last_checked: u64,
    head: &ChainHead,
) -> Result<Vec<Block>, TransportError>
where
    T: TransportPort + ?Sized,
{
    let mut blocks = Vec::new();
    let mut cursor = head.hash;
    let mut expected = head.number;

    while expected > last_checked {
        let block = transport
            .block_by_hash(&cursor)
            .await?
            .ok_or_else(|| TransportError::BlockNotFound(hash_hex(&cursor)))?;

        if block.number != expected {
            return Err(TransportError::Rpc(format!(
                "block {} reports height {}, expected {}",
                hash_hex(&cursor),
                block.number,
                expected
            )));
        }

        cursor = block.parent_hash;
        expected -= 1;
        blocks.push(block);
    }

    blocks.reverse();
    Ok(blocks)
}

/// First block containing `tx_hash`, with the transaction's index.
pub fn locate_transaction<'a>(blocks: &'a [Block], tx_hash: &Hash) -> Option<(&'a Block, u32)> {
    blocks
        .iter()
        .find_map(|block| block.position_of(tx_hash).map(|index| (block, index)))
}
