use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::rpc::{RpcClient, RpcError};

/// `system_health` result
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHealth {
    pub peers: u64,
    pub is_syncing: bool,
    pub should_have_peers: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    number: String,
    parent_hash: String,
    state_root: String,
    #[serde(default)]
    extrinsics_root: String,
    #[serde(default)]
    digest: Digest,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct Digest {
    logs: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct Block {
    header: Header,
    extrinsics: Vec<String>,
}

/// `chain_getBlock` result
#[derive(Clone, Debug, Deserialize)]
struct SignedBlock {
    block: Block,
}

/// Header of a block looked up by number.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub state_root: String,
    pub extrinsics_root: String,
    pub digest_logs: usize,
    pub extrinsics: usize,
}

impl BlockHeader {
    fn from_block(hash: String, block: Block) -> Self {
        let header = block.header;
        Self {
            number: parse_block_number(&header.number).unwrap_or_default(),
            hash,
            parent_hash: header.parent_hash,
            state_root: header.state_root,
            extrinsics_root: header.extrinsics_root,
            digest_logs: header.digest.logs.len(),
            extrinsics: block.extrinsics.len(),
        }
    }
}

/// Summary of the connected node and its best block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeInfo {
    pub endpoint: String,
    pub name: String,
    pub version: String,
    pub chain: String,
    pub health: NodeHealth,
    pub best_number: u64,
    pub best_hash: String,
    pub parent_hash: String,
    pub state_root: String,
    pub genesis_hash: Option<String>,
}

/// Block numbers come back as hex quantities (`"0x1a"`).
pub fn parse_block_number(s: &str) -> Option<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

/// Query the node identity, health and best header.
pub async fn node_info(client: &RpcClient) -> Result<NodeInfo, RpcError> {
    let (name, version, chain, health, header, best_hash, genesis_hash) = tokio::try_join!(
        client.call::<String>("system_name", json!([])),
        client.call::<String>("system_version", json!([])),
        client.call::<String>("system_chain", json!([])),
        client.call::<NodeHealth>("system_health", json!([])),
        client.call::<Header>("chain_getHeader", json!([])),
        client.call::<String>("chain_getBlockHash", json!([])),
        block_hash(client, 0),
    )?;
    Ok(NodeInfo {
        endpoint: client.url().to_string(),
        name,
        version,
        chain,
        health,
        best_number: parse_block_number(&header.number).unwrap_or_default(),
        best_hash,
        parent_hash: header.parent_hash,
        state_root: header.state_root,
        genesis_hash,
    })
}

/// Hash of the block at `number`, if the node knows it.
pub async fn block_hash(client: &RpcClient, number: u64) -> Result<Option<String>, RpcError> {
    client.call("chain_getBlockHash", json!([number])).await
}

/// Header of the block at `number`. `None` when the chain is not that long yet.
pub async fn block_header(client: &RpcClient, number: u64) -> Result<Option<BlockHeader>, RpcError> {
    let Some(hash) = block_hash(client, number).await? else {
        return Ok(None);
    };
    let block: Option<SignedBlock> = client.call("chain_getBlock", json!([hash])).await?;
    Ok(block.map(|signed| BlockHeader::from_block(hash, signed.block)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_numbers_are_hex() {
        assert_eq!(parse_block_number("0x1a"), Some(26));
        assert_eq!(parse_block_number("0x0"), Some(0));
        assert_eq!(parse_block_number("zz"), None);
    }

    #[test]
    fn health_uses_camel_case() {
        let health: NodeHealth =
            serde_json::from_str(r#"{"peers":3,"isSyncing":false,"shouldHavePeers":true}"#).unwrap();
        assert_eq!(health.peers, 3);
        assert!(!health.is_syncing);
        assert!(health.should_have_peers);
    }

    #[test]
    fn block_header_counts_extrinsics() {
        let signed: SignedBlock = serde_json::from_str(
            r#"{
                "block": {
                    "header": {
                        "parentHash": "0x01",
                        "number": "0x2a",
                        "stateRoot": "0x02",
                        "extrinsicsRoot": "0x03",
                        "digest": { "logs": ["0x0642", "0x0561"] }
                    },
                    "extrinsics": ["0x280403000b"]
                },
                "justifications": null
            }"#,
        )
        .unwrap();
        let header = BlockHeader::from_block("0xbeef".into(), signed.block);
        assert_eq!(header.number, 42);
        assert_eq!(header.hash, "0xbeef");
        assert_eq!(header.parent_hash, "0x01");
        assert_eq!(header.extrinsics_root, "0x03");
        assert_eq!(header.digest_logs, 2);
        assert_eq!(header.extrinsics, 1);
    }
}
