//! Public proposals and ongoing referendums from the democracy pallet.

use codec::{Decode, Encode};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::account::{AccountId, DEFAULT_SS58_PREFIX};
use super::codec::{storage_prefix, to_hex, twox_64_concat, DecodeError};
use super::{read_storage, QueryError};
use crate::rpc::RpcClient;

const PALLET: &str = "Democracy";

type Hash = [u8; 32];

/// Approval threshold of a referendum.
#[derive(Encode, Decode, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteThreshold {
    SuperMajorityApprove,
    SuperMajorityAgainst,
    SimpleMajority,
}

#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    pub ayes: u128,
    pub nays: u128,
    pub turnout: u128,
}

#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct ReferendumStatus {
    pub end: u32,
    pub proposal_hash: Hash,
    pub threshold: VoteThreshold,
    pub delay: u32,
    pub tally: Tally,
}

/// Stored value of `ReferendumInfoOf`.
#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub enum ReferendumInfo {
    Ongoing(ReferendumStatus),
    Finished { approved: bool, end: u32 },
}

/// A public proposal waiting to be tabled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub index: u32,
    pub image_hash: String,
    pub proposer: String,
    pub deposit: Option<u128>,
    pub seconds: usize,
}

/// A referendum that is still open for votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referendum {
    pub index: u32,
    pub image_hash: String,
    pub end: u32,
    pub threshold: VoteThreshold,
    pub delay: u32,
    pub ayes: u128,
    pub nays: u128,
    pub turnout: u128,
}

impl Referendum {
    fn from_status(index: u32, status: ReferendumStatus) -> Self {
        Self {
            index,
            image_hash: to_hex(&status.proposal_hash),
            end: status.end,
            threshold: status.threshold,
            delay: status.delay,
            ayes: status.tally.ayes,
            nays: status.tally.nays,
            turnout: status.tally.turnout,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemocracyOverview {
    pub referendums: Vec<Referendum>,
    pub proposals: Vec<Proposal>,
}

fn item_key(item: &str, index: u32) -> Vec<u8> {
    let mut key = storage_prefix(PALLET, item);
    key.extend(twox_64_concat(&index.encode()));
    key
}

/// `ReferendumInfoOf` key of referendum `index`.
pub fn referendum_key(index: u32) -> Vec<u8> {
    item_key("ReferendumInfoOf", index)
}

/// `DepositOf` key of proposal `index`.
pub fn deposit_key(index: u32) -> Vec<u8> {
    item_key("DepositOf", index)
}

/// Decode `PublicProps`: `(index, preimage hash, proposer)` triples.
pub fn decode_public_props(data: &[u8]) -> Result<Vec<(u32, Hash, Hash)>, DecodeError> {
    Ok(Vec::<(u32, Hash, Hash)>::decode(&mut &data[..])?)
}

/// Decode `DepositOf`: the seconding accounts and the locked amount.
pub fn decode_deposit(data: &[u8]) -> Result<(usize, u128), DecodeError> {
    let (seconds, deposit) = <(Vec<Hash>, u128)>::decode(&mut &data[..])?;
    Ok((seconds.len(), deposit))
}

/// Decode a `ReferendumInfoOf` value. Finished referendums yield `None`.
pub fn decode_referendum(index: u32, data: &[u8]) -> Result<Option<Referendum>, DecodeError> {
    match ReferendumInfo::decode(&mut &data[..])? {
        ReferendumInfo::Ongoing(status) => Ok(Some(Referendum::from_status(index, status))),
        ReferendumInfo::Finished { .. } => Ok(None),
    }
}

async fn read_u32(client: &RpcClient, item: &str) -> Result<u32, QueryError> {
    match read_storage(client, &storage_prefix(PALLET, item)).await? {
        Some(bytes) => Ok(u32::decode(&mut &bytes[..]).map_err(DecodeError::from)?),
        None => Ok(0),
    }
}

/// Public proposals with their deposits.
pub async fn proposals(client: &RpcClient) -> Result<Vec<Proposal>, QueryError> {
    let props = match read_storage(client, &storage_prefix(PALLET, "PublicProps")).await? {
        Some(bytes) => decode_public_props(&bytes)?,
        None => Vec::new(),
    };
    tracing::debug!("{} public proposal(s)", props.len());
    try_join_all(props.into_iter().map(|(index, hash, proposer)| async move {
        let deposit = match read_storage(client, &deposit_key(index)).await? {
            Some(bytes) => Some(decode_deposit(&bytes)?),
            None => None,
        };
        Ok::<_, QueryError>(Proposal {
            index,
            image_hash: to_hex(&hash),
            proposer: AccountId(proposer).to_ss58(DEFAULT_SS58_PREFIX),
            deposit: deposit.map(|(_, amount)| amount),
            seconds: deposit.map(|(seconds, _)| seconds).unwrap_or_default(),
        })
    }))
    .await
}

/// Referendums between `LowestUnbaked` and `ReferendumCount` that are still ongoing.
pub async fn referendums(client: &RpcClient) -> Result<Vec<Referendum>, QueryError> {
    let (lowest, count) = tokio::try_join!(read_u32(client, "LowestUnbaked"), read_u32(client, "ReferendumCount"))?;
    tracing::debug!("referendums {}..{}", lowest, count);
    let infos = try_join_all((lowest..count).map(|index| async move {
        let value = read_storage(client, &referendum_key(index)).await?;
        Ok::<_, QueryError>((index, value))
    }))
    .await?;

    let mut referendums = Vec::new();
    for (index, value) in infos {
        if let Some(bytes) = value {
            if let Some(referendum) = decode_referendum(index, &bytes)? {
                referendums.push(referendum);
            }
        }
    }
    Ok(referendums)
}

/// Ongoing referendums and public proposals.
pub async fn overview(client: &RpcClient) -> Result<DemocracyOverview, QueryError> {
    let (referendums, proposals) = tokio::try_join!(referendums(client), proposals(client))?;
    Ok(DemocracyOverview { referendums, proposals })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ongoing(end: u32) -> ReferendumInfo {
        ReferendumInfo::Ongoing(ReferendumStatus {
            end,
            proposal_hash: [0xab; 32],
            threshold: VoteThreshold::SuperMajorityApprove,
            delay: 10,
            tally: Tally { ayes: 300, nays: 100, turnout: 400 },
        })
    }

    #[test]
    fn ongoing_referendum_is_listed() {
        let referendum = decode_referendum(3, &ongoing(120).encode()).unwrap().unwrap();
        assert_eq!(referendum.index, 3);
        assert_eq!(referendum.end, 120);
        assert_eq!(referendum.image_hash, to_hex(&[0xab; 32]));
        assert_eq!(referendum.threshold, VoteThreshold::SuperMajorityApprove);
        assert_eq!((referendum.ayes, referendum.nays, referendum.turnout), (300, 100, 400));
    }

    #[test]
    fn finished_referendum_is_skipped() {
        let finished = ReferendumInfo::Finished { approved: true, end: 90 }.encode();
        // variant index 1, then approved and end
        assert_eq!(finished, vec![1, 1, 90, 0, 0, 0]);
        assert_eq!(decode_referendum(0, &finished).unwrap(), None);
        assert!(decode_referendum(0, &[7]).is_err());
    }

    #[test]
    fn public_props_and_deposits() {
        let props = vec![(0u32, [1u8; 32], [2u8; 32]), (4u32, [3u8; 32], [4u8; 32])].encode();
        let decoded = decode_public_props(&props).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].0, 4);
        assert_eq!(decoded[1].1, [3u8; 32]);

        let deposit = (vec![[2u8; 32], [5u8; 32]], 1_000u128).encode();
        assert_eq!(decode_deposit(&deposit).unwrap(), (2, 1_000));
    }

    #[test]
    fn map_keys_use_twox_64_concat() {
        let key = referendum_key(2);
        assert!(key.starts_with(&storage_prefix(PALLET, "ReferendumInfoOf")));
        assert_eq!(key.len(), 32 + 8 + 4);
        assert!(key.ends_with(&[2, 0, 0, 0]));
        assert_ne!(referendum_key(2), deposit_key(2));
    }
}
