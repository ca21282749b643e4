//! Solidity ABI encoding for the calls made against campaign, factory and
//! price feed contracts.
//!
//! Only the shapes those contracts use are supported: static `uint256`,
//! `int256`, `address` words, dynamic `string`, and arrays of tuples mixing
//! the two.

use super::campaign::{CampaignSummary, Tier};
use super::oracle::RoundData;
use anyhow::{Context, Result, anyhow, bail};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

pub const WORD: usize = 32;

pub type Selector = [u8; 4];

// Campaign getters
pub const NAME: Selector = [0x06, 0xfd, 0xde, 0x03]; // name()
pub const DESCRIPTION: Selector = [0x72, 0x84, 0xe4, 0x16]; // description()
pub const DEADLINE: Selector = [0x29, 0xdc, 0xb0, 0xcf]; // deadline()
pub const GOAL: Selector = [0x40, 0x19, 0x38, 0x83]; // goal()
pub const BALANCE: Selector = [0x6f, 0x9f, 0xb9, 0x8a]; // getContractBalance()
pub const TIERS: Selector = [0xde, 0x17, 0x05, 0x70]; // getTiers()
pub const OWNER: Selector = [0x8d, 0xa5, 0xcb, 0x5b]; // owner()
pub const STATE: Selector = [0xc1, 0x9d, 0x93, 0xfb]; // state()

// Campaign writes
pub const ADD_TIER: Selector = [0x8e, 0xce, 0x7b, 0x91]; // addTier(string,uint256)
pub const REMOVE_TIER: Selector = [0x74, 0x97, 0x21, 0x1b]; // removeTier(uint256)
pub const FUND: Selector = [0xca, 0x1d, 0x20, 0x9d]; // fund(uint256)

// Factory and price feed
pub const ALL_CAMPAIGNS: Selector = [0x86, 0xcd, 0xf6, 0x04]; // getAllCampaigns()
pub const LATEST_ROUND_DATA: Selector = [0xfe, 0xaf, 0x96, 0x8c]; // latestRoundData()

/// An argument of an encoded call.
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    Uint(&'a BigUint),
    Text(&'a str),
}

fn uint_word(value: &BigUint) -> Result<[u8; WORD]> {
    let bytes = value.to_bytes_be();
    if bytes.len() > WORD {
        bail!("Value {value} does not fit in uint256");
    }
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Encodes a call as selector, static head, then dynamic tail.
pub fn encode_call(selector: Selector, args: &[Token<'_>]) -> Result<Vec<u8>> {
    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            Token::Uint(value) => head.extend_from_slice(&uint_word(value)?),
            Token::Text(text) => {
                let offset = BigUint::from(head_len + tail.len());
                head.extend_from_slice(&uint_word(&offset)?);
                tail.extend_from_slice(&uint_word(&BigUint::from(text.len()))?);
                tail.extend_from_slice(text.as_bytes());
                tail.resize(tail.len().next_multiple_of(WORD), 0);
            }
        }
    }

    let mut data = Vec::with_capacity(4 + head.len() + tail.len());
    data.extend_from_slice(&selector);
    data.extend(head);
    data.extend(tail);
    Ok(data)
}

pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub fn from_hex(input: &str) -> Result<Vec<u8>> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(digits).with_context(|| format!("Invalid hex data: '{input}'"))
}

/// Whether `input` is a `0x`-prefixed 20-byte hex address. Checksum casing is
/// not verified.
pub fn is_address(input: &str) -> bool {
    input
        .strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Random access reader over returned ABI data. Offsets are in bytes.
pub struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                anyhow!(
                    "ABI data truncated: need {len} bytes at offset {offset}, have {}",
                    self.data.len()
                )
            })
    }

    pub fn uint(&self, offset: usize) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(self.slice(offset, WORD)?))
    }

    pub fn int(&self, offset: usize) -> Result<BigInt> {
        Ok(BigInt::from_signed_bytes_be(self.slice(offset, WORD)?))
    }

    pub fn address(&self, offset: usize) -> Result<String> {
        let word = self.slice(offset, WORD)?;
        Ok(format!("0x{}", hex::encode(&word[12..])))
    }

    fn offset(&self, offset: usize) -> Result<usize> {
        let value = self.uint(offset)?;
        value
            .to_usize()
            .ok_or_else(|| anyhow!("ABI offset {value} out of range"))
    }

    /// Reads the string whose offset, relative to `base`, is stored at `head`.
    pub fn string(&self, head: usize, base: usize) -> Result<String> {
        let start = base
            .checked_add(self.offset(head)?)
            .ok_or_else(|| anyhow!("ABI string offset overflow"))?;
        let len = self.offset(start)?;
        let bytes = self.slice(start + WORD, len)?;
        String::from_utf8(bytes.to_vec()).context("ABI string is not valid UTF-8")
    }

    /// Start offsets of the elements of a dynamic-tuple array whose offset is
    /// stored at `head`.
    fn tuple_array(&self, head: usize) -> Result<Vec<usize>> {
        let array = self.offset(head)?;
        let len = self.offset(array)?;
        let items = array + WORD;
        (0..len)
            .map(|i| {
                let relative = self.offset(items + i * WORD)?;
                items
                    .checked_add(relative)
                    .ok_or_else(|| anyhow!("ABI tuple offset overflow"))
            })
            .collect()
    }
}

pub fn decode_uint(data: &[u8]) -> Result<BigUint> {
    Decoder::new(data).uint(0)
}

pub fn decode_string(data: &[u8]) -> Result<String> {
    Decoder::new(data).string(0, 0)
}

pub fn decode_address(data: &[u8]) -> Result<String> {
    Decoder::new(data).address(0)
}

/// Decodes `(uint80, int256, uint256, uint256, uint80)`.
pub fn decode_round(data: &[u8]) -> Result<RoundData> {
    let d = Decoder::new(data);
    Ok(RoundData {
        round_id: d.uint(0)?,
        answer: d.int(WORD)?,
        started_at: d.uint(2 * WORD)?,
        updated_at: d.uint(3 * WORD)?,
        answered_in_round: d.uint(4 * WORD)?,
    })
}

/// Decodes `(string name, uint256 amount, uint256 backers)[]`.
pub fn decode_tiers(data: &[u8]) -> Result<Vec<Tier>> {
    let d = Decoder::new(data);
    d.tuple_array(0)?
        .into_iter()
        .enumerate()
        .map(|(index, tuple)| {
            Ok(Tier {
                name: d.string(tuple, tuple)?,
                amount: d.uint(tuple + WORD)?,
                backers: d.uint(tuple + 2 * WORD)?,
                index,
            })
        })
        .collect()
}

/// Decodes `(address campaign, address owner, string name, ...)[]`. Trailing
/// tuple members are ignored.
pub fn decode_campaigns(data: &[u8]) -> Result<Vec<CampaignSummary>> {
    let d = Decoder::new(data);
    d.tuple_array(0)?
        .into_iter()
        .map(|tuple| {
            Ok(CampaignSummary {
                address: d.address(tuple)?,
                owner: d.address(tuple + WORD)?,
                name: d.string(tuple + 2 * WORD, tuple)?,
            })
        })
        .collect()
}
