//! Proof of work: compact target expansion and nonce search

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use primitive_types::U256;
use tracing::{debug, info, warn};

use crate::block::{hash_to_u256, header_hash, header_prefix};
use crate::error::{Result, WireError};
use crate::hash::double_sha256;
use crate::types::*;

/// How often (in attempts) the deadline and cancel flag are polled
const POLL_INTERVAL: u64 = 1024;

/// ExpandTarget: 𝔹⁴ → ℕ
///
/// For compact bits b[0..4] as stored on the wire:
/// 1. exponent = b[3]
/// 2. coefficient = b[0..3] read little-endian
/// 3. target = coefficient × 256^(exponent − 3)
pub fn target_from_bits_bytes(bits: [u8; 4]) -> Result<U256> {
    let exponent = bits[3] as usize;
    let coefficient = U256::from(u32::from_le_bytes([bits[0], bits[1], bits[2], 0]));

    if exponent <= 3 {
        return Ok(coefficient >> (8 * (3 - exponent)));
    }

    let shift = 8 * (exponent - 3);
    if coefficient.bits() + shift > 256 {
        return Err(WireError::InvalidBits(u32::from_le_bytes(bits)));
    }
    Ok(coefficient << shift)
}

/// ExpandTarget over the header's `bits` field
pub fn target_from_bits(bits: u32) -> Result<U256> {
    target_from_bits_bytes(bits.to_le_bytes())
}

/// Block target limited by the network maximum
pub fn capped_target(bits: u32, max_target: U256) -> Result<U256> {
    Ok(target_from_bits(bits)?.min(max_target))
}

/// CheckProofOfWork: ℋ × ℕ → {true, false}
pub fn check_proof_of_work(header: &BlockHeader, target: U256) -> Result<bool> {
    Ok(header_hash(header)? < target)
}

// ============================================================================
// NONCE SEARCH
// ============================================================================

/// Budget for a single nonce search
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    /// Maximum hashes to try; `None` is unbounded
    pub max_attempts: Option<u64>,
    /// Wall-clock deadline
    pub deadline: Option<Instant>,
    /// First nonce to try; random when `None`
    pub start_nonce: Option<u64>,
}

/// A nonce whose header hash is below target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundNonce {
    pub nonce: u64,
    pub hash: U256,
    pub attempts: u64,
}

/// SearchNonce: ℋ × ℕ → ℕ
///
/// 1. Start at a random (or configured) nonce
/// 2. If header_hash < target: found
/// 3. Else nonce ← nonce + 1 mod 2^64 and retry
/// 4. Stop with TargetUnreachable when the budget runs out or `cancel` is set
pub fn search_nonce(
    header: &BlockHeader,
    target: U256,
    limits: &SearchLimits,
    cancel: Option<&AtomicBool>,
) -> Result<FoundNonce> {
    search_until(header, target, limits, || is_set(cancel))
}

/// Search and install the found nonce into the header
pub fn mine_header(header: &mut BlockHeader, target: U256, limits: &SearchLimits) -> Result<FoundNonce> {
    let found = search_nonce(header, target, limits, None)?;
    header.nonce = found.nonce;
    Ok(found)
}

/// Run `workers` independent searches from distinct random starts; first hit wins.
///
/// A configured start nonce is spread across workers by `u64::MAX / workers`.
/// The attempt budget applies to each worker.
#[cfg(feature = "parallel")]
pub fn search_nonce_parallel(
    header: &BlockHeader,
    target: U256,
    limits: &SearchLimits,
    workers: usize,
    cancel: Option<&AtomicBool>,
) -> Result<FoundNonce> {
    use rayon::prelude::*;

    let workers = workers.max(1);
    let stride = u64::MAX / workers as u64;
    let found_flag = AtomicBool::new(false);

    let results: Vec<Result<FoundNonce>> = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let worker_limits = SearchLimits {
                start_nonce: limits
                    .start_nonce
                    .map(|s| s.wrapping_add(stride.wrapping_mul(worker as u64))),
                ..limits.clone()
            };
            let result = search_until(header, target, &worker_limits, || {
                found_flag.load(Ordering::Relaxed) || is_set(cancel)
            });
            if result.is_ok() {
                found_flag.store(true, Ordering::Relaxed);
            }
            result
        })
        .collect();

    let mut total_attempts = 0u64;
    for result in results {
        match result {
            Ok(found) => return Ok(found),
            Err(WireError::TargetUnreachable { attempts }) => total_attempts += attempts,
            Err(other) => return Err(other),
        }
    }
    Err(WireError::TargetUnreachable { attempts: total_attempts })
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn search_until<F>(header: &BlockHeader, target: U256, limits: &SearchLimits, stopped: F) -> Result<FoundNonce>
where
    F: Fn() -> bool,
{
    let mut buf = header_prefix(header)?;
    let nonce_at = buf.len();
    buf.extend_from_slice(&[0u8; 8]);

    let start = limits.start_nonce.unwrap_or_else(rand::random);
    if target.is_zero() && limits.max_attempts.is_none() && limits.deadline.is_none() {
        warn!("nonce search started with zero target and no budget");
    }
    debug!(start_nonce = start, target = %format!("{:#x}", target), "starting nonce search");

    let mut nonce = start;
    let mut attempts: u64 = 0;
    loop {
        if limits.max_attempts.is_some_and(|max| attempts >= max) {
            warn!(attempts, "nonce search budget exhausted");
            return Err(WireError::TargetUnreachable { attempts });
        }
        if attempts > 0 && attempts % POLL_INTERVAL == 0 {
            let expired = limits.deadline.is_some_and(|d| Instant::now() >= d);
            if expired || stopped() {
                debug!(attempts, expired, "nonce search stopped");
                return Err(WireError::TargetUnreachable { attempts });
            }
        }

        buf[nonce_at..].copy_from_slice(&nonce.to_le_bytes());
        let hash = hash_to_u256(&double_sha256(&buf));
        attempts += 1;

        if hash < target {
            info!(nonce, attempts, "found nonce");
            return Ok(FoundNonce { nonce, hash, attempts });
        }
        nonce = nonce.wrapping_add(1);
    }
}

fn is_set(flag: Option<&AtomicBool>) -> bool {
    flag.is_some_and(|f| f.load(Ordering::Relaxed))
}
