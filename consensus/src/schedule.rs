//! Round-robin proposer schedule over fixed slot intervals.
//!
//! Slot `k` after a parent block opens at `parent.timestamp + k * interval`
//! and belongs to authority `(parent.number + k) % n`. A missed slot hands
//! authority to the next proposer in rotation, so liveness survives any
//! minority of offline authorities.

use meridian_chain::Header;
use meridian_types::{Address, ChainParams, Timestamp};

/// The authority entitled to propose at `ts` on top of `parent`.
///
/// `None` when `ts` is not a valid slot for that parent: at or before the
/// parent's timestamp, off the slot grid, or with no authorities at all.
pub fn proposer_for(parent: &Header, ts: Timestamp, params: &ChainParams) -> Option<Address> {
    let n = params.authorities.len() as u64;
    if n == 0 {
        return None;
    }
    let delta = ts.as_secs().checked_sub(parent.timestamp.as_secs())?;
    if delta == 0 || delta % params.block_interval_secs != 0 {
        return None;
    }
    let k = delta / params.block_interval_secs;
    let idx = ((parent.number.wrapping_add(k)) % n) as usize;
    Some(params.authorities[idx])
}

/// The earliest slot at or after `now` in which `proposer` may pack on top
/// of `parent`. `None` when the address is not an authority.
pub fn next_slot(
    parent: &Header,
    proposer: Address,
    now: Timestamp,
    params: &ChainParams,
) -> Option<Timestamp> {
    if !params.is_authority(&proposer) {
        return None;
    }
    let interval = params.block_interval_secs;
    let parent_ts = parent.timestamp.as_secs();
    let elapsed = now.as_secs().saturating_sub(parent_ts);
    let first = (elapsed.div_ceil(interval)).max(1);
    let n = params.authorities.len() as u64;
    // rotation covers every authority within n consecutive slots
    for k in first..first + n {
        let ts = Timestamp::new(parent_ts + k * interval);
        if proposer_for(parent, ts, params) == Some(proposer) {
            return Some(ts);
        }
    }
    None
}
