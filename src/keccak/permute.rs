//! Keccak-f[1600] permutation.
//!
//! The permutation applies 24 rounds. Each round consists of:
//! 1. Theta (column parity mixing)
//! 2. Rho + Pi (lane rotation and transposition, fused into one pass)
//! 3. Chi (non-linear row mixing)
//! 4. Iota (round constant into lane 0)

use super::{State, PI_LANES, ROTATION_OFFSETS, ROUNDS, ROUND_CONSTANTS};

/// XOR each lane with the parity of its two neighbouring columns.
#[inline]
fn theta(state: &mut State) {
    let mut parity = [0u64; 5];
    for (x, p) in parity.iter_mut().enumerate() {
        *p = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
    }

    for x in 0..5 {
        let d = parity[(x + 4) % 5] ^ parity[(x + 1) % 5].rotate_left(1);
        for y in (0..25).step_by(5) {
            state[y + x] ^= d;
        }
    }
}

/// Rotate and move lanes, carrying one value along the Pi sequence.
#[inline]
fn rho_pi(state: &mut State) {
    let mut carried = state[1];
    for (&lane, &offset) in PI_LANES.iter().zip(ROTATION_OFFSETS.iter()) {
        let next = state[lane];
        state[lane] = carried.rotate_left(offset);
        carried = next;
    }
}

/// Row-wise `a ^= !b & c`.
#[inline]
fn chi(state: &mut State) {
    for y in (0..25).step_by(5) {
        let mut row = [0u64; 5];
        row.copy_from_slice(&state[y..y + 5]);
        for x in 0..5 {
            state[y + x] ^= !row[(x + 1) % 5] & row[(x + 2) % 5];
        }
    }
}

#[inline]
fn round(state: &mut State, round: usize) {
    theta(state);
    rho_pi(state);
    chi(state);
    state[0] ^= ROUND_CONSTANTS[round];
}

/// Apply all rounds in place.
pub(crate) fn keccak_f(state: &mut State) {
    for r in 0..ROUNDS {
        round(state, r);
    }
}

/// Complete Keccak-f[1600] permutation.
pub fn permute(state: &State) -> State {
    let mut st = *state;
    keccak_f(&mut st);
    st
}

/// Keccak-f[1600] with trace output for debugging.
///
/// Returns (final_state, round_traces) where each trace entry contains
/// the state after that round.
pub fn permute_with_trace(state: &State) -> (State, Vec<State>) {
    let mut st = *state;
    let mut traces = Vec::with_capacity(ROUNDS);

    for r in 0..ROUNDS {
        round(&mut st, r);
        traces.push(st);
    }

    (st, traces)
}
