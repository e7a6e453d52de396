//! Process-wide 64-bit uid allocation.
//!
//! Layout, MSB to LSB: 1 sign bit (always 0), 29 bits of seconds since the
//! service epoch, 14 bits of node id, 20 bits of per-second sequence. Ids are
//! monotone per node and unique across nodes; allocation is safe from
//! multiple scene threads. When a second's sequence space is exhausted the
//! allocator spins until the wall clock advances.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Service epoch: 2024-03-11 14:36:31 UTC.
const EPOCH_SECS: i64 = 1_710_138_991;

const SEQ_BITS: u32 = 20;
const NODE_BITS: u32 = 14;
const MAX_SEQ: i64 = (1 << SEQ_BITS) - 1;
const MAX_NODE: i64 = (1 << NODE_BITS) - 1;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Uid(i64);

impl Uid {
    pub const ZERO: Uid = Uid(0);

    #[inline]
    pub fn from_i64(v: i64) -> Uid {
        Uid(v)
    }

    #[inline]
    pub fn to_i64(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Node id embedded in this uid.
    #[inline]
    pub fn node(self) -> i64 {
        (self.0 >> SEQ_BITS) & MAX_NODE
    }

    /// Seconds since the service epoch embedded in this uid.
    #[inline]
    pub fn seconds(self) -> i64 {
        self.0 >> (SEQ_BITS + NODE_BITS)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({})", self.0)
    }
}

struct AllocState {
    last_secs: i64,
    seq: i64,
}

static NODE_ID: AtomicI64 = AtomicI64::new(0);
static ALLOC: Mutex<AllocState> = Mutex::new(AllocState {
    last_secs: -1,
    seq: 0,
});

/// Set the node id for this process. Node id ranges are assigned at
/// deployment; an out-of-range id is a deployment error and aborts startup.
pub fn init(node_id: i64) {
    assert!(
        (0..=MAX_NODE).contains(&node_id),
        "node id overflow, node id: {node_id}"
    );
    NODE_ID.store(node_id, Ordering::Relaxed);
}

fn now_secs() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    secs - EPOCH_SECS
}

/// Allocate a fresh uid.
pub fn gen() -> Uid {
    let node = NODE_ID.load(Ordering::Relaxed);
    let mut state = ALLOC.lock().unwrap_or_else(|e| e.into_inner());
    loop {
        let t = now_secs();
        if t == state.last_secs {
            if state.seq >= MAX_SEQ {
                // Sequence space for this second is spent; wait the clock out.
                std::hint::spin_loop();
                continue;
            }
            state.seq += 1;
        } else {
            state.last_secs = t;
            state.seq = 0;
        }
        let id =
            ((state.last_secs << (SEQ_BITS + NODE_BITS)) | (node << SEQ_BITS) | state.seq)
                & i64::MAX;
        return Uid(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    // Tests that reconfigure or observe the node id must not interleave.
    static NODE_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn zero_is_invalid() {
        assert!(!Uid::ZERO.is_valid());
        assert!(Uid::from_i64(1).is_valid());
    }

    #[test]
    #[should_panic(expected = "node id overflow")]
    fn init_rejects_out_of_range_node() {
        init(MAX_NODE + 1);
    }

    #[test]
    fn node_id_round_trips() {
        let _guard = NODE_GUARD.lock().unwrap_or_else(|e| e.into_inner());
        init(4095);
        let id = gen();
        assert_eq!(id.node(), 4095);
        assert!(id.seconds() > 0);
        init(0);
    }

    #[test]
    fn ids_are_unique_and_increasing_within_a_thread() {
        let _guard = NODE_GUARD.lock().unwrap_or_else(|e| e.into_inner());
        let mut prev = Uid::ZERO;
        for _ in 0..10_000 {
            let id = gen();
            assert!(id > prev, "{id} not above {prev}");
            prev = id;
        }
    }

    #[test]
    fn concurrent_allocation_yields_distinct_ids() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| (0..5_000).map(|_| gen()).collect::<Vec<_>>()))
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().expect("allocator thread") {
                assert!(seen.insert(id), "duplicate uid {id}");
            }
        }
    }
}
