//! Identifier generation for captured records.
//!
//! The default scheme is a 64-bit snowflake:
//!
//! ```text
//!  63                       22 21        12 11          0
//! +---------------------------+------------+-------------+
//! | ms since epoch (41 bits)  | node (10)  | sequence (12)|
//! +---------------------------+------------+-------------+
//! ```
//!
//! Ids from one generator are strictly increasing. Ids from generators with
//! distinct node values never collide within the 41-bit window after the
//! configured epoch.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 2024-01-01T00:00:00Z in milliseconds since the Unix epoch.
pub const DEFAULT_EPOCH_MS: u64 = 1_704_067_200_000;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const TIMESTAMP_BITS: u32 = 41;

pub const MAX_NODE: u16 = (1 << NODE_BITS) - 1;
pub const MAX_SEQUENCE: u16 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Which identifier format new records get.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Snowflake,
    Uuid7,
}

/// Source of record identifiers, shared by every request of a shim.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// A decoded snowflake identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(u64);

impl Snowflake {
    pub fn from_parts(timestamp: u64, node: u16, sequence: u16) -> Self {
        let value = ((timestamp & TIMESTAMP_MASK) << (NODE_BITS + SEQUENCE_BITS))
            | (u64::from(node & MAX_NODE) << SEQUENCE_BITS)
            | u64::from(sequence & MAX_SEQUENCE);
        Self(value)
    }

    /// Milliseconds since the generator's epoch.
    pub fn timestamp(&self) -> u64 {
        self.0 >> (NODE_BITS + SEQUENCE_BITS)
    }

    pub fn node(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) as u16) & MAX_NODE
    }

    pub fn sequence(&self) -> u16 {
        (self.0 as u16) & MAX_SEQUENCE
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Snowflake)
    }
}

/// Milliseconds since the generator's epoch.
pub type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

struct GeneratorState {
    last_tick: Option<u64>,
    sequence: u16,
}

/// Thread-safe snowflake generator.
pub struct SnowflakeGenerator {
    node: u16,
    clock: Clock,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a generator for `node` (reduced modulo 1024) counting from `epoch_ms`.
    pub fn new(node: u16, epoch_ms: u64) -> Self {
        Self::with_clock(
            node,
            Box::new(move || unix_millis().saturating_sub(epoch_ms)),
        )
    }

    /// Generator whose node is derived from the current process id.
    pub fn for_process(epoch_ms: u64) -> Self {
        Self::new(process_node(), epoch_ms)
    }

    /// The clock returns milliseconds since the generator's epoch.
    pub fn with_clock(node: u16, clock: Clock) -> Self {
        Self {
            node: node % (MAX_NODE + 1),
            clock,
            state: Mutex::new(GeneratorState {
                last_tick: None,
                sequence: 0,
            }),
        }
    }

    pub fn node(&self) -> u16 {
        self.node
    }

    pub fn next(&self) -> Snowflake {
        let mut state = self.state.lock();
        let mut tick = (self.clock)();

        match state.last_tick {
            Some(last) if tick <= last => {
                // Same tick, or clock stepped backwards: stay on the last tick.
                tick = last;
                state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
                if state.sequence == 0 {
                    tick = self.tick_after(last);
                }
            }
            _ => state.sequence = 0,
        }

        state.last_tick = Some(tick);
        Snowflake::from_parts(tick, self.node, state.sequence)
    }

    /// First tick past `last`. Waits out the current millisecond, but a clock
    /// behind `last` moves to `last + 1` instead of stalling until it catches up.
    fn tick_after(&self, last: u64) -> u64 {
        loop {
            let now = (self.clock)();
            if now > last {
                return now;
            }
            if now < last {
                return last + 1;
            }
            std::hint::spin_loop();
        }
    }
}

impl IdGenerator for SnowflakeGenerator {
    fn next_id(&self) -> String {
        self.next().to_string()
    }
}

/// UUIDv7 ids as 32 lowercase hex characters, k-ordered by time.
#[derive(Debug, Default, Clone, Copy)]
pub struct Uuid7Generator;

impl IdGenerator for Uuid7Generator {
    fn next_id(&self) -> String {
        Uuid::now_v7().simple().to_string()
    }
}

/// Node component for this process: `pid % 1024`.
pub fn process_node() -> u16 {
    (std::process::id() % (u32::from(MAX_NODE) + 1)) as u16
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
