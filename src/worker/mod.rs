//! Salt search: a sequential miner and a pipelined worker pool.

mod cpu;
mod miner;
mod pool;

pub use cpu::WorkerStats;
pub use miner::{MiningOutcome, SaltMatch, SaltMiner};
pub use pool::{WorkerPool, DEFAULT_CHUNK_SIZE};
