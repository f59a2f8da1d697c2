pub mod covered_calls;
pub mod speculative;
pub mod wheel;
