pub mod engine_state;
pub mod launch_strategy;
pub mod metadata;
