pub mod best_effort;
pub mod context;
pub mod entity;
pub mod fetcher;
pub mod orchestrator;
pub mod outcome;
pub mod retry;
