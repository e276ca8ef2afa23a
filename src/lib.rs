// Configuration (TOML + env overrides)
pub mod config;

// Channel events and typed payloads
pub mod event;

// Derived state store and ingestion metrics
pub mod state;

// Per-subsystem log sequences
pub mod logs;

// Liveness watchdogs
pub mod watchdog;

// Referee change-suppression filter
pub mod referee;

// Event routing and session loop
pub mod dispatch;

// Event channel transports
pub mod channel;
