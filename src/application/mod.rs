//! Application services orchestrating the order lifecycle.
//!
//! `OrderService` handles placement, `SettlementService` handles payment and
//! funding. Both are stateless and own only the injected store handles, so
//! concurrency control reduces to the stores' conditional updates.

pub mod order;
pub mod settlement;
