pub mod coordinator;
pub mod matcher;
pub mod policy;
pub mod pricing;
pub mod queue;
pub mod route_cache;
pub mod scheduler;
pub mod worker;
