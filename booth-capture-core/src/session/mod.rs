pub mod delegate_pool;
pub mod manager;
