// 配额记录存储
// 内存实现用于单实例部署，Redis 实现用于多实例共享

pub mod keys;
pub mod memory;
pub mod redis_store;

pub use memory::MemoryQuotaStore;
pub use redis_store::RedisQuotaStore;
