pub mod local_cache;
pub mod remote;

pub use local_cache::LocalProgressCache;
pub use remote::HttpBackend;
