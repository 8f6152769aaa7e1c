pub mod codec;
pub mod hash;
pub mod scan;
pub mod service;
pub mod watcher;
