pub mod artifact_lock;
pub mod directories;
pub mod logging;
pub mod storage;
