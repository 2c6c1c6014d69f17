//! Adapters for services outside the process. Only object storage for now.

pub mod storage;
