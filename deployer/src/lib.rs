//! MDL Deployer Library
//!
//! Submits MDL manifests to the engine and confirms the engine adopted them.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod storage;
pub mod utils;
