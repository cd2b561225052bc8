//! Camera adapters. Implement FrameSource.

pub mod directory;

pub use directory::DirectoryFrameSource;
