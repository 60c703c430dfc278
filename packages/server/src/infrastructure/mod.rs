//! Infrastructure layer.
//!
//! ドメイン層のインターフェースの具体的な実装と、外部とやり取りする DTO。

pub mod dto;
pub mod registry;

pub use registry::{InMemoryRoomRegistry, RegistryConfig};
