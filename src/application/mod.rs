//! Application Layer - 应用层
//!
//! 编排领域逻辑完成各流水线阶段，通过端口访问外部能力

pub mod error;
pub mod pipeline;
pub mod ports;

pub use error::ApplicationError;
