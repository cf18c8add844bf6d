//! 命令基础库（commands-core）
//!
//! 提供“命令对象”模式的核心构件：
//! - 命令（`command`）：属性声明、校验钩子与操作体；
//! - 执行包裹（`envelope`）：校验门控、结果捕获、软/严格两种调用；
//! - 错误集合（`validation`）：结构化、有序、可分组输出的错误容器；
//! - 远端错误合并（`remote`）与属性存在性判断（`presence`）。
//!
//! 规则求值交给外部校验框架（`validator`），本 crate 只定义调用外壳。
//!
//! 典型用法：
//! 1. 用 `#[command]` 声明命令属性；
//! 2. 为其实现 [`Command`]（`validate` / `perform`）；
//! 3. 通过 `Command::call` / `Command::call_strict` 或 `commander!` 生成的入口调用。
//!
pub mod attributes;
pub mod command;
pub mod envelope;
pub mod error;
pub mod presence;
pub mod remote;
pub mod validation;

pub use attributes::{
    Attributes, CommandAttributes, IntoAttributes, filter_known, merge_arguments, to_attributes,
};
pub use command::{Command, Mode, invoke};
pub use envelope::Envelope;
pub use error::{CommandError, CommandInvalid, CommandResult};
pub use presence::{Presence, present};
pub use remote::{REMOTE_PREFIX, RemoteResponse, merge_remote_errors};
pub use validation::{BASE, ErrorDetail, ErrorEntry, Errors};

#[cfg(feature = "macros")]
pub use commands_macros::{command, commander};

// 过程宏生成的 ::commands_core 路径在本 crate 内同样可解析
extern crate self as commands_core;
