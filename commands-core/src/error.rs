//! 命令层统一错误定义
//!
//! 校验失败本身不是错误（记录在 [`Errors`] 中，通过 `success()` 查看）；
//! 只有严格调用、显式中止、未实现的操作体以及注册/解析问题才会以
//! `CommandError` 的形式向上传播。
//!
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::validation::Errors;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CommandError {
    // --- 执行 ---
    #[error("not implemented: command={0}")]
    NotImplemented(&'static str),
    #[error(transparent)]
    Invalid(Box<CommandInvalid>),
    #[error("command aborted by operation body")]
    Abort,

    // --- 属性/参数 ---
    #[error("attribute error: {source}")]
    Attributes {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    // --- 注册/解析 ---
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown operation: host={host}, operation={operation}")]
    UnknownOperation {
        host: &'static str,
        operation: String,
    },
    #[error("operation level mismatch: operation={operation}, registered as {registered}")]
    LevelMismatch {
        operation: String,
        registered: &'static str,
    },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },
}

/// 统一 Result 类型别名
pub type CommandResult<T> = Result<T, CommandError>;

impl CommandError {
    /// 是否为“命令无效”错误（严格调用或显式中止产生）
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// 取出无效命令的诊断信息
    pub fn as_invalid(&self) -> Option<&CommandInvalid> {
        match self {
            Self::Invalid(invalid) => Some(invalid),
            _ => None,
        }
    }
}

/// 命令无效
///
/// 携带出错命令的快照（名称、属性与错误集合），调用方据此诊断。
#[derive(Debug, Clone)]
pub struct CommandInvalid {
    command: &'static str,
    attributes: Value,
    errors: Errors,
}

impl CommandInvalid {
    pub fn new(command: &'static str, attributes: Value, errors: Errors) -> Self {
        Self {
            command,
            attributes,
            errors,
        }
    }

    /// 命令的稳定名称
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// 失败时的属性快照
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// 失败时的错误集合
    pub fn errors(&self) -> &Errors {
        &self.errors
    }
}

impl fmt::Display for CommandInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not execute command ({}): attributes={}, errors=[{}]",
            self.command, self.attributes, self.errors
        )
    }
}

impl std::error::Error for CommandInvalid {}

impl From<CommandInvalid> for CommandError {
    fn from(invalid: CommandInvalid) -> Self {
        CommandError::Invalid(Box::new(invalid))
    }
}
