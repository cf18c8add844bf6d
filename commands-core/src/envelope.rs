//! 执行包裹（Envelope）
//!
//! 一个命令实例 = 属性（`C`）+ 错误集合 + 结果。
//! 包裹固定了调用顺序：先校验，校验通过才执行操作体，并捕获其返回值。
//! 不变式：`result` 为 `Some` 当且仅当操作体已执行并成功返回。
//!
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde_json::{Map, Value};

use crate::attributes::{Attributes, filter_known};
use crate::command::Command;
use crate::error::{CommandError, CommandInvalid, CommandResult};
use crate::remote::{RemoteResponse, merge_remote_errors};
use crate::validation::Errors;

pub struct Envelope<C: Command> {
    command: C,
    errors: Errors,
    result: Option<C::Output>,
}

impl<C: Command> Envelope<C> {
    /// 以属性构造命令：只保留声明过的属性，未知键静默丢弃
    pub fn new(attributes: Attributes) -> CommandResult<Self> {
        let known = filter_known::<C>(attributes);
        let command: C = serde_json::from_value(Value::Object(known))?;
        Ok(Self::from_command(command))
    }

    /// 包裹一个已构建的命令
    pub fn from_command(command: C) -> Self {
        Self {
            command,
            errors: Errors::new(),
            result: None,
        }
    }

    /// 软调用
    ///
    /// - 已捕获结果时直接返回，不会再次执行操作体；
    /// - 校验失败返回 `Ok(None)`，操作体不执行；
    /// - 校验通过则执行操作体一次并捕获结果。
    pub fn call_soft(&mut self) -> CommandResult<Option<&C::Output>> {
        if self.result.is_some() {
            return Ok(self.result.as_ref());
        }

        self.errors.clear();
        self.command.validate(&mut self.errors);
        if !self.errors.is_empty() {
            tracing::debug!(command = C::NAME, errors = %self.errors, "validation failed");
            return Ok(None);
        }

        let span = tracing::info_span!("command", name = C::NAME);
        let outcome = {
            let _guard = span.enter();
            self.command.perform(&mut self.errors)
        };

        match outcome {
            Ok(output) => {
                tracing::debug!(command = C::NAME, errors = self.errors.len(), "command performed");
                self.result = Some(output);
                Ok(self.result.as_ref())
            }
            Err(CommandError::Abort) => Err(self.invalid()),
            Err(err) => Err(err),
        }
    }

    /// 严格调用：执行后错误集合非空则返回 [`CommandError::Invalid`]
    pub fn call_strict(&mut self) -> CommandResult<&C::Output> {
        self.call_soft()?;
        if self.failure() {
            return Err(self.invalid());
        }
        match self.result.as_ref() {
            Some(output) => Ok(output),
            None => Err(self.invalid()),
        }
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn failure(&self) -> bool {
        !self.success()
    }

    /// 合并远端错误（属性名加 `remote_` 前缀）
    pub fn merge_remote_errors<R: RemoteResponse + ?Sized>(&mut self, response: &R) -> usize {
        merge_remote_errors(&mut self.errors, response)
    }

    /// 按属性分组的错误视图
    pub fn errors_as_json(&self) -> Map<String, Value> {
        self.errors.as_json()
    }

    /// 无条件返回携带当前命令快照的 [`CommandError::Invalid`]
    pub fn raise_invalid<T>(&self) -> CommandResult<T> {
        Err(self.invalid())
    }

    fn invalid(&self) -> CommandError {
        CommandInvalid::new(C::NAME, self.attributes(), self.errors.clone()).into()
    }

    /// 属性的 JSON 视图；无法序列化时为 `null` 并记录告警
    pub fn attributes(&self) -> Value {
        match serde_json::to_value(&self.command) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(command = C::NAME, error = %err, "command attributes are not serializable");
                Value::Null
            }
        }
    }

    pub fn name(&self) -> &'static str {
        C::NAME
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    pub fn result(&self) -> Option<&C::Output> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<C::Output> {
        self.result
    }

    /// 严格取出结果：失败或未执行时返回 [`CommandError::Invalid`]
    pub fn into_output(mut self) -> CommandResult<C::Output> {
        if self.failure() {
            return Err(self.invalid());
        }
        match self.result.take() {
            Some(output) => Ok(output),
            None => Err(self.invalid()),
        }
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    pub fn command_mut(&mut self) -> &mut C {
        &mut self.command
    }

    pub fn into_command(self) -> C {
        self.command
    }
}

impl<C: Command> Deref for Envelope<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.command
    }
}

impl<C: Command> DerefMut for Envelope<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.command
    }
}

impl<C> fmt::Debug for Envelope<C>
where
    C: Command + fmt::Debug,
    C::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("command", &self.command)
            .field("errors", &self.errors)
            .field("result", &self.result)
            .finish()
    }
}
