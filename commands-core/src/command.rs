//! 命令（Command）
//!
//! 一次性的、经过校验的工作单元：
//! - 属性由 `#[command]` 声明（见 [`CommandAttributes`]）；
//! - `validate` 把规则结果写入 [`Errors`]；
//! - `perform` 是操作体，只有校验通过才会执行，且只执行一次；
//! - 执行包裹（门控 + 结果捕获）由 [`Envelope`] 统一负责，具体命令无需关心。
//!
use serde::{Serialize, de::DeserializeOwned};

use crate::attributes::{Attributes, CommandAttributes, merge_arguments};
use crate::envelope::Envelope;
use crate::error::{CommandError, CommandResult};
use crate::validation::Errors;

/// 调用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 校验/业务失败只记录在错误集合中
    Soft,
    /// 执行后错误集合非空时返回 [`CommandError::Invalid`]
    Strict,
}

/// 命令抽象
///
/// ```
/// use commands_core::{Command, CommandResult, Errors, command};
///
/// #[command]
/// struct Greet {
///     name: String,
/// }
///
/// impl Command for Greet {
///     type Output = String;
///
///     fn validate(&self, errors: &mut Errors) {
///         if self.name.is_empty() {
///             errors.add("name", "blank");
///         }
///     }
///
///     fn perform(&mut self, _errors: &mut Errors) -> CommandResult<String> {
///         Ok(format!("hello, {}", self.name))
///     }
/// }
///
/// let greeting = Greet::call(serde_json::json!({ "name": "ada" }).as_object().cloned().unwrap())
///     .unwrap();
/// assert_eq!(greeting.as_deref(), Some("hello, ada"));
/// ```
pub trait Command: CommandAttributes + Serialize + DeserializeOwned + Send + Sized + 'static {
    /// 命令的稳定名称，默认取属性声明中的名称
    const NAME: &'static str = <Self as CommandAttributes>::COMMAND;

    /// 操作体的返回值
    type Output: Send + 'static;

    /// 规则求值：把失败写入 `errors`
    fn validate(&self, _errors: &mut Errors) {}

    /// 操作体
    ///
    /// 可以在执行中追加错误（例如远端返回的业务错误）；
    /// 需要立即中止时返回 [`CommandError::Abort`]，执行包裹会将其转换为
    /// 携带当前命令快照的 [`CommandError::Invalid`]。
    fn perform(&mut self, _errors: &mut Errors) -> CommandResult<Self::Output> {
        Err(CommandError::NotImplemented(Self::NAME))
    }

    /// 构造命令（未知属性被丢弃）
    fn construct(attributes: Attributes) -> CommandResult<Envelope<Self>> {
        Envelope::new(attributes)
    }

    /// 构造并软调用，返回操作体结果（校验失败时为 `None`）
    fn call(attributes: Attributes) -> CommandResult<Option<Self::Output>> {
        let mut envelope = Self::construct(attributes)?;
        envelope.call_soft()?;
        Ok(envelope.into_result())
    }

    /// 构造并严格调用
    fn call_strict(attributes: Attributes) -> CommandResult<Self::Output> {
        let mut envelope = Self::construct(attributes)?;
        envelope.call_strict()?;
        envelope.into_output()
    }
}

/// 以合并后的参数构造命令并按 `mode` 调用，返回命令本身
///
/// `options` 覆盖 `base` 中的同名键。Commander 生成的入口都经过这里。
pub fn invoke<C: Command>(
    base: Attributes,
    options: Attributes,
    mode: Mode,
) -> CommandResult<Envelope<C>> {
    let mut envelope = Envelope::<C>::new(merge_arguments(base, options))?;
    match mode {
        Mode::Soft => {
            envelope.call_soft()?;
        }
        Mode::Strict => {
            envelope.call_strict()?;
        }
    }
    Ok(envelope)
}
