use crate::erased::ErasedCommand;
use commands_core::{Attributes, Command, CommandError, CommandResult, Envelope, Mode};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// 命令构造器：按给定属性构造命令并以指定方式调用
pub type Constructor =
    Arc<dyn Fn(Attributes, Mode) -> CommandResult<Box<dyn ErasedCommand>> + Send + Sync>;

/// 按名称注册的命令表
/// - 以 `Command::NAME` 为键，重复注册覆盖旧项
/// - 运行时以类型擦除（`ErasedCommand`）方式返回命令实例
pub struct CommandRegistry {
    constructors: DashMap<&'static str, Constructor>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self {
            constructors: DashMap::new(),
        }
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令
    pub fn register<C>(&self)
    where
        C: Command,
        C::Output: Serialize,
    {
        let f: Constructor = Arc::new(|attributes: Attributes, mode: Mode| {
            let mut envelope = Envelope::<C>::new(attributes)?;
            match mode {
                Mode::Soft => {
                    envelope.call_soft()?;
                }
                Mode::Strict => {
                    envelope.call_strict()?;
                }
            }
            Ok(Box::new(envelope) as Box<dyn ErasedCommand>)
        });

        if self.constructors.insert(C::NAME, f).is_some() {
            tracing::debug!(command = C::NAME, "command re-registered");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// 已注册的命令名（按字母序）
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.constructors.iter().map(|e| *e.key()).collect();
        names.sort_unstable();
        names
    }

    /// 解析命令构造器
    pub fn resolve(&self, name: &str) -> CommandResult<Constructor> {
        self.constructors
            .get(name)
            .map(|f| f.clone())
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))
    }

    /// 构造并调用命令
    pub fn execute(
        &self,
        name: &str,
        attributes: Attributes,
        mode: Mode,
    ) -> CommandResult<Box<dyn ErasedCommand>> {
        let f = self.resolve(name)?;
        (f)(attributes, mode)
    }
}
