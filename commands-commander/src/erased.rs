use commands_core::{Command, CommandError, CommandResult, Envelope, Errors};
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;

/// 类型擦除后的命令实例
///
/// 运行时 Commander 按名称分发命令，调用方拿到的是这个视图；
/// 需要具体类型时通过 [`downcast`](dyn ErasedCommand::downcast) 取回 `Envelope<C>`。
pub trait ErasedCommand: Send {
    fn name(&self) -> &'static str;

    fn success(&self) -> bool;

    fn failure(&self) -> bool {
        !self.success()
    }

    fn errors(&self) -> &Errors;

    fn errors_as_json(&self) -> Map<String, Value> {
        self.errors().as_json()
    }

    /// 操作体结果的 JSON 视图（未执行或序列化失败时为 `None`）
    fn result_value(&self) -> Option<Value>;

    fn attributes(&self) -> Value;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<C> ErasedCommand for Envelope<C>
where
    C: Command,
    C::Output: Serialize,
{
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn success(&self) -> bool {
        Envelope::success(self)
    }

    fn errors(&self) -> &Errors {
        Envelope::errors(self)
    }

    fn result_value(&self) -> Option<Value> {
        let output = self.result()?;
        match serde_json::to_value(output) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(command = C::NAME, error = %err, "result is not serializable");
                None
            }
        }
    }

    fn attributes(&self) -> Value {
        Envelope::attributes(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl dyn ErasedCommand {
    pub fn is<C: Command>(&self) -> bool {
        self.as_any().is::<Envelope<C>>()
    }

    pub fn downcast_ref<C: Command>(&self) -> Option<&Envelope<C>> {
        self.as_any().downcast_ref::<Envelope<C>>()
    }

    /// 取回具体的命令实例，类型不符时返回 [`CommandError::TypeMismatch`]
    pub fn downcast<C: Command>(self: Box<Self>) -> CommandResult<Envelope<C>> {
        let found = self.name();
        match self.into_any().downcast::<Envelope<C>>() {
            Ok(envelope) => Ok(*envelope),
            Err(_) => Err(CommandError::TypeMismatch {
                expected: C::NAME.to_string(),
                found: found.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for dyn ErasedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedCommand")
            .field("name", &self.name())
            .field("attributes", &self.attributes())
            .field("errors", self.errors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands_core::command;
    use serde_json::json;

    #[command(name = "echo")]
    struct Echo {
        text: String,
    }

    impl Command for Echo {
        type Output = String;

        fn perform(&mut self, _errors: &mut Errors) -> CommandResult<String> {
            Ok(self.text.to_uppercase())
        }
    }

    #[command(name = "other")]
    struct Other {}

    impl Command for Other {
        type Output = ();
    }

    fn erased(text: &str) -> Box<dyn ErasedCommand> {
        let mut envelope = Envelope::<Echo>::from_command(Echo { text: text.into() });
        envelope.call_soft().unwrap();
        Box::new(envelope)
    }

    // 测试擦除视图暴露名称、属性与结果
    #[test]
    fn erased_view() {
        let cmd = erased("hi");
        assert_eq!(cmd.name(), "echo");
        assert!(cmd.success());
        assert_eq!(cmd.attributes(), json!({ "text": "hi" }));
        assert_eq!(cmd.result_value(), Some(json!("HI")));
        assert!(cmd.is::<Echo>());
    }

    // 测试向下转型
    #[test]
    fn downcast_to_concrete() {
        let cmd = erased("hi");
        assert_eq!(cmd.downcast_ref::<Echo>().map(|e| e.text.as_str()), Some("hi"));
        assert!(cmd.downcast_ref::<Other>().is_none());

        let envelope = cmd.downcast::<Echo>().unwrap();
        assert_eq!(envelope.into_result().as_deref(), Some("HI"));
    }

    // 测试类型不符时返回 TypeMismatch
    #[test]
    fn downcast_mismatch() {
        let err = erased("hi").downcast::<Other>().unwrap_err();
        match err {
            CommandError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "other");
                assert_eq!(found, "echo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
