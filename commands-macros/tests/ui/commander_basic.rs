use commands_core::{Attributes, Command, CommandResult, Errors, command, commander};
use serde_json::json;

#[command(name = "dummy")]
struct DummyCommand {
    attr1: String,
    attr2: String,
}

impl Command for DummyCommand {
    type Output = String;

    fn validate(&self, errors: &mut Errors) {
        if self.attr1.is_empty() {
            errors.add("attr1", "blank");
        }
    }

    fn perform(&mut self, _errors: &mut Errors) -> CommandResult<String> {
        Ok(format!("{}:{}", self.attr1, self.attr2))
    }
}

struct Host {
    id: String,
}

struct Wrapper<T> {
    inner: T,
}

commander! {
    impl Host {
        /// 实例级：参数来自宿主
        command run(args = |host: &Self| json!({ "attr1": host.id })) => DummyCommand;
        class_command search(args = || json!({ "attr1": "all" })) => DummyCommand;
        command bare => DummyCommand;
        pub(crate) class_command r#static => DummyCommand;
    }
}

commander! {
    impl<T> Wrapper<T> where T: ToString {
        command wrapped(args = |w: &Self| json!({ "attr1": w.inner.to_string() })) => DummyCommand;
    }
}

fn main() {
    let host = Host { id: "h1".into() };

    let cmd = host.run(Attributes::new()).unwrap();
    assert!(cmd.success());
    assert_eq!(cmd.result().map(String::as_str), Some("h1:"));

    let cmd = Host::search_strict(json!({ "attr2": "x" }).as_object().cloned().unwrap()).unwrap();
    assert_eq!(cmd.result().map(String::as_str), Some("all:x"));

    let cmd = host.bare(Attributes::new()).unwrap();
    assert!(cmd.failure());
    assert!(host.bare_strict(Attributes::new()).is_err());

    let _ = Host::r#static(Attributes::new());
    let _ = Host::static_strict(Attributes::new());

    let w = Wrapper { inner: 7 };
    let cmd = w.wrapped(Attributes::new()).unwrap();
    assert_eq!(cmd.attr1, "7");
}
