use commands_core::{Command, CommandAttributes, Errors, command};
use serde_json::json;

#[command(name = "profiles.update")]
#[serde(rename_all = "camelCase")]
struct UpdateProfile {
    user_name: String,
    #[serde(rename = "mail")]
    email: String,
    #[serde(alias = "nick")]
    display_name: String,
    #[serde(skip)]
    cache: Option<String>,
    #[serde(rename(serialize = "out", deserialize = "in"))]
    channel: String,
}

impl Command for UpdateProfile {
    type Output = String;

    fn perform(&mut self, _errors: &mut Errors) -> commands_core::CommandResult<String> {
        Ok(self.user_name.clone())
    }
}

#[command]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
struct Shout {
    max_retries: u8,
}

fn main() {
    // 属性名取反序列化时的键
    assert_eq!(
        UpdateProfile::NAMES,
        &["userName", "mail", "displayName", "nick", "in"]
    );
    assert!(!UpdateProfile::is_declared("user_name"));
    assert!(!UpdateProfile::is_declared("cache"));
    assert_eq!(Shout::NAMES, &["MAX-RETRIES"]);

    // 改名后的键可以正常构造，存在性判断仍按字段名
    let attrs = json!({ "userName": "ada", "nick": "countess", "in": "sms" })
        .as_object()
        .cloned()
        .unwrap();
    let cmd = UpdateProfile::construct(attrs).unwrap();
    assert_eq!(cmd.user_name, "ada");
    assert_eq!(cmd.display_name, "countess");
    assert_eq!(cmd.channel, "sms");
    assert!(cmd.user_name_present());
    assert!(!cmd.email_present());
    assert!(cmd.cache.is_none());
}
