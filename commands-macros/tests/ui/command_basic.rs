use commands_core::{CommandAttributes, command};

#[command]
struct CreateUser {
    name: String,
    age: Option<u32>,
    tags: Vec<String>,
}

#[command(name = "users.rename", debug = false)]
#[derive(Clone)]
struct RenameUser {
    r#type: String,
}

#[command(default = false)]
struct Explicit {
    level: i32,
}

impl Default for Explicit {
    fn default() -> Self {
        Self { level: 3 }
    }
}

fn main() {
    // 属性名按声明顺序生成
    assert_eq!(CreateUser::NAMES, &["name", "age", "tags"]);
    assert_eq!(CreateUser::COMMAND, "CreateUser");
    assert!(CreateUser::is_declared("age"));
    assert!(!CreateUser::is_declared("email"));

    // Debug/Default 默认开启
    let user = CreateUser::default();
    let _ = format!("{:?}", user);
    assert!(!user.name_present());
    assert!(!user.age_present());
    assert!(!user.tags_present());

    // r# 前缀被去掉，自定义名称生效，已有 derive 被保留
    assert_eq!(RenameUser::NAMES, &["type"]);
    assert_eq!(RenameUser::COMMAND, "users.rename");
    let renamed = RenameUser::default().clone();
    assert!(!renamed.type_present());

    // 缺失的属性取手写 Default
    let explicit: Explicit = serde_json::from_str("{}").unwrap();
    assert_eq!(explicit.level, 3);
    assert!(explicit.level_present());
}
