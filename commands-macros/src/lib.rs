use proc_macro::TokenStream;

mod command;
mod commander;
mod utils;

/// 命令宏
/// - 结构体的具名字段即命令属性，生成属性名列表与命令名称
/// - 合并派生 Debug/Default/Serialize/Deserialize，缺失属性取默认值
/// - 为每个属性生成 `<attr>_present()` 存在性判断
/// - 支持参数：`#[command(name = "...", debug = false, default = false)]`
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr, item)
}

/// 声明式 Commander
/// 为宿主类型生成软/严格两种命令入口（实例级或类型级）
#[proc_macro]
pub fn commander(input: TokenStream) -> TokenStream {
    commander::expand(input)
}
