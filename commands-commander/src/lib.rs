//! 运行时 Commander
//!
//! - [`CommandRegistry`]：按名称注册命令，类型擦除后统一构造与调用；
//! - [`Commander`]：为宿主类型登记软/严格入口，目标命令在每次调用时解析；
//! - [`ErasedCommand`]：擦除后的命令视图，可向下转型回 `Envelope<C>`。
//!
//! 编译期版本见 `commands_core::commander!`。
pub mod commander;
pub mod erased;
pub mod registry;

pub use commander::{ArgumentBuilder, Commander, Level, Registration};
pub use erased::ErasedCommand;
pub use registry::{CommandRegistry, Constructor};
