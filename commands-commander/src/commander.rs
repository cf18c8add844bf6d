use crate::erased::ErasedCommand;
use crate::registry::CommandRegistry;
use bon::Builder;
use commands_core::{
    Attributes, CommandError, CommandResult, IntoAttributes, Mode, merge_arguments,
};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// 入口所在层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// 实例级：参数构造器接收宿主实例
    #[default]
    Instance,
    /// 类型级：参数构造器无参
    Type,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Instance => "instance",
            Level::Type => "type",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type InstanceArgs<H> = Arc<dyn Fn(&H) -> CommandResult<Attributes> + Send + Sync>;
type TypeArgs = Arc<dyn Fn() -> CommandResult<Attributes> + Send + Sync>;

/// 参数构造器：每次调用都会重新求值
pub enum ArgumentBuilder<H> {
    Instance(InstanceArgs<H>),
    Type(TypeArgs),
}

impl<H> ArgumentBuilder<H> {
    /// 实例级参数构造器
    pub fn instance<F, A>(f: F) -> Self
    where
        F: Fn(&H) -> A + Send + Sync + 'static,
        A: IntoAttributes,
    {
        Self::Instance(Arc::new(move |host: &H| f(host).into_attributes()))
    }

    /// 类型级参数构造器
    pub fn class<F, A>(f: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
        A: IntoAttributes,
    {
        Self::Type(Arc::new(move || f().into_attributes()))
    }

    pub fn level(&self) -> Level {
        match self {
            Self::Instance(_) => Level::Instance,
            Self::Type(_) => Level::Type,
        }
    }
}

impl<H> Clone for ArgumentBuilder<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Instance(f) => Self::Instance(f.clone()),
            Self::Type(f) => Self::Type(f.clone()),
        }
    }
}

impl<H> fmt::Debug for ArgumentBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgumentBuilder({})", self.level())
    }
}

/// 一条 Commander 声明
///
/// ```rust
/// use commands_commander::{ArgumentBuilder, Level, Registration};
/// use serde_json::json;
///
/// struct Order {
///     id: u64,
/// }
///
/// let reg = Registration::<Order>::builder()
///     .operation("pay")
///     .class_name("orders.pay")
///     .args(ArgumentBuilder::instance(|order: &Order| json!({ "order_id": order.id })))
///     .build();
/// assert_eq!(reg.level(), Level::Instance);
/// ```
#[derive(Builder, Debug, Clone)]
pub struct Registration<H> {
    /// 入口名称（严格入口为 `<operation>_strict`）
    #[builder(into)]
    operation: String,
    /// 目标命令名称，每次调用时从注册表解析
    #[builder(into)]
    class_name: String,
    /// 参数构造器（缺省为空参数）
    args: Option<ArgumentBuilder<H>>,
    #[builder(default)]
    level: Level,
}

impl<H> Registration<H> {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    fn base(&self, host: Option<&H>) -> CommandResult<Attributes> {
        match (&self.args, host) {
            (None, _) => Ok(Attributes::new()),
            (Some(ArgumentBuilder::Instance(f)), Some(host)) => f(host),
            (Some(ArgumentBuilder::Type(f)), _) => f(),
            (Some(ArgumentBuilder::Instance(_)), None) => Err(CommandError::LevelMismatch {
                operation: self.operation.clone(),
                registered: Level::Instance.as_str(),
            }),
        }
    }
}

/// 声明式 Commander（运行时版本）
/// - 为宿主类型 `H` 登记命令入口，实例级与类型级分别存放
/// - 同名入口重复登记时后者覆盖前者
/// - 目标命令按名称在调用时解析，注册表中的替换对后续调用立即生效
/// - 每次调用：参数构造器求值 → 与调用方选项合并（调用方优先）→ 构造 → 软/严格调用
pub struct Commander<H> {
    host: &'static str,
    registry: Arc<CommandRegistry>,
    instance: DashMap<String, Arc<Registration<H>>>,
    types: DashMap<String, Arc<Registration<H>>>,
}

impl<H> Commander<H> {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            host: std::any::type_name::<H>(),
            registry,
            instance: DashMap::new(),
            types: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// 登记入口；参数构造器层级与声明层级不一致时返回 [`CommandError::LevelMismatch`]
    pub fn register(&self, registration: Registration<H>) -> CommandResult<()> {
        if let Some(args) = &registration.args {
            if args.level() != registration.level {
                return Err(CommandError::LevelMismatch {
                    operation: registration.operation.clone(),
                    registered: registration.level.as_str(),
                });
            }
        }

        let operation = registration.operation.clone();
        let level = registration.level;
        let replaced = self
            .table(level)
            .insert(operation.clone(), Arc::new(registration));

        tracing::debug!(
            host = self.host,
            operation = %operation,
            level = %level,
            replaced = replaced.is_some(),
            "command operation registered"
        );
        Ok(())
    }

    /// 实例级入口
    pub fn command(
        &self,
        operation: impl Into<String>,
        class_name: impl Into<String>,
        args: Option<ArgumentBuilder<H>>,
    ) -> CommandResult<()> {
        self.register(
            Registration::builder()
                .operation(operation)
                .class_name(class_name)
                .maybe_args(args)
                .level(Level::Instance)
                .build(),
        )
    }

    /// 类型级入口
    pub fn class_command(
        &self,
        operation: impl Into<String>,
        class_name: impl Into<String>,
        args: Option<ArgumentBuilder<H>>,
    ) -> CommandResult<()> {
        self.register(
            Registration::builder()
                .operation(operation)
                .class_name(class_name)
                .maybe_args(args)
                .level(Level::Type)
                .build(),
        )
    }

    pub fn invoke(
        &self,
        host: &H,
        operation: &str,
        options: Attributes,
    ) -> CommandResult<Box<dyn ErasedCommand>> {
        self.dispatch(Level::Instance, Some(host), operation, options, Mode::Soft)
    }

    pub fn invoke_strict(
        &self,
        host: &H,
        operation: &str,
        options: Attributes,
    ) -> CommandResult<Box<dyn ErasedCommand>> {
        self.dispatch(Level::Instance, Some(host), operation, options, Mode::Strict)
    }

    pub fn invoke_type(
        &self,
        operation: &str,
        options: Attributes,
    ) -> CommandResult<Box<dyn ErasedCommand>> {
        self.dispatch(Level::Type, None, operation, options, Mode::Soft)
    }

    pub fn invoke_type_strict(
        &self,
        operation: &str,
        options: Attributes,
    ) -> CommandResult<Box<dyn ErasedCommand>> {
        self.dispatch(Level::Type, None, operation, options, Mode::Strict)
    }

    /// 是否存在该入口（接受 `_strict` 或 `!` 后缀）
    ///
    /// 先按原名查找，入口名本身以 `_strict` 结尾时同样可以响应。
    pub fn responds_to(&self, operation: &str) -> bool {
        let known = |name: &str| self.instance.contains_key(name) || self.types.contains_key(name);
        known(operation)
            || operation.strip_suffix("_strict").is_some_and(known)
            || operation.strip_suffix('!').is_some_and(known)
    }

    /// 已登记的入口（按字母序）
    pub fn operations(&self) -> Vec<(String, Level)> {
        let mut ops: Vec<(String, Level)> = self
            .instance
            .iter()
            .map(|e| (e.key().clone(), Level::Instance))
            .chain(self.types.iter().map(|e| (e.key().clone(), Level::Type)))
            .collect();
        ops.sort();
        ops
    }

    fn table(&self, level: Level) -> &DashMap<String, Arc<Registration<H>>> {
        match level {
            Level::Instance => &self.instance,
            Level::Type => &self.types,
        }
    }

    fn entry(&self, level: Level, operation: &str) -> CommandResult<Arc<Registration<H>>> {
        if let Some(entry) = self.table(level).get(operation) {
            return Ok(entry.clone());
        }

        let other = match level {
            Level::Instance => Level::Type,
            Level::Type => Level::Instance,
        };
        if self.table(other).contains_key(operation) {
            return Err(CommandError::LevelMismatch {
                operation: operation.to_string(),
                registered: other.as_str(),
            });
        }

        Err(CommandError::UnknownOperation {
            host: self.host,
            operation: operation.to_string(),
        })
    }

    fn dispatch(
        &self,
        level: Level,
        host: Option<&H>,
        operation: &str,
        options: Attributes,
        mode: Mode,
    ) -> CommandResult<Box<dyn ErasedCommand>> {
        let entry = self.entry(level, operation)?;
        let target = self.registry.resolve(&entry.class_name)?;
        let base = entry.base(host)?;

        tracing::debug!(
            host = self.host,
            operation = operation,
            command = %entry.class_name,
            ?mode,
            "dispatching command"
        );
        (target)(merge_arguments(base, options), mode)
    }
}
