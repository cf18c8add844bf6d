use anyhow::Result;
use commands_commander::{ArgumentBuilder, CommandRegistry, Commander};
use commands_core::{
    Attributes, Command, CommandError, CommandResult, ErrorDetail, Errors, IntoAttributes,
    command, commander,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Account {
    id: u64,
    email: String,
    balance: i64,
}

#[command(name = "accounts.deposit")]
struct Deposit {
    account: Account,
    amount: i64,
}

impl Command for Deposit {
    type Output = Account;

    fn validate(&self, errors: &mut Errors) {
        if self.amount <= 0 {
            errors.add_detail("amount", ErrorDetail::new("greater_than").with("count", 0));
        }
        if !self.account.email.contains('@') {
            errors.add("account", "invalid_email");
        }
    }

    fn perform(&mut self, _errors: &mut Errors) -> CommandResult<Account> {
        let mut account = self.account.clone();
        account.balance += self.amount;
        Ok(account)
    }
}

#[command(name = "accounts.transfer")]
struct Transfer {
    account: Account,
    to: Option<u64>,
    amount: i64,
}

impl Command for Transfer {
    type Output = Value;

    fn validate(&self, errors: &mut Errors) {
        if !self.to_present() {
            errors.add("to", "blank");
        }
    }

    fn perform(&mut self, errors: &mut Errors) -> CommandResult<Value> {
        // 模拟远端账务服务的拒绝响应
        let response = json!({
            "errors": {
                "amount": [{ "error": "exceeds_limit", "limit": 100 }],
                "to": "frozen"
            }
        });
        if self.amount > 100 {
            commands_core::merge_remote_errors(errors, &response);
            return Err(CommandError::Abort);
        }
        Ok(json!({ "from": self.account.id, "to": self.to, "amount": self.amount }))
    }
}

#[command(name = "accounts.audit")]
struct Audit {
    scope: String,
}

impl Command for Audit {
    type Output = String;

    fn perform(&mut self, _errors: &mut Errors) -> CommandResult<String> {
        Ok(format!("audited {}", self.scope))
    }
}

commander! {
    impl Account {
        /// 存入：以当前账户为参数
        command deposit(args = |account: &Self| json!({ "account": account })) => Deposit;
        class_command audit(args = || json!({ "scope": "all" })) => Audit;
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let account = Account {
        id: 1,
        email: "ada@example.com".to_string(),
        balance: 10,
    };

    // 编译期 Commander
    let cmd = account.deposit(json!({ "amount": 5 }).into_attributes()?)?;
    println!("deposit ok: success={} result={:?}", cmd.success(), cmd.result());

    let cmd = account.deposit(json!({ "amount": -1, "memo": "ignored" }).into_attributes()?)?;
    println!("deposit rejected: errors={}", Value::Object(cmd.errors_as_json()));

    match account.deposit_strict(json!({ "amount": 0 }).into_attributes()?) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("deposit strict: {err}"),
    }

    let cmd = Account::audit(Attributes::new())?;
    println!("audit: {:?}", cmd.result());

    // 运行时 Commander
    let registry = Arc::new(CommandRegistry::new());
    registry.register::<Deposit>();
    registry.register::<Transfer>();

    let commander = Commander::<Account>::new(registry.clone());
    commander.command(
        "transfer",
        "accounts.transfer",
        Some(ArgumentBuilder::instance(|account: &Account| {
            json!({ "account": account })
        })),
    )?;
    tracing::info!(operations = ?commander.operations(), "commander ready");

    let options = json!({ "to": 2, "amount": 30 }).into_attributes()?;
    let cmd = commander.invoke(&account, "transfer", options)?;
    println!("transfer: {}", cmd.result_value().unwrap_or(Value::Null));

    let options = json!({ "to": 2, "amount": 500 }).into_attributes()?;
    match commander.invoke(&account, "transfer", options) {
        Ok(cmd) => println!("transfer: {}", cmd.result_value().unwrap_or(Value::Null)),
        Err(err) => {
            let errors = err
                .as_invalid()
                .map(|invalid| Value::Object(invalid.errors().as_json()))
                .unwrap_or(Value::Null);
            println!("transfer aborted: {errors}");
        }
    }

    match commander.invoke_type("transfer", Attributes::new()) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("transfer as type-level: {err}"),
    }

    println!("registered commands: {:?}", registry.names());
    println!("operations: {:?}", commander.operations());
    Ok(())
}
