//! Account and transaction aggregation behind the dashboard cards.
//!
//! Amounts are signed minor units (cents). Currency codes are carried for
//! display only; nothing here converts between currencies.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Cash,
    Investment,
}

impl AccountKind {
    pub fn label(self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking Account",
            AccountKind::Savings => "Savings Account",
            AccountKind::CreditCard => "Credit Card",
            AccountKind::Cash => "Cash",
            AccountKind::Investment => "Investment",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            AccountKind::Checking => "🏦",
            AccountKind::Savings => "🐷",
            AccountKind::CreditCard => "💳",
            AccountKind::Cash => "💵",
            AccountKind::Investment => "📈",
        }
    }
}

fn default_currency() -> String {
    "BRL".to_string()
}

fn default_color() -> String {
    "#3b82f6".to_string()
}

fn default_icon() -> String {
    "💳".to_string()
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    #[serde(default)]
    pub balance: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub credit_limit: Option<i64>,
    #[serde(default)]
    pub closing_day: Option<u8>,
    #[serde(default)]
    pub due_day: Option<u8>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Account {
            id: id.into(),
            name: name.into(),
            kind,
            balance: 0,
            currency: default_currency(),
            color: default_color(),
            icon: kind.icon().to_string(),
            is_active: true,
            credit_limit: None,
            closing_day: None,
            due_day: None,
            bank_name: None,
            account_number: None,
        }
    }

    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_credit_limit(mut self, limit: i64) -> Self {
        self.credit_limit = Some(limit);
        self
    }

    /// Remaining credit on a card; card balances are negative when owed.
    pub fn available_credit(&self) -> Option<i64> {
        match (self.kind, self.credit_limit) {
            (AccountKind::CreditCard, Some(limit)) => Some(limit + self.balance),
            _ => None,
        }
    }
}

/// The user's active accounts, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountBook {
    accounts: Vec<Account>,
}

impl AccountBook {
    pub fn new(accounts: Vec<Account>) -> Self {
        AccountBook {
            accounts: accounts.into_iter().filter(|acc| acc.is_active).collect(),
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Replaces the account with the same id, or adds it at the front.
    pub fn upsert(&mut self, account: Account) {
        match self.accounts.iter_mut().find(|acc| acc.id == account.id) {
            Some(existing) => *existing = account,
            None => self.accounts.insert(0, account),
        }
    }

    /// Soft delete: the account drops out of the local list. Returns whether
    /// anything was removed.
    pub fn deactivate(&mut self, id: &str) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|acc| acc.id != id);
        self.accounts.len() != before
    }

    pub fn find(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.id == id)
    }

    pub fn by_kind(&self, kind: AccountKind) -> impl Iterator<Item = &Account> + '_ {
        self.accounts.iter().filter(move |acc| acc.kind == kind)
    }

    /// Net worth across accounts. Credit card balances always count as debt.
    pub fn total_balance(&self) -> i64 {
        self.accounts
            .iter()
            .map(|acc| match acc.kind {
                AccountKind::CreditCard => -acc.balance.abs(),
                _ => acc.balance,
            })
            .sum()
    }

    pub fn balance_by_kind(&self, kind: AccountKind) -> i64 {
        self.by_kind(kind).map(|acc| acc.balance).sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

impl TransactionStatus {
    pub fn badge(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "success",
            TransactionStatus::Pending => "warning",
            TransactionStatus::Cancelled => "danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: Option<i32>,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: i64,
    #[serde(default)]
    pub status: TransactionStatus,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_income: i64,
    pub total_expenses: i64,
    pub balance: i64,
}

impl DashboardSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_income: i64 = transactions
            .iter()
            .filter(|t| t.amount > 0)
            .map(|t| t.amount)
            .sum();
        let total_expenses: i64 = transactions
            .iter()
            .filter(|t| t.amount < 0)
            .map(|t| t.amount.abs())
            .sum();
        DashboardSummary {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        }
    }
}

/// Spending (as a positive number) in the given calendar month.
pub fn monthly_spending(transactions: &[Transaction], year: i32, month: u32) -> i64 {
    transactions
        .iter()
        .filter(|t| t.amount < 0 && t.date.year() == year && t.date.month() == month)
        .map(|t| t.amount.abs())
        .sum()
}

pub fn by_category<'a>(transactions: &'a [Transaction], category: &'a str) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.category == category)
        .collect()
}

pub fn currency_symbol_for(code: &str) -> &'static str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "PHP" => "₱",
        _ => "R$",
    }
}

pub fn format_with_commas(value: i64) -> String {
    let is_negative = value < 0;
    let s = value.unsigned_abs().to_string().chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in s.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    let formatted: String = out.into_iter().rev().collect();
    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

pub fn format_currency(minor_units: i64, symbol: &str) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    format!(
        "{}{} {}.{:02}",
        sign,
        symbol,
        format_with_commas((abs / 100) as i64),
        abs % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, category: &str, amount: i64) -> Transaction {
        Transaction {
            id: None,
            date: date.parse().unwrap(),
            description: category.to_string(),
            category: category.to_string(),
            amount,
            status: TransactionStatus::Completed,
        }
    }

    fn book() -> AccountBook {
        AccountBook::new(vec![
            Account::new("1", "Main", AccountKind::Checking).with_balance(250_000),
            Account::new("2", "Card", AccountKind::CreditCard)
                .with_balance(-40_000)
                .with_credit_limit(100_000),
            Account::new("3", "Wallet", AccountKind::Cash).with_balance(5_000),
            Account::new("4", "Piggy", AccountKind::Savings).with_balance(10_000),
        ])
    }

    #[test]
    fn total_balance_treats_cards_as_debt() {
        assert_eq!(book().total_balance(), 250_000 - 40_000 + 5_000 + 10_000);

        let mut positive_card = book();
        positive_card.upsert(
            Account::new("2", "Card", AccountKind::CreditCard).with_balance(40_000),
        );
        assert_eq!(positive_card.total_balance(), 250_000 - 40_000 + 5_000 + 10_000);
    }

    #[test]
    fn balance_by_kind_sums_raw_balances() {
        let mut accounts = book();
        accounts.upsert(Account::new("5", "Second", AccountKind::Checking).with_balance(1_000));
        assert_eq!(accounts.balance_by_kind(AccountKind::Checking), 251_000);
        assert_eq!(accounts.balance_by_kind(AccountKind::Investment), 0);
        assert_eq!(accounts.accounts()[0].id, "5");
    }

    #[test]
    fn inactive_accounts_are_dropped() {
        let mut archived = Account::new("9", "Old", AccountKind::Cash).with_balance(99);
        archived.is_active = false;
        let accounts = AccountBook::new(vec![archived]);
        assert!(accounts.accounts().is_empty());
    }

    #[test]
    fn deactivate_removes_locally() {
        let mut accounts = book();
        assert!(accounts.deactivate("3"));
        assert!(!accounts.deactivate("3"));
        assert!(accounts.find("3").is_none());
        assert_eq!(accounts.accounts().len(), 3);
    }

    #[test]
    fn available_credit_only_for_cards() {
        let accounts = book();
        assert_eq!(accounts.find("2").and_then(Account::available_credit), Some(60_000));
        assert_eq!(accounts.find("1").and_then(Account::available_credit), None);
    }

    #[test]
    fn account_defaults_from_json() {
        let account: Account =
            serde_json::from_str(r#"{"id":"a","name":"Nubank","type":"credit_card"}"#).unwrap();
        assert_eq!(account.kind, AccountKind::CreditCard);
        assert_eq!(account.currency, "BRL");
        assert_eq!(account.color, "#3b82f6");
        assert!(account.is_active);
        assert_eq!(account.credit_limit, None);
    }

    #[test]
    fn summary_splits_income_and_expenses() {
        let txs = vec![
            tx("2026-02-01", "Food", -15_000),
            tx("2026-01-31", "Income", 300_000),
            tx("2026-01-15", "Transport", -2_500),
        ];
        assert_eq!(
            DashboardSummary::from_transactions(&txs),
            DashboardSummary {
                total_income: 300_000,
                total_expenses: 17_500,
                balance: 282_500,
            }
        );
        assert_eq!(monthly_spending(&txs, 2026, 1), 2_500);
        assert_eq!(monthly_spending(&txs, 2026, 2), 15_000);
        assert_eq!(by_category(&txs, "Food").len(), 1);
    }

    #[test]
    fn transaction_status_defaults_to_completed() {
        let t: Transaction = serde_json::from_str(
            r#"{"id":1,"date":"2026-02-01","description":"Market","category":"Food","amount":-15000}"#,
        )
        .unwrap();
        assert_eq!(t.status, TransactionStatus::Completed);
        assert_eq!(TransactionStatus::Pending.badge(), "warning");
    }

    #[test]
    fn formats_currency_with_grouping() {
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
        assert_eq!(format_with_commas(-1_000), "-1,000");
        assert_eq!(format_currency(123_456, "R$"), "R$ 1,234.56");
        assert_eq!(format_currency(-5, "$"), "-$ 0.05");
        assert_eq!(currency_symbol_for("EUR"), "€");
        assert_eq!(currency_symbol_for("XYZ"), "R$");
    }
}
