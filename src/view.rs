//! Pure functions that turn transactions into what the user sees: dashboard, history rows, and
//! formatted money and dates. Nothing in here touches the store.

use crate::error::Res;
use crate::model::{Transaction, TransactionType};
use crate::report::{Report, Summary, Totals};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How money is printed.
///
/// The default is Indonesian Rupiah style. Whole amounts have no fraction digits and other amounts
/// keep up to two: `Rp 1.500.000`, `Rp 12,5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneyFormat {
    /// Printed before the number, separated by a space. May be empty.
    pub symbol: String,
    /// Thousands separator.
    pub thousands: char,
    /// Decimal separator.
    pub decimal: char,
    /// Fraction digits that are always printed, padded with zeros.
    pub min_fraction_digits: u8,
    /// Fraction digits kept at most. Amounts are rounded half away from zero to this many.
    pub max_fraction_digits: u8,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "Rp".to_string(),
            thousands: '.',
            decimal: ',',
            min_fraction_digits: 0,
            max_fraction_digits: 2,
        }
    }
}

impl MoneyFormat {
    /// Formats `value`, e.g. `Rp 1.500.000`, `Rp 0,4` or `-Rp 50.000`.
    pub fn format(&self, value: Decimal) -> String {
        let max = u32::from(self.max_fraction_digits);
        let min = usize::from(self.min_fraction_digits.min(self.max_fraction_digits));
        let rounded = value
            .abs()
            .round_dp_with_strategy(max, RoundingStrategy::MidpointAwayFromZero);
        let sign = if value.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        // Whole amounts stay below 2^53, so the f64 handed to format_num is exact.
        let whole = rounded.trunc().to_f64().unwrap_or_default();
        let mut localized: String = format_num::format_num!(",.0f", whole)
            .chars()
            .map(|c| if c == ',' { self.thousands } else { c })
            .collect();

        let fraction = rounded.fract().normalize().to_string();
        let mut digits = fraction.strip_prefix("0.").unwrap_or_default().to_string();
        while digits.len() < min {
            digits.push('0');
        }
        if !digits.is_empty() {
            localized.push(self.decimal);
            localized.push_str(&digits);
        }

        if self.symbol.is_empty() {
            format!("{sign}{localized}")
        } else {
            format!("{sign}{} {localized}", self.symbol)
        }
    }
}

/// Formats a date for display, e.g. `5 Mar 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Which transaction types a history listing shows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TypeFilter);
serde_plain::derive_fromstr_from_deserialize!(TypeFilter);

impl TypeFilter {
    pub fn accepts(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => kind == TransactionType::Income,
            TypeFilter::Expense => kind == TransactionType::Expense,
        }
    }
}

/// Search and type filter for the history listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub search: Option<String>,
    pub kind: TypeFilter,
}

impl HistoryFilter {
    /// Search matches, case-insensitively, a substring of the description or of the category
    /// label. The type filter is applied on top of that.
    pub fn matches(&self, t: &Transaction) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                t.description().to_lowercase().contains(&term)
                    || t.category().label().to_lowercase().contains(&term)
            }
        };
        search_ok && self.kind.accepts(t.r#type())
    }
}

/// One transaction as it is shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub kind: TransactionType,
    pub sign: char,
    pub amount: String,
    pub description: String,
    pub date: String,
    pub category: String,
}

impl Row {
    pub fn new(t: &Transaction, money: &MoneyFormat) -> Self {
        Self {
            id: t.id().to_string(),
            kind: t.r#type(),
            sign: t.r#type().sign(),
            amount: money.format(t.amount().value()),
            description: t.description().to_string(),
            date: format_date(t.date()),
            category: t.category().label().to_string(),
        }
    }
}

/// Totals formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsView {
    pub income: String,
    pub expense: String,
    pub balance: String,
    pub count: usize,
}

impl TotalsView {
    pub fn new(totals: &Totals, money: &MoneyFormat) -> Self {
        Self {
            income: money.format(totals.income),
            expense: money.format(totals.expense),
            balance: money.format(totals.balance),
            count: totals.count,
        }
    }
}

/// The overview screen: overall totals and the most recent transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub totals: TotalsView,
    pub recent: Vec<Row>,
}

/// Builds the dashboard. `transactions` must already be ordered newest first.
pub fn dashboard(
    transactions: &[Transaction],
    recent: usize,
    money: &MoneyFormat,
) -> Res<Dashboard> {
    Ok(Dashboard {
        totals: TotalsView::new(&Totals::of(transactions)?, money),
        recent: transactions
            .iter()
            .take(recent)
            .map(|t| Row::new(t, money))
            .collect(),
    })
}

/// The history rows that pass `filter`, in the order given.
pub fn history(
    transactions: &[Transaction],
    filter: &HistoryFilter,
    money: &MoneyFormat,
) -> Vec<Row> {
    transactions
        .iter()
        .filter(|t| filter.matches(t))
        .map(|t| Row::new(t, money))
        .collect()
}

/// Renders rows as a Markdown table. An empty list renders as a short notice instead.
pub fn rows_table(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No transactions found".to_string();
    }
    let mut lines = vec![
        "| Date | Type | Amount | Category | Description | ID |".to_string(),
        "|---|---|---:|---|---|---|".to_string(),
    ];
    lines.extend(rows.iter().map(|r| {
        format!(
            "| {} | {} | {}{} | {} | {} | {} |",
            r.date,
            r.kind,
            r.sign,
            r.amount,
            escape_cell(&r.category),
            escape_cell(&r.description),
            r.id
        )
    }));
    lines_to_text(lines)
}

/// Renders a report as a small Markdown table.
pub fn report_table(report: &Report, money: &MoneyFormat) -> String {
    let totals = TotalsView::new(&report.totals, money);
    lines_to_text(vec![
        format!("| {} {} | |", capitalize(report.period.kind()), report.period),
        "|---|---:|".to_string(),
        format!("| Income | {} |", totals.income),
        format!("| Expense | {} |", totals.expense),
        format!("| Balance | {} |", totals.balance),
        format!("| Transactions | {} |", totals.count),
    ])
}

/// Renders the day, week and month reports one after another.
pub fn summary_table(summary: &Summary, money: &MoneyFormat) -> String {
    [&summary.daily, &summary.weekly, &summary.monthly]
        .iter()
        .map(|r| report_table(r, money))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the dashboard as text.
pub fn dashboard_text(dashboard: &Dashboard) -> String {
    let header = lines_to_text(vec![
        format!("Balance: {}", dashboard.totals.balance),
        format!("Income:  {}", dashboard.totals.income),
        format!("Expense: {}", dashboard.totals.expense),
        String::new(),
        "Recent transactions:".to_string(),
    ]);
    header + &rows_table(&dashboard.recent)
}

/// The plain-text message sent to the chat webhook for a report.
pub fn report_message(report: &Report, money: &MoneyFormat) -> String {
    let totals = TotalsView::new(&report.totals, money);
    format!(
        "{} report {}\nIncome: {}\nExpense: {}\nBalance: {}\nTransactions: {}",
        capitalize(report.period.kind()),
        report.period,
        totals.income,
        totals.expense,
        totals.balance,
        totals.count
    )
}

/// Joins lines, ending each with a newline.
fn lines_to_text(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
