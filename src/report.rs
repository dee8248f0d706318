//! Period filtering and the income/expense/balance reduction behind the dashboard and reports.

use crate::error::Res;
use crate::model::{
    parse_date, week_number, IsoWeek, ParseError, Transaction, TransactionType, YearMonth,
};
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The span of time a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day(NaiveDate),
    Week(IsoWeek),
    Month(YearMonth),
    All,
}

impl Period {
    /// True if a transaction dated `date` belongs to this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Period::Day(day) => *day == date,
            Period::Week(week) => week.contains(date),
            Period::Month(month) => month.contains(date),
            Period::All => true,
        }
    }

    /// A short name for the kind of period.
    pub fn kind(&self) -> &'static str {
        match self {
            Period::Day(_) => "daily",
            Period::Week(_) => "weekly",
            Period::Month(_) => "monthly",
            Period::All => "overall",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            Period::Week(week) => write!(f, "{week}"),
            Period::Month(month) => write!(f, "{month}"),
            Period::All => write!(f, "all"),
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-Www`, `YYYY-MM` or `all`.
impl FromStr for Period {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(Period::All)
        } else if s.contains("-W") {
            Ok(Period::Week(IsoWeek::from_str(s)?))
        } else if s.len() == 7 {
            Ok(Period::Month(YearMonth::from_str(s)?))
        } else {
            Ok(Period::Day(parse_date(s)?))
        }
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Period::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Income, expense and balance over some set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub count: usize,
}

impl Totals {
    /// Sums income and expense amounts separately; balance is income minus expense.
    ///
    /// Fails instead of panicking when a sum leaves the range of `Decimal`.
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Res<Self> {
        let mut totals = Totals::default();
        for t in transactions {
            totals
                .add(t.r#type(), t.amount().value())
                .with_context(|| format!("Unable to total transaction {}", t.id()))?;
        }
        Ok(totals)
    }

    /// Adds one amount to the income or expense side and updates the balance.
    pub fn add(&mut self, kind: TransactionType, value: Decimal) -> Res<()> {
        let side = match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expense,
        };
        *side = side
            .checked_add(value)
            .with_context(|| format!("The {kind} total overflows"))?;
        self.balance = self
            .income
            .checked_sub(self.expense)
            .context("The balance overflows")?;
        self.count += 1;
        Ok(())
    }
}

/// The totals of the transactions that fall within `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub period: Period,
    pub totals: Totals,
}

/// Computes the report for `period`.
pub fn build(transactions: &[Transaction], period: Period) -> Res<Report> {
    Ok(Report {
        period,
        totals: Totals::of(filter(transactions, period))
            .with_context(|| format!("Unable to build the {period} report"))?,
    })
}

/// The day, week and month reports for the periods that contain `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub daily: Report,
    pub weekly: Report,
    pub monthly: Report,
}

pub fn summary(transactions: &[Transaction], today: NaiveDate) -> Res<Summary> {
    Ok(Summary {
        daily: build(transactions, Period::Day(today))?,
        weekly: build(transactions, Period::Week(week_number(today)))?,
        monthly: build(transactions, Period::Month(YearMonth::of(today)))?,
    })
}

/// The transactions that fall within `period`, in their original order.
pub fn filter(transactions: &[Transaction], period: Period) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(move |t| period.contains(t.date()))
}

/// The transactions dated exactly `day`.
pub fn bucket_by_date(transactions: &[Transaction], day: NaiveDate) -> Vec<&Transaction> {
    filter(transactions, Period::Day(day)).collect()
}

/// The transactions dated within `month`.
pub fn bucket_by_month(transactions: &[Transaction], month: YearMonth) -> Vec<&Transaction> {
    filter(transactions, Period::Month(month)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionData;

    fn txn(id: &str, kind: TransactionType, amount: &str, date: &str) -> Transaction {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let data = TransactionData::parse(kind, amount, None, None, Some(date), today).unwrap();
        Transaction::new(id, data)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("1", TransactionType::Income, "5000000", "2024-03-01"),
            txn("2", TransactionType::Expense, "25000", "2024-03-31"),
            txn("3", TransactionType::Expense, "100000", "2024-04-01"),
            txn("4", TransactionType::Income, "250000", "2024-03-31"),
            txn("5", TransactionType::Expense, "12.5", "2024-02-29"),
        ]
    }

    #[test]
    fn test_balance_is_income_minus_expense() {
        let list = sample();
        let totals = Totals::of(&list).unwrap();
        assert_eq!(totals.income, Decimal::from(5_250_000));
        assert_eq!(totals.expense, Decimal::from_str("125012.5").unwrap());
        assert_eq!(totals.balance, totals.income - totals.expense);
        assert_eq!(totals.count, 5);

        for n in 0..list.len() {
            let subset = &list[..n];
            let t = Totals::of(subset).unwrap();
            assert_eq!(t.income - t.expense, t.balance);
        }
    }

    #[test]
    fn test_empty_totals() {
        let empty: Vec<Transaction> = Vec::new();
        assert_eq!(Totals::of(&empty).unwrap(), Totals::default());
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let mut totals = Totals::default();
        totals.add(TransactionType::Income, Decimal::MAX).unwrap();
        let err = totals.add(TransactionType::Income, Decimal::ONE).unwrap_err();
        assert!(err.to_string().contains("income total overflows"), "{err:#}");

        let mut totals = Totals::default();
        totals.add(TransactionType::Expense, Decimal::MAX).unwrap();
        totals.add(TransactionType::Income, Decimal::ONE).unwrap();
        let err = totals.add(TransactionType::Expense, Decimal::ONE).unwrap_err();
        assert!(err.to_string().contains("expense total overflows"), "{err:#}");
    }

    #[test]
    fn test_totals_at_the_amount_limit() {
        let limit = "1000000000000000";
        let list: Vec<Transaction> = (0..4)
            .map(|i| txn(&i.to_string(), TransactionType::Income, limit, "2024-03-01"))
            .collect();
        let totals = Totals::of(&list).unwrap();
        assert_eq!(totals.income, Decimal::from(4_000_000_000_000_000_i64));
        assert_eq!(totals.balance, totals.income);
    }

    #[test]
    fn test_month_bucket_boundaries() {
        let list = sample();
        let march: YearMonth = "2024-03".parse().unwrap();
        let ids: Vec<&str> = bucket_by_month(&list, march).iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_day_bucket() {
        let list = sample();
        let day = parse_date("2024-03-31").unwrap();
        let ids: Vec<&str> = bucket_by_date(&list, day).iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["2", "4"]);
    }

    #[test]
    fn test_week_report() {
        let list = sample();
        // 2024-W13 runs from Monday 2024-03-25 to Sunday 2024-03-31.
        let report = build(&list, "2024-W13".parse().unwrap()).unwrap();
        assert_eq!(report.totals.count, 2);
        assert_eq!(report.totals.income, Decimal::from(250_000));
        assert_eq!(report.totals.expense, Decimal::from(25_000));
        assert_eq!(report.totals.balance, Decimal::from(225_000));

        // 2024-W14 starts on Monday 2024-04-01.
        let report = build(&list, "2024-W14".parse().unwrap()).unwrap();
        assert_eq!(report.totals.count, 1);
        assert_eq!(report.totals.balance, Decimal::from(-100_000));
    }

    #[test]
    fn test_summary() {
        let list = sample();
        let s = summary(&list, parse_date("2024-03-31").unwrap()).unwrap();
        assert_eq!(s.daily.totals.count, 2);
        assert_eq!(s.weekly.totals.count, 2);
        assert_eq!(s.monthly.totals.count, 3);
        assert_eq!(s.weekly.period.to_string(), "2024-W13");
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::from_str("all").unwrap(), Period::All);
        assert!(matches!(Period::from_str("2024-03").unwrap(), Period::Month(_)));
        assert!(matches!(Period::from_str("2024-W09").unwrap(), Period::Week(_)));
        assert!(matches!(Period::from_str("2024-03-09").unwrap(), Period::Day(_)));
        assert!(matches!(
            Period::from_str("2024-3").unwrap_err(),
            ParseError::Date(_)
        ));
        assert!(matches!(
            Period::from_str("2024-13").unwrap_err(),
            ParseError::Month(_)
        ));
        assert!(Period::from_str("2024-W60").is_err());
        assert_eq!(Period::from_str("2020-W53").unwrap().to_string(), "2020-W53");
    }
}
