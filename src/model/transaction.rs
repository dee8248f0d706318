use crate::error::Res;
use crate::model::calendar::parse_date;
use crate::model::{Amount, Category};
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a transaction brings money in or takes it out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// `+` for income, `-` for expense.
    pub fn sign(&self) -> char {
        match self {
            TransactionType::Income => '+',
            TransactionType::Expense => '-',
        }
    }
}

/// Everything about a transaction except its id. This is what gets written on create and what
/// fully replaces a stored transaction on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub(crate) r#type: TransactionType,
    pub(crate) amount: Amount,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
}

impl TransactionData {
    pub fn new(
        r#type: TransactionType,
        amount: Amount,
        category: Category,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            r#type,
            amount,
            category,
            description: description.into().trim().to_string(),
            date,
        }
    }

    /// Validates raw user input. Nothing is written anywhere if this fails.
    ///
    /// - `amount` must parse to a number greater than zero.
    /// - `date` must be `YYYY-MM-DD`; when absent, `today` is used.
    pub fn parse(
        r#type: TransactionType,
        amount: &str,
        category: Option<&str>,
        description: Option<&str>,
        date: Option<&str>,
        today: NaiveDate,
    ) -> Res<Self> {
        let amount = Amount::from_str(amount).context("Invalid transaction amount")?;
        let date = match date {
            Some(s) if !s.trim().is_empty() => {
                parse_date(s).context("Invalid transaction date")?
            }
            _ => today,
        };
        Ok(Self::new(
            r#type,
            amount,
            Category::new(category.unwrap_or_default()),
            description.unwrap_or_default(),
            date,
        ))
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) r#type: TransactionType,
    pub(crate) amount: Amount,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
}

impl Transaction {
    pub fn new(id: impl Into<String>, data: TransactionData) -> Self {
        Self {
            id: id.into(),
            r#type: data.r#type,
            amount: data.amount,
            category: data.category,
            description: data.description,
            date: data.date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The amount with the sign its type gives it: positive for income, negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        match self.r#type {
            TransactionType::Income => self.amount.value(),
            TransactionType::Expense => -self.amount.value(),
        }
    }

    /// Copies the fields other than `id`.
    pub fn data(&self) -> TransactionData {
        TransactionData {
            r#type: self.r#type,
            amount: self.amount,
            category: self.category.clone(),
            description: self.description.clone(),
            date: self.date,
        }
    }
}

/// Orders transactions the way every listing shows them: newest date first, then by id.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_parse_valid() {
        let data = TransactionData::parse(
            TransactionType::Expense,
            "25000",
            Some("makanan"),
            Some(" Nasi goreng "),
            Some("2024-03-10"),
            today(),
        )
        .unwrap();
        assert_eq!(data.amount().value(), Decimal::from(25000));
        assert_eq!(data.category().key(), "makanan");
        assert_eq!(data.description(), "Nasi goreng");
        assert_eq!(data.date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_parse_defaults() {
        let data =
            TransactionData::parse(TransactionType::Income, "10", None, None, None, today())
                .unwrap();
        assert_eq!(data.date(), today());
        assert_eq!(data.category(), &Category::default());
        assert_eq!(data.description(), "");
    }

    #[test]
    fn test_parse_rejects_bad_amount() {
        for bad in ["0", "-5", "abc", ""] {
            let err = TransactionData::parse(
                TransactionType::Income,
                bad,
                None,
                None,
                None,
                today(),
            )
            .unwrap_err();
            assert!(
                format!("{err:#}").contains("Invalid transaction amount"),
                "unexpected error for '{bad}': {err:#}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let err = TransactionData::parse(
            TransactionType::Income,
            "10",
            None,
            None,
            Some("15-03-2024"),
            today(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn test_type_display_and_parse() {
        assert_eq!(TransactionType::Income.to_string(), "income");
        assert_eq!(
            TransactionType::from_str("expense").unwrap(),
            TransactionType::Expense
        );
        assert!(TransactionType::from_str("transfer").is_err());
    }

    #[test]
    fn test_signed_amount() {
        let data =
            TransactionData::parse(TransactionType::Expense, "7.5", None, None, None, today())
                .unwrap();
        let t = Transaction::new("a", data);
        assert_eq!(t.signed_amount(), Decimal::from_str("-7.5").unwrap());
        assert_eq!(t.r#type().sign(), '-');
    }

    #[test]
    fn test_sort_newest_first() {
        let mk = |id: &str, date: &str| {
            let data = TransactionData::parse(
                TransactionType::Income,
                "1",
                None,
                None,
                Some(date),
                today(),
            )
            .unwrap();
            Transaction::new(id, data)
        };
        let mut list = vec![
            mk("b", "2024-01-01"),
            mk("c", "2024-02-01"),
            mk("a", "2024-01-01"),
        ];
        sort_newest_first(&mut list);
        let ids: Vec<&str> = list.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_serde_shape() {
        let data = TransactionData::parse(
            TransactionType::Income,
            "1500000",
            Some("gaji"),
            Some("Salary"),
            Some("2024-03-01"),
            today(),
        )
        .unwrap();
        let t = Transaction::new("abc", data);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["amount"], "1500000");
        assert_eq!(json["date"], "2024-03-01");
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
