//! Types that represent the core data model, such as `Transaction` and `Category`, plus the
//! calendar values used to bucket transactions into days, ISO weeks and months.
mod amount;
mod calendar;
mod category;
mod transaction;

pub use amount::{Amount, AmountError, MAX_AMOUNT};
pub use calendar::{parse_date, start_of_iso_week, week_number, IsoWeek, ParseError, YearMonth};
pub use category::{Category, DEFAULT_CATEGORY};
pub use transaction::{sort_newest_first, Transaction, TransactionData, TransactionType};
