use crate::args::ListArgs;
use crate::commands::{load_all, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::view::{self, Dashboard, Row};
use crate::{Config, Result};

/// Overall totals and the most recent transactions.
pub async fn dashboard(config: Config) -> Result<Out<Dashboard>> {
    let all = load_all(&config).await?;
    let dashboard = view::dashboard(&all, config.recent_count(), config.money())
        .pub_result(ErrorType::Validation)?;
    let message = format!(
        "Balance {} across {}",
        dashboard.totals.balance,
        plural(dashboard.totals.count, "transaction", "transactions")
    );
    let detail = view::dashboard_text(&dashboard);
    Ok(Out::new(message, dashboard).with_detail(detail))
}

/// The transaction history, newest first, narrowed by the search text and type filter.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<Row>>> {
    let all = load_all(&config).await?;
    let rows = view::history(&all, &args.filter(), config.money());
    let message = format!(
        "Found {}",
        plural(rows.len(), "transaction", "transactions")
    );
    let detail = view::rows_table(&rows);
    Ok(Out::new(message, rows).with_detail(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::view::TypeFilter;

    #[tokio::test]
    async fn test_dashboard() {
        let env = TestEnv::new().await;
        let ids = env.add_sample().await;
        let out = dashboard(env.config()).await.unwrap();
        let dash = out.structure().unwrap();
        assert_eq!(dash.totals.balance, "Rp 4.860.000");
        assert_eq!(dash.totals.income, "Rp 5.000.000");
        assert_eq!(dash.totals.expense, "Rp 140.000");
        // Newest first: Sepatu (04-01), Ojek (03-31), Nasi goreng (03-25), Gaji (03-01).
        let recent: Vec<&str> = dash.recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(recent, vec![&ids[3], &ids[2], &ids[1], &ids[0]]);
        assert_eq!(dash.recent[0].date, "1 Apr 2024");
        assert_eq!(out.message(), "Balance Rp 4.860.000 across 4 transactions");
        assert!(out.detail().unwrap().contains("Recent transactions:"));
    }

    #[tokio::test]
    async fn test_dashboard_empty() {
        let env = TestEnv::new().await;
        let out = dashboard(env.config()).await.unwrap();
        assert_eq!(out.structure().unwrap().totals.balance, "Rp 0");
        assert!(out.detail().unwrap().contains("No transactions found"));
    }

    #[tokio::test]
    async fn test_list_search_and_type() {
        let env = TestEnv::new().await;
        env.add_sample().await;

        let out = list(env.config(), ListArgs::new(Some("ojek".into()), TypeFilter::All))
            .await
            .unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Transportasi");

        // "Gaji" matches the label of the income row only.
        let out = list(env.config(), ListArgs::new(Some("GAJI".into()), TypeFilter::Expense))
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "Found 0 transactions");

        let out = list(env.config(), ListArgs::default()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 4);
        assert!(out.detail().unwrap().contains("| 31 Mar 2024 | expense | -Rp 15.000 |"));
    }
}
