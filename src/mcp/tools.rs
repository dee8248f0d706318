//! The MCP tools. Each one wraps the command handler of the same name.

use crate::args::{
    DeleteArgs, EditArgs, ListArgs, ReportArgs, SendArgs, SummaryArgs, TransactionArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::CashbookServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl CashbookServer {
    #[tool]
    /// Initialize the cashbook MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// Record a new income or expense transaction.
    ///
    /// # Parameters
    ///
    /// - `type`: `income` or `expense`.
    /// - `amount`: A positive number. A leading `Rp` or `$` and comma separators are accepted,
    ///   e.g. `"Rp 25,000"`.
    /// - `category`: A category key such as `makanan`, `transportasi` or `gaji`. Defaults to
    ///   `lainnya`.
    /// - `description`: Optional free text.
    /// - `date`: `YYYY-MM-DD`. Defaults to today.
    ///
    /// # Returns
    ///
    /// The stored transaction as JSON, including its new `id`.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "type": "expense",
    ///   "amount": "25000",
    ///   "category": "makanan",
    ///   "description": "Nasi goreng",
    ///   "date": "2024-03-25"
    /// }
    /// ```
    #[tool]
    async fn add_transaction(
        &self,
        Parameters(args): Parameters<TransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_transaction called");
        let config = (*self.config).clone();
        tool_result(commands::add(config, args).await)
    }

    /// Replace every field of an existing transaction. Fields that are left out are reset to
    /// their defaults, they are not carried over from the stored transaction. Takes the same
    /// fields as `add_transaction` plus the `id` to replace.
    #[tool]
    async fn edit_transaction(
        &self,
        Parameters(args): Parameters<EditArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: edit_transaction called for {}", args.id());
        let config = (*self.config).clone();
        tool_result(commands::edit(config, args).await)
    }

    /// Delete one or more transactions by id. Either every id is deleted or, if any id does not
    /// exist, nothing is. Returns the totals over the transactions that remain.
    #[tool]
    async fn delete_transactions(
        &self,
        Parameters(args): Parameters<DeleteArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: delete_transactions called with {} ids", args.ids().len());
        let config = (*self.config).clone();
        tool_result(commands::delete(config, args).await)
    }

    /// The overall balance, income and expense totals, and the most recent transactions.
    #[tool]
    async fn dashboard(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::dashboard(config).await)
    }

    /// List transactions newest first. `search` matches the description or category,
    /// ignoring case. `type` is `all`, `income` or `expense`.
    #[tool]
    async fn list_transactions(
        &self,
        Parameters(args): Parameters<ListArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::list(config, args).await)
    }

    /// Income, expense, balance and count for one period. `period` is a day (`2024-03-31`), an
    /// ISO week (`2024-W13`), a month (`2024-03`) or `all`. Defaults to the current month.
    #[tool]
    async fn report(
        &self,
        Parameters(args): Parameters<ReportArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::report(config, args).await)
    }

    /// The day, ISO week and month reports for the periods that contain `date` (`YYYY-MM-DD`),
    /// today by default.
    #[tool]
    async fn summary(
        &self,
        Parameters(args): Parameters<SummaryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::summary(config, args).await)
    }

    /// Send the report for `period` to the configured chat as a plain-text message. Takes the
    /// same `period` values as `report`. The message is sent once and is not retried.
    #[tool]
    async fn send_report(
        &self,
        Parameters(args): Parameters<SendArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: send_report called");
        let config = (*self.config).clone();
        tool_result(commands::send_report(config, self.mode, args).await)
    }
}
