//! CSV aggregation for the three derived reports.
//!
//! All inputs share one row shape: `date, account, (unused), debit,
//! credit`. Missing or non-numeric debit/credit fields count as 0.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::types::{ReportError, ReportKind};

/// Account names the financial statement recognizes, per section.
const REVENUE_ACCOUNTS: &[&str] = &["Sales Revenue"];
const EXPENSE_ACCOUNTS: &[&str] = &[
    "Cost of Goods Sold",
    "Salaries Expense",
    "Rent Expense",
    "Utilities Expense",
    "Interest Expense",
    "Tax Expense",
];
const ASSET_ACCOUNTS: &[&str] = &[
    "Cash",
    "Accounts Receivable",
    "Inventory",
    "Fixed Assets",
    "Prepaid Expenses",
];
const LIABILITY_ACCOUNTS: &[&str] = &[
    "Accounts Payable",
    "Loan Payable",
    "Sales Tax Payable",
    "Accrued Liabilities",
    "Unearned Revenue",
    "Dividends Payable",
];
const EQUITY_ACCOUNTS: &[&str] = &["Common Stock", "Retained Earnings"];

/// One parsed transaction row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CsvRow {
    pub date: String,
    pub account: String,
    pub debit: f64,
    pub credit: f64,
}

impl CsvRow {
    pub fn net(&self) -> f64 {
        self.debit - self.credit
    }
}

/// Parse a single CSV line; blank lines yield nothing.
pub(crate) fn parse_line(line: &str) -> Option<CsvRow> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split(',');
    let date = fields.next().unwrap_or("").trim().to_string();
    let account = fields.next().unwrap_or("").trim().to_string();
    let _unused = fields.next();
    let debit = parse_amount(fields.next());
    let credit = parse_amount(fields.next());

    Some(CsvRow {
        date,
        account,
        debit,
        credit,
    })
}

fn parse_amount(field: Option<&str>) -> f64 {
    field
        .and_then(|f| f.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Generate one report from the staging directory into the output directory.
pub(crate) async fn generate(
    kind: ReportKind,
    staging_dir: &Path,
    output_dir: &Path,
) -> Result<(), ReportError> {
    let rows = read_staging_rows(staging_dir, kind.output_filename()).await?;

    let output = match kind {
        ReportKind::Accounts => render_accounts(&rows),
        ReportKind::Yearly => render_yearly(&rows),
        ReportKind::FinancialStatement => render_financial_statement(&rows),
    };

    tokio::fs::create_dir_all(output_dir).await?;
    tokio::fs::write(output_dir.join(kind.output_filename()), output).await?;

    Ok(())
}

/// Read every `.csv` in the staging directory except the generator's own
/// output file, in file-name order, parsed line by line.
async fn read_staging_rows(
    staging_dir: &Path,
    own_output: &str,
) -> Result<Vec<CsvRow>, ReportError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut entries = tokio::fs::read_dir(staging_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        let is_own_output = path
            .file_name()
            .map(|name| name == own_output)
            .unwrap_or(false);

        if is_csv && !is_own_output {
            paths.push(path);
        }
    }

    // Directory iteration order is platform-dependent
    paths.sort();

    let mut rows = Vec::new();
    for path in paths {
        let contents = tokio::fs::read_to_string(&path).await?;
        rows.extend(contents.lines().filter_map(parse_line));
    }

    Ok(rows)
}

/// Per-account running balance, accounts in first-encountered order.
pub(crate) fn render_accounts(rows: &[CsvRow]) -> String {
    let mut order: Vec<String> = Vec::new();
    let mut balances: HashMap<String, f64> = HashMap::new();

    for row in rows {
        if !balances.contains_key(&row.account) {
            order.push(row.account.clone());
        }
        *balances.entry(row.account.clone()).or_insert(0.0) += row.net();
    }

    let mut out = String::from("Account,Balance\n");
    for account in &order {
        let _ = writeln!(out, "{},{:.2}", account, balances[account]);
    }
    out
}

/// Cash balance bucketed by calendar year, ascending.
pub(crate) fn render_yearly(rows: &[CsvRow]) -> String {
    let mut by_year: BTreeMap<String, f64> = BTreeMap::new();

    for row in rows {
        if row.account != "Cash" {
            continue;
        }
        let year = row.date.split('-').next().unwrap_or("").trim().to_string();
        *by_year.entry(year).or_insert(0.0) += row.net();
    }

    let mut out = String::from("Financial Year,Cash Balance\n");
    for (year, balance) in &by_year {
        let _ = writeln!(out, "{},{:.2}", year, balance);
    }
    out
}

/// Fixed-layout financial statement over the closed account set.
///
/// Accounts outside the closed set are ignored. The closing identity line
/// is diagnostic output: both sides are always printed, whether or not
/// they agree.
pub(crate) fn render_financial_statement(rows: &[CsvRow]) -> String {
    let mut balances: HashMap<&str, f64> = HashMap::new();
    for section in [
        REVENUE_ACCOUNTS,
        EXPENSE_ACCOUNTS,
        ASSET_ACCOUNTS,
        LIABILITY_ACCOUNTS,
        EQUITY_ACCOUNTS,
    ] {
        for &account in section {
            balances.insert(account, 0.0);
        }
    }

    for row in rows {
        if let Some(balance) = balances.get_mut(row.account.as_str()) {
            *balance += row.net();
        }
    }

    let section_total =
        |accounts: &[&str]| -> f64 { accounts.iter().map(|a| balances[a]).sum() };

    let revenues = section_total(REVENUE_ACCOUNTS);
    let expenses = section_total(EXPENSE_ACCOUNTS);
    let net_income = revenues - expenses;
    let total_assets = section_total(ASSET_ACCOUNTS);
    let total_liabilities = section_total(LIABILITY_ACCOUNTS);
    let total_equity = section_total(EQUITY_ACCOUNTS) + net_income;

    let mut out = String::new();

    write_section(&mut out, &balances, "Income Statement", &[]);
    write_section(&mut out, &balances, "Revenues", REVENUE_ACCOUNTS);
    write_section(&mut out, &balances, "Expenses", EXPENSE_ACCOUNTS);
    let _ = writeln!(out, "Net Income,{:.2}", net_income);

    write_section(&mut out, &balances, "Balance Sheet", &[]);
    write_section(&mut out, &balances, "Assets", ASSET_ACCOUNTS);
    let _ = writeln!(out, "Total Assets,{:.2}", total_assets);
    write_section(&mut out, &balances, "Liabilities", LIABILITY_ACCOUNTS);
    let _ = writeln!(out, "Total Liabilities,{:.2}", total_liabilities);
    write_section(&mut out, &balances, "Equity", EQUITY_ACCOUNTS);
    let _ = writeln!(out, "Retained Earnings (Net Income),{:.2}", net_income);
    let _ = writeln!(out, "Total Equity,{:.2}", total_equity);

    let _ = writeln!(
        out,
        "Assets = Liabilities + Equity, {:.2} = {:.2}",
        total_assets,
        total_liabilities + total_equity
    );

    out
}

fn write_section(
    out: &mut String,
    balances: &HashMap<&str, f64>,
    title: &str,
    accounts: &[&str],
) {
    out.push_str(title);
    out.push('\n');
    for account in accounts {
        let _ = writeln!(out, "{},{:.2}", account, balances[account]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, account: &str, debit: f64, credit: f64) -> CsvRow {
        CsvRow {
            date: date.to_string(),
            account: account.to_string(),
            debit,
            credit,
        }
    }

    #[test]
    fn test_parse_line_full_row() {
        let parsed = parse_line("2024-03-01,Cash,memo,1000,250.50").unwrap();
        assert_eq!(parsed.date, "2024-03-01");
        assert_eq!(parsed.account, "Cash");
        assert_eq!(parsed.debit, 1000.0);
        assert_eq!(parsed.credit, 250.5);
    }

    #[test]
    fn test_parse_line_malformed_amounts_are_zero() {
        let parsed = parse_line("2024-03-01,Cash,memo,abc,").unwrap();
        assert_eq!(parsed.debit, 0.0);
        assert_eq!(parsed.credit, 0.0);

        let short = parse_line("2024-03-01,Cash").unwrap();
        assert_eq!(short.debit, 0.0);
        assert_eq!(short.credit, 0.0);
    }

    #[test]
    fn test_parse_line_blank() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
    }

    #[test]
    fn test_accounts_balance_nets_debits_and_credits() {
        let rows = vec![
            row("2024-01-01", "Cash", 1000.0, 0.0),
            row("2024-01-02", "Cash", 0.0, 300.0),
        ];
        let output = render_accounts(&rows);
        assert_eq!(output, "Account,Balance\nCash,700.00\n");
    }

    #[test]
    fn test_accounts_first_encountered_order() {
        let rows = vec![
            row("2024-01-01", "Inventory", 50.0, 0.0),
            row("2024-01-02", "Cash", 10.0, 0.0),
            row("2024-01-03", "Inventory", 25.0, 0.0),
        ];
        let output = render_accounts(&rows);
        assert_eq!(
            output,
            "Account,Balance\nInventory,75.00\nCash,10.00\n"
        );
    }

    #[test]
    fn test_yearly_buckets_cash_by_year_ascending() {
        let rows = vec![
            row("2024-02-01", "Cash", 0.0, 40.0),
            row("2023-06-15", "Cash", 100.0, 0.0),
            row("2024-03-01", "Cash", 90.0, 0.0),
            row("2023-01-01", "Inventory", 999.0, 0.0),
        ];
        let output = render_yearly(&rows);
        assert_eq!(
            output,
            "Financial Year,Cash Balance\n2023,100.00\n2024,50.00\n"
        );
    }

    #[test]
    fn test_yearly_ignores_non_cash_accounts() {
        let rows = vec![row("2023-01-01", "Sales Revenue", 0.0, 500.0)];
        let output = render_yearly(&rows);
        assert_eq!(output, "Financial Year,Cash Balance\n");
    }

    #[test]
    fn test_financial_statement_ignores_unknown_accounts() {
        let rows = vec![
            row("2024-01-01", "Cash", 700.0, 0.0),
            row("2024-01-01", "Petty Cash Float", 5000.0, 0.0),
        ];
        let output = render_financial_statement(&rows);
        assert!(output.contains("Cash,700.00\n"));
        assert!(!output.contains("Petty Cash Float"));
        assert!(output.contains("Total Assets,700.00\n"));
    }

    #[test]
    fn test_financial_statement_sections_present_when_empty() {
        let output = render_financial_statement(&[]);
        assert!(output.contains("Income Statement\n"));
        assert!(output.contains("Balance Sheet\n"));
        assert!(output.contains("Net Income,0.00\n"));
        assert!(output.contains("Total Assets,0.00\n"));
        assert!(output.contains("Total Liabilities,0.00\n"));
        assert!(output.contains("Total Equity,0.00\n"));
        assert!(output.contains("Assets = Liabilities + Equity, 0.00 = 0.00\n"));
    }

    #[test]
    fn test_financial_statement_folds_net_income_into_equity() {
        let rows = vec![
            row("2024-01-01", "Sales Revenue", 100.0, 0.0),
            row("2024-01-02", "Rent Expense", 40.0, 0.0),
            row("2024-01-03", "Common Stock", 10.0, 0.0),
        ];
        let output = render_financial_statement(&rows);
        // Net income = 100 - 40
        assert!(output.contains("Net Income,60.00\n"));
        assert!(output.contains("Retained Earnings (Net Income),60.00\n"));
        // Equity total = common stock + retained earnings + net income
        assert!(output.contains("Total Equity,70.00\n"));
    }

    #[test]
    fn test_financial_statement_identity_line_prints_disagreeing_sides() {
        let rows = vec![row("2024-01-01", "Cash", 700.0, 0.0)];
        let output = render_financial_statement(&rows);
        assert!(output.contains("Assets = Liabilities + Equity, 700.00 = 0.00\n"));
    }

    #[tokio::test]
    async fn test_generate_excludes_own_output_file() {
        let staging = tempfile::tempdir().unwrap();
        std::fs::write(
            staging.path().join("txns.csv"),
            "2024-01-01,Cash,x,100,0\n",
        )
        .unwrap();
        // A stale copy of the report's own output in the staging directory
        std::fs::write(
            staging.path().join("accounts.csv"),
            "2024-01-01,Cash,x,9999,0\n",
        )
        .unwrap();

        let out = tempfile::tempdir().unwrap();
        generate(ReportKind::Accounts, staging.path(), out.path())
            .await
            .unwrap();

        let written =
            std::fs::read_to_string(out.path().join("accounts.csv")).unwrap();
        assert_eq!(written, "Account,Balance\nCash,100.00\n");
    }

    #[tokio::test]
    async fn test_generate_skips_non_csv_files() {
        let staging = tempfile::tempdir().unwrap();
        std::fs::write(
            staging.path().join("txns.csv"),
            "2024-01-01,Cash,x,100,0\n",
        )
        .unwrap();
        std::fs::write(staging.path().join("notes.txt"), "2024-01-01,Cash,x,5,0\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        generate(ReportKind::Accounts, staging.path(), out.path())
            .await
            .unwrap();

        let written =
            std::fs::read_to_string(out.path().join("accounts.csv")).unwrap();
        assert_eq!(written, "Account,Balance\nCash,100.00\n");
    }

    #[tokio::test]
    async fn test_generate_missing_staging_dir_errors() {
        let out = tempfile::tempdir().unwrap();
        let result = generate(
            ReportKind::Accounts,
            Path::new("/nonexistent/staging"),
            out.path(),
        )
        .await;
        assert!(matches!(result, Err(ReportError::Io(_))));
    }

    #[tokio::test]
    async fn test_generate_aggregates_across_files() {
        let staging = tempfile::tempdir().unwrap();
        std::fs::write(
            staging.path().join("a.csv"),
            "2024-01-01,Cash,x,1000,0\n",
        )
        .unwrap();
        std::fs::write(staging.path().join("b.csv"), "2024-01-02,Cash,x,0,300\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        generate(ReportKind::Accounts, staging.path(), out.path())
            .await
            .unwrap();

        let written =
            std::fs::read_to_string(out.path().join("accounts.csv")).unwrap();
        assert_eq!(written, "Account,Balance\nCash,700.00\n");
    }
}
