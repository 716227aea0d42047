//! Upstream endpoints and run defaults shared by the updater and the viewer.

use std::time::Duration;

/// Default location of the persisted price store.
pub const DEFAULT_STORE_PATH: &str = "stock_prices.json";

/// Spreadsheet holding the account/code columns.
pub const DEFAULT_SHEET_ID: &str = "1AMJsDNUm0y_tFNC3zW3zbWPqFTovEyAl-cnhPnSokSo";
/// Worksheet id inside the spreadsheet.
pub const DEFAULT_SHEET_GID: &str = "0";
/// Zero-based index of the account/market column (column C).
pub const DEFAULT_ACCOUNT_COLUMN: usize = 2;
/// Zero-based index of the code column (column F).
pub const DEFAULT_CODE_COLUMN: usize = 5;

/// Minimum pause between two identifier resolutions.
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(500);
/// Upper bound of a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like agent; both quote sites refuse the default client agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Naver Finance item page, primary source for Korea codes.
pub const NAVER_ITEM_URL: &str = "https://finance.naver.com/item/main.naver";
/// Google Finance quote page, primary source for US tickers.
pub const GOOGLE_QUOTE_URL: &str = "https://www.google.com/finance/quote";
/// Yahoo Finance chart API, secondary source for both markets.
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// CSV export URL of a Google Sheets worksheet.
pub fn sheet_csv_url(sheet_id: &str, gid: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        sheet_id, gid
    )
}
