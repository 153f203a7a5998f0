use crate::error::{EtlError, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

/// One row of the source ranking table. The market cap is kept as raw cell
/// text; the numeric cast happens during transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankRecord {
    pub name: String,
    pub mc_usd_billion: String,
}

impl BankRecord {
    /// Field names this extractor produces, in output order.
    pub const FIELDS: [&'static str; 2] = ["Name", "MC_USD_Billion"];
}

/// Fetch the source document and parse its first table body into records,
/// preserving the source ranking order.
pub async fn extract(
    client: &Client,
    source_url: &str,
    expected_fields: &[String],
) -> Result<Vec<BankRecord>> {
    validate_expected_fields(expected_fields)?;
    let html = fetch_document(client, source_url).await?;
    let records = parse_bank_table(&html)?;
    info!(records = records.len(), url = source_url, "extracted bank table");
    Ok(records)
}

/// Retrieve the document body as text. Any retrieval failure, including a
/// non-success status, is fatal to the run.
pub async fn fetch_document(client: &Client, source_url: &str) -> Result<String> {
    let url = Url::parse(source_url)
        .map_err(|e| EtlError::Parse(format!("invalid source url {:?}: {}", source_url, e)))?;
    let fetch_err = |source| EtlError::Fetch {
        url: source_url.to_string(),
        source,
    };
    let body = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e))?
        .error_for_status()
        .map_err(|e| fetch_err(e))?
        .text()
        .await
        .map_err(|e| fetch_err(e))?;
    debug!(bytes = body.len(), "fetched source document");
    Ok(body)
}

/// Parse the first `tbody` in document order. The first row is the header and
/// is skipped; each remaining row with at least one `td` contributes cell 1 as
/// the bank name and cell 2 as the USD market cap, whitespace-trimmed. Rows
/// where either value is empty are excluded.
pub fn parse_bank_table(html: &str) -> Result<Vec<BankRecord>> {
    let tbody_selector = Selector::parse("tbody").expect("tbody selector should be valid");
    let tr_selector = Selector::parse("tr").expect("tr selector should be valid");
    let td_selector = Selector::parse("td").expect("td selector should be valid");

    let document = Html::parse_document(html);
    let tbody = document
        .select(&tbody_selector)
        .next()
        .ok_or_else(|| EtlError::Parse("no table body element in source document".to_string()))?;

    let mut records = Vec::new();
    for row in tbody.select(&tr_selector).skip(1) {
        let cells: Vec<String> = row
            .select(&td_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() < 3 {
            return Err(EtlError::Parse(format!(
                "table row has {} cells, expected at least 3",
                cells.len()
            )));
        }
        let name = cells[1].clone();
        let mc_usd_billion = cells[2].clone();
        if name.is_empty() || mc_usd_billion.is_empty() {
            continue;
        }
        records.push(BankRecord {
            name,
            mc_usd_billion,
        });
    }
    Ok(records)
}

/// The extraction schema is fixed by `BankRecord`; a caller asking for
/// anything else gets a parse error rather than silently mismatched columns.
fn validate_expected_fields(expected_fields: &[String]) -> Result<()> {
    if expected_fields
        .iter()
        .map(String::as_str)
        .eq(BankRecord::FIELDS)
    {
        Ok(())
    } else {
        Err(EtlError::Parse(format!(
            "unsupported extraction schema {:?}, extractor produces {:?}",
            expected_fields,
            BankRecord::FIELDS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><body><table><tbody>
        <tr><th>Rank</th><th>Bank name</th><th>Market cap (US$ billion)</th></tr>
        <tr><td>1</td><td> JPMorgan Chase </td><td>432.92</td></tr>
        <tr><td>2</td><td>Bank of America</td><td>231.52</td></tr>
        <tr><td>3</td><td>ICBC</td><td>194.56</td></tr>
    </tbody></table></body></html>"#;

    #[test]
    fn parses_qualifying_rows_in_source_order() -> Result<()> {
        let records = parse_bank_table(SAMPLE)?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "JPMorgan Chase");
        assert_eq!(records[0].mc_usd_billion, "432.92");
        assert_eq!(records[2].name, "ICBC");
        Ok(())
    }

    #[test]
    fn header_only_tbody_yields_empty_set() -> Result<()> {
        let html = r#"<table><tbody>
            <tr><th>Rank</th><th>Bank name</th><th>Market cap</th></tr>
        </tbody></table>"#;
        let records = parse_bank_table(html)?;
        assert!(records.is_empty());
        Ok(())
    }

    #[test]
    fn missing_tbody_is_a_parse_error() {
        let err = parse_bank_table("<p>no tables here</p>").unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn row_with_too_few_cells_is_a_parse_error() {
        let html = r#"<table><tbody>
            <tr><th>Rank</th><th>Bank name</th><th>Market cap</th></tr>
            <tr><td>1</td><td>Lonely Bank</td></tr>
        </tbody></table>"#;
        let err = parse_bank_table(html).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn rows_with_empty_values_are_excluded() -> Result<()> {
        let html = r#"<table><tbody>
            <tr><th>Rank</th><th>Bank name</th><th>Market cap</th></tr>
            <tr><td>1</td><td>   </td><td>100.00</td></tr>
            <tr><td>2</td><td>Real Bank</td><td>50.00</td></tr>
        </tbody></table>"#;
        let records = parse_bank_table(html)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Real Bank");
        Ok(())
    }

    #[test]
    fn unexpected_schema_is_rejected() {
        let fields = vec!["Name".to_string(), "Assets".to_string()];
        let err = validate_expected_fields(&fields).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)), "got {err:?}");

        let fields = vec!["Name".to_string(), "MC_USD_Billion".to_string()];
        assert!(validate_expected_fields(&fields).is_ok());
    }
}
