//! HTML side of the results site: form state and the results table.

use std::sync::LazyLock;

use pcso_core::RawRow;
use scraper::{ElementRef, Html, Selector};

use crate::request::Unavailable;

const DENIED_MARKER: &str = "Access Denied";
const RESULTS_HEADER_MARKER: &str = "LOTTO GAME";
const FIELD_PREFIX: &str = "ctl00$ctl00$cphContainer$cpContent$";
/// Game selector value for every game
const ALL_GAMES: &str = "0";

static INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name]").expect("static selector"));
static GRID_BY_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#GridView1").expect("static selector"));
static GRID_BY_CLASS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.grid").expect("static selector"));
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("static selector"));
static TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("static selector"));
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("static selector"));
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// Bot protection answers 403 or a page saying so
pub(super) fn access_denied(status: u16, body: &str) -> Option<Unavailable> {
    (status == 403 || body.contains(DENIED_MARKER)).then_some(Unavailable::AccessDenied { status })
}

/// Hidden ASP.NET fields that must be echoed back with the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    view_state: String,
    view_state_generator: String,
    event_validation: String,
}

impl FormState {
    /// `None` when the page carries no usable `__VIEWSTATE`
    pub fn extract(html: &str) -> Option<Self> {
        let document = Html::parse_document(html);
        let field = |name: &str| -> String {
            document
                .select(&INPUT)
                .find(|input| input.value().attr("name") == Some(name))
                .and_then(|input| input.value().attr("value"))
                .unwrap_or_default()
                .to_owned()
        };

        let view_state = field("__VIEWSTATE");
        if view_state.is_empty() {
            return None;
        }

        Some(Self {
            view_state,
            view_state_generator: field("__VIEWSTATEGENERATOR"),
            event_validation: field("__EVENTVALIDATION"),
        })
    }

    /// Search form body for every game between two `MM/DD/YYYY` dates
    pub fn search_fields(&self, start: &str, end: &str) -> Vec<(String, String)> {
        vec![
            ("__VIEWSTATE".to_owned(), self.view_state.clone()),
            (
                "__VIEWSTATEGENERATOR".to_owned(),
                self.view_state_generator.clone(),
            ),
            ("__EVENTVALIDATION".to_owned(), self.event_validation.clone()),
            (format!("{FIELD_PREFIX}txtStartDate"), start.to_owned()),
            (format!("{FIELD_PREFIX}txtEndDate"), end.to_owned()),
            (format!("{FIELD_PREFIX}ddlSelectGame"), ALL_GAMES.to_owned()),
            (format!("{FIELD_PREFIX}btnSearch"), "Search Lotto".to_owned()),
        ]
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

fn find_results_table(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&GRID_BY_ID)
        .next()
        .or_else(|| document.select(&GRID_BY_CLASS).next())
        .or_else(|| {
            document.select(&TABLE).find(|table| {
                table
                    .select(&TH)
                    .any(|th| th.text().collect::<String>().contains(RESULTS_HEADER_MARKER))
            })
        })
}

/// Rows of the results table; `None` when no table can be located
pub fn parse_results(html: &str) -> Option<Vec<RawRow>> {
    let document = Html::parse_document(html);
    let table = find_results_table(&document)?;

    let rows: Vec<RawRow> = table
        .select(&TR)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&TD).map(text_of).collect();
            match cells.as_slice() {
                [game, combinations, date, jackpot, winners, ..] => Some(RawRow::new(
                    game.as_str(),
                    combinations.as_str(),
                    date.as_str(),
                    jackpot.as_str(),
                    winners.as_str(),
                )),
                _ => None,
            }
        })
        .collect();

    log::debug!("results table yielded {} rows", rows.len());
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body><form>
          <input type="hidden" name="__VIEWSTATE" value="dDwtMTA4" />
          <input type="hidden" name="__VIEWSTATEGENERATOR" value="C0D3" />
          <input type="hidden" name="__EVENTVALIDATION" value="ev+1" />
          <input type="text" name="ctl00$ctl00$cphContainer$cpContent$txtStartDate" />
        </form></body></html>
    "#;

    #[test]
    fn extracts_form_state() {
        let state = FormState::extract(SEARCH_PAGE).expect("view state present");
        let fields = state.search_fields("12/01/2025", "12/16/2025");

        assert_eq!(fields[0], ("__VIEWSTATE".to_owned(), "dDwtMTA4".to_owned()));
        assert_eq!(fields[1].1, "C0D3");
        assert_eq!(fields[2].1, "ev+1");
        assert!(fields.contains(&(
            "ctl00$ctl00$cphContainer$cpContent$txtEndDate".to_owned(),
            "12/16/2025".to_owned()
        )));
        assert!(fields.contains(&(
            "ctl00$ctl00$cphContainer$cpContent$ddlSelectGame".to_owned(),
            "0".to_owned()
        )));
    }

    #[test]
    fn missing_view_state_is_not_a_form() {
        assert_eq!(FormState::extract("<html><body>maintenance</body></html>"), None);
        assert_eq!(
            FormState::extract(r#"<input name="__VIEWSTATE" value="">"#),
            None
        );
    }

    #[test]
    fn detects_bot_protection() {
        assert_eq!(
            access_denied(403, ""),
            Some(Unavailable::AccessDenied { status: 403 })
        );
        assert_eq!(
            access_denied(200, "<h1>Access Denied</h1>"),
            Some(Unavailable::AccessDenied { status: 200 })
        );
        assert_eq!(access_denied(200, SEARCH_PAGE), None);
    }

    #[test]
    fn parses_grid_view_rows() {
        let html = r#"
            <table id="GridView1">
              <tr><th>LOTTO GAME</th><th>COMBINATIONS</th><th>DRAW DATE</th><th>JACKPOT (PHP)</th><th>WINNERS</th></tr>
              <tr><td> Ultra Lotto 6/58 </td><td>35-37-14-01-43-12</td><td>12/16/2025</td><td>49,500,000.00</td><td>0</td></tr>
              <tr><td>3D Lotto 2PM</td><td>7-0-2</td><td>12/16/2025</td><td>4,500.00</td><td>312</td></tr>
              <tr><td colspan="5">No more results</td></tr>
            </table>
        "#;
        let rows = parse_results(html).expect("table found");

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            RawRow::new(
                "Ultra Lotto 6/58",
                "35-37-14-01-43-12",
                "12/16/2025",
                "49,500,000.00",
                "0"
            )
        );
        assert_eq!(rows[1].game_name, "3D Lotto 2PM");
        assert_eq!(rows[1].winners, "312");
    }

    #[test]
    fn falls_back_to_grid_class_then_header_text() {
        let by_class = r#"
            <table><tr><td>layout</td></tr></table>
            <table class="grid">
              <tr><th>Game</th></tr>
              <tr><td>4D Lotto</td><td>1-2-3-4</td><td>12/15/2025</td><td>10,000.00</td><td>3</td></tr>
            </table>
        "#;
        let rows = parse_results(by_class).expect("grid class table");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].combinations, "1-2-3-4");

        let by_header = r#"
            <table><tr><td>layout</td></tr></table>
            <table>
              <tr><th>LOTTO GAME</th><th>COMBINATIONS</th></tr>
              <tr><td>Lotto 6/42</td><td>4-8-15-16-23-42</td><td>12/13/2025</td><td>PHP 6,000,000.00</td><td>1</td></tr>
            </table>
        "#;
        let rows = parse_results(by_header).expect("table with LOTTO GAME header");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].jackpot, "PHP 6,000,000.00");
    }

    #[test]
    fn no_table_is_none_and_empty_table_is_zero_rows() {
        assert_eq!(parse_results("<html><body><p>nothing</p></body></html>"), None);

        let empty = r#"<table id="GridView1"><tr><th>LOTTO GAME</th></tr></table>"#;
        assert_eq!(parse_results(empty), Some(Vec::new()));
    }
}
