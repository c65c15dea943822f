//! # Argument Value Parsers
//!
//! `clap` value parsers for the compact forms the invoice flags take:
//!
//! ```text
//!   --item 42:2                   catalog carpet 42, quantity 2
//!   --item 42                     quantity defaults to 1
//!   --line "Runner:1:150,000"     free-text line, title may contain ':'
//!   --check 778899:50000:2024-04-20[:payee]
//!   --date 2024-03-20
//! ```

use chrono::NaiveDate;
use farsh_core::Money;

/// A catalog carpet reference and a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemArg {
    pub carpet_id: i64,
    pub quantity: u32,
}

/// A free-text invoice line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineArg {
    pub title: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// A check handed over with the invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckArg {
    pub number: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub payee: Option<String>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD)", value))
}

pub fn parse_money(value: &str) -> Result<Money, String> {
    value.parse::<Money>().map_err(|e| e.to_string())
}

fn parse_quantity(value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a quantity", value))
}

pub fn parse_item(value: &str) -> Result<ItemArg, String> {
    let (id, quantity) = match value.split_once(':') {
        Some((id, qty)) => (id, parse_quantity(qty)?),
        None => (value, 1),
    };
    let carpet_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not a carpet id", id))?;
    Ok(ItemArg {
        carpet_id,
        quantity,
    })
}

pub fn parse_line(value: &str) -> Result<LineArg, String> {
    let mut parts = value.rsplitn(3, ':');
    let (price, quantity, title) = match (parts.next(), parts.next(), parts.next()) {
        (Some(price), Some(qty), Some(title)) => (price, qty, title),
        _ => return Err(format!("'{}' is not TITLE:QTY:PRICE", value)),
    };
    Ok(LineArg {
        title: title.to_string(),
        quantity: parse_quantity(quantity)?,
        unit_price: parse_money(price)?,
    })
}

pub fn parse_check(value: &str) -> Result<CheckArg, String> {
    let parts: Vec<&str> = value.splitn(4, ':').collect();
    if parts.len() < 3 {
        return Err(format!("'{}' is not NUMBER:AMOUNT:DATE[:PAYEE]", value));
    }
    Ok(CheckArg {
        number: parts[0].to_string(),
        amount: parse_money(parts[1])?,
        due_date: parse_date(parts[2])?,
        payee: parts
            .get(3)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item() {
        assert_eq!(
            parse_item("42:2").unwrap(),
            ItemArg {
                carpet_id: 42,
                quantity: 2
            }
        );
        assert_eq!(parse_item("42").unwrap().quantity, 1);
        assert!(parse_item("x:2").is_err());
        assert!(parse_item("42:-1").is_err());
    }

    #[test]
    fn test_line_keeps_colons_in_title() {
        let line = parse_line("Tabriz: silk:2:100,000").unwrap();
        assert_eq!(line.title, "Tabriz: silk");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Money::from_units(100_000));
        assert!(parse_line("Tabriz:2").is_err());
    }

    #[test]
    fn test_check() {
        let check = parse_check("778899:50000:2024-04-20").unwrap();
        assert_eq!(check.number, "778899");
        assert_eq!(check.amount, Money::from_units(50_000));
        assert_eq!(check.due_date, NaiveDate::from_ymd_opt(2024, 4, 20).unwrap());
        assert_eq!(check.payee, None);

        let with_payee = parse_check("1:1,000:2024-04-20:Ali").unwrap();
        assert_eq!(with_payee.payee.as_deref(), Some("Ali"));

        assert!(parse_check("1:1000").is_err());
        assert!(parse_check("1:1000:20-04-2024").is_err());
    }
}
