//! Projection of cart + catalog into display rows.
//!
//! Pure: no I/O, no presentation. The embedding application feeds the rows to
//! whatever renders them (an HTML template in the shop).

use petal_market_core::Price;

use crate::catalog::{CatalogEntry, CatalogError};
use crate::item::CartState;

/// One display row: a line item joined with its catalog metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRow {
    pub image: String,
    pub name: String,
    pub number: u32,
    pub unit_price: Price,
    /// `number * unit_price`.
    pub line_total: Price,
}

/// The rendered cart: rows in cart order, grand total, and the encoded form
/// value for the hidden `cart` field.
#[derive(Debug, Clone, PartialEq)]
pub struct CartTable {
    pub rows: Vec<CartRow>,
    pub total: Price,
    pub form_value: String,
}

impl CartTable {
    /// Join the cart with catalog entries into display rows.
    ///
    /// Row order is cart order. The grand total sums the line totals.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when a held flower is missing from
    /// the catalog; a row cannot be built without its metadata.
    pub fn project(state: &CartState, catalog: &[CatalogEntry]) -> Result<Self, CatalogError> {
        let mut rows = Vec::with_capacity(state.len());
        let mut total = Price::ZERO;

        for item in state.iter() {
            let info = catalog
                .iter()
                .find(|entry| entry.id == item.id)
                .ok_or(CatalogError::NotFound(item.id))?;
            let line_total = info.unit_price.times(item.number);
            total = total + line_total;
            rows.push(CartRow {
                image: info.image.clone(),
                name: info.name.clone(),
                number: item.number,
                unit_price: info.unit_price,
                line_total,
            });
        }

        Ok(Self {
            rows,
            total,
            form_value: state.encode_form_value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use petal_market_core::FlowerId;

    use super::*;

    fn entry(id: i32, name: &str, unit_price: i64, quantity: u32) -> CatalogEntry {
        CatalogEntry {
            id: FlowerId::new(id),
            name: name.to_string(),
            image: format!("{name}.jpeg"),
            unit_price: Price::from_units(unit_price),
            quantity,
        }
    }

    #[test]
    fn test_total_and_form_value() {
        let mut state = CartState::new();
        state.merge(FlowerId::new(0), 2);
        state.merge(FlowerId::new(1), 1);

        let catalog = vec![entry(0, "gerbera", 3, 100), entry(1, "lily", 5, 50)];
        let table = CartTable::project(&state, &catalog).expect("project");

        assert_eq!(table.total, Price::from_units(11));
        assert_eq!(table.form_value, "0=2;1=1");
    }

    #[test]
    fn test_rows_follow_cart_order() {
        let mut state = CartState::new();
        state.merge(FlowerId::new(1), 1);
        state.merge(FlowerId::new(0), 2);

        let catalog = vec![entry(0, "gerbera", 3, 100), entry(1, "lily", 5, 50)];
        let table = CartTable::project(&state, &catalog).expect("project");

        let names: Vec<_> = table.rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["lily", "gerbera"]);
    }

    #[test]
    fn test_line_totals() {
        let mut state = CartState::new();
        state.merge(FlowerId::new(1), 4);

        let catalog = vec![entry(1, "rose", 3, 60)];
        let table = CartTable::project(&state, &catalog).expect("project");

        let row = table.rows.first().expect("row");
        assert_eq!(row.line_total, Price::from_units(12));
        assert_eq!(row.unit_price, Price::from_units(3));
    }

    #[test]
    fn test_unknown_flower_is_an_error() {
        let mut state = CartState::new();
        state.merge(FlowerId::new(9), 1);

        let result = CartTable::project(&state, &[]);
        assert!(matches!(result, Err(CatalogError::NotFound(id)) if id == FlowerId::new(9)));
    }

    #[test]
    fn test_empty_cart_projects_empty_table() {
        let table = CartTable::project(&CartState::new(), &[]).expect("project");
        assert!(table.rows.is_empty());
        assert_eq!(table.total, Price::ZERO);
        assert_eq!(table.form_value, "");
    }
}
