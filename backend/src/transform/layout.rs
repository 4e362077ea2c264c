//! Fixed roster layout and product-column discovery.
//!
//! ```text
//!          col 0   col 1    col 2     col 3   ...
//! row 0                     weight    weight
//! row 1                     category  category
//! row 2                     name      name      <- run stops at first blank
//! row 3                     price     price
//! row 4
//! row 5+           person   qty       qty
//! ```

use crate::error::{TransformError, TransformResult};
use crate::models::{Cell, Grid, ProductColumn};

/// Row holding per-product weight.
pub const WEIGHT_ROW: usize = 0;
/// Row holding per-product category label.
pub const CATEGORY_ROW: usize = 1;
/// Row holding per-product name.
pub const NAME_ROW: usize = 2;
/// Row holding per-product unit price.
pub const PRICE_ROW: usize = 3;
/// First person row.
pub const FIRST_PERSON_ROW: usize = 5;
/// Column holding person names.
pub const PERSON_NAME_COL: usize = 1;
/// First product column.
pub const FIRST_PRODUCT_COL: usize = 2;

/// Smallest grid that can hold the header rows and one person row.
pub const MIN_ROWS: usize = FIRST_PERSON_ROW + 1;
/// Smallest grid that can hold a name column and one product column.
pub const MIN_COLS: usize = FIRST_PRODUCT_COL + 1;

/// Reject grids too small for the fixed layout.
pub fn check_shape(grid: &Grid) -> TransformResult<()> {
    if grid.height() < MIN_ROWS || grid.width() < MIN_COLS {
        return Err(TransformError::MalformedInput(format!(
            "insufficient rows/columns: got {}x{}, need at least {}x{}",
            grid.height(),
            grid.width(),
            MIN_ROWS,
            MIN_COLS
        )));
    }
    Ok(())
}

/// Build the contiguous run of product columns.
///
/// Scanning starts at [`FIRST_PRODUCT_COL`] and stops at the first blank name
/// cell; columns past a gap are never read.
pub fn product_columns(grid: &Grid) -> TransformResult<Vec<ProductColumn>> {
    let products: Vec<ProductColumn> = (FIRST_PRODUCT_COL..grid.width())
        .map_while(|col| {
            let name = grid.get(NAME_ROW, col);
            if name.is_blank() {
                return None;
            }
            Some(ProductColumn {
                index: col,
                name: name.display(),
                category: resolve_category(grid.get(CATEGORY_ROW, col)),
                weight: resolve_weight(grid.get(WEIGHT_ROW, col)),
                unit_price: resolve_price(grid.get(PRICE_ROW, col)),
            })
        })
        .collect();

    if products.is_empty() {
        return Err(TransformError::MalformedInput(
            "no product names found".to_string(),
        ));
    }

    Ok(products)
}

/// Positive numbers only; anything else contributes no weight.
fn resolve_weight(cell: &Cell) -> Option<f64> {
    cell.as_number().filter(|w| *w > 0.0)
}

/// Blank and whitespace-only labels are both uncategorized.
fn resolve_category(cell: &Cell) -> Option<String> {
    if cell.is_blank() {
        None
    } else {
        Some(cell.display())
    }
}

fn resolve_price(cell: &Cell) -> f64 {
    cell.as_number().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_names(names: &[&str]) -> Grid {
        let mut rows = vec![Vec::new(); MIN_ROWS];
        rows[NAME_ROW] = names.iter().map(|n| Cell::from(*n)).collect();
        Grid::new(rows)
    }

    #[test]
    fn test_shape_rejects_small_grids() {
        let short = Grid::new(vec![vec![Cell::Empty; 5]; 4]);
        assert!(matches!(check_shape(&short), Err(TransformError::MalformedInput(_))));

        let narrow = Grid::new(vec![vec![Cell::Empty; 2]; 10]);
        assert!(matches!(check_shape(&narrow), Err(TransformError::MalformedInput(_))));

        let ok = Grid::new(vec![vec![Cell::Empty; 3]; 6]);
        assert!(check_shape(&ok).is_ok());
    }

    #[test]
    fn test_run_stops_at_first_gap() {
        let grid = grid_with_names(&["", "", "Widget", "", "Gadget"]);
        let products = product_columns(&grid).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Widget");
        assert_eq!(products[0].index, 2);
    }

    #[test]
    fn test_whitespace_name_ends_run() {
        let grid = grid_with_names(&["", "", "Widget", "Gadget", "  ", "Gizmo"]);
        let names: Vec<_> = product_columns(&grid).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Widget", "Gadget"]);
    }

    #[test]
    fn test_no_product_names() {
        let grid = grid_with_names(&["", "", "", "Gadget"]);
        let err = product_columns(&grid).unwrap_err();
        assert!(err.to_string().contains("no product names found"));
    }

    #[test]
    fn test_metadata_degrades_to_defaults() {
        let mut rows = vec![Vec::new(); MIN_ROWS];
        rows[WEIGHT_ROW] = vec![Cell::Empty, Cell::Empty, Cell::from(2.0), Cell::from("heavy"), Cell::from(-1.0)];
        rows[CATEGORY_ROW] = vec![Cell::Empty, Cell::Empty, Cell::from(" Snacks "), Cell::from("   ")];
        rows[NAME_ROW] = vec![Cell::Empty, Cell::Empty, Cell::from("Widget"), Cell::from("Gadget"), Cell::from(101i64)];
        rows[PRICE_ROW] = vec![Cell::Empty, Cell::Empty, Cell::from(5i64), Cell::from("n/a")];
        let products = product_columns(&Grid::new(rows)).unwrap();

        assert_eq!(products.len(), 3);
        assert_eq!(products[0].weight, Some(2.0));
        assert_eq!(products[0].category.as_deref(), Some("Snacks"));
        assert_eq!(products[0].unit_price, 5.0);

        assert_eq!(products[1].weight, None);
        assert_eq!(products[1].category, None);
        assert_eq!(products[1].unit_price, 0.0);

        assert_eq!(products[2].name, "101");
        assert_eq!(products[2].weight, None);
    }
}
