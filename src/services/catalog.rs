//! Admin product table filters.

use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use super::{contains_ignore_case, Selection};
use crate::models::{Product, ProductStatus, ResourceId};

/// Products at or below this many units are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StockLevel {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockLevel {
    pub fn of(product: &Product) -> Self {
        match product.stock {
            0 => StockLevel::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => StockLevel::LowStock,
            _ => StockLevel::InStock,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub status: Selection<ProductStatus>,
    pub category: Selection<ResourceId>,
    pub stock: Selection<StockLevel>,
    pub search: String,
}

impl ProductFilters {
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.status.matches(&product.status) || !self.stock.matches(&StockLevel::of(product)) {
            return false;
        }
        if let Selection::Only(category_id) = self.category {
            if product.category_id != Some(category_id) {
                return false;
            }
        }

        let term = self.search.trim().to_lowercase();
        term.is_empty()
            || contains_ignore_case(&product.name, &term)
            || contains_ignore_case(&product.sku, &term)
    }

    /// Matching products in their original order.
    pub fn apply(&self, products: &[Arc<Product>]) -> Vec<Arc<Product>> {
        products
            .iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::catalog::tests::product;

    fn products() -> Vec<Arc<Product>> {
        vec![
            Arc::new(product(1, 0, ProductStatus::Active)),
            Arc::new(product(2, 8, ProductStatus::Active)),
            Arc::new(product(3, 40, ProductStatus::Draft)),
            Arc::new(product(4, 25, ProductStatus::Active)),
        ]
    }

    #[test]
    fn stock_levels() {
        assert_eq!(StockLevel::of(&product(1, 0, ProductStatus::Active)), StockLevel::OutOfStock);
        assert_eq!(StockLevel::of(&product(1, 10, ProductStatus::Active)), StockLevel::LowStock);
        assert_eq!(StockLevel::of(&product(1, 11, ProductStatus::Active)), StockLevel::InStock);
    }

    #[test]
    fn combined_filters() {
        let filters = ProductFilters {
            status: Selection::Only(ProductStatus::Active),
            stock: Selection::Only(StockLevel::InStock),
            ..Default::default()
        };
        let ids: Vec<_> = filters.apply(&products()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn search_matches_sku_and_reset_restores_all() {
        let mut filters = ProductFilters {
            search: "blm-002".into(),
            ..Default::default()
        };
        assert_eq!(filters.apply(&products()).len(), 1);

        filters.reset();
        let all = products();
        let visible = filters.apply(&all);
        assert!(visible.iter().zip(&all).all(|(a, b)| Arc::ptr_eq(a, b)));
        assert_eq!(visible.len(), 4);
    }
}
