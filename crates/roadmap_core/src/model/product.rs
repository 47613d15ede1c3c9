//! Product and whole-board aggregates.

use crate::model::initiative::{Initiative, InitiativeId};
use serde::{Deserialize, Serialize};

/// Named collection of initiatives; the unit of remote synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub initiatives: Vec<Initiative>,
}

impl Product {
    /// Creates an empty product.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initiatives: Vec::new(),
        }
    }

    pub fn initiative(&self, id: &str) -> Option<&Initiative> {
        self.initiatives.iter().find(|initiative| initiative.id == id)
    }

    pub fn initiative_mut(&mut self, id: &str) -> Option<&mut Initiative> {
        self.initiatives
            .iter_mut()
            .find(|initiative| initiative.id == id)
    }

    /// Removes one initiative and returns it when present.
    pub fn remove_initiative(&mut self, id: &str) -> Option<Initiative> {
        let index = self
            .initiatives
            .iter()
            .position(|initiative| initiative.id == id)?;
        Some(self.initiatives.remove(index))
    }

    pub fn initiative_ids(&self) -> Vec<InitiativeId> {
        self.initiatives
            .iter()
            .map(|initiative| initiative.id.clone())
            .collect()
    }
}

/// Every product known to the board, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl AppData {
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.name == name)
    }

    pub fn product_mut(&mut self, name: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|product| product.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.product(name).is_some()
    }

    /// Replaces the product with the same name in place.
    ///
    /// Returns `false` without inserting when no product has that name.
    pub fn replace_product(&mut self, product: Product) -> bool {
        match self.product_mut(&product.name) {
            Some(slot) => {
                *slot = product;
                true
            }
            None => false,
        }
    }

    /// Merges remote products over local ones.
    ///
    /// Remote products come first in their listed order and win on name
    /// conflicts; local-only products follow in their local order.
    pub fn merged_with_remote(&self, remote: Vec<Product>) -> AppData {
        let mut products: Vec<Product> = Vec::with_capacity(remote.len() + self.products.len());
        for product in remote {
            if let Some(existing) = products.iter_mut().find(|p| p.name == product.name) {
                *existing = product;
            } else {
                products.push(product);
            }
        }
        for local in &self.products {
            if !products.iter().any(|p| p.name == local.name) {
                products.push(local.clone());
            }
        }
        AppData { products }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppData, Product};
    use crate::model::initiative::{Initiative, InitiativeDraft};

    fn product_with(name: &str, titles: &[&str]) -> Product {
        let mut product = Product::new(name);
        for (index, title) in titles.iter().enumerate() {
            product.initiatives.push(Initiative::from_draft(
                index.to_string(),
                &InitiativeDraft::new(*title, 5.0, "goal"),
            ));
        }
        product
    }

    #[test]
    fn merge_prefers_remote_and_keeps_local_only() {
        let local = AppData {
            products: vec![product_with("A", &["a1"]), product_with("B", &["old"])],
        };
        let merged = local.merged_with_remote(vec![
            product_with("B", &["new", "newer"]),
            product_with("C", &[]),
        ]);

        let names: Vec<&str> = merged.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        let b = merged.product("B").expect("B should be merged");
        assert_eq!(b.initiatives.len(), 2);
        assert_eq!(b.initiatives[0].title, "new");
    }

    #[test]
    fn replace_product_ignores_unknown_names() {
        let mut data = AppData {
            products: vec![product_with("A", &[])],
        };
        assert!(!data.replace_product(product_with("Z", &["z"])));
        assert!(data.replace_product(product_with("A", &["a"])));
        assert_eq!(data.products.len(), 1);
        assert_eq!(data.products[0].initiatives.len(), 1);
    }
}
