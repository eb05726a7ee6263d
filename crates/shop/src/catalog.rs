//! In-memory flower catalog.
//!
//! The repository is the source of truth for flower metadata and live stock.
//! Carts treat it as read-only and re-fetch per add/render.

use std::future::Future;
use std::sync::Arc;

use petal_market_cart::{CatalogClient, CatalogEntry, CatalogError};
use petal_market_core::{CategoryId, FlowerId, Price};
use serde::Serialize;
use tokio::sync::RwLock;

/// A flower category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog flower record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flower {
    pub id: FlowerId,
    pub name: String,
    pub image: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub category: Category,
}

impl Flower {
    /// The client-facing catalog view of this flower.
    #[must_use]
    pub fn entry(&self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// Repository over the flower catalog.
///
/// Cheaply cloneable; clones share the underlying list.
#[derive(Debug, Clone)]
pub struct FlowerRepository {
    flowers: Arc<RwLock<Vec<Flower>>>,
}

impl FlowerRepository {
    /// Create a repository seeded with the standard catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let red = Category {
            id: CategoryId::new(0),
            name: "Red flowers".to_string(),
        };
        let orange = Category {
            id: CategoryId::new(1),
            name: "Orange flowers".to_string(),
        };
        let white = Category {
            id: CategoryId::new(2),
            name: "White flowers".to_string(),
        };

        let flowers = vec![
            seed_flower(0, "Gerbera", "gerbera.jpeg", 1, 100, red.clone()),
            seed_flower(1, "Red rose", "red-rose.jpeg", 3, 60, red),
            seed_flower(2, "Lily", "lily.jpeg", 5, 50, orange),
            seed_flower(3, "Daisy", "daisy.jpeg", 2, 70, white),
        ];

        Self {
            flowers: Arc::new(RwLock::new(flowers)),
        }
    }

    /// All flowers, in catalog order.
    pub async fn get_all(&self) -> Vec<Flower> {
        self.flowers.read().await.clone()
    }

    /// One flower by id.
    pub async fn get_one(&self, id: FlowerId) -> Option<Flower> {
        self.flowers
            .read()
            .await
            .iter()
            .find(|flower| flower.id == id)
            .cloned()
    }

    /// Flowers grouped by category, in first-seen category order.
    pub async fn get_by_categories(&self) -> Vec<(Category, Vec<Flower>)> {
        let flowers = self.flowers.read().await;
        let mut groups: Vec<(Category, Vec<Flower>)> = Vec::new();
        for flower in flowers.iter() {
            match groups
                .iter_mut()
                .find(|(category, _)| category.id == flower.category.id)
            {
                Some((_, members)) => members.push(flower.clone()),
                None => groups.push((flower.category.clone(), vec![flower.clone()])),
            }
        }
        groups
    }
}

fn seed_flower(
    id: i32,
    name: &str,
    image: &str,
    unit_price: i64,
    quantity: u32,
    category: Category,
) -> Flower {
    Flower {
        id: FlowerId::new(id),
        name: name.to_string(),
        image: image.to_string(),
        unit_price: Price::from_units(unit_price),
        quantity,
        category,
    }
}

/// In-process [`CatalogClient`] over the repository.
///
/// Used by the shop's own cart handlers; remote embedders use
/// [`petal_market_cart::HttpCatalogClient`] against the JSON API instead.
#[derive(Debug, Clone)]
pub struct RepositoryCatalog {
    repository: FlowerRepository,
}

impl RepositoryCatalog {
    #[must_use]
    pub const fn new(repository: FlowerRepository) -> Self {
        Self { repository }
    }
}

impl CatalogClient for RepositoryCatalog {
    fn flower(
        &self,
        id: FlowerId,
    ) -> impl Future<Output = Result<CatalogEntry, CatalogError>> + Send {
        async move {
            self.repository
                .get_one(id)
                .await
                .map(|flower| flower.entry())
                .ok_or(CatalogError::NotFound(id))
        }
    }

    fn flowers(&self) -> impl Future<Output = Result<Vec<CatalogEntry>, CatalogError>> + Send {
        async move {
            Ok(self
                .repository
                .get_all()
                .await
                .iter()
                .map(Flower::entry)
                .collect())
        }
    }
}
