#![cfg(test)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::Utc;
use fake::faker::lorem::en::Word;
use fake::rand::rngs::StdRng;
use fake::rand::{Rng, SeedableRng};
use fake::Fake;
use uuid::Uuid;

use crate::core::config::CatalogConfig;
use crate::features::categories::clients::{CategoryApi, InMemoryCategoryApi};
use crate::features::categories::models::{Category, CategoryNode, CategoryTree};
use crate::features::categories::routes;
use crate::features::categories::CategoryService;

pub const TEST_DEPARTMENT: Uuid = Uuid::from_u128(1);

pub fn category(name: &str, department_id: Uuid, parent_id: Option<Uuid>) -> Category {
    Category {
        id: Uuid::now_v7(),
        name: name.to_string(),
        description: None,
        department_id,
        parent_id,
        updated_at: Utc::now(),
    }
}

pub fn leaf(name: &str) -> CategoryNode {
    CategoryNode::leaf(category(name, TEST_DEPARTMENT, None))
}

/// Node with `children` re-parented under it
pub fn branch(name: &str, mut children: Vec<CategoryNode>) -> CategoryNode {
    let parent = category(name, TEST_DEPARTMENT, None);
    for child in &mut children {
        child.category.parent_id = Some(parent.id);
    }
    CategoryNode::with_children(parent, children)
}

#[derive(Debug, Clone, Copy)]
pub struct HardwareIds {
    pub department: Uuid,
    pub hardware: Uuid,
    pub laptops: Uuid,
    pub monitors: Uuid,
    pub four_k: Uuid,
    pub ultrawide: Uuid,
}

/// Hardware > {Laptops, Monitors > {4K, Ultrawide}} as a flat list, parents first
pub fn hardware_categories() -> (HardwareIds, Vec<Category>) {
    let department = Uuid::now_v7();
    let hardware = category("Hardware", department, None);
    let laptops = category("Laptops", department, Some(hardware.id));
    let monitors = category("Monitors", department, Some(hardware.id));
    let four_k = category("4K", department, Some(monitors.id));
    let ultrawide = category("Ultrawide", department, Some(monitors.id));

    let ids = HardwareIds {
        department,
        hardware: hardware.id,
        laptops: laptops.id,
        monitors: monitors.id,
        four_k: four_k.id,
        ultrawide: ultrawide.id,
    };

    (ids, vec![hardware, laptops, monitors, four_k, ultrawide])
}

/// Same taxonomy as `hardware_categories`, nested
pub fn hardware_tree() -> (HardwareIds, CategoryTree) {
    let (ids, categories) = hardware_categories();
    let [hardware, laptops, monitors, four_k, ultrawide]: [Category; 5] =
        categories.try_into().expect("five hardware categories");

    let tree = vec![CategoryNode::with_children(
        hardware,
        vec![
            CategoryNode::leaf(laptops),
            CategoryNode::with_children(
                monitors,
                vec![CategoryNode::leaf(four_k), CategoryNode::leaf(ultrawide)],
            ),
        ],
    )];

    (ids, tree)
}

/// Tree whose shape and names are fixed by `seed`
pub fn random_tree(seed: u64) -> CategoryTree {
    fn grow(depth: usize, rng: &mut StdRng) -> CategoryNode {
        let name: String = Word().fake_with_rng(rng);
        let fanout = if depth >= 4 { 0 } else { rng.random_range(0..4) };
        let mut children = Vec::new();
        for _ in 0..fanout {
            children.push(grow(depth + 1, rng));
        }
        branch(&name, children)
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let roots = rng.random_range(1..=3);
    (0..roots).map(|_| grow(0, &mut rng)).collect()
}

/// Root names, in order
pub fn names(tree: &CategoryTree) -> Vec<String> {
    tree.iter().map(|n| n.category.name.clone()).collect()
}

/// Category routes over `api`, ready for requests
pub fn test_server(api: Arc<InMemoryCategoryApi>) -> TestServer {
    let api: Arc<dyn CategoryApi> = api;
    let service = Arc::new(CategoryService::new(api, CatalogConfig::default()));
    TestServer::new(routes::routes(service)).expect("test server starts")
}
