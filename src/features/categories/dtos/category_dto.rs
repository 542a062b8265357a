use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryChanges, CategoryNode, NewCategory};
use crate::shared::validation::validate_not_blank;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub department_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            department_id: c.department_id,
            parent_id: c.parent_id,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Converts the backend tree, keeping sibling order
    pub fn build_tree(tree: &[CategoryNode]) -> Vec<CategoryTreeDto> {
        tree.iter().map(Self::build_node).collect()
    }

    fn build_node(node: &CategoryNode) -> CategoryTreeDto {
        CategoryTreeDto {
            id: node.category.id,
            name: node.category.name.clone(),
            description: node.category.description.clone(),
            parent_id: node.category.parent_id,
            children: node.children.iter().map(Self::build_node).collect(),
        }
    }
}

// Create request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub department_id: Uuid,

    /// Omit for a top-level category
    pub parent_id: Option<Uuid>,
}

impl From<CreateCategoryDto> for NewCategory {
    fn from(dto: CreateCategoryDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            description: dto
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            department_id: dto.department_id,
            parent_id: dto.parent_id,
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn deserialize_explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

// Update request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Absent keeps the parent, `null` moves the category to the top level
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,

    /// Department the category belongs to. Used to scope the parent checks
    /// and never forwarded; a category cannot change department.
    pub department_id: Option<Uuid>,
}

impl UpdateCategoryDto {
    pub fn ensure_name_not_blank(&self) -> Result<()> {
        match self.name.as_deref().map(validate_not_blank) {
            Some(Err(_)) => Err(AppError::Validation("name: must not be blank".to_string())),
            _ => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.parent_id.is_none()
    }
}

impl From<UpdateCategoryDto> for CategoryChanges {
    fn from(dto: UpdateCategoryDto) -> Self {
        Self {
            name: dto.name.map(|n| n.trim().to_string()),
            description: dto.description.map(|d| d.trim().to_string()),
            parent_id: dto.parent_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{branch, leaf};

    #[test]
    fn test_build_tree_keeps_order_and_nesting() {
        let tree = vec![
            branch("Hardware", vec![leaf("Laptops"), leaf("Monitors")]),
            leaf("Software"),
        ];

        let dto = CategoryTreeDto::build_tree(&tree);

        assert_eq!(dto.len(), 2);
        assert_eq!(dto[0].children.len(), 2);
        assert_eq!(dto[0].children[1].name, "Monitors");
        assert_eq!(dto[0].children[1].parent_id, Some(dto[0].id));
        assert!(dto[1].children.is_empty());
    }

    #[test]
    fn test_create_dto_rejects_blank_name() {
        let dto = CreateCategoryDto {
            name: "   ".to_string(),
            description: None,
            department_id: Uuid::now_v7(),
            parent_id: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateCategoryDto {
            name: " Chairs ".to_string(),
            description: Some("  ".to_string()),
            ..dto
        };
        assert!(dto.validate().is_ok());

        let input: NewCategory = dto.into();
        assert_eq!(input.name, "Chairs");
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_update_dto_distinguishes_null_from_absent_parent() {
        let absent: UpdateCategoryDto = serde_json::from_str(r#"{"name":"Desks"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let null: UpdateCategoryDto = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));

        let id = Uuid::now_v7();
        let set: UpdateCategoryDto =
            serde_json::from_str(&format!(r#"{{"parent_id":"{}"}}"#, id)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }

    #[test]
    fn test_update_dto_blank_name() {
        let dto = UpdateCategoryDto {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(dto.ensure_name_not_blank(), Err(AppError::Validation(_))));
        assert!(UpdateCategoryDto::default().ensure_name_not_blank().is_ok());
        assert!(UpdateCategoryDto::default().is_empty());
    }
}
