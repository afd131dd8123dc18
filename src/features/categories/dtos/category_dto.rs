use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::hierarchy::{
    order_for_display, resolve_hierarchy, CategoryWithLevel, DisplayOrder, HierarchyDiagnostics,
    ParentLink, ParentRef,
};
use crate::features::categories::models::{Category, CategorySummary};
use crate::shared::coerce;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            meta_title: c.meta_title,
            meta_description: c.meta_description,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from tree-ordered resolver output.
    ///
    /// Categories with a dangling or cyclic parent become roots.
    pub fn build_tree(records: Vec<CategoryWithLevel>) -> Vec<CategoryTreeDto> {
        let mut children_of: HashMap<Uuid, Vec<Category>> = HashMap::new();
        let mut roots = Vec::new();

        for record in records {
            match record.link {
                ParentLink::ChildOf(parent) => {
                    children_of.entry(parent.id).or_default().push(record.category)
                }
                _ => roots.push(record.category),
            }
        }

        roots
            .into_iter()
            .map(|root| Self::build_node(root, &mut children_of))
            .collect()
    }

    fn build_node(category: Category, children_of: &mut HashMap<Uuid, Vec<Category>>) -> Self {
        // ChildOf links never loop, so each category is taken exactly once
        let children = children_of
            .remove(&category.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::build_node(child, children_of))
            .collect();

        CategoryTreeDto {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            image_url: category.image_url,
            display_order: category.display_order,
            children,
        }
    }
}

/// Public category listing: flat or nested
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryListDto {
    Flat(Vec<CategoryResponseDto>),
    Tree(Vec<CategoryTreeDto>),
}

/// How a category's parent reference resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParentStatus {
    Root,
    Child,
    Dangling,
    Cyclic,
}

impl From<&ParentLink> for ParentStatus {
    fn from(link: &ParentLink) -> Self {
        match link {
            ParentLink::Root => ParentStatus::Root,
            ParentLink::ChildOf(_) => ParentStatus::Child,
            ParentLink::DanglingParent(_) => ParentStatus::Dangling,
            ParentLink::CyclicParent(_) => ParentStatus::Cyclic,
        }
    }
}

/// Admin list row: category with resolved parent and depth
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryWithLevelDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Resolved parent; absent for roots and for unresolvable parents
    pub parent: Option<ParentRef>,
    pub parent_status: ParentStatus,
    /// Depth in the tree (0 for top-level rows)
    pub level: u32,
    /// Number of direct children among the listed categories
    pub children_count: i64,
}

impl CategoryWithLevelDto {
    pub fn from_record(record: CategoryWithLevel, children_count: i64) -> Self {
        let parent_status = ParentStatus::from(&record.link);
        let parent = record.link.parent().cloned();
        let c = record.category;

        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            is_active: c.is_active,
            meta_title: c.meta_title,
            meta_description: c.meta_description,
            created_at: c.created_at,
            updated_at: c.updated_at,
            parent,
            parent_status,
            level: record.level,
            children_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminCategoryListDto {
    pub categories: Vec<CategoryWithLevelDto>,
    pub diagnostics: HierarchyDiagnostics,
}

impl AdminCategoryListDto {
    /// Resolve against every stored category, then hide inactive rows unless asked for.
    /// Levels and parent links never depend on which rows are shown.
    pub fn build(all: &[Category], include_inactive: bool, order: DisplayOrder) -> Self {
        let resolved = resolve_hierarchy(all);

        let mut children_count: HashMap<Uuid, i64> = HashMap::new();
        for record in &resolved.categories {
            if let Some(parent) = record.parent() {
                *children_count.entry(parent.id).or_default() += 1;
            }
        }

        let categories = order_for_display(resolved.categories, order)
            .into_iter()
            .filter(|record| include_inactive || record.category.is_active)
            .map(|record| {
                let count = children_count
                    .get(&record.category.id)
                    .copied()
                    .unwrap_or(0);
                CategoryWithLevelDto::from_record(record, count)
            })
            .collect();

        Self {
            categories,
            diagnostics: resolved.diagnostics,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySummaryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<CategorySummary> for CategorySummaryDto {
    fn from(c: CategorySummary) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}

/// Admin detail: category with its parent and direct children
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetailDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub parent: Option<CategorySummaryDto>,
    pub children: Vec<CategorySummaryDto>,
}

impl CategoryDetailDto {
    pub fn new(
        c: Category,
        parent: Option<CategorySummary>,
        children: Vec<CategorySummary>,
    ) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            is_active: c.is_active,
            meta_title: c.meta_title,
            meta_description: c.meta_description,
            created_at: c.created_at,
            updated_at: c.updated_at,
            parent: parent.map(Into::into),
            children: children.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query params for listing public categories
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

/// Query params for the admin category list
#[derive(Debug, Deserialize, IntoParams)]
pub struct AdminListCategoriesQuery {
    /// Include inactive categories (default: true)
    #[serde(default = "default_include_inactive")]
    pub include_inactive: bool,
    /// `level` (grouped by depth, default) or `tree` (parents followed by descendants)
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub order: DisplayOrder,
}

fn default_include_inactive() -> bool {
    true
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Defaults to the slugified name
    #[validate(regex(
        path = "*crate::shared::validation::SLUG_REGEX",
        message = "Slug must be lowercase alphanumeric words separated by single hyphens"
    ))]
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub image_url: Option<String>,

    /// Empty string or null means top-level
    #[serde(default, deserialize_with = "coerce::optional_uuid")]
    pub parent_id: Option<Uuid>,

    /// Number or numeric string; blank or invalid input is 0
    #[serde(default, deserialize_with = "coerce::integer_or_zero")]
    pub display_order: i32,

    /// Defaults to true
    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub meta_title: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub meta_description: Option<String>,
}

/// Request DTO for updating a category; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(regex(
        path = "*crate::shared::validation::SLUG_REGEX",
        message = "Slug must be lowercase alphanumeric words separated by single hyphens"
    ))]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,

    /// Empty string or null moves the category to the top level
    #[serde(default, deserialize_with = "coerce::patch_uuid")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "coerce::patch_integer_or_zero")]
    pub display_order: Option<i32>,

    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub meta_title: Option<Option<String>>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub meta_description: Option<Option<String>>,
}

impl UpdateCategoryDto {
    /// Apply the provided fields on top of the stored category
    pub fn apply(self, mut category: Category) -> Category {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(slug) = self.slug {
            category.slug = slug;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        if let Some(image_url) = self.image_url {
            category.image_url = image_url;
        }
        if let Some(parent_id) = self.parent_id {
            category.parent_id = parent_id;
        }
        if let Some(display_order) = self.display_order {
            category.display_order = display_order;
        }
        if let Some(is_active) = self.is_active {
            category.is_active = is_active;
        }
        if let Some(meta_title) = self.meta_title {
            category.meta_title = meta_title;
        }
        if let Some(meta_description) = self.meta_description {
            category.meta_description = meta_description;
        }
        category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::hierarchy::{order_for_display, resolve_hierarchy};
    use serde_json::json;

    fn category(n: u128, name: &str, parent: Option<u128>) -> Category {
        Category {
            id: Uuid::from_u128(n),
            parent_id: parent.map(Uuid::from_u128),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            image_url: None,
            display_order: 0,
            is_active: true,
            meta_title: None,
            meta_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_tree_nests_children_and_lifts_orphans() {
        let all = vec![
            category(1, "Vanities", None),
            category(2, "Single", Some(1)),
            category(3, "Orphan", Some(404)),
            category(4, "Double", Some(1)),
        ];
        let resolved = resolve_hierarchy(&all);
        let tree = CategoryTreeDto::build_tree(order_for_display(
            resolved.categories,
            DisplayOrder::Tree,
        ));

        let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Orphan", "Vanities"]);
        let children: Vec<&str> = tree[1].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(children, vec!["Double", "Single"]);
    }

    #[test]
    fn test_build_tree_drops_subtree_of_hidden_parent() {
        let all = vec![
            category(1, "Vanities", None),
            category(2, "Single", Some(1)),
            category(3, "Mirrors", None),
        ];
        let visible = order_for_display(resolve_hierarchy(&all).categories, DisplayOrder::Tree)
            .into_iter()
            .filter(|r| r.category.name != "Vanities")
            .collect();

        let tree = CategoryTreeDto::build_tree(visible);
        let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Mirrors"]);
    }

    #[test]
    fn test_build_tree_survives_cycles() {
        let all = vec![category(5, "Five", Some(6)), category(6, "Six", Some(5))];
        let tree = CategoryTreeDto::build_tree(resolve_hierarchy(&all).categories);
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_create_dto_coercions() {
        let dto: CreateCategoryDto = serde_json::from_value(json!({
            "name": "Mirrors",
            "slug": "",
            "parent_id": "",
            "display_order": "3"
        }))
        .unwrap();

        assert_eq!(dto.slug, None);
        assert_eq!(dto.parent_id, None);
        assert_eq!(dto.display_order, 3);
        assert_eq!(dto.is_active, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_dto_rejects_bad_slug() {
        let dto: CreateCategoryDto = serde_json::from_value(json!({
            "name": "Mirrors",
            "slug": "Bad Slug"
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_dto_only_touches_provided_fields() {
        let mut stored = category(2, "Single", Some(1));
        stored.description = Some("Old".to_string());
        stored.display_order = 5;

        let dto: UpdateCategoryDto = serde_json::from_value(json!({
            "name": "Single Sink",
            "parent_id": null,
            "description": ""
        }))
        .unwrap();
        let updated = dto.apply(stored);

        assert_eq!(updated.name, "Single Sink");
        assert_eq!(updated.parent_id, None);
        assert_eq!(updated.description, None);
        assert_eq!(updated.display_order, 5);
        assert_eq!(updated.slug, "single");
    }

    #[test]
    fn test_admin_order_query_values() {
        let q: AdminListCategoriesQuery =
            serde_json::from_value(json!({ "order": "tree" })).unwrap();
        assert_eq!(q.order, DisplayOrder::Tree);

        let q: AdminListCategoriesQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(q.order, DisplayOrder::LevelGrouped);
        assert!(q.include_inactive);

        let q: AdminListCategoriesQuery =
            serde_json::from_value(json!({ "include_inactive": false })).unwrap();
        assert!(!q.include_inactive);
    }

    #[test]
    fn test_admin_list_links_active_child_to_inactive_parent() {
        let mut parent = category(1, "Vanities", None);
        parent.is_active = false;
        let all = vec![parent, category(2, "Single", Some(1)), category(3, "Double", Some(1))];

        let list = AdminCategoryListDto::build(&all, true, DisplayOrder::LevelGrouped);
        assert!(list.diagnostics.is_clean());
        assert_eq!(list.categories.len(), 3);
        assert_eq!(list.categories[0].name, "Vanities");
        assert_eq!(list.categories[0].children_count, 2);

        let single = list.categories.iter().find(|c| c.name == "Single").unwrap();
        assert_eq!(single.level, 1);
        assert_eq!(single.parent_status, ParentStatus::Child);
        assert_eq!(single.parent.as_ref().map(|p| p.name.as_str()), Some("Vanities"));
    }

    #[test]
    fn test_admin_list_hides_inactive_without_relinking() {
        let mut parent = category(1, "Vanities", None);
        parent.is_active = false;
        let all = vec![parent, category(2, "Single", Some(1))];

        let list = AdminCategoryListDto::build(&all, false, DisplayOrder::Tree);
        assert!(list.diagnostics.is_clean());
        assert_eq!(list.categories.len(), 1);
        assert_eq!(list.categories[0].name, "Single");
        assert_eq!(list.categories[0].level, 1);
        assert_eq!(list.categories[0].parent_status, ParentStatus::Child);
    }
}
