use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::categories::dtos::{
    AdminCategoryListDto, CategoryDetailDto, CategoryResponseDto, CategoryTreeDto,
    CategoryWithLevelDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::hierarchy::{
    ensure_parent_assignable, order_for_display, resolve_hierarchy, DisplayOrder,
    HierarchyDiagnostics,
};
use crate::features::categories::models::{Category, CategorySummary, CATEGORY_COLUMNS};
use crate::shared::slug::resolve_slug;

const SLUG_CONFLICT: &str = "A category with this slug already exists";

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, include_inactive: bool) -> Result<Vec<Category>> {
        let query = format!(
            r#"
            SELECT {}
            FROM categories
            WHERE $1 OR is_active = TRUE
            ORDER BY display_order, name
            "#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find(&self, id: Uuid) -> Result<Category> {
        let query = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);

        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// List all active categories (flat list)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.fetch_all(false).await?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// List all active categories as tree structure
    ///
    /// Resolved over every row so an inactive parent is not reported as missing.
    /// An inactive category hides its whole subtree.
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.fetch_all(true).await?;
        let resolved = resolve_hierarchy(&categories);
        log_diagnostics(&resolved.diagnostics);

        let active = order_for_display(resolved.categories, DisplayOrder::Tree)
            .into_iter()
            .filter(|record| record.category.is_active)
            .collect();
        Ok(CategoryTreeDto::build_tree(active))
    }

    /// Get active category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let query = format!(
            "SELECT {} FROM categories WHERE slug = $1 AND is_active = TRUE",
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category by slug: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// Admin list: every category with resolved parent, depth and child count
    pub async fn list_with_levels(
        &self,
        include_inactive: bool,
        order: DisplayOrder,
    ) -> Result<AdminCategoryListDto> {
        let categories = self.fetch_all(true).await?;
        let list = AdminCategoryListDto::build(&categories, include_inactive, order);
        log_diagnostics(&list.diagnostics);
        Ok(list)
    }

    /// Admin detail with parent and direct children
    pub async fn get_detail(&self, id: Uuid) -> Result<CategoryDetailDto> {
        let category = self.find(id).await?;

        let parent = match category.parent_id {
            Some(parent_id) => sqlx::query_as::<_, CategorySummary>(
                "SELECT id, name, slug FROM categories WHERE id = $1",
            )
            .bind(parent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?,
            None => None,
        };

        let children = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT id, name, slug
            FROM categories
            WHERE parent_id = $1 AND id <> $1
            ORDER BY display_order, name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(CategoryDetailDto::new(category, parent, children))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryWithLevelDto> {
        let slug = resolve_slug(dto.slug, &dto.name)?;

        let query = format!(
            r#"
            INSERT INTO categories
                (name, slug, description, image_url, parent_id, display_order,
                 is_active, meta_title, meta_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(&dto.name)
            .bind(&slug)
            .bind(&dto.description)
            .bind(&dto.image_url)
            .bind(dto.parent_id)
            .bind(dto.display_order)
            .bind(dto.is_active.unwrap_or(true))
            .bind(&dto.meta_title)
            .bind(&dto.meta_description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, SLUG_CONFLICT))?;

        tracing::info!("Created category {} ({})", category.slug, category.id);
        self.with_level(category).await
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryWithLevelDto> {
        let existing = self.find(id).await?;

        if let Some(new_parent) = dto.parent_id {
            if new_parent != existing.parent_id {
                let all = self.fetch_all(true).await?;
                ensure_parent_assignable(&all, id, new_parent)?;
            }
        }

        let category = dto.apply(existing);

        let query = format!(
            r#"
            UPDATE categories
            SET name = $2,
                slug = $3,
                description = $4,
                image_url = $5,
                parent_id = $6,
                display_order = $7,
                is_active = $8,
                meta_title = $9,
                meta_description = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.image_url)
            .bind(category.parent_id)
            .bind(category.display_order)
            .bind(category.is_active)
            .bind(&category.meta_title)
            .bind(&category.meta_description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, SLUG_CONFLICT))?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!("Updated category {} ({})", category.slug, category.id);
        self.with_level(category).await
    }

    /// Delete a category that has no children and no products
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.find(id).await?;

        let has_children: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE parent_id = $1 AND id <> $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if has_children {
            return Err(AppError::BadRequest(
                "Cannot delete category with child categories. Please delete or move children first."
                    .to_string(),
            ));
        }

        let has_products: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM product_categories WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if has_products {
            return Err(AppError::BadRequest(
                "Cannot delete category with associated products. Please remove products from this category first."
                    .to_string(),
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, SLUG_CONFLICT))?;

        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    /// Resolve a single category against the full set
    async fn with_level(&self, category: Category) -> Result<CategoryWithLevelDto> {
        let all = self.fetch_all(true).await?;
        let resolved = resolve_hierarchy(&all);

        let children_count = resolved
            .categories
            .iter()
            .filter(|r| r.parent().is_some_and(|p| p.id == category.id))
            .count() as i64;

        let record = resolved
            .categories
            .into_iter()
            .find(|r| r.category.id == category.id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category.id)))?;

        Ok(CategoryWithLevelDto::from_record(record, children_count))
    }
}

fn log_diagnostics(diagnostics: &HierarchyDiagnostics) {
    if !diagnostics.dangling.is_empty() {
        tracing::warn!(
            "Categories with missing parent treated as top-level: {:?}",
            diagnostics.dangling
        );
    }
    if !diagnostics.cyclic.is_empty() {
        tracing::warn!(
            "Categories on a parent cycle treated as top-level: {:?}",
            diagnostics.cyclic
        );
    }
}
