use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::dtos::{
    AdminListProductsQuery, CreateProductDto, ListProductsQuery, ProductDetailDto,
    ProductImageDto, ProductImageInput, ProductResponseDto, ReviewDto, UpdateProductDto,
};
use crate::features::products::models::{
    Product, ProductCategoryLink, ProductImage, ProductStatus, Review, PRODUCT_COLUMNS,
};
use crate::features::settings::SettingsService;
use crate::shared::constants::{RELATED_PRODUCTS_LIMIT, WHATSAPP_NUMBER_KEY};
use crate::shared::slug::{generate_sku, resolve_slug};
use crate::shared::whatsapp::{product_inquiry_message, whatsapp_url};

const PRODUCT_CONFLICT: &str = "A product with this slug or SKU already exists";
const DEFAULT_DIMENSION_UNIT: &str = "in";
const DEFAULT_WEIGHT_UNIT: &str = "lb";

/// Storefront catalog filter, shared by the list and count queries.
/// $1 status, $2 category slug, $3 search pattern, $4/$5 price range, $6 featured, $7 new arrival
const STOREFRONT_FILTER: &str = r#"
    p.status = $1
    AND ($2::text IS NULL OR EXISTS (
        SELECT 1 FROM product_categories pc
        JOIN categories c ON c.id = pc.category_id
        WHERE pc.product_id = p.id AND c.slug = $2
    ))
    AND ($3::text IS NULL OR p.name ILIKE $3 OR p.description ILIKE $3)
    AND ($4::numeric IS NULL OR p.base_price >= $4)
    AND ($5::numeric IS NULL OR p.base_price <= $5)
    AND (NOT $6 OR p.is_featured)
    AND (NOT $7 OR p.is_new_arrival)
"#;

/// $1 status, $2 search pattern (name or SKU)
const ADMIN_FILTER: &str = r#"
    ($1::product_status IS NULL OR p.status = $1)
    AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
"#;

/// Service for catalog and product management
pub struct ProductService {
    pool: PgPool,
    settings: Arc<SettingsService>,
    frontend_url: String,
}

impl ProductService {
    pub fn new(pool: PgPool, settings: Arc<SettingsService>, frontend_url: String) -> Self {
        Self {
            pool,
            settings,
            frontend_url,
        }
    }

    // =========================================================================
    // STOREFRONT
    // =========================================================================

    /// Filtered, paginated catalog, newest first
    pub async fn list(&self, query: &ListProductsQuery) -> Result<(Vec<ProductResponseDto>, i64)> {
        let status = query.storefront_status()?;
        let pagination = query.pagination();
        let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
        let search = query.search.as_deref().and_then(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products p WHERE {}",
            STOREFRONT_FILTER
        ))
        .bind(status)
        .bind(category)
        .bind(&search)
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(query.featured)
        .bind(query.new_arrival)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count products: {:?}", e);
            AppError::Database(e)
        })?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE {} ORDER BY p.created_at DESC LIMIT $8 OFFSET $9",
            PRODUCT_COLUMNS, STOREFRONT_FILTER
        ))
        .bind(status)
        .bind(category)
        .bind(&search)
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(query.featured)
        .bind(query.new_arrival)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list products: {:?}", e);
            AppError::Database(e)
        })?;

        let products = self.with_relations(products).await?;
        Ok((storefront(products), total))
    }

    pub async fn featured(&self, limit: i64) -> Result<Vec<ProductResponseDto>> {
        self.highlighted("p.is_featured", limit).await
    }

    pub async fn new_arrivals(&self, limit: i64) -> Result<Vec<ProductResponseDto>> {
        self.highlighted("p.is_new_arrival", limit).await
    }

    async fn highlighted(&self, flag: &str, limit: i64) -> Result<Vec<ProductResponseDto>> {
        let query = format!(
            r#"
            SELECT {}
            FROM products p
            WHERE p.status = $1 AND {}
            ORDER BY p.created_at DESC
            LIMIT $2
            "#,
            PRODUCT_COLUMNS, flag
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(ProductStatus::Active)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list highlighted products: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(storefront(self.with_relations(products).await?))
    }

    /// Product page: purchasable product by slug with reviews, related products and inquiry link
    pub async fn get_detail_by_slug(&self, slug: &str) -> Result<ProductDetailDto> {
        let query = format!(
            "SELECT {} FROM products p WHERE p.slug = $1 AND p.status IN ('active', 'pre_order')",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product by slug: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", slug)))?;

        let product = self.hydrate(product).await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, rating, title, comment, is_verified_purchase, created_at
            FROM reviews
            WHERE product_id = $1 AND is_approved = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(product.id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?
        .into_iter()
        .map(ReviewDto::from)
        .collect();

        let related = match product.categories.first() {
            Some(category) => self.related(product.id, category.id).await?,
            None => Vec::new(),
        };

        let inquiry_url = self.inquiry_url(&product.name, &product.slug).await;

        Ok(ProductDetailDto::new(product, reviews, related, inquiry_url))
    }

    async fn related(&self, product_id: Uuid, category_id: Uuid) -> Result<Vec<ProductResponseDto>> {
        let query = format!(
            r#"
            SELECT {}
            FROM products p
            WHERE p.status = $1
              AND p.id <> $2
              AND EXISTS (
                  SELECT 1 FROM product_categories pc
                  WHERE pc.product_id = p.id AND pc.category_id = $3
              )
            ORDER BY p.created_at DESC
            LIMIT $4
            "#,
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(ProductStatus::Active)
            .bind(product_id)
            .bind(category_id)
            .bind(RELATED_PRODUCTS_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(storefront(self.with_relations(products).await?))
    }

    /// Inquiry link for the product page. A settings lookup failure only hides the button.
    async fn inquiry_url(&self, name: &str, slug: &str) -> Option<String> {
        let phone = match self.settings.store_text(WHATSAPP_NUMBER_KEY).await {
            Ok(phone) => phone?,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", WHATSAPP_NUMBER_KEY, e);
                return None;
            }
        };

        let message = product_inquiry_message(name, &self.frontend_url, slug);
        whatsapp_url(&phone, Some(&message))
    }

    // =========================================================================
    // BACK OFFICE
    // =========================================================================

    pub async fn list_admin(
        &self,
        query: &AdminListProductsQuery,
    ) -> Result<(Vec<ProductResponseDto>, i64)> {
        let pagination = query.pagination();
        let search = query.search.as_deref().and_then(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products p WHERE {}",
            ADMIN_FILTER
        ))
        .bind(query.status)
        .bind(&search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count products: {:?}", e);
            AppError::Database(e)
        })?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE {} ORDER BY p.created_at DESC LIMIT $3 OFFSET $4",
            PRODUCT_COLUMNS, ADMIN_FILTER
        ))
        .bind(query.status)
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list products: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((self.with_relations(products).await?, total))
    }

    pub async fn get_admin(&self, id: Uuid) -> Result<ProductResponseDto> {
        let product = self.find(id).await?;
        self.hydrate(product).await
    }

    /// Create the product with its images and category links in one transaction
    pub async fn create(&self, dto: CreateProductDto) -> Result<ProductResponseDto> {
        let slug = resolve_slug(dto.slug, &dto.name)?;
        let sku = dto.sku.unwrap_or_else(|| generate_sku(&dto.name, None));
        let published_at = publish_time(dto.status, None);

        let query = format!(
            r#"
            INSERT INTO products
                (name, slug, sku, description, short_description, base_price, sale_price,
                 cost_price, stock_quantity, low_stock_threshold, track_inventory,
                 allow_backorder, status, is_featured, is_new_arrival, width, height, depth,
                 weight, dimension_unit, weight_unit, meta_title, meta_description,
                 meta_keywords, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&dto.name)
            .bind(&slug)
            .bind(&sku)
            .bind(&dto.description)
            .bind(&dto.short_description)
            .bind(dto.base_price)
            .bind(dto.sale_price)
            .bind(dto.cost_price)
            .bind(dto.stock_quantity)
            .bind(dto.low_stock_threshold)
            .bind(dto.track_inventory)
            .bind(dto.allow_backorder)
            .bind(dto.status)
            .bind(dto.is_featured)
            .bind(dto.is_new_arrival)
            .bind(dto.width)
            .bind(dto.height)
            .bind(dto.depth)
            .bind(dto.weight)
            .bind(dto.dimension_unit.as_deref().unwrap_or(DEFAULT_DIMENSION_UNIT))
            .bind(dto.weight_unit.as_deref().unwrap_or(DEFAULT_WEIGHT_UNIT))
            .bind(&dto.meta_title)
            .bind(&dto.meta_description)
            .bind(&dto.meta_keywords)
            .bind(published_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, PRODUCT_CONFLICT))?;

        insert_images(&mut tx, product.id, &product.name, &dto.image_data).await?;
        link_categories(&mut tx, product.id, &dto.category_ids).await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Created product {} ({})", product.slug, product.id);
        self.hydrate(product).await
    }

    /// Partial update; `image_data` / `category_ids` replace the stored rows when present
    pub async fn update(&self, id: Uuid, mut dto: UpdateProductDto) -> Result<ProductResponseDto> {
        let existing = self.find(id).await?;
        let images = dto.image_data.take();
        let category_ids = dto.category_ids.take();

        let mut product = dto.apply(existing);
        product.published_at = publish_time(product.status, product.published_at);

        let query = format!(
            r#"
            UPDATE products
            SET name = $2, slug = $3, sku = $4, description = $5, short_description = $6,
                base_price = $7, sale_price = $8, cost_price = $9, stock_quantity = $10,
                low_stock_threshold = $11, track_inventory = $12, allow_backorder = $13,
                status = $14, is_featured = $15, is_new_arrival = $16, width = $17,
                height = $18, depth = $19, weight = $20, dimension_unit = $21,
                weight_unit = $22, meta_title = $23, meta_description = $24,
                meta_keywords = $25, published_at = $26, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&product.name)
            .bind(&product.slug)
            .bind(&product.sku)
            .bind(&product.description)
            .bind(&product.short_description)
            .bind(product.base_price)
            .bind(product.sale_price)
            .bind(product.cost_price)
            .bind(product.stock_quantity)
            .bind(product.low_stock_threshold)
            .bind(product.track_inventory)
            .bind(product.allow_backorder)
            .bind(product.status)
            .bind(product.is_featured)
            .bind(product.is_new_arrival)
            .bind(product.width)
            .bind(product.height)
            .bind(product.depth)
            .bind(product.weight)
            .bind(&product.dimension_unit)
            .bind(&product.weight_unit)
            .bind(&product.meta_title)
            .bind(&product.meta_description)
            .bind(&product.meta_keywords)
            .bind(product.published_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, PRODUCT_CONFLICT))?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        if let Some(images) = images {
            sqlx::query("DELETE FROM product_images WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            insert_images(&mut tx, id, &product.name, &images).await?;
        }

        if let Some(category_ids) = category_ids {
            sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            link_categories(&mut tx, id, &category_ids).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Updated product {} ({})", product.slug, product.id);
        self.hydrate(product).await
    }

    /// Delete a product; images and category links cascade
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete product {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Product> {
        let query = format!("SELECT {} FROM products p WHERE p.id = $1", PRODUCT_COLUMNS);

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    async fn hydrate(&self, product: Product) -> Result<ProductResponseDto> {
        let id = product.id;
        self.with_relations(vec![product])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    /// Load images and categories for a page of products in two queries
    async fn with_relations(&self, products: Vec<Product>) -> Result<Vec<ProductResponseDto>> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let images = sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, product_id, url, alt_text, display_order, is_primary
            FROM product_images
            WHERE product_id = ANY($1)
            ORDER BY display_order, created_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let categories = sqlx::query_as::<_, ProductCategoryLink>(
            r#"
            SELECT pc.product_id, c.id, c.name, c.slug
            FROM product_categories pc
            JOIN categories c ON c.id = pc.category_id
            WHERE pc.product_id = ANY($1)
            ORDER BY c.display_order, c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let mut images_by_product: HashMap<Uuid, Vec<ProductImageDto>> = HashMap::new();
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image.into());
        }

        let mut categories_by_product: HashMap<Uuid, Vec<CategorySummaryDto>> = HashMap::new();
        for link in categories {
            categories_by_product
                .entry(link.product_id)
                .or_default()
                .push(CategorySummaryDto {
                    id: link.id,
                    name: link.name,
                    slug: link.slug,
                });
        }

        Ok(products
            .into_iter()
            .map(|p| {
                let images = images_by_product.remove(&p.id).unwrap_or_default();
                let categories = categories_by_product.remove(&p.id).unwrap_or_default();
                ProductResponseDto::new(p, images, categories)
            })
            .collect())
    }
}

async fn insert_images(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    product_name: &str,
    images: &[ProductImageInput],
) -> Result<()> {
    for image in images {
        sqlx::query(
            r#"
            INSERT INTO product_images (product_id, url, alt_text, display_order, is_primary)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product_id)
        .bind(image.url.trim())
        .bind(image.alt_text.as_deref().unwrap_or(product_name))
        .bind(image.display_order)
        .bind(image.is_primary)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert image for product {}: {:?}", product_id, e);
            AppError::Database(e)
        })?;
    }
    Ok(())
}

async fn link_categories(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> Result<()> {
    if category_ids.is_empty() {
        return Ok(());
    }

    let mut ids = category_ids.to_vec();
    ids.sort();
    ids.dedup();

    sqlx::query(
        r#"
        INSERT INTO product_categories (product_id, category_id)
        SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(product_id)
    .bind(&ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_db_error(e, "Category linked twice"))?;

    Ok(())
}

fn storefront(products: Vec<ProductResponseDto>) -> Vec<ProductResponseDto> {
    products
        .into_iter()
        .map(ProductResponseDto::for_storefront)
        .collect()
}

/// First activation stamps `published_at`; later status changes keep it
fn publish_time(
    status: ProductStatus,
    published_at: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (status, published_at) {
        (_, Some(at)) => Some(at),
        (ProductStatus::Active, None) => Some(Utc::now()),
        _ => None,
    }
}

/// `%term%` ILIKE pattern with wildcards in the term escaped; `None` for a blank term
fn like_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("oak"), Some("%oak%".to_string()));
        assert_eq!(like_pattern(" 50% off_"), Some("%50\\% off\\_%".to_string()));
        assert_eq!(like_pattern("   "), None);
    }

    #[test]
    fn test_publish_time() {
        let earlier = Utc::now() - chrono::Duration::days(3);

        assert!(publish_time(ProductStatus::Active, None).is_some());
        assert_eq!(publish_time(ProductStatus::Draft, None), None);
        assert_eq!(publish_time(ProductStatus::PreOrder, None), None);
        assert_eq!(
            publish_time(ProductStatus::Archived, Some(earlier)),
            Some(earlier)
        );
        assert_eq!(
            publish_time(ProductStatus::Active, Some(earlier)),
            Some(earlier)
        );
    }
}
