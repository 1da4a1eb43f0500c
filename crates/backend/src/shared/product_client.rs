use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use uuid::Uuid;

use crate::shared::config::ProductServiceConfig;

/// Поставщик единицы измерения продукта
///
/// Каталог продуктов — внешний сервис; движок проекций знает о нём только
/// через этот трейт, чтобы тесты могли подставить заглушку.
#[async_trait]
pub trait UnitProvider: Send + Sync {
    async fn unit_of_measure(&self, product_ref: Uuid) -> anyhow::Result<String>;
}

#[derive(Debug, Deserialize)]
struct ProductDto {
    #[serde(default)]
    unit_of_measure: Option<String>,
}

/// HTTP-клиент каталога продуктов
pub struct ProductServiceClient {
    http: reqwest::Client,
    base_url: String,
    default_unit: String,
}

impl ProductServiceClient {
    pub fn new(base_url: String, default_unit: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            default_unit,
        }
    }
}

#[async_trait]
impl UnitProvider for ProductServiceClient {
    async fn unit_of_measure(&self, product_ref: Uuid) -> anyhow::Result<String> {
        let url = format!(
            "{}/api/product/{}",
            self.base_url.trim_end_matches('/'),
            product_ref
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "product service returned {} for product {}",
                response.status(),
                product_ref
            );
        }

        let product: ProductDto = response.json().await?;
        // Каталог может не знать единицу измерения — тогда берём дефолт
        Ok(product
            .unit_of_measure
            .unwrap_or_else(|| self.default_unit.clone()))
    }
}

static PRODUCT_CLIENT: OnceCell<ProductServiceClient> = OnceCell::new();

pub fn initialize_product_client(config: &ProductServiceConfig) -> anyhow::Result<()> {
    PRODUCT_CLIENT
        .set(ProductServiceClient::new(
            config.base_url.clone(),
            config.default_unit.clone(),
        ))
        .map_err(|_| anyhow::anyhow!("Failed to set PRODUCT_CLIENT"))?;
    Ok(())
}

pub fn get_product_client() -> &'static ProductServiceClient {
    PRODUCT_CLIENT
        .get()
        .expect("Product service client has not been initialized")
}
