use crate::domain::model::{ImageFile, ProductPayload, SourceListing, TargetProduct};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where products are read from (Directus).
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn authenticate(&self) -> Result<()>;
    /// Rows that fail to decode come back in [`SourceListing::rejected`].
    async fn list_products(&self) -> Result<SourceListing>;
    /// Resolves an image reference to something an [`ImageFetcher`] can download.
    fn image_url(&self, image: &str) -> String {
        image.to_string()
    }
}

/// Where products are written to (Medusa).
#[async_trait]
pub trait ProductTarget: Send + Sync {
    async fn authenticate(&self) -> Result<()>;
    async fn search_products(&self, query: &str) -> Result<Vec<TargetProduct>>;
    async fn list_all_products(&self) -> Result<Vec<TargetProduct>>;
    async fn create_product(&self, payload: &ProductPayload) -> Result<String>;
    async fn update_product(&self, id: &str, payload: &ProductPayload) -> Result<String>;
    async fn delete_product(&self, id: &str) -> Result<()>;
    /// Uploads a file and returns the public URL the target assigned to it.
    async fn upload_image(&self, image: ImageFile) -> Result<String>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ImageFile>;
}

pub trait ConfigProvider: Send + Sync {
    fn currency_code(&self) -> &str;
    fn image_concurrency(&self) -> usize;
    fn prune(&self) -> bool;
    fn dry_run(&self) -> bool;
}

/// Destination for run reports.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
