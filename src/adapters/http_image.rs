use crate::adapters::check_status;
use crate::domain::model::ImageFile;
use crate::domain::ports::ImageFetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const SERVICE: &str = "image host";
const FALLBACK_FILE_NAME: &str = "product-image.jpg";
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Downloads product images so they can be re-uploaded to the target.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

pub fn file_name_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn content_type_of(header: Option<&str>) -> String {
    header
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageFile> {
        tracing::debug!("Downloading image {}", url);
        let response = self.client.get(url).send().await?;
        let response = check_status(SERVICE, response).await?;

        let content_type = content_type_of(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = response.bytes().await?.to_vec();

        Ok(ImageFile {
            file_name: file_name_from_url(url),
            content_type,
            bytes,
        })
    }
}
