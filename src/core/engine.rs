use crate::core::{
    ActionOutcome, ActionRecord, ConfigProvider, ImageFetcher, ProductSource, ProductTarget,
    RejectedRow, SourceListing, SourceProduct, SyncAction, SyncReport,
};
use crate::domain::plan::{build_create_payload, build_update_payload, find_exact_match, plan_deletions};
use crate::utils::error::Result;
use futures::stream::{self, StreamExt};

/// One pass of Directus → Medusa product synchronization.
///
/// Authentication and listing failures abort the run. Failures on a single
/// product are logged, recorded in the report, and the pass moves on.
pub struct SyncEngine<S, T, F, C>
where
    S: ProductSource,
    T: ProductTarget,
    F: ImageFetcher,
    C: ConfigProvider,
{
    source: S,
    target: T,
    images: F,
    config: C,
}

struct UploadedImages {
    urls: Vec<String>,
    failed: usize,
}

impl<S, T, F, C> SyncEngine<S, T, F, C>
where
    S: ProductSource,
    T: ProductTarget,
    F: ImageFetcher,
    C: ConfigProvider,
{
    pub fn new(source: S, target: T, images: F, config: C) -> Self {
        Self {
            source,
            target,
            images,
            config,
        }
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let dry_run = self.config.dry_run();
        let mut report = SyncReport::new(dry_run);

        tracing::info!("🚀 Starting product sync{}", if dry_run { " (dry run)" } else { "" });

        self.source.authenticate().await?;
        self.target.authenticate().await?;

        let listing = self.source.list_products().await?;
        report.source_products = listing.len();

        for row in &listing.rejected {
            report.record(Self::rejected_record(row));
        }

        let products = &listing.products;
        for (index, product) in products.iter().enumerate() {
            tracing::debug!("Syncing product {}/{}: {}", index + 1, products.len(), product.name);
            let record = self.sync_product(product).await;
            report.record(record);
        }

        if self.config.prune() {
            self.prune(&listing, &mut report).await?;
        } else {
            tracing::info!("Pruning disabled, leaving unmatched Medusa products in place");
        }

        report.finish();
        tracing::info!(
            "✅ Sync finished: {} created, {} updated, {} deleted, {} failed",
            report.count("create"),
            report.count("update"),
            report.count("delete"),
            report.failures()
        );
        Ok(report)
    }

    fn rejected_record(row: &RejectedRow) -> ActionRecord {
        tracing::error!("Skipping unreadable Directus product {:?}: {}", row.id, row.error);
        ActionRecord {
            action: SyncAction::Read {
                title: row.name.clone().unwrap_or_default(),
            },
            outcome: ActionOutcome::Failed {
                error: row.error.clone(),
            },
            images_uploaded: 0,
            images_failed: 0,
        }
    }

    async fn sync_product(&self, product: &SourceProduct) -> ActionRecord {
        if product.name.trim().is_empty() {
            tracing::warn!("Skipping Directus product {:?} without a name", product.id);
            return ActionRecord {
                action: SyncAction::Create {
                    title: product.name.clone(),
                },
                outcome: ActionOutcome::Failed {
                    error: "product has no name".to_string(),
                },
                images_uploaded: 0,
                images_failed: 0,
            };
        }

        let candidates = match self.target.search_products(&product.name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("Error looking up '{}' in Medusa: {}", product.name, e);
                return ActionRecord {
                    action: SyncAction::Match {
                        title: product.name.clone(),
                    },
                    outcome: ActionOutcome::Failed {
                        error: e.to_string(),
                    },
                    images_uploaded: 0,
                    images_failed: 0,
                };
            }
        };

        let action = match find_exact_match(&product.name, &candidates) {
            Some(existing) => SyncAction::Update {
                id: existing.id.clone(),
                title: product.name.clone(),
            },
            None => SyncAction::Create {
                title: product.name.clone(),
            },
        };

        if self.config.dry_run() {
            tracing::info!("📝 Would {} '{}'", action.kind(), product.name);
            return ActionRecord {
                action,
                outcome: ActionOutcome::Planned,
                images_uploaded: 0,
                images_failed: 0,
            };
        }

        let uploaded = self.upload_images(product).await;
        let images_uploaded = uploaded.urls.len();

        let result = match &action {
            SyncAction::Update { id, .. } => {
                let payload = build_update_payload(product, uploaded.urls);
                self.target.update_product(id, &payload).await
            }
            _ => {
                let payload =
                    build_create_payload(product, uploaded.urls, self.config.currency_code());
                self.target.create_product(&payload).await
            }
        };

        let (done, doing) = match &action {
            SyncAction::Update { .. } => ("updated", "updating"),
            _ => ("created", "creating"),
        };
        let outcome = match result {
            Ok(id) => {
                tracing::info!("Product {} in Medusa: {}", done, id);
                ActionOutcome::Applied { id }
            }
            Err(e) => {
                tracing::error!("Error {} product '{}' in Medusa: {}", doing, product.name, e);
                ActionOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        ActionRecord {
            action,
            outcome,
            images_uploaded,
            images_failed: uploaded.failed,
        }
    }

    /// Uploads in source order with at most `image_concurrency` in flight.
    async fn upload_images(&self, product: &SourceProduct) -> UploadedImages {
        let results: Vec<Option<String>> = stream::iter(product.images.iter())
            .map(|image| self.upload_image(image))
            .buffered(self.config.image_concurrency().max(1))
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.is_none()).count();
        UploadedImages {
            urls: results.into_iter().flatten().collect(),
            failed,
        }
    }

    async fn upload_image(&self, image: &str) -> Option<String> {
        let url = self.source.image_url(image);
        let result: Result<String> = async {
            let file = self.images.fetch(&url).await?;
            self.target.upload_image(file).await
        }
        .await;

        match result {
            Ok(uploaded) => Some(uploaded),
            Err(e) => {
                tracing::error!("Error uploading image {} to Medusa: {}", url, e);
                None
            }
        }
    }

    /// Rejected rows still count as present, so their Medusa products stay.
    async fn prune(&self, listing: &SourceListing, report: &mut SyncReport) -> Result<()> {
        let targets = self.target.list_all_products().await?;
        let stale = plan_deletions(listing.names(), &targets);
        tracing::info!("🧹 {} Medusa products are no longer in Directus", stale.len());

        for product in stale {
            let action = SyncAction::Delete {
                id: product.id.clone(),
                title: product.title.clone(),
            };

            let outcome = if self.config.dry_run() {
                tracing::info!("📝 Would delete '{}' ({})", product.title, product.id);
                ActionOutcome::Planned
            } else {
                match self.target.delete_product(&product.id).await {
                    Ok(()) => {
                        tracing::info!("Product deleted in Medusa: {}", product.id);
                        ActionOutcome::Applied {
                            id: product.id.clone(),
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error deleting product {} in Medusa: {}", product.id, e);
                        ActionOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            report.record(ActionRecord {
                action,
                outcome,
                images_uploaded: 0,
                images_failed: 0,
            });
        }

        Ok(())
    }
}
