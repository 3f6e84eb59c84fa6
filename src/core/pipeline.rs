use crate::core::filter::ListingFilter;
use crate::core::pagination::{paginate, total_pages};
use crate::core::{
    ConfigProvider, FeedOutput, FeedPage, Listing, OutputFormat, Pipeline, RankedFeed, Storage,
};
use crate::domain::model::parse_listings;
use crate::utils::error::{FeedError, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::time::Duration;
use zip::write::{FileOptions, ZipWriter};

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

pub const FEED_JSON: &str = "feed.json";
pub const FEED_CSV: &str = "feed.csv";
pub const FEED_ZIP: &str = "atlas_feed.zip";

pub struct FeedPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> FeedPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn fetch_payload(&self, endpoint: &str) -> Result<Value> {
        let max_attempts = self.config.retry_attempts().saturating_add(1);
        let mut attempt = 1;

        loop {
            match self.request_once(endpoint).await {
                Ok(payload) => return Ok(payload),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    let delay = RETRY_BACKOFF * attempt;
                    tracing::warn!(
                        "Retry attempt {}/{} in {:?}: {}",
                        attempt,
                        max_attempts - 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_once(&self, endpoint: &str) -> Result<Value> {
        tracing::debug!("Making API request to: {}", endpoint);
        let response = self
            .client
            .get(endpoint)
            .timeout(self.config.request_timeout())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(FeedError::HttpStatusError {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let body = response.bytes().await?;
        parse_body(&body)
    }

    async fn read_input_file(&self, path: &str) -> Result<Value> {
        tracing::debug!("Reading listings from file: {}", path);
        let body = self.storage.read_file(path).await?;
        parse_body(&body)
    }

    fn filter(&self) -> ListingFilter {
        ListingFilter::new(self.config.kind_filter(), self.config.category())
    }
}

// 空白回應視為空清單
fn parse_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FeedPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Listing>> {
        let payload = match (self.config.source_endpoint(), self.config.input_file()) {
            (Some(endpoint), _) => self.fetch_payload(endpoint).await?,
            (None, Some(path)) => self.read_input_file(path).await?,
            (None, None) => {
                return Err(FeedError::MissingConfigError {
                    field: "source.endpoint or source.input_file".to_string(),
                })
            }
        };

        let listings = parse_listings(&payload, self.config.listing_kind())?;
        if listings.is_empty() {
            tracing::warn!("Listing source returned no listings");
        }
        Ok(listings)
    }

    async fn transform(&self, listings: Vec<Listing>) -> Result<FeedOutput> {
        let page_size = self.config.page_size();
        let listings = self.filter().apply(listings);

        let mut rng = match self.config.shuffle_seed() {
            Some(seed) => {
                tracing::debug!("Using fixed shuffle seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let feed = RankedFeed::build(&listings, &mut rng);
        let pages = paginate(&feed.listings, page_size)?;

        Ok(FeedOutput {
            feed,
            pages,
            page_size,
            generated_at: Utc::now(),
        })
    }

    async fn load(&self, output: FeedOutput) -> Result<String> {
        let files = render_files(&output, self.config.output_formats(), self.config.split_pages())?;
        if files.is_empty() {
            return Err(FeedError::ProcessingError {
                message: "no output formats selected".to_string(),
            });
        }

        if self.config.compress() {
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = bundle_zip(&files)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(FEED_ZIP, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), FEED_ZIP));
        }

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedDocument<'a> {
    generated_at: DateTime<Utc>,
    total: usize,
    boosted: usize,
    page_size: usize,
    total_pages: usize,
    listings: &'a [Listing],
}

#[derive(Serialize)]
struct CsvRow<'a> {
    position: usize,
    page: usize,
    id: &'a str,
    kind: String,
    name: &'a str,
    is_boosted: bool,
    boost_priority: Option<i64>,
    created_at: Option<String>,
}

/// 依輸出格式產生 (檔名, 內容)
pub fn render_files(
    output: &FeedOutput,
    formats: &[OutputFormat],
    split_pages: bool,
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();

    for format in formats {
        match format {
            OutputFormat::Json => {
                let document = FeedDocument {
                    generated_at: output.generated_at,
                    total: output.feed.len(),
                    boosted: output.feed.boosted_count,
                    page_size: output.page_size,
                    total_pages: total_pages(output.feed.len(), output.page_size),
                    listings: &output.feed.listings,
                };
                files.push((FEED_JSON.to_string(), serde_json::to_vec_pretty(&document)?));
            }
            OutputFormat::Csv => {
                files.push((FEED_CSV.to_string(), render_csv(output)?));
            }
        }
    }

    if split_pages {
        for page in &output.pages {
            files.push((page_file_name(page), serde_json::to_vec_pretty(page)?));
        }
    }

    Ok(files)
}

pub fn page_file_name(page: &FeedPage) -> String {
    format!("pages/page-{:03}.json", page.number)
}

fn render_csv(output: &FeedOutput) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for (index, listing) in output.feed.listings.iter().enumerate() {
        writer.serialize(CsvRow {
            position: index + 1,
            page: index / output.page_size.max(1) + 1,
            id: &listing.id,
            kind: listing.kind.to_string(),
            name: listing.name.as_deref().unwrap_or(""),
            is_boosted: listing.is_boosted,
            boost_priority: listing.boost_priority,
            created_at: listing.created_at.map(|t| t.to_rfc3339()),
        })?;
    }

    if output.feed.is_empty() {
        // 沒有資料列時 serialize 不會寫表頭，手動補上
        writer.write_record([
            "position",
            "page",
            "id",
            "kind",
            "name",
            "is_boosted",
            "boost_priority",
            "created_at",
        ])?;
    }

    writer.into_inner().map_err(|e| FeedError::ProcessingError {
        message: format!("failed to flush CSV writer: {}", e),
    })
}

fn bundle_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
