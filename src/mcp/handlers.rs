//! Tool handlers backed by the thumbnail resolver.

use std::sync::Arc;

use serde_json::Value;

use super::tools::ToolHandler;
use crate::lookup::{resolve_thumbnails, LookupError, ThumbnailResolver};
use crate::models::LookupRequest;

fn parse_request(args: Value) -> Result<LookupRequest, String> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e))
}

fn lookup_error(err: LookupError) -> String {
    format!("{} (status {})", err, err.status_code())
}

/// Handler returning every candidate for a lookup
#[derive(Debug)]
pub struct ResolveThumbnailsHandler {
    pub resolver: Arc<ThumbnailResolver>,
}

#[async_trait::async_trait]
impl ToolHandler for ResolveThumbnailsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request = parse_request(args)?;

        let response = resolve_thumbnails(&self.resolver, request)
            .await
            .map_err(lookup_error)?;

        serde_json::to_value(response).map_err(|e| format!("Serialization error: {}", e))
    }
}

/// Handler returning only the best thumbnail URL
#[derive(Debug)]
pub struct GetThumbnailHandler {
    pub resolver: Arc<ThumbnailResolver>,
}

#[async_trait::async_trait]
impl ToolHandler for GetThumbnailHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request = parse_request(args)?;
        let query = request.query().ok_or_else(|| {
            lookup_error(LookupError::Validation(
                "one of title, isbn or url is required".to_string(),
            ))
        })?;

        let thumbnail = self
            .resolver
            .thumbnail(&query)
            .await
            .map_err(lookup_error)?
            .ok_or_else(|| lookup_error(LookupError::NotFound))?;

        Ok(serde_json::json!({ "thumbnail_url": thumbnail }))
    }
}
