use std::collections::HashMap;

use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region};
use aws_sdk_dynamodb::{types::AttributeValue as SdkAttributeValue, Client};
use tracing::{debug, info};

use crate::attribute::{item_from_sdk, Item};
use crate::convert::convert_to_json;
use crate::error::{Error, Result};

pub const DEFAULT_REGION: &str = "us-east-1";

pub const DEFAULT_PAGE_SIZE: i32 = 100;

/// Build a client, preferring `region` over the environment's default chain.
pub async fn client(region: Option<String>) -> Client {
    let region_provider = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(DEFAULT_REGION);
    let config = aws_config::defaults(BehaviorVersion::v2024_03_28())
        .region(region_provider)
        .load()
        .await;

    Client::new(&config)
}

/// Scan `table` to the end, following `LastEvaluatedKey` between pages.
pub async fn scan_items(client: &Client, table: &str, page_size: i32) -> Result<Vec<Item>> {
    let mut last_evaluated_key: Option<HashMap<String, SdkAttributeValue>> = None;
    let mut items = Vec::new();
    let mut pages = 0usize;

    loop {
        let response = client
            .scan()
            .table_name(table)
            .limit(page_size)
            .set_exclusive_start_key(last_evaluated_key.take())
            .send()
            .await
            .map_err(|err| Error::from(aws_sdk_dynamodb::Error::from(err)))?;

        pages += 1;
        if let Some(page) = response.items {
            debug!(table, page = pages, count = page.len(), "scanned page");
            items.extend(page.into_iter().map(item_from_sdk));
        }

        last_evaluated_key = response.last_evaluated_key;
        if last_evaluated_key.is_none() {
            break;
        }
    }

    info!(table, pages, items = items.len(), "finished scan");

    Ok(items)
}

/// Scan `table` and convert every item to JSON.
pub async fn scan_to_json(client: &Client, table: &str, page_size: i32) -> Result<Vec<Vec<u8>>> {
    scan_items(client, table, page_size)
        .await?
        .iter()
        .map(convert_to_json)
        .collect()
}
