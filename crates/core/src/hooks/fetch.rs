//! What a hook fetches

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use batchgate_domain::{KeyedRequest, RequestOptions};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{ApiClient, ApiResult};

/// One fetch attempt against the facade
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    async fn fetch(&self, api: &ApiClient) -> ApiResult<Self::Output>;
}

/// A single GET
#[derive(Debug)]
pub struct SingleFetch<T> {
    pub url: String,
    pub options: RequestOptions,
    _output: PhantomData<fn() -> T>,
}

impl<T> SingleFetch<T> {
    pub fn new(url: impl Into<String>, options: RequestOptions) -> Self {
        Self { url: url.into(), options, _output: PhantomData }
    }
}

impl<T> Clone for SingleFetch<T> {
    fn clone(&self) -> Self {
        Self::new(self.url.clone(), self.options)
    }
}

#[async_trait]
impl<T> Fetch for SingleFetch<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Output = T;

    async fn fetch(&self, api: &ApiClient) -> ApiResult<T> {
        api.get(&self.url, self.options).await
    }
}

/// A facade `batch` whose results are published by key
#[derive(Debug, Clone, Default)]
pub struct BatchFetch {
    pub requests: Vec<KeyedRequest>,
}

impl BatchFetch {
    pub fn new(requests: Vec<KeyedRequest>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl Fetch for BatchFetch {
    type Output = HashMap<String, Value>;

    async fn fetch(&self, api: &ApiClient) -> ApiResult<Self::Output> {
        let requests = self.requests.iter().map(|keyed| keyed.request.clone()).collect();
        let results = api.batch(requests).await?;
        Ok(self.requests.iter().map(|keyed| keyed.key.clone()).zip(results).collect())
    }
}
