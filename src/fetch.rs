//! HTTP client abstraction for making requests to the Evalya backend

use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config::CLIENT_INFO;
use crate::error::Error;

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        Self {
            client,
            url: url.to_string(),
            method,
            headers: HeaderMap::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request; invalid names or values are skipped
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => debug!("Skipping invalid header {}", name),
        }
        self
    }

    /// Identify the client to the backend
    pub fn client_info(self) -> Self {
        self.header("X-Client-Info", CLIENT_INFO)
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add bearer token authentication when a token is available
    pub fn maybe_bearer_auth(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.bearer_auth(token),
            None => self,
        }
    }

    /// Append a query parameter, keeping insertion order
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(json);
        Ok(self)
    }

    /// Add a raw binary body with the given content type
    pub fn bytes(mut self, body: Vec<u8>, content_type: &str) -> Self {
        self.body = Some(body);
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        debug!("{} {}", self.method, url);

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.execute_checked().await?;
        let text = response.text().await?;
        let result = serde_json::from_str::<T>(&text)?;
        Ok(result)
    }

    /// Execute the request, failing on any non-2xx status with the body text
    pub async fn execute_checked(&self) -> Result<reqwest::Response, Error> {
        let response = self.execute_raw().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status, text));
        }

        Ok(response)
    }

    /// Execute the request and return the raw response
    pub async fn execute_raw(&self) -> Result<reqwest::Response, Error> {
        let req = self.build()?;
        let response = req.send().await?;
        Ok(response)
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PUT request
    pub fn put<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PUT)
    }
}
