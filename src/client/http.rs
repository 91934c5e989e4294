//! reqwest-backed client for a REST user collection.
//!
//! Verb mapping: `GET <base>`, `POST <base>`, `PUT <base>/<id>`,
//! `DELETE <base>/<id>`. Bodies are JSON in the [`User`] shape.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::client::{NetworkError, Operation, UserResource};
use crate::constants::USER_AGENT;
use crate::models::{NewUser, User, UserPatch};

/// Errors while constructing the client.
#[derive(Error, Debug)]
pub enum ClientInitError {
    #[error("base URL cannot carry a path: {0}")]
    CannotBeABase(Url),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP client for a single collection endpoint.
#[derive(Debug, Clone)]
pub struct HttpUserClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpUserClient {
    /// Create a client for the collection at `base_url`.
    ///
    /// `timeout` of `None` means requests wait as long as the transport allows.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ClientInitError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientInitError::CannotBeABase(base_url));
        }
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// `<base>/<id>`, tolerating a trailing slash on the base.
    fn item_url(&self, id: u64) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`, so the segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sending request");
        self.http.request(method, url)
    }

    async fn send(&self, operation: Operation, req: RequestBuilder) -> Result<Response, NetworkError> {
        let resp = req
            .send()
            .await
            .map_err(|e| NetworkError::new(operation, format!("request failed: {e}")))?;

        let status = resp.status();
        debug!(%operation, %status, "response received");
        if !status.is_success() {
            return Err(NetworkError::new(operation, format!("HTTP {status}")));
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(operation: Operation, resp: Response) -> Result<T, NetworkError> {
        resp.json::<T>()
            .await
            .map_err(|e| NetworkError::new(operation, format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl UserResource for HttpUserClient {
    async fn list(&self) -> Result<Vec<User>, NetworkError> {
        let req = self.request(Method::GET, self.base_url.clone());
        let resp = self.send(Operation::List, req).await?;
        Self::decode(Operation::List, resp).await
    }

    async fn create(&self, user: &NewUser) -> Result<User, NetworkError> {
        let req = self.request(Method::POST, self.base_url.clone()).json(user);
        let resp = self.send(Operation::Create, req).await?;
        Self::decode(Operation::Create, resp).await
    }

    async fn update(&self, id: u64, patch: &UserPatch) -> Result<User, NetworkError> {
        let req = self.request(Method::PUT, self.item_url(id)).json(patch);
        let resp = self.send(Operation::Update, req).await?;
        Self::decode(Operation::Update, resp).await
    }

    async fn delete(&self, id: u64) -> Result<(), NetworkError> {
        let req = self.request(Method::DELETE, self.item_url(id));
        self.send(Operation::Delete, req).await?;
        Ok(())
    }
}
