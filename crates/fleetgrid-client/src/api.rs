//! Typed scheduler API calls.
//!
//! Each method issues exactly one HTTP exchange and maps unexpected status
//! codes to the matching [`ApiError`] variant. Retrying is left to the
//! caller.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::transport::Transport;
use crate::types::{Machine, MachinePage, StatePage, UnitState, UnitSubmission};

const API_PREFIX: &str = "/v1-alpha";

/// Scheduler API client over an owned transport.
pub struct SchedulerClient<T> {
    transport: T,
}

impl<T: Transport> SchedulerClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Create or replace a unit. Any 2xx status is success.
    pub async fn submit_unit(&mut self, name: &str, submission: &UnitSubmission) -> ApiResult<()> {
        let body = serde_json::to_vec(submission).map_err(ApiError::Encode)?;
        let response = self
            .exchange(Method::PUT, &unit_path(name), Bytes::from(body))
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::SubmitFailed {
                unit: name.to_string(),
                status: response.status(),
                body: body_text(&response),
            });
        }
        Ok(())
    }

    /// Delete a unit. A unit that is already gone (404) counts as deleted.
    pub async fn delete_unit(&mut self, name: &str) -> ApiResult<()> {
        let response = self
            .exchange(Method::DELETE, &unit_path(name), Bytes::new())
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(ApiError::DeleteFailed {
                unit: name.to_string(),
                status,
                body: body_text(&response),
            }),
        }
    }

    /// Observed unit states, optionally filtered to one unit.
    pub async fn query_state(&mut self, name: Option<&str>) -> ApiResult<Vec<UnitState>> {
        let mut path = format!("{API_PREFIX}/state");
        if let Some(name) = name {
            path.push_str(&format!("?unitName={name}.service"));
        }
        let response = self.exchange(Method::GET, &path, Bytes::new()).await?;

        if response.status() != StatusCode::OK {
            return Err(ApiError::StateQueryFailed {
                status: response.status(),
                body: body_text(&response),
            });
        }
        Ok(decode::<StatePage>(response.body())?.states)
    }

    /// Machines currently registered with the cluster.
    pub async fn query_machines(&mut self) -> ApiResult<Vec<Machine>> {
        let path = format!("{API_PREFIX}/machines");
        let response = self.exchange(Method::GET, &path, Bytes::new()).await?;

        if response.status() != StatusCode::OK {
            return Err(ApiError::MachinesQueryFailed {
                status: response.status(),
                body: body_text(&response),
            });
        }
        Ok(decode::<MachinePage>(response.body())?.machines)
    }

    async fn exchange(
        &mut self,
        method: Method,
        path: &str,
        body: Bytes,
    ) -> ApiResult<Response<Bytes>> {
        let request = Request::builder()
            .method(method.clone())
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(body)?;

        debug!(%method, %path, "scheduler request");
        let response = self.transport.send(request).await?;
        debug!(%method, %path, status = %response.status(), "scheduler response");

        Ok(response)
    }
}

fn unit_path(name: &str) -> String {
    format!("{API_PREFIX}/units/{name}.service")
}

fn body_text(response: &Response<Bytes>) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}

/// Decode a JSON body, treating an empty body as the default value.
fn decode<D: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<D> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(D::default());
    }
    serde_json::from_slice(body).map_err(ApiError::Decode)
}
