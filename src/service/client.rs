//! Blocking HTTP client for the description service.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ServiceError;
use crate::types::{Models, Opts};

use super::image::compress_image;
use super::prompts::{architecture_prompt, combine_prompt, file_prompt, folder_prompt};
use super::protocol::{ChatRequest, ChatResponse, ImageRequest, ImageResponse, ModelSpec};
use super::{Analyst, Describer};

const ASK_ENDPOINT: &str = "ask";
const IMAGE_ENDPOINT: &str = "analyze-image";

/// Client for `/ask` and `/analyze-image`. Cheap to share across worker threads.
pub struct ApiClient {
    http: Client,
    base_url: String,
    models: Models,
}

impl ApiClient {
    pub fn new(opts: &Opts) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(opts.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: opts.api_base_url.trim_end_matches('/').to_string(),
            models: opts.models.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self.http.post(&url).json(body).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<R>()
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    fn ask(&self, prompt: &str, model: &ModelSpec) -> Result<String, ServiceError> {
        let resp: ChatResponse = self.post(ASK_ENDPOINT, &ChatRequest::user(prompt, model))?;
        debug!("/{} answered, queue length {}", ASK_ENDPOINT, resp.queue_length);
        Ok(resp.response)
    }
}

impl Describer for ApiClient {
    fn describe_file(&self, content: &str, name: &str) -> Result<String, ServiceError> {
        self.ask(&file_prompt(name, content), &self.models.file)
    }

    fn describe_image(&self, path: &Path) -> Result<String, ServiceError> {
        let bytes = compress_image(path)?;
        let encoded = STANDARD.encode(&bytes);
        let request = ImageRequest {
            image: &encoded,
            model: &self.models.image,
        };
        let resp: ImageResponse = self.post(IMAGE_ENDPOINT, &request)?;
        debug!(
            "/{} answered, queue length {}",
            IMAGE_ENDPOINT, resp.queue_length
        );
        Ok(resp.analysis)
    }

    fn describe_folder(&self, summary: &str, name: &str) -> Result<String, ServiceError> {
        self.ask(&folder_prompt(name, summary), &self.models.folder)
    }
}

impl Analyst for ApiClient {
    fn analyze(&self, chunk: &str, label: &str) -> Result<String, ServiceError> {
        self.ask(&architecture_prompt(label, chunk), &self.models.architecture)
    }

    fn combine(&self, analyses: &[String]) -> Result<String, ServiceError> {
        self.ask(&combine_prompt(analyses), &self.models.architecture)
    }
}
