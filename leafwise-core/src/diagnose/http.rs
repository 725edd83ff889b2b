//! HTTP clients for the external diagnosis services.
//!
//! One reqwest client serves the three endpoints. Requests are JSON POSTs
//! with camelCase bodies. Each call makes exactly one attempt; whether to
//! re-invoke a failed diagnosis is the caller's decision, so no retry layer
//! hides in here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::services::{
    ClassificationVerdict, Classifier, ServiceUnavailable, Summarizer, TreatmentAdvice,
    TreatmentAdvisor,
};

const DEFAULT_CLASSIFY_URL: &str = "http://127.0.0.1:8790/v1/classify";
const DEFAULT_SUMMARIZE_URL: &str = "http://127.0.0.1:8791/v1/summarize";
const DEFAULT_TREATMENT_URL: &str = "http://127.0.0.1:8791/v1/treatment";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint set and request policy for the three services.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub classify_url: String,
    pub summarize_url: String,
    pub treatment_url: String,
    pub timeout: Duration,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            classify_url: DEFAULT_CLASSIFY_URL.to_string(),
            summarize_url: DEFAULT_SUMMARIZE_URL.to_string(),
            treatment_url: DEFAULT_TREATMENT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client implementing all three service traits over HTTP.
pub struct HttpDiagnosisServices {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl HttpDiagnosisServices {
    /// Build a client for the given endpoints.
    #[instrument(level = "debug", skip_all, fields(
        classify_url = %endpoints.classify_url,
        timeout_ms = endpoints.timeout.as_millis() as u64
    ))]
    pub fn new(endpoints: ServiceEndpoints) -> Result<Self, ServiceUnavailable> {
        let client = Client::builder()
            .timeout(endpoints.timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "failed to create HTTP client");
                ServiceUnavailable::new("diagnosis services", format!("HTTP client: {e}"))
            })?;

        Ok(Self { client, endpoints })
    }

    /// POST a JSON body and decode a JSON response. Single attempt.
    async fn post_json<B, R>(
        &self,
        service: &'static str,
        url: &str,
        body: &B,
    ) -> Result<R, ServiceUnavailable>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let start = Instant::now();

        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            warn!(service, error = %e, "service request failed");
            ServiceUnavailable::new(service, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(service, status = %status, "service returned error status");
            return Err(ServiceUnavailable::new(service, format!("status {status}")));
        }

        let parsed = response.json::<R>().await.map_err(|e| {
            warn!(service, error = %e, "failed to parse service response");
            ServiceUnavailable::new(service, format!("invalid response: {e}"))
        })?;

        debug!(
            service,
            latency_ms = start.elapsed().as_millis() as u64,
            "service call completed"
        );
        Ok(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest<'a> {
    image_base64: String,
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResponse {
    disease_name: String,
    confidence_score: f32,
    raw_description: String,
}

impl ClassifyResponse {
    /// Confidence is clamped at the boundary so a misbehaving service can
    /// never push an out-of-range score into the pipeline.
    fn into_verdict(self) -> ClassificationVerdict {
        ClassificationVerdict {
            disease_name: self.disease_name,
            confidence_score: self.confidence_score.clamp(0.0, 1.0),
            raw_description: self.raw_description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest<'a> {
    disease_name: &'a str,
    disease_description: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreatmentRequest<'a> {
    disease_name: &'a str,
    confidence_score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreatmentResponse {
    organic_recommendations: String,
    chemical_recommendations: String,
}

#[async_trait]
impl Classifier for HttpDiagnosisServices {
    #[instrument(level = "info", skip_all, fields(service = "classifier", bytes = image.len()))]
    async fn classify(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<ClassificationVerdict, ServiceUnavailable> {
        let body = ClassifyRequest {
            image_base64: base64::engine::general_purpose::STANDARD.encode(image),
            mime_type,
        };
        let response: ClassifyResponse = self
            .post_json("classifier", &self.endpoints.classify_url, &body)
            .await?;
        Ok(response.into_verdict())
    }
}

#[async_trait]
impl Summarizer for HttpDiagnosisServices {
    #[instrument(level = "info", skip_all, fields(service = "summarizer", disease = disease_name))]
    async fn summarize(
        &self,
        disease_name: &str,
        raw_description: &str,
    ) -> Result<String, ServiceUnavailable> {
        let body = SummarizeRequest {
            disease_name,
            disease_description: raw_description,
        };
        let response: SummarizeResponse = self
            .post_json("summarizer", &self.endpoints.summarize_url, &body)
            .await?;
        Ok(response.summary)
    }
}

#[async_trait]
impl TreatmentAdvisor for HttpDiagnosisServices {
    #[instrument(level = "info", skip_all, fields(service = "treatment", disease = disease_name))]
    async fn recommend(
        &self,
        disease_name: &str,
        confidence_score: f32,
    ) -> Result<TreatmentAdvice, ServiceUnavailable> {
        let body = TreatmentRequest {
            disease_name,
            confidence_score,
        };
        let response: TreatmentResponse = self
            .post_json("treatment", &self.endpoints.treatment_url, &body)
            .await?;
        Ok(TreatmentAdvice {
            organic_recommendations: response.organic_recommendations,
            chemical_recommendations: response.chemical_recommendations,
        })
    }
}
