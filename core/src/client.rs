use crate::api::{
    decode_data_uri, AnalysisStatus, Artifact, ErrorBody, ImageResponse, StartResponse,
    StatsResponse, StatisticsPayload, Visualization,
};
use crate::prelude::{ClientError, ClientResult};
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};

/// HTTP client for the dashboard backend.
///
/// The backend scopes every call to a session cookie, so the underlying
/// client carries a cookie store; [`ApiClient::open_session`] performs the
/// initial request that obtains it. Cloning is cheap and clones share the
/// session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|err| ClientError::Config(format!("base url {base_url}: {err}")))?;
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|err| ClientError::Config(format!("endpoint {path}: {err}")))
    }

    /// Absolute URL of an artifact, used by manual-download fallbacks.
    pub fn artifact_url(&self, artifact: Artifact) -> String {
        self.base
            .join(artifact.path())
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.base, artifact.path()))
    }

    /// Obtains the session cookie by requesting the dashboard root.
    pub async fn open_session(&self) -> ClientResult<()> {
        let response = self.http.get(self.base.clone()).send().await?;
        check(response).await?;
        Ok(())
    }

    pub async fn start_analysis(&self) -> ClientResult<StartResponse> {
        let response = self.http.post(self.endpoint("run-analysis")?).send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn fetch_status(&self) -> ClientResult<AnalysisStatus> {
        let response = self.http.get(self.endpoint("status")?).send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Plain-text report; callers degrade to a placeholder when this fails.
    pub async fn fetch_report(&self) -> ClientResult<String> {
        let response = self
            .http
            .get(self.endpoint("results/statistics_report.txt")?)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.text().await?)
    }

    /// Heatmap PNG, delivered by the backend as a base64 data URI inside a
    /// JSON envelope.
    pub async fn fetch_heatmap(&self) -> ClientResult<Vec<u8>> {
        let response = self
            .http
            .get(self.endpoint(Visualization::Heatmap.path())?)
            .send()
            .await?;
        let response = check(response).await?;
        let envelope: ImageResponse = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Backend(envelope.error.unwrap_or_else(|| {
                "Не удалось получить изображение".into()
            })));
        }
        match envelope.image {
            Some(uri) => decode_data_uri(&uri),
            None => Err(ClientError::Decode("image field missing".into())),
        }
    }

    pub async fn fetch_infographic(&self) -> ClientResult<Vec<u8>> {
        self.fetch_png(Visualization::Infographic.path()).await
    }

    pub async fn fetch_speed_distribution(&self) -> ClientResult<Vec<u8>> {
        self.fetch_png(Visualization::SpeedDistribution.path()).await
    }

    // PNG endpoints answer image bytes on success and a JSON error envelope
    // when the file is missing.
    async fn fetch_png(&self, path: &str) -> ClientResult<Vec<u8>> {
        let response = self.http.get(self.endpoint(path)?).send().await?;
        let response = check(response).await?;
        if is_json(&response) {
            let envelope: ImageResponse = response.json().await?;
            return Err(ClientError::Backend(envelope.error.unwrap_or_else(|| {
                "Не удалось получить изображение".into()
            })));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn fetch_stats(&self) -> ClientResult<StatisticsPayload> {
        let response = self
            .http
            .get(self.endpoint(Visualization::Stats.path())?)
            .send()
            .await?;
        let response = check(response).await?;
        let envelope: StatsResponse = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Backend(envelope.error.unwrap_or_else(|| {
                "Не удалось получить статистику".into()
            })));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("data field missing".into()))
    }

    pub async fn fetch_artifact(&self, artifact: Artifact) -> ClientResult<Vec<u8>> {
        debug!("fetching artifact {}", artifact.path());
        let response = self.http.get(self.endpoint(artifact.path())?).send().await?;
        let response = check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}

async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| "".into());
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.error)
        .unwrap_or(body);
    Err(ClientError::Http { status, detail })
}
