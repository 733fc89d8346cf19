//! Live adapter for the Google Generative Language API (Imagen + Gemini).

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::MockupError;
use crate::model::{detect_family, ModelFamily};
use crate::payload::ImagePayload;
use crate::ports::image_service::{
    EditRequest, ImageService, LogoPlacementRequest, MockupRequest, ServiceFuture,
    EDIT_IMAGE_ACTION, PLACE_LOGO_ACTION,
};

/// Default REST base for model calls.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const MOCKUP_MIME: &str = "image/jpeg";
const MOCKUP_ASPECT_RATIO: &str = "1:1";

/// Everything the client needs, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API key; `None` makes every call fail with `MissingApiKey`.
    pub api_key: Option<String>,
    /// REST base URL without trailing slash.
    pub api_base: String,
    /// Resolved text-to-image model id.
    pub generate_model: String,
    /// Resolved image-editing model id.
    pub edit_model: String,
}

/// Live client that calls the Google AI API.
pub struct GeminiClient {
    client: Client,
    settings: ClientSettings,
    generate_family: ModelFamily,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the generation model belongs to no known family.
    pub fn new(settings: ClientSettings) -> Result<Self, MockupError> {
        let generate_family =
            detect_family(&settings.generate_model).map_err(MockupError::InvalidArgument)?;
        Ok(Self { client: Client::new(), settings, generate_family })
    }

    fn api_key(&self) -> Result<&str, MockupError> {
        self.settings
            .api_key
            .as_deref()
            .ok_or(MockupError::MissingApiKey { env_var: "GEMINI_API_KEY" })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        body: &B,
    ) -> Result<T, MockupError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{model}:{method}", self.settings.api_base);
        tracing::debug!(%url, "sending request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(MockupError::Api { status: status.as_u16(), message: response_text });
        }

        serde_json::from_str(&response_text).map_err(|e| MockupError::Api {
            status: status.as_u16(),
            message: format!("Failed to parse response: {e}"),
        })
    }

    async fn generate_with_imagen(&self, prompt: &str) -> Result<String, MockupError> {
        let body = imagen_body(prompt);
        let response: PredictResponse =
            self.post(&self.settings.generate_model, "predict", &body).await?;
        first_prediction(response).ok_or(MockupError::EmptyGenerationResult)
    }

    async fn generate_with_gemini(&self, prompt: &str) -> Result<String, MockupError> {
        let mut body = content_body(vec![Part::text(prompt)]);
        body.generation_config.image_config =
            Some(ImageConfig { aspect_ratio: MOCKUP_ASPECT_RATIO.to_string() });
        let response: ContentResponse =
            self.post(&self.settings.generate_model, "generateContent", &body).await?;
        any_inline_image(response).ok_or(MockupError::EmptyGenerationResult)
    }

    async fn edit(&self, parts: Vec<Part>, action: &'static str) -> Result<String, MockupError> {
        let body = content_body(parts);
        let response: ContentResponse =
            self.post(&self.settings.edit_model, "generateContent", &body).await?;
        first_part_image(response).ok_or(MockupError::NoImageReturned { action })
    }
}

impl ImageService for GeminiClient {
    fn generate_mockup(&self, request: &MockupRequest) -> ServiceFuture<'_> {
        let prompt = request.prompt.clone();
        Box::pin(async move {
            match self.generate_family {
                ModelFamily::Imagen => self.generate_with_imagen(&prompt).await,
                ModelFamily::Gemini => self.generate_with_gemini(&prompt).await,
            }
        })
    }

    fn place_logo(&self, request: &LogoPlacementRequest) -> ServiceFuture<'_> {
        let parts = placement_parts(request);
        Box::pin(async move { self.edit(parts, PLACE_LOGO_ACTION).await })
    }

    fn edit_image(&self, request: &EditRequest) -> ServiceFuture<'_> {
        let parts = edit_parts(request);
        Box::pin(async move { self.edit(parts, EDIT_IMAGE_ACTION).await })
    }
}

/// The compositing instruction sent alongside the mockup and logo.
#[must_use]
pub fn logo_placement_instruction(description: &str) -> String {
    format!(
        "Seamlessly place the logo from the second image onto the {description} in the first \
         image. The logo should look natural and follow the contours and lighting of the object. \
         Preserve the background of the first image. Do not add any text or annotations."
    )
}

/// Mockup, then logo, then the instruction. Each image keeps its own MIME type.
fn placement_parts(request: &LogoPlacementRequest) -> Vec<Part> {
    vec![
        Part::image(&request.mockup),
        Part::image(&request.logo),
        Part::text(&logo_placement_instruction(&request.description)),
    ]
}

fn edit_parts(request: &EditRequest) -> Vec<Part> {
    vec![Part::image(&request.image), Part::text(&request.instruction)]
}

fn imagen_body(prompt: &str) -> PredictRequest {
    PredictRequest {
        instances: vec![PredictInstance { prompt: prompt.to_string() }],
        parameters: PredictParameters {
            sample_count: 1,
            output_mime_type: MOCKUP_MIME.to_string(),
            aspect_ratio: MOCKUP_ASPECT_RATIO.to_string(),
        },
    }
}

fn content_body(parts: Vec<Part>) -> ContentRequest {
    ContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
            image_config: None,
        },
    }
}

fn first_prediction(response: PredictResponse) -> Option<String> {
    response
        .predictions
        .into_iter()
        .filter_map(|p| p.bytes_base64_encoded)
        .find(|data| !data.is_empty())
}

/// Only the first part of the first candidate counts.
fn first_part_image(response: ContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let inline = content.parts.into_iter().next()?.inline_data?;
    (!inline.data.is_empty()).then_some(inline.data)
}

/// Gemini generation may lead with text; take the first inline image anywhere.
fn any_inline_image(response: ContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.inline_data)
        .map(|inline| inline.data)
        .find(|data| !data.is_empty())
}

// --- Imagen :predict types ---

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    output_mime_type: String,
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

// --- Gemini :generateContent types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self { text: Some(text.to_string()), ..Self::default() }
    }

    fn image(payload: &ImagePayload) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: payload.mime_type().to_string(),
                data: payload.base64().to_string(),
            }),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(key: Option<&str>) -> ClientSettings {
        ClientSettings {
            api_key: key.map(String::from),
            api_base: GEMINI_API_BASE.to_string(),
            generate_model: "imagen-4.0-generate-001".into(),
            edit_model: "gemini-2.5-flash-image".into(),
        }
    }

    #[test]
    fn instruction_embeds_description() {
        let text = logo_placement_instruction("black coffee mug");
        assert!(text.starts_with(
            "Seamlessly place the logo from the second image onto the black coffee mug in the \
             first image."
        ));
        assert!(text.contains("Preserve the background"));
        assert!(text.ends_with("Do not add any text or annotations."));
    }

    #[test]
    fn imagen_body_requests_one_square_jpeg() {
        let body = serde_json::to_value(imagen_body("A red mug")).unwrap();
        assert_eq!(body["instances"][0]["prompt"], "A red mug");
        assert_eq!(body["parameters"]["sampleCount"], 1);
        assert_eq!(body["parameters"]["outputMimeType"], "image/jpeg");
        assert_eq!(body["parameters"]["aspectRatio"], "1:1");
    }

    #[test]
    fn placement_body_is_image_only() {
        let request = LogoPlacementRequest {
            mockup: ImagePayload::new("/9j/", "image/jpeg"),
            logo: ImagePayload::new("iVBO", "image/png"),
            description: "red mug".into(),
        };
        let body = serde_json::to_value(content_body(placement_parts(&request))).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "iVBO");
        assert!(parts[2]["text"].as_str().unwrap().contains("onto the red mug"));
        assert!(parts[2].get("inlineData").is_none());
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
        assert!(body["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn png_composite_is_edited_as_png() {
        let request = EditRequest {
            image: ImagePayload::new("iVBORw0KGgo=", "image/png"),
            instruction: "add a retro filter".into(),
        };
        let body = serde_json::to_string(&content_body(edit_parts(&request))).unwrap();
        assert!(body.contains(r#""inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}"#));
        assert!(!body.contains("image/jpeg"));
        assert!(body.contains(r#""text":"add a retro filter""#));
    }

    #[test]
    fn gemini_mockup_keeps_its_type_in_placement() {
        let request = LogoPlacementRequest {
            mockup: ImagePayload::new("iVBO", "image/png"),
            logo: ImagePayload::new("UklG", "image/webp"),
            description: "tote bag".into(),
        };
        let parts = serde_json::to_value(placement_parts(&request)).unwrap();
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/webp");
    }

    #[test]
    fn empty_predictions_yield_nothing() {
        let response: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(first_prediction(response).is_none());

        let response: PredictResponse =
            serde_json::from_str(r#"{"predictions":[{"bytesBase64Encoded":""}]}"#).unwrap();
        assert!(first_prediction(response).is_none());
    }

    #[test]
    fn prediction_bytes_are_returned() {
        let response: PredictResponse = serde_json::from_str(
            r#"{"predictions":[{"bytesBase64Encoded":"/9j/4AAQ","mimeType":"image/jpeg"}]}"#,
        )
        .unwrap();
        assert_eq!(first_prediction(response).as_deref(), Some("/9j/4AAQ"));
    }

    #[test]
    fn first_part_must_be_image() {
        let text_first: ContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here you go"},
                {"inlineData":{"mimeType":"image/png","data":"iVBO"}}
            ]}}]}"#,
        )
        .unwrap();
        assert!(first_part_image(text_first).is_none());

        let image_first: ContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"inlineData":{"mimeType":"image/png","data":"iVBO"}}
            ]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_part_image(image_first).as_deref(), Some("iVBO"));
    }

    #[test]
    fn blocked_response_has_no_image() {
        let blocked: ContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(first_part_image(blocked).is_none());
        let empty: ContentResponse = serde_json::from_str("{}").unwrap();
        assert!(any_inline_image(empty).is_none());
    }

    #[test]
    fn generation_scans_past_text_parts() {
        let response: ContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"A mug"},
                {"inlineData":{"mimeType":"image/png","data":"iVBO"}}
            ]}}]}"#,
        )
        .unwrap();
        assert_eq!(any_inline_image(response).as_deref(), Some("iVBO"));
    }

    #[test]
    fn unknown_generate_model_rejected() {
        let mut s = settings(Some("k"));
        s.generate_model = "dall-e-3".into();
        assert!(matches!(GeminiClient::new(s), Err(MockupError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_at_first_call() {
        let client = GeminiClient::new(settings(None)).unwrap();
        let err = client
            .generate_mockup(&MockupRequest { prompt: "A red mug".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, MockupError::MissingApiKey { .. }));
    }
}
