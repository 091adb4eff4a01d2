//! Optional LLM collaborator that proposes descriptions for unknown
//! abbreviations. Treated as an opaque, possibly wrong, possibly slow text
//! function: its failures degrade to a sentinel, never to an error, and its
//! output must be re-validated before anyone trusts it.

use serde::Deserialize;
use tracing::{debug, warn};

/// Returned in place of a description when the model is unreachable or its
/// answer cannot be parsed.
pub const UNAVAILABLE: &str = "описание недоступно";

/// Narrow interface the pipeline talks to; swap in a stub for tests.
pub trait DescriptionSuggester {
    /// Best-effort description for `abbreviation` as used in `context`.
    /// Infallible by contract: failures return [`UNAVAILABLE`].
    fn suggest(&self, abbreviation: &str, context: &str) -> String;
}

/// Instruction block prepended to every request; the model must answer with
/// a single short same-language expansion whose words spell the abbreviation.
fn build_prompt(abbreviation: &str, context: &str) -> String {
    format!(
        "Вспомни важные правила:\n\
         1. Расшифровка должна быть максимально короткой и общепринята в медицинской документации.\n\
         2. Слова в расшифровке должны соответствовать буквам аббревиатуры \
         (например, для аббревиатуры 'АБС' расшифровка должна содержать три слова, \
         первое из которых начинается с буквы 'А', второе с буквы 'Б', третье с буквы 'С').\n\
         3. Язык расшифровки должен соответствовать языку аббревиатуры.\n\
         4. Если не уверен, что расшифровка правильная, то отвечай 'не знаю'.\n\
         Следуя этим правилам, расшифруй аббревиатуру: \
         '{abbreviation}', использованную в контексте: '{context}'.\n\n \
         Ответ должен быть одним коротким предложением на одном языке\
         в формате: {{\"description\": \"<текст расшифровки>\"}}"
    )
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct SuggestedDescription {
    description: String,
}

/// Client for an Ollama-style `/api/generate` endpoint.
pub struct OllamaSuggester {
    host: String,
    model: String,
}

impl OllamaSuggester {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
        }
    }

    fn request(&self, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
        let url = format!("{}/api/generate", self.host);
        debug!(%url, "requesting description suggestion");

        let body: GenerateResponse = ureq::post(&url)
            .send_json(serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "format": "json",
                "stream": false,
            }))?
            .into_json()?;

        // The model's answer arrives as a JSON string inside `response`.
        let parsed: SuggestedDescription = serde_json::from_str(&body.response)?;
        Ok(parsed.description)
    }
}

impl Default for OllamaSuggester {
    fn default() -> Self {
        Self::new("http://localhost:11434", "llama3.2")
    }
}

impl DescriptionSuggester for OllamaSuggester {
    fn suggest(&self, abbreviation: &str, context: &str) -> String {
        let prompt = build_prompt(abbreviation, context);
        match self.request(&prompt) {
            Ok(description) => description,
            Err(e) => {
                warn!(abbreviation, error = %e, "description suggestion failed");
                UNAVAILABLE.to_string()
            }
        }
    }
}
