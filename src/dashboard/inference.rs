//! Clients for text models served over HTTP.
//!
//! The service follows the conventions of the Hugging Face inference API:
//! the text is posted as `{"inputs": "..."}` to `<endpoint>/<model>`, and
//! the answer is a (possibly nested) list of `{"label", "score"}` objects
//! for classifiers, `{"generated_text"}` for generative models and
//! `{"summary_text"}` for summarizers.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;
use serde_json::Value as JSValue;

use survey_stats::text::{
    ClassifierError, EnsembleClassifier, LabelScore, TextClassifier, TextSummarizer,
};

use crate::dashboard::config_reader::InferenceConfig;
use crate::dashboard::*;

/// The labels of the combined emotion model.
pub const EMOTION_LABELS: &[&str] = &[
    "anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise",
];

pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_EMOTION_MODELS: &[&str] = &[
    "j-hartmann/emotion-english-distilroberta-base",
    "mrm8488/t5-base-finetuned-emotion",
];
pub const DEFAULT_SUMMARIZER_MODEL: &str = "csebuetnlp/mT5_multilingual_XLSum";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One model behind the inference service.
pub struct InferenceModel {
    client: Client,
    url: String,
    token: Option<String>,
}

impl InferenceModel {
    pub fn new(client: Client, endpoint: &str, model: &str, token: Option<String>) -> Self {
        InferenceModel {
            client,
            url: format!("{}/{}", endpoint.trim_end_matches('/'), model),
            token,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn query(&self, payload: &JSValue) -> Result<JSValue, ClassifierError> {
        let mut req = self.client.post(&self.url).json(payload);
        if let Some(token) = self.token.as_ref() {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .map_err(|e| ClassifierError::Unavailable(format!("{}: {}", self.url, e)))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| ClassifierError::Unavailable(format!("{}: {}", self.url, e)))?;
        let js = read_answer(&self.url, status, &body)?;
        debug!("query: {}: {}", self.url, js);
        Ok(js)
    }
}

impl TextClassifier for InferenceModel {
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        let js = self.query(&json!({ "inputs": text }))?;
        parse_label_scores(&js)
    }
}

impl TextSummarizer for InferenceModel {
    fn summarize(&self, text: &str) -> Result<String, ClassifierError> {
        let js = self.query(&json!({
            "inputs": text,
            "parameters": {"max_length": 100, "min_length": 25, "do_sample": false}
        }))?;
        parse_summary(&js)
    }
}

/// Checks the status of an answer before reading its body as JSON.
///
/// A failed request is reported with its status, and with the error
/// message of the service when the body carries one.
pub fn read_answer(url: &str, status: u16, body: &str) -> Result<JSValue, ClassifierError> {
    let js: Option<JSValue> = serde_json::from_str(body).ok();
    let service_error = js.as_ref().and_then(|js| js.get("error")).cloned();
    if !(200..300).contains(&status) {
        return Err(ClassifierError::Inference(match service_error {
            Some(err) => format!("{}: HTTP status {}: {}", url, status, err),
            None => format!("{}: HTTP status {}", url, status),
        }));
    }
    if let Some(err) = service_error {
        return Err(ClassifierError::Inference(format!("{}: {}", url, err)));
    }
    js.ok_or_else(|| ClassifierError::Malformed(format!("{}: answer is not JSON", url)))
}

/// Reads the answer of a classifier.
///
/// A generative model answers with the name of a label: it is read as a
/// certain prediction of that label.
pub fn parse_label_scores(js: &JSValue) -> Result<Vec<LabelScore>, ClassifierError> {
    let mut res: Vec<LabelScore> = Vec::new();
    collect_label_scores(js, &mut res)?;
    Ok(res)
}

fn collect_label_scores(js: &JSValue, res: &mut Vec<LabelScore>) -> Result<(), ClassifierError> {
    match js {
        JSValue::Array(l) => {
            for elt in l.iter() {
                collect_label_scores(elt, res)?;
            }
            Ok(())
        }
        JSValue::Object(m) => match (m.get("label"), m.get("score"), m.get("generated_text")) {
            (Some(JSValue::String(label)), Some(score), _) => {
                let score = score
                    .as_f64()
                    .ok_or_else(|| ClassifierError::Malformed(format!("score {}", score)))?;
                res.push(LabelScore {
                    label: label.clone(),
                    score,
                });
                Ok(())
            }
            (_, _, Some(JSValue::String(text))) => {
                res.push(LabelScore {
                    label: text.trim().to_lowercase(),
                    score: 1.0,
                });
                Ok(())
            }
            _ => Err(ClassifierError::Malformed(js.to_string())),
        },
        _ => Err(ClassifierError::Malformed(js.to_string())),
    }
}

pub fn parse_summary(js: &JSValue) -> Result<String, ClassifierError> {
    match js {
        JSValue::Array(l) => l
            .first()
            .ok_or_else(|| ClassifierError::Malformed("empty answer".to_string()))
            .and_then(parse_summary),
        JSValue::Object(m) => match m.get("summary_text").or_else(|| m.get("generated_text")) {
            Some(JSValue::String(s)) => Ok(s.trim().to_string()),
            _ => Err(ClassifierError::Malformed(js.to_string())),
        },
        _ => Err(ClassifierError::Malformed(js.to_string())),
    }
}

/// The text models used by the pages. A missing model turns the widgets
/// that need it into notices.
pub struct TextModels {
    pub sentiment: Option<Box<dyn TextClassifier>>,
    pub emotion: Option<Box<dyn TextClassifier>>,
    pub summarizer: Option<Box<dyn TextSummarizer>>,
}

impl TextModels {
    pub fn disabled() -> TextModels {
        TextModels {
            sentiment: None,
            emotion: None,
            summarizer: None,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> DResult<TextModels> {
        let token = match config.token_env.as_ref() {
            Some(var) => {
                let t = std::env::var(var).ok();
                if t.is_none() {
                    warn!("TextModels: environment variable {} is not set", var);
                }
                t
            }
            None => None,
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .user_agent("hrpulse")
            .build()
            .context(InferenceClientSnafu {})?;
        let model = |name: &str| InferenceModel::new(client.clone(), &config.endpoint, name, token.clone());

        let sentiment = model(
            config
                .sentiment_model
                .as_deref()
                .unwrap_or(DEFAULT_SENTIMENT_MODEL),
        );
        let emotion_names: Vec<String> = match config.emotion_models.as_ref() {
            Some(l) => l.clone(),
            None => DEFAULT_EMOTION_MODELS.iter().map(|s| s.to_string()).collect(),
        };
        let members: Vec<Box<dyn TextClassifier>> = emotion_names
            .iter()
            .map(|n| Box::new(model(n)) as Box<dyn TextClassifier>)
            .collect();
        let emotion: Option<Box<dyn TextClassifier>> = if members.is_empty() {
            None
        } else {
            Some(Box::new(EnsembleClassifier::new(EMOTION_LABELS, members)))
        };
        let summarizer = model(
            config
                .summarizer_model
                .as_deref()
                .unwrap_or(DEFAULT_SUMMARIZER_MODEL),
        );
        info!(
            "TextModels: sentiment {}, {} emotion model(s), summarizer {}",
            sentiment.url(),
            emotion_names.len(),
            summarizer.url()
        );
        Ok(TextModels {
            sentiment: Some(Box::new(sentiment)),
            emotion,
            summarizer: Some(Box::new(summarizer)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_answers() {
        let nested = json!([[{"label": "POSITIVE", "score": 0.98}, {"label": "NEGATIVE", "score": 0.02}]]);
        let scores = parse_label_scores(&nested).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "POSITIVE");

        let generated = json!([{"generated_text": " Joy"}]);
        assert_eq!(
            parse_label_scores(&generated).unwrap(),
            vec![LabelScore {
                label: "joy".to_string(),
                score: 1.0
            }]
        );

        assert!(parse_label_scores(&json!([{"label": "x"}])).is_err());
        assert!(parse_label_scores(&json!("hello")).is_err());
    }

    #[test]
    fn summarizer_answers() {
        assert_eq!(
            parse_summary(&json!([{"summary_text": " Short. "}])).unwrap(),
            "Short."
        );
        assert!(parse_summary(&json!([])).is_err());
    }

    #[test]
    fn failed_requests_keep_their_status() {
        let url = "http://localhost/m";
        let err = read_answer(url, 503, "<html>Service Unavailable</html>").unwrap_err();
        assert_eq!(
            err,
            ClassifierError::Inference("http://localhost/m: HTTP status 503".to_string())
        );
        let err = read_answer(url, 503, r#"{"error": "Model is loading"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(m) if m.contains("503") && m.contains("loading")));

        let err = read_answer(url, 200, "not json").unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
        let err = read_answer(url, 200, r#"{"error": "bad input"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
        assert_eq!(
            read_answer(url, 200, r#"[{"label": "joy", "score": 1.0}]"#).unwrap(),
            json!([{"label": "joy", "score": 1.0}])
        );
    }

    #[test]
    fn model_urls() {
        let m = InferenceModel::new(Client::new(), "http://localhost:8080/models/", "a/b", None);
        assert_eq!(m.url(), "http://localhost:8080/models/a/b");
    }

    #[test]
    fn unreachable_service() {
        let config = InferenceConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: Some(2),
            emotion_models: Some(vec![]),
            ..InferenceConfig::default()
        };
        let models = TextModels::from_config(&config).unwrap();
        assert!(models.emotion.is_none());
        let err = models
            .sentiment
            .as_ref()
            .unwrap()
            .classify("fine")
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }
}
