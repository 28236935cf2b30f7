//! Free text answers.
//!
//! The classification and summarization of texts is done by external
//! services, seen here through the [`TextClassifier`] and
//! [`TextSummarizer`] traits. This module only selects the texts, hands
//! them over and attaches the outcome back to the respondents. It also
//! computes the word frequencies that word clouds are drawn from.

use log::debug;

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::Display;

use crate::config::*;
use crate::parse_scale;

/// The score of one label, as returned by a classifier.
#[derive(PartialEq, Debug, Clone)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Failures of the external text services.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ClassifierError {
    /// The model could not be loaded or reached.
    Unavailable(String),
    /// The service answered with an error.
    Inference(String),
    /// The answer could not be understood.
    Malformed(String),
}

impl Error for ClassifierError {}

impl Display for ClassifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierError::Unavailable(s) => write!(f, "text model unavailable: {}", s),
            ClassifierError::Inference(s) => write!(f, "text model failed: {}", s),
            ClassifierError::Malformed(s) => write!(f, "unexpected text model answer: {}", s),
        }
    }
}

/// A pre-trained text classification model (sentiment, emotion).
pub trait TextClassifier {
    /// The scores of the labels for this text, in any order.
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// A pre-trained summarization model.
pub trait TextSummarizer {
    fn summarize(&self, text: &str) -> Result<String, ClassifierError>;
}

/// The label with the highest score. The first one wins on ties.
pub fn top_label(scores: &[LabelScore]) -> Option<&LabelScore> {
    let mut best: Option<&LabelScore> = None;
    for s in scores.iter() {
        match best {
            Some(b) if b.score >= s.score => {}
            _ => best = Some(s),
        }
    }
    best
}

/// The outcome of the classification of one answer.
#[derive(PartialEq, Debug, Clone)]
pub struct Annotation {
    pub respondent_id: String,
    pub text: String,
    pub label: String,
    pub score: f64,
}

/// The non-blank answers of a text column, with the identifier of their
/// respondent.
///
/// When a row has no identifier, its 1-based position is used instead.
pub fn collect_texts<'a>(
    rows: &[&'a Respondent],
    text_column: usize,
    id_column: usize,
) -> Vec<(String, &'a str)> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, r)| {
            let text = r.get(text_column)?;
            let id = r
                .get(id_column)
                .map(|s| s.to_string())
                .unwrap_or_else(|| (idx + 1).to_string());
            Some((id, text.trim()))
        })
        .collect()
}

/// Classifies every answer of a text column.
///
/// The first failure of the classifier stops the processing: the caller
/// is expected to report it instead of the results.
pub fn annotate(
    rows: &[&Respondent],
    text_column: usize,
    id_column: usize,
    classifier: &dyn TextClassifier,
) -> Result<Vec<Annotation>, ClassifierError> {
    let texts = collect_texts(rows, text_column, id_column);
    debug!(
        "annotate: column {}: {} texts to classify",
        text_column,
        texts.len()
    );
    let mut res: Vec<Annotation> = Vec::new();
    for (respondent_id, text) in texts {
        let scores = classifier.classify(text)?;
        let best = top_label(&scores).ok_or_else(|| {
            ClassifierError::Malformed(format!("no label returned for {:?}", text))
        })?;
        res.push(Annotation {
            respondent_id,
            text: text.to_string(),
            label: best.label.clone(),
            score: best.score,
        });
    }
    Ok(res)
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Interprets the label of a sentiment model. Anything that is not
    /// clearly positive or negative is neutral.
    pub fn from_label(label: &str) -> Sentiment {
        let l = label.trim().to_lowercase();
        if l.starts_with("pos") {
            Sentiment::Positive
        } else if l.starts_with("neg") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

/// Sentiment distribution of a set of answers.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SentimentTally {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    /// The most confidently positive comments, with their score.
    pub top_positive: Vec<(String, f64)>,
    pub top_negative: Vec<(String, f64)>,
}

impl SentimentTally {
    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }

    /// Shares of each sentiment, all zero when there is no answer.
    pub fn proportions(&self) -> Vec<(Sentiment, f64)> {
        let total = self.total();
        let share = |c: u64| {
            if total == 0 {
                0.0
            } else {
                c as f64 / total as f64
            }
        };
        vec![
            (Sentiment::Positive, share(self.positive)),
            (Sentiment::Negative, share(self.negative)),
            (Sentiment::Neutral, share(self.neutral)),
        ]
    }
}

pub fn tally_sentiment(annotations: &[Annotation], top_n: usize) -> SentimentTally {
    let mut res = SentimentTally::default();
    let mut pos: Vec<(String, f64)> = Vec::new();
    let mut neg: Vec<(String, f64)> = Vec::new();
    for a in annotations.iter() {
        match Sentiment::from_label(&a.label) {
            Sentiment::Positive => {
                res.positive += 1;
                pos.push((a.text.clone(), a.score));
            }
            Sentiment::Negative => {
                res.negative += 1;
                neg.push((a.text.clone(), a.score));
            }
            Sentiment::Neutral => res.neutral += 1,
        }
    }
    for l in [&mut pos, &mut neg] {
        l.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        l.truncate(top_n);
    }
    res.top_positive = pos;
    res.top_negative = neg;
    res
}

/// Number of answers for each label, most frequent first.
pub fn tally_labels(annotations: &[Annotation]) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    for a in annotations.iter() {
        match counts.iter_mut().find(|(l, _)| *l == a.label) {
            Some(entry) => entry.1 += 1,
            None => counts.push((a.label.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Combines several classifiers by averaging their scores over a fixed
/// set of labels.
///
/// Labels returned by a member but absent from the set are ignored, and
/// labels of the set that a member does not know score zero for it.
pub struct EnsembleClassifier {
    labels: Vec<String>,
    members: Vec<Box<dyn TextClassifier>>,
}

impl EnsembleClassifier {
    pub fn new(labels: &[&str], members: Vec<Box<dyn TextClassifier>>) -> EnsembleClassifier {
        EnsembleClassifier {
            labels: labels.iter().map(|l| l.to_lowercase()).collect(),
            members,
        }
    }
}

impl TextClassifier for EnsembleClassifier {
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        if self.members.is_empty() {
            return Err(ClassifierError::Unavailable(
                "no model in the ensemble".to_string(),
            ));
        }
        let mut acc: Vec<f64> = vec![0.0; self.labels.len()];
        for m in self.members.iter() {
            for ls in m.classify(text)? {
                let label = ls.label.to_lowercase();
                if let Some(idx) = self.labels.iter().position(|l| *l == label) {
                    acc[idx] += ls.score;
                }
            }
        }
        let n = self.members.len() as f64;
        Ok(self
            .labels
            .iter()
            .zip(acc)
            .map(|(label, total)| LabelScore {
                label: label.clone(),
                score: total / n,
            })
            .collect())
    }
}

// A compact version of the usual English stopword list of word clouds.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
    "ever", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into",
    "is", "it", "its", "itself", "just", "like", "me", "more", "most", "my", "myself", "no", "nor",
    "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shall", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Counts the words of free text answers, for word clouds.
///
/// Words are lower-cased; stopwords, numbers and possessive endings are
/// dropped.
pub struct WordCounter {
    stopwords: HashSet<String>,
}

impl WordCounter {
    pub fn new(extra_stopwords: &[String]) -> WordCounter {
        let mut stopwords: HashSet<String> = STOPWORDS.iter().map(|s| s.to_string()).collect();
        stopwords.extend(extra_stopwords.iter().map(|s| s.to_lowercase()));
        WordCounter { stopwords }
    }

    pub fn count<'a, I>(&self, texts: I) -> Vec<(String, u64)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, u64)> = Vec::new();
        for text in texts {
            for word in words(text) {
                let w = word.to_lowercase();
                let w = w.strip_suffix("'s").unwrap_or(&w).to_string();
                if w.is_empty()
                    || w.chars().all(|c| c.is_numeric())
                    || self.stopwords.contains(&w)
                {
                    continue;
                }
                match index.get(&w) {
                    Some(pos) => counts[*pos].1 += 1,
                    None => {
                        index.insert(w.clone(), counts.len());
                        counts.push((w, 1));
                    }
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

// Words start with a letter or a digit and may contain apostrophes.
fn words(text: &str) -> Vec<&str> {
    let mut res: Vec<&str> = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        let in_word = c.is_alphanumeric() || c == '_' || (c == '\'' && start.is_some());
        match (in_word, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                res.push(&text[s..idx]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        res.push(&text[s..]);
    }
    res
}

/// Counts whole answers, for questions where each answer is a short
/// phrase that should not be broken into words.
pub fn phrase_frequencies<'a, I>(texts: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, u64)> = Vec::new();
    for text in texts {
        let phrase = text.trim();
        if phrase.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(p, _)| p == phrase) {
            Some(entry) => entry.1 += 1,
            None => counts.push((phrase.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The reasons given by the respondents, separated by the rating they
/// gave.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TextsByScore<'a> {
    /// Ratings 4 and 5.
    pub high: Vec<&'a str>,
    /// Ratings 1 to 3.
    pub low: Vec<&'a str>,
}

pub fn split_by_score<'a>(
    rows: &[&'a Respondent],
    score_column: usize,
    text_column: usize,
) -> TextsByScore<'a> {
    let mut res = TextsByScore::default();
    for r in rows.iter() {
        let text = match r.get(text_column) {
            Some(t) => t,
            None => continue,
        };
        match r.get(score_column).and_then(parse_scale) {
            Some(4) | Some(5) => res.high.push(text),
            Some(_) => res.low.push(text),
            None => {}
        }
    }
    res
}
