// The nine pages of the dashboard, rendered as JSON reports.

use serde::Serialize;

use survey_stats::text::{
    annotate, phrase_frequencies, split_by_score, tally_labels, tally_sentiment, Annotation,
    Sentiment, WordCounter,
};
use survey_stats::*;

use crate::dashboard::inference::TextModels;
use crate::dashboard::schema::SurveyColumn;
use crate::dashboard::session::Session;
use crate::dashboard::source::Dataset;
use crate::dashboard::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Page {
    General,
    EmployeeExperience,
    RecruitingOnboarding,
    PerformanceTalent,
    Learning,
    Compensation,
    Payroll,
    TimeManagement,
    UserExperience,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::General,
        Page::EmployeeExperience,
        Page::RecruitingOnboarding,
        Page::PerformanceTalent,
        Page::Learning,
        Page::Compensation,
        Page::Payroll,
        Page::TimeManagement,
        Page::UserExperience,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::General => "general",
            Page::EmployeeExperience => "employee-experience",
            Page::RecruitingOnboarding => "recruiting-onboarding",
            Page::PerformanceTalent => "performance-talent",
            Page::Learning => "learning",
            Page::Compensation => "compensation",
            Page::Payroll => "payroll",
            Page::TimeManagement => "time-management",
            Page::UserExperience => "user-experience",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::General => "General Survey Results",
            Page::EmployeeExperience => "Section 1: Employee Experience",
            Page::RecruitingOnboarding => "Section 2: Recruiting & Onboarding",
            Page::PerformanceTalent => "Section 3: Performance & Talent",
            Page::Learning => "Section 4: Learning",
            Page::Compensation => "Section 5: Compensation",
            Page::Payroll => "Section 6: Payroll",
            Page::TimeManagement => "Section 7: Time Management",
            Page::UserExperience => "Section 8: User Experience",
        }
    }

    /// Accepts the slug, the number of the page (0 for the general page,
    /// then the section number) or its full title.
    pub fn parse(s: &str) -> DResult<Page> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return Page::ALL
                .get(n)
                .copied()
                .context(UnknownPageSnafu { name: s });
        }
        Page::ALL
            .iter()
            .find(|p| p.slug() == s || p.title().eq_ignore_ascii_case(s))
            .copied()
            .context(UnknownPageSnafu { name: s })
    }
}

const SATISFACTION_LABELS: [&str; 5] = [
    "Very Dissatisfied",
    "Dissatisfied",
    "Neutral",
    "Satisfied",
    "Very Satisfied",
];

const COMFORT_LABELS: [&str; 5] = [
    "Very Uncomfortable",
    "Uncomfortable",
    "Hesitant",
    "Comfortable",
    "Very Comfortable",
];

const COMMUNICATION_STOPWORDS: &[&str] = &[
    "communication",
    "channels",
    "HR",
    "information",
    "important",
    "informed",
    "stay",
    "communicated",
    "employees",
    "company",
    "help",
    "communicates",
    "need",
    "everyone",
    "makes",
];

const MAX_WORDS: usize = 50;
const TOP_COMMENTS: usize = 5;

/// The country standing for a continent on the location map.
pub fn continent_code(continent: &str) -> Option<&'static str> {
    match continent {
        "Asia" => Some("KAZ"),
        "Oceania" => Some("AUS"),
        "North America" => Some("CAN"),
        "South America" => Some("BRA"),
        "Europe" => Some("DEU"),
        "Africa" => Some("TCD"),
        _ => None,
    }
}

// ********* Report structures ***********

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
    /// Map code, for locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct ScoreBar {
    pub score: u8,
    pub label: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct Share {
    pub label: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct ComparisonRow {
    pub label: String,
    pub left: u64,
    pub right: u64,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct Comment {
    pub text: String,
    pub score: f64,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct EmotionRow {
    #[serde(rename = "respondentId")]
    pub respondent_id: String,
    pub emotion: String,
}

/// What the percentages of a breakdown are relative to.
#[derive(Serialize, Eq, PartialEq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    /// The filtered respondents. A respondent may give several answers.
    Respondents,
    /// All the answers given.
    Tokens,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum Widget {
    Population {
        total: u64,
        filtered: u64,
    },
    Highlights {
        items: Vec<String>,
    },
    Counts {
        title: String,
        counts: Vec<LabelCount>,
    },
    ScoreChart {
        title: String,
        question: String,
        bars: Vec<ScoreBar>,
        responses: u64,
        median: Option<f64>,
    },
    DrillDown {
        title: String,
        score: u8,
        label: String,
        respondents: u64,
        roles: Vec<LabelCount>,
        functions: Vec<LabelCount>,
    },
    SatisfactionSplit {
        title: String,
        dissatisfied: Vec<ScoreBar>,
        satisfied: Vec<ScoreBar>,
    },
    Breakdown {
        title: String,
        question: String,
        basis: Basis,
        respondents: u64,
        items: Vec<Share>,
    },
    Comparison {
        title: String,
        left: String,
        right: String,
        rows: Vec<ComparisonRow>,
    },
    Proportion {
        title: String,
        count: u64,
        denominator: u64,
        percentage: Option<f64>,
        text: String,
    },
    Words {
        title: String,
        group: Option<String>,
        words: Vec<LabelCount>,
    },
    Sentiment {
        title: String,
        positive: u64,
        negative: u64,
        neutral: u64,
        shares: Vec<Share>,
        #[serde(rename = "topPositive")]
        top_positive: Vec<Comment>,
        #[serde(rename = "topNegative")]
        top_negative: Vec<Comment>,
    },
    Emotions {
        title: String,
        counts: Vec<LabelCount>,
        respondents: Vec<EmotionRow>,
    },
    Summary {
        title: String,
        text: String,
    },
    Notice {
        title: String,
        message: String,
    },
}

#[derive(Serialize, Eq, PartialEq, Debug, Clone)]
pub struct Filters {
    pub roles: Vec<String>,
    pub functions: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PageOutcome {
    Success { widgets: Vec<Widget> },
    Error { message: String },
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct PageReport {
    pub page: &'static str,
    pub title: &'static str,
    /// Number of respondents left by the filters.
    pub respondents: u64,
    pub filters: Filters,
    pub focus: Option<u8>,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

// ******** Rendering *********

/// The shared, read-only inputs of every page.
pub struct RenderContext<'a> {
    pub dataset: &'a Dataset,
    pub stopwords: &'a [String],
    pub models: &'a TextModels,
}

/// Renders the current page of the session.
///
/// A page that cannot be computed is reported as an error; this never
/// affects the other pages.
pub fn render_page(ctx: &RenderContext, session: &Session) -> PageReport {
    let page = session.page();
    let dataset = ctx.dataset;
    let rows = apply_filters(
        &dataset.table,
        &dataset.schema.filter_columns(),
        session.selection(),
    );
    info!(
        "render_page: {} with {} of {} respondents",
        page.slug(),
        rows.len(),
        dataset.table.len()
    );
    let input = PageInput {
        ctx,
        rows: &rows,
        focus: session.focus(),
    };
    let res = match page {
        Page::General => general(&input),
        Page::EmployeeExperience => employee_experience(&input),
        Page::RecruitingOnboarding => recruiting_onboarding(&input),
        Page::PerformanceTalent => performance_talent(&input),
        Page::Learning => learning(&input),
        Page::Compensation => compensation(&input),
        Page::Payroll => payroll(&input),
        Page::TimeManagement => time_management(&input),
        Page::UserExperience => user_experience(&input),
    };
    let outcome = match res {
        Ok(widgets) => PageOutcome::Success { widgets },
        Err(e) => {
            warn!("render_page: {} failed: {}", page.slug(), e);
            PageOutcome::Error {
                message: e.to_string(),
            }
        }
    };
    let selection = session.selection();
    PageReport {
        page: page.slug(),
        title: page.title(),
        respondents: rows.len() as u64,
        filters: Filters {
            roles: selection.roles.clone(),
            functions: selection.functions.clone(),
            locations: selection.locations.clone(),
        },
        focus: session.focus(),
        outcome,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn label_counts(counts: Vec<(String, u64)>) -> Vec<LabelCount> {
    counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label,
            count,
            code: None,
        })
        .collect()
}

type PageResult = Result<Vec<Widget>, SurveyError>;

struct PageInput<'a> {
    ctx: &'a RenderContext<'a>,
    rows: &'a [&'a Respondent],
    focus: Option<u8>,
}

impl<'a> PageInput<'a> {
    fn col(&self, c: SurveyColumn) -> usize {
        self.ctx.dataset.schema.index(c)
    }

    fn question(&self, c: SurveyColumn) -> String {
        self.ctx
            .dataset
            .schema
            .title(&self.ctx.dataset.table, c)
            .to_string()
    }

    /// The distribution of a rating, followed by the profile of the
    /// respondents who gave the focused rating.
    fn scores(
        &self,
        widgets: &mut Vec<Widget>,
        title: &str,
        c: SurveyColumn,
        labels: &[&str; 5],
    ) -> Result<(), SurveyError> {
        let col = self.col(c);
        let dist = score_distribution(self.rows, col)?;
        let bars: Vec<ScoreBar> = dist
            .counts
            .iter()
            .zip(labels.iter())
            .map(|((score, count), label)| ScoreBar {
                score: *score,
                label: label.to_string(),
                count: *count,
                percentage: round2(dist.percentage(*score)),
            })
            .collect();
        widgets.push(Widget::ScoreChart {
            title: title.to_string(),
            question: self.question(c),
            bars,
            responses: dist.responses,
            median: dist.median(),
        });

        if let Some(score) = self.focus {
            let subset = filter_by_score(self.rows, col, score);
            let fc = self.ctx.dataset.schema.filter_columns();
            widgets.push(Widget::DrillDown {
                title: title.to_string(),
                score,
                label: score
                    .checked_sub(SCALE_MIN)
                    .and_then(|i| labels.get(i as usize))
                    .unwrap_or(&"")
                    .to_string(),
                respondents: subset.len() as u64,
                roles: label_counts(value_counts(&subset, fc.role)),
                functions: label_counts(value_counts(&subset, fc.function)),
            });
        }
        Ok(())
    }

    fn breakdown(&self, title: &str, c: SurveyColumn, basis: Basis) -> Widget {
        let counts = explode_counts(self.rows, self.col(c));
        let shares = match basis {
            Basis::Respondents => counts.percent_of_respondents(),
            Basis::Tokens => counts.percent_of_tokens(),
        };
        let items: Vec<Share> = counts
            .counts
            .iter()
            .zip(shares)
            .map(|((label, count), (_, pct))| Share {
                label: label.clone(),
                count: *count,
                percentage: round2(pct),
            })
            .collect();
        Widget::Breakdown {
            title: title.to_string(),
            question: self.question(c),
            basis,
            respondents: counts.respondents,
            items,
        }
    }

    /// Share of the respondents answering `sentinel`, optionally among the
    /// respondents who answered "Yes" to another question.
    fn rate(
        &self,
        title: &str,
        c: SurveyColumn,
        sentinel: &str,
        among: Option<SurveyColumn>,
        statement: &str,
    ) -> Widget {
        let condition = among.map(|a| Condition {
            column: self.col(a),
            value: "Yes".to_string(),
        });
        let p = conditional_yes_rate(self.rows, self.col(c), sentinel, condition.as_ref());
        let text = match p.percentage {
            Some(pct) if among.is_some() => format!(
                "{:.2}% of the {} respondent(s) concerned, {} employee(s), {}.",
                pct, p.denominator, p.count, statement
            ),
            Some(pct) => format!(
                "{:.2}% of the respondents, {} employee(s), {}.",
                pct, p.count, statement
            ),
            None => "Not applicable: no respondent of the current selection is concerned."
                .to_string(),
        };
        Widget::Proportion {
            title: title.to_string(),
            count: p.count,
            denominator: p.denominator,
            percentage: p.percentage.map(round2),
            text,
        }
    }

    fn texts(&self, c: SurveyColumn) -> Vec<&'a str> {
        let col = self.col(c);
        self.rows.iter().filter_map(|r| r.get(col)).collect()
    }

    fn counter(&self, extra: &[&str]) -> WordCounter {
        let mut stopwords: Vec<String> = self.ctx.stopwords.to_vec();
        stopwords.extend(extra.iter().map(|s| s.to_string()));
        WordCounter::new(&stopwords)
    }

    fn words(&self, title: &str, group: Option<&str>, counts: Vec<(String, u64)>) -> Widget {
        let mut words = label_counts(counts);
        words.truncate(MAX_WORDS);
        Widget::Words {
            title: title.to_string(),
            group: group.map(|s| s.to_string()),
            words,
        }
    }

    fn word_table(&self, title: &str, c: SurveyColumn) -> Widget {
        let counts = self.counter(&[]).count(self.texts(c));
        self.words(title, None, counts)
    }

    fn annotations(
        &self,
        c: SurveyColumn,
        model: Option<&dyn survey_stats::text::TextClassifier>,
    ) -> Result<Vec<Annotation>, String> {
        let model = model.ok_or_else(|| "No text model is configured.".to_string())?;
        annotate(self.rows, self.col(c), self.col(SurveyColumn::Id), model)
            .map_err(|e| e.to_string())
    }

    fn sentiment(&self, title: &str, c: SurveyColumn) -> Widget {
        match self.annotations(c, self.ctx.models.sentiment.as_deref()) {
            Ok(annotations) => {
                let tally = tally_sentiment(&annotations, TOP_COMMENTS);
                let comments = |l: Vec<(String, f64)>| -> Vec<Comment> {
                    l.into_iter()
                        .map(|(text, score)| Comment { text, score })
                        .collect()
                };
                let shares: Vec<Share> = tally
                    .proportions()
                    .into_iter()
                    .map(|(sentiment, share)| Share {
                        label: sentiment.name().to_string(),
                        count: match sentiment {
                            Sentiment::Positive => tally.positive,
                            Sentiment::Negative => tally.negative,
                            Sentiment::Neutral => tally.neutral,
                        },
                        percentage: round2(share * 100.0),
                    })
                    .collect();
                Widget::Sentiment {
                    title: title.to_string(),
                    positive: tally.positive,
                    negative: tally.negative,
                    neutral: tally.neutral,
                    shares,
                    top_positive: comments(tally.top_positive),
                    top_negative: comments(tally.top_negative),
                }
            }
            Err(message) => notice(title, message),
        }
    }

    fn emotions(&self, title: &str, c: SurveyColumn) -> Widget {
        match self.annotations(c, self.ctx.models.emotion.as_deref()) {
            Ok(annotations) => Widget::Emotions {
                title: title.to_string(),
                counts: label_counts(tally_labels(&annotations)),
                respondents: annotations
                    .into_iter()
                    .map(|a| EmotionRow {
                        respondent_id: a.respondent_id,
                        emotion: a.label,
                    })
                    .collect(),
            },
            Err(message) => notice(title, message),
        }
    }

    fn summary(&self, title: &str, c: SurveyColumn) -> Widget {
        let summarizer = match self.ctx.models.summarizer.as_ref() {
            Some(s) => s,
            None => return notice(title, "No text model is configured.".to_string()),
        };
        let texts: Vec<&str> = self.texts(c).into_iter().map(|t| t.trim()).collect();
        if texts.is_empty() {
            return notice(title, "No answer to summarize.".to_string());
        }
        match summarizer.summarize(&texts.join(" ")) {
            Ok(text) => Widget::Summary {
                title: title.to_string(),
                text,
            },
            Err(e) => notice(title, e.to_string()),
        }
    }
}

fn notice(title: &str, message: String) -> Widget {
    warn!("{}: {}", title, message);
    Widget::Notice {
        title: title.to_string(),
        message,
    }
}

fn general(input: &PageInput) -> PageResult {
    let dataset = input.ctx.dataset;
    let fc = dataset.schema.filter_columns();
    let locations: Vec<LabelCount> = value_counts(input.rows, fc.location)
        .into_iter()
        .map(|(label, count)| LabelCount {
            code: continent_code(&label).map(|s| s.to_string()),
            label,
            count,
        })
        .collect();
    Ok(vec![
        Widget::Population {
            total: dataset.table.len() as u64,
            filtered: input.rows.len() as u64,
        },
        Widget::Counts {
            title: "by Continent".to_string(),
            counts: locations,
        },
        Widget::Counts {
            title: "by Role".to_string(),
            counts: label_counts(value_counts(input.rows, fc.role)),
        },
        Widget::Counts {
            title: "by Function".to_string(),
            counts: label_counts(value_counts(input.rows, fc.function)),
        },
    ])
}

fn employee_experience(input: &PageInput) -> PageResult {
    let mut w: Vec<Widget> = Vec::new();
    let overall = score_distribution(input.rows, input.col(SurveyColumn::OverallRating))?;
    let processes = explode_counts(input.rows, input.col(SurveyColumn::HrProcesses));
    let improvements = explode_counts(input.rows, input.col(SurveyColumn::ImprovementAreas));
    let devices = explode_counts(input.rows, input.col(SurveyColumn::HrAccess));
    let responsive = conditional_yes_rate(
        input.rows,
        input.col(SurveyColumn::HrResponsive),
        "Yes",
        None,
    );

    let mut items: Vec<String> = Vec::new();
    if let Some(m) = overall.median() {
        items.push(format!("Median rating of the overall HR services: {}", m));
    }
    if let Some(pct) = responsive.percentage {
        items.push(format!(
            "{:.2}% of the respondents find HR responsive to their inquiries and concerns",
            pct
        ));
    }
    let top_excluding_none = |counts: &TokenCounts| -> Option<String> {
        counts
            .counts
            .iter()
            .find(|(t, _)| t != "None")
            .map(|(t, c)| format!("{} ({})", t, c))
    };
    if let Some(s) = top_excluding_none(&processes) {
        items.push(format!("Most interacted HR process: {}", s));
    }
    if let Some(s) = top_excluding_none(&improvements) {
        items.push(format!("Most requested improvement area: {}", s));
    }
    if let Some((device, _)) = devices.top() {
        items.push(format!("Most used device to access HR information: {}", device));
    }
    w.push(Widget::Highlights { items });

    input.scores(
        &mut w,
        "Overall rating on HR services and support",
        SurveyColumn::OverallRating,
        &SATISFACTION_LABELS,
    )?;
    let split = satisfaction_split(input.rows, input.col(SurveyColumn::OverallRating))?;
    let bars = |l: &[(u8, f64)], total: u64| -> Vec<ScoreBar> {
        l.iter()
            .map(|(s, share)| ScoreBar {
                score: *s,
                label: SATISFACTION_LABELS[(*s - SCALE_MIN) as usize].to_string(),
                count: (share * total as f64).round() as u64,
                percentage: round2(share * 100.0),
            })
            .collect()
    };
    w.push(Widget::SatisfactionSplit {
        title: "Overall rating: dissatisfied and satisfied respondents".to_string(),
        dissatisfied: bars(&split.dissatisfied[..], split.total_dissatisfied),
        satisfied: bars(&split.satisfied[..], split.total_satisfied),
    });
    input.scores(
        &mut w,
        "Rating on communication channels",
        SurveyColumn::CommunicationRating,
        &SATISFACTION_LABELS,
    )?;

    w.push(Widget::Comparison {
        title: "HR Processes: Employee Interaction vs Improvement Areas".to_string(),
        left: "Employee Interaction".to_string(),
        right: "Improvement Areas".to_string(),
        rows: compare_breakdowns(&processes, &improvements, Some("None"))
            .into_iter()
            .map(|p| ComparisonRow {
                label: p.token,
                left: p.left,
                right: p.right,
            })
            .collect(),
    });
    w.push(input.breakdown(
        "Devices Used to Access HR Information",
        SurveyColumn::HrAccess,
        Basis::Tokens,
    ));
    w.push(input.rate(
        "HR responsiveness",
        SurveyColumn::HrResponsive,
        "Yes",
        None,
        "find the HR department responsive to their inquiries and concerns",
    ));

    let title = "The Reasons for Ratings on Communication Channels";
    let split = split_by_score(
        input.rows,
        input.col(SurveyColumn::CommunicationRating),
        input.col(SurveyColumn::CommunicationReasons),
    );
    let counter = input.counter(COMMUNICATION_STOPWORDS);
    w.push(input.words(title, Some("high scores"), counter.count(split.high)));
    w.push(input.words(title, Some("low scores"), counter.count(split.low)));
    w.push(input.sentiment(title, SurveyColumn::CommunicationReasons));
    w.push(input.summary(title, SurveyColumn::CommunicationReasons));
    Ok(w)
}

fn recruiting_onboarding(input: &PageInput) -> PageResult {
    let mut w: Vec<Widget> = Vec::new();
    w.push(input.rate(
        "Tenure",
        SurveyColumn::Tenure,
        "Less than a year",
        None,
        "have been part of the company for less than a year",
    ));
    input.scores(
        &mut w,
        "Rating on the recruiting process",
        SurveyColumn::RecruitingRating,
        &SATISFACTION_LABELS,
    )?;
    w.push(input.breakdown(
        "Reasons that drive scores: 1 - Very Dissatisfied / 2 - Dissatisfied / 3 - Neutral",
        SurveyColumn::RecruitingNegativeReasons,
        Basis::Respondents,
    ));
    w.push(input.breakdown(
        "Reasons that drive scores: 4 - Satisfied / 5 - Very Satisfied",
        SurveyColumn::RecruitingPositiveReasons,
        Basis::Respondents,
    ));
    w.push(input.breakdown(
        "Aspects of the recruiting process that took the most time and require improvement",
        SurveyColumn::RecruitingImprovements,
        Basis::Respondents,
    ));
    input.scores(
        &mut w,
        "Rating on the onboarding process",
        SurveyColumn::OnboardingRating,
        &SATISFACTION_LABELS,
    )?;
    w.push(input.breakdown(
        "Reasons that drive scores: 1 - Very Dissatisfied / 2 - Dissatisfied / 3 - Neutral",
        SurveyColumn::OnboardingNegativeReasons,
        Basis::Respondents,
    ));
    w.push(input.breakdown(
        "Reasons that drive scores: 4 - Satisfied / 5 - Very Satisfied",
        SurveyColumn::OnboardingPositiveReasons,
        Basis::Respondents,
    ));
    w.push(input.breakdown(
        "Parts of the onboarding process that were particularly helpful",
        SurveyColumn::OnboardingHelpful,
        Basis::Respondents,
    ));
    w.push(input.breakdown(
        "Part of the Onboarding Process Could Be Improved",
        SurveyColumn::OnboardingImprovements,
        Basis::Respondents,
    ));
    Ok(w)
}

fn performance_talent(input: &PageInput) -> PageResult {
    let mut w: Vec<Widget> = Vec::new();
    input.scores(
        &mut w,
        "Rating on the performance evaluation and feedback process",
        SurveyColumn::PerformanceRating,
        &SATISFACTION_LABELS,
    )?;
    input.scores(
        &mut w,
        "Comfort discussing career goals and development with the manager",
        SurveyColumn::CareerComfort,
        &COMFORT_LABELS,
    )?;
    w.push(input.rate(
        "Identify and tag your skills within the HRIS",
        SurveyColumn::SkillsTagging,
        "Yes",
        None,
        "are able to identify and tag their skills within the HRIS",
    ));
    Ok(w)
}

fn learning(input: &PageInput) -> PageResult {
    let mut w: Vec<Widget> = Vec::new();
    input.scores(
        &mut w,
        "Rating on the learning management system",
        SurveyColumn::LmsRating,
        &SATISFACTION_LABELS,
    )?;
    w.push(input.breakdown(
        "Preferred learning formats",
        SurveyColumn::LearningFormat,
        Basis::Tokens,
    ));
    w.push(input.rate(
        "Participation in training programs",
        SurveyColumn::TrainingParticipation,
        "Yes",
        None,
        "have participated in training or development programs provided by HR",
    ));
    w.push(input.rate(
        "Training recommendations",
        SurveyColumn::TrainingRecommendations,
        "Yes",
        None,
        "have received recommendations on training",
    ));
    let title = "What could be improved or what kind of format is missing today ?";
    w.push(input.word_table(title, SurveyColumn::LearningImprovements));
    w.push(input.emotions(title, SurveyColumn::LearningImprovements));
    Ok(w)
}

fn compensation(input: &PageInput) -> PageResult {
    let campaign = Some(SurveyColumn::CompensationCampaign);
    let mut w: Vec<Widget> = vec![
        input.rate(
            "Participation in the compensation campaign",
            SurveyColumn::CompensationCampaign,
            "Yes",
            None,
            "participate in the compensation campaign",
        ),
        input.rate(
            "Data available in the compensation form",
            SurveyColumn::CompensationData,
            "Yes",
            campaign,
            "think that the data available in the compensation form enables a fair decision",
        ),
        input.words(
            "What data is missing according to you ?",
            None,
            phrase_frequencies(input.texts(SurveyColumn::CompensationMissingData)),
        ),
        input.breakdown(
            "Compensation Campaigns Management/Launch",
            SurveyColumn::CompensationManagement,
            Basis::Tokens,
        ),
    ];
    input.scores(
        &mut w,
        "Rating on the compensation campaign",
        SurveyColumn::CompensationRating,
        &SATISFACTION_LABELS,
    )?;
    w.push(input.rate(
        "Retroactivity on salary payments",
        SurveyColumn::SalaryRetroactivity,
        "Yes",
        campaign,
        "have retroactivity on salary payments",
    ));
    w.push(input.rate(
        "Participation in the variable pay/bonus campaign",
        SurveyColumn::BonusCampaign,
        "Yes",
        campaign,
        "participate in the variable pay/bonus campaign",
    ));
    input.scores(
        &mut w,
        "Rating on the variable pay/bonus campaign",
        SurveyColumn::BonusRating,
        &SATISFACTION_LABELS,
    )?;
    w.push(input.breakdown(
        "Variable Pay/Bonus Campaigns Management/Launch",
        SurveyColumn::BonusManagement,
        Basis::Tokens,
    ));
    w.push(input.rate(
        "Dates of the variable pay campaign",
        SurveyColumn::BonusDates,
        "Yes",
        campaign,
        "have different dates for the variable pay and the compensation campaigns",
    ));
    Ok(w)
}

fn payroll(input: &PageInput) -> PageResult {
    let team = Some(SurveyColumn::PayrollTeam);
    let mut w: Vec<Widget> = vec![input.rate(
        "Part of the payroll team",
        SurveyColumn::PayrollTeam,
        "Yes",
        None,
        "are part of the payroll team",
    )];
    input.scores(
        &mut w,
        "Rating on the current payroll system",
        SurveyColumn::PayrollRating,
        &SATISFACTION_LABELS,
    )?;
    w.push(input.rate(
        "Internal or outsourced payroll",
        SurveyColumn::PayrollInternal,
        "Internal",
        team,
        "realize their payroll activities internally",
    ));
    w.push(input.rate(
        "Legal updates",
        SurveyColumn::PayrollLegalUpdates,
        "Yes",
        team,
        "have a system that covers legal updates",
    ));
    w.push(input.rate(
        "Autonomy on simple updates",
        SurveyColumn::PayrollAutonomy,
        "Autonomous",
        team,
        "are autonomous when updating simple data",
    ));
    w.push(input.word_table(
        "Features of the current system that respondents like",
        SurveyColumn::PayrollFeatures,
    ));
    w.push(input.rate(
        "Global platform",
        SurveyColumn::PayrollGlobalPlatform,
        "Yes",
        team,
        "have a global platform consolidating the data of all the countries",
    ));
    w.push(input.rate(
        "Payroll KPIs",
        SurveyColumn::PayrollKpis,
        "Yes",
        Some(SurveyColumn::PayrollGlobalPlatform),
        "have a platform that generates payroll KPIs automatically",
    ));
    w.push(input.rate(
        "Mass entries",
        SurveyColumn::PayrollMassEntries,
        "Yes",
        team,
        "can make mass entries in the tool",
    ));
    w.push(input.rate(
        "Connection with time management",
        SurveyColumn::PayrollTimeLink,
        "Yes",
        team,
        "have a payroll connected with their time management system",
    ));
    w.push(input.rate(
        "Connection with core HR",
        SurveyColumn::PayrollCoreHrLink,
        "Yes",
        team,
        "have a payroll connected with a core HR/administrative solution",
    ));
    Ok(w)
}

fn time_management(input: &PageInput) -> PageResult {
    let team = Some(SurveyColumn::TimeTeam);
    let mut w: Vec<Widget> = vec![
        input.rate(
            "Part of the time management team",
            SurveyColumn::TimeTeam,
            "Yes",
            None,
            "are part of the time management team",
        ),
        input.rate(
            "Time management system",
            SurveyColumn::TimeSystem,
            "Yes",
            team,
            "currently have a time management system",
        ),
    ];
    input.scores(
        &mut w,
        "Rating on the current time management system",
        SurveyColumn::TimeRating,
        &SATISFACTION_LABELS,
    )?;
    for (title, c, statement) in [
        (
            "Employee self-service",
            SurveyColumn::TimeSelfService,
            "have a self-service for their employees",
        ),
        (
            "Vacation counters",
            SurveyColumn::TimeVacationCounters,
            "have a system that lets employees view their vacation counters",
        ),
        (
            "Shift scheduling",
            SurveyColumn::TimeShiftScheduling,
            "have a system that covers all the shift scheduling functions they need",
        ),
        (
            "Reporting",
            SurveyColumn::TimeReporting,
            "can run all the reports they need",
        ),
    ] {
        w.push(input.rate(title, c, "Yes", team, statement));
    }
    w.push(input.word_table(
        "According to you, what functionalities are missing from your current system ?",
        SurveyColumn::TimeMissingFeatures,
    ));
    w.push(input.rate(
        "Leave requests",
        SurveyColumn::TimeLeaveWorkflow,
        "Yes",
        team,
        "have a system where employees take their own leave with a validation workflow",
    ));
    w.push(input.rate(
        "Retroactive items",
        SurveyColumn::TimeRetroactivity,
        "Yes",
        team,
        "have a system that takes retroactive items into account automatically",
    ));
    Ok(w)
}

fn user_experience(input: &PageInput) -> PageResult {
    let mut w: Vec<Widget> = Vec::new();
    for c in [SurveyColumn::HrisValuable, SurveyColumn::HrisGaps] {
        let title = input.question(c);
        w.push(input.word_table(&title, c));
        w.push(input.emotions(&title, c));
    }
    w.push(input.rate(
        "Time Spend on HRIS",
        SurveyColumn::HrisTimeWellSpent,
        "Yes",
        None,
        "consider the time they spend on the HRIS to be time well spent",
    ));
    let title = input.question(SurveyColumn::HrisThreeWords);
    w.push(input.word_table(&title, SurveyColumn::HrisThreeWords));
    w.push(input.emotions(&title, SurveyColumn::HrisThreeWords));
    Ok(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::schema::testing::sample_table;
    use crate::dashboard::schema::Schema;
    use crate::dashboard::session::Dimension;
    use survey_stats::text::{ClassifierError, LabelScore, TextClassifier, TextSummarizer};

    struct FixedLabel(&'static str);

    impl TextClassifier for FixedLabel {
        fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
            Ok(vec![LabelScore {
                label: self.0.to_string(),
                score: 0.9,
            }])
        }
    }

    struct Offline;

    impl TextSummarizer for Offline {
        fn summarize(&self, _text: &str) -> Result<String, ClassifierError> {
            Err(ClassifierError::Unavailable("offline".to_string()))
        }
    }

    fn dataset() -> Dataset {
        let table = sample_table();
        let schema = Schema::resolve(&table, &[]).unwrap();
        Dataset {
            table,
            schema,
            origin: "sample".to_string(),
        }
    }

    fn widgets(report: &PageReport) -> &[Widget] {
        match &report.outcome {
            PageOutcome::Success { widgets } => widgets,
            PageOutcome::Error { message } => panic!("page failed: {}", message),
        }
    }

    fn render(data: &Dataset, models: &TextModels, session: &Session) -> PageReport {
        let stopwords: Vec<String> = vec![];
        let ctx = RenderContext {
            dataset: data,
            stopwords: &stopwords,
            models,
        };
        render_page(&ctx, session)
    }

    #[test]
    fn pages_by_name() {
        assert_eq!(Page::parse("payroll").unwrap(), Page::Payroll);
        assert_eq!(Page::parse("0").unwrap(), Page::General);
        assert_eq!(Page::parse("8").unwrap(), Page::UserExperience);
        assert_eq!(
            Page::parse("section 2: recruiting & onboarding").unwrap(),
            Page::RecruitingOnboarding
        );
        assert!(Page::parse("9").is_err());
        assert!(Page::parse("wellbeing").is_err());
    }

    #[test]
    fn general_page_counts_the_selection() {
        let data = dataset();
        let models = TextModels::disabled();
        let mut session = Session::new();
        session.select(Dimension::Location, "Europe");
        session.select(Dimension::Role, "Manager");
        let report = render(&data, &models, &session);
        assert_eq!(report.respondents, 2);
        match &widgets(&report)[0] {
            Widget::Population { total, filtered } => {
                assert_eq!(*total, 10);
                assert_eq!(*filtered, 2);
            }
            w => panic!("unexpected widget {:?}", w),
        }
        match &widgets(&report)[1] {
            Widget::Counts { counts, .. } => {
                assert_eq!(counts[0].label, "Europe");
                assert_eq!(counts[0].code, Some("DEU".to_string()));
            }
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn every_page_renders() {
        let data = dataset();
        let models = TextModels::disabled();
        let mut session = Session::new();
        for page in Page::ALL.iter() {
            session.select_page(*page);
            let report = render(&data, &models, &session);
            assert!(!widgets(&report).is_empty(), "{}", page.slug());
        }
    }

    #[test]
    fn missing_models_become_notices() {
        let data = dataset();
        let models = TextModels::disabled();
        let mut session = Session::new();
        session.select_page(Page::UserExperience);
        let report = render(&data, &models, &session);
        assert!(widgets(&report)
            .iter()
            .any(|w| matches!(w, Widget::Notice { .. })));
    }

    #[test]
    fn text_models_are_used() {
        let data = dataset();
        let models = TextModels {
            sentiment: Some(Box::new(FixedLabel("NEGATIVE"))),
            emotion: Some(Box::new(FixedLabel("joy"))),
            summarizer: Some(Box::new(Offline)),
        };
        let mut session = Session::new();
        session.select_page(Page::EmployeeExperience);
        let report = render(&data, &models, &session);
        let ws = widgets(&report);
        let sentiment = ws
            .iter()
            .find_map(|w| match w {
                Widget::Sentiment {
                    negative,
                    top_negative,
                    ..
                } => Some((*negative, top_negative.len())),
                _ => None,
            })
            .unwrap();
        assert_eq!(sentiment, (10, TOP_COMMENTS));
        // The summarizer failure does not prevent the rest of the page.
        assert!(matches!(ws.last(), Some(Widget::Notice { .. })));

        session.select_page(Page::UserExperience);
        let report = render(&data, &models, &session);
        let emotions = widgets(&report)
            .iter()
            .find_map(|w| match w {
                Widget::Emotions {
                    counts, respondents, ..
                } => Some((counts.clone(), respondents.len())),
                _ => None,
            })
            .unwrap();
        assert_eq!(emotions.0[0].label, "joy");
        assert_eq!(emotions.1, 10);
    }

    #[test]
    fn conditional_rates_without_population() {
        let data = dataset();
        let models = TextModels::disabled();
        let mut session = Session::new();
        session.select_page(Page::Payroll);
        // Both IT employees in Europe answered "No" to being in the payroll team.
        session.select(Dimension::Function, "IT");
        session.select(Dimension::Location, "Europe");
        let report = render(&data, &models, &session);
        let internal = widgets(&report)
            .iter()
            .find_map(|w| match w {
                Widget::Proportion {
                    title,
                    percentage,
                    denominator,
                    ..
                } if title == "Internal or outsourced payroll" => Some((*percentage, *denominator)),
                _ => None,
            })
            .unwrap();
        assert_eq!(internal, (None, 0));
    }

    #[test]
    fn focus_adds_a_drill_down() {
        let data = dataset();
        let models = TextModels::disabled();
        let mut session = Session::new();
        session.select_page(Page::PerformanceTalent);
        session.set_focus(Some(4));
        let report = render(&data, &models, &session);
        let drill = widgets(&report)
            .iter()
            .find_map(|w| match w {
                Widget::DrillDown {
                    label, respondents, ..
                } => Some((label.clone(), *respondents)),
                _ => None,
            })
            .unwrap();
        assert_eq!(drill, ("Satisfied".to_string(), 3));
    }

    #[test]
    fn invalid_rating_fails_only_its_page() {
        let mut data = dataset();
        data.table.rows[0].cells[26] = Some("great".to_string());
        let models = TextModels::disabled();
        let mut session = Session::new();
        session.select_page(Page::PerformanceTalent);
        let report = render(&data, &models, &session);
        assert!(matches!(report.outcome, PageOutcome::Error { .. }));

        session.select_page(Page::Learning);
        let report = render(&data, &models, &session);
        assert!(matches!(report.outcome, PageOutcome::Success { .. }));
    }

    #[test]
    fn report_json_layout() {
        let data = dataset();
        let models = TextModels::disabled();
        let session = Session::new();
        let js = serde_json::to_value(render(&data, &models, &session)).unwrap();
        assert_eq!(js["status"], "success");
        assert_eq!(js["title"], "General Survey Results");
        assert_eq!(js["widgets"][0]["widget"], "population");
        assert_eq!(js["widgets"][1]["widget"], "counts");
        assert_eq!(js["filters"]["roles"], serde_json::json!([]));
    }
}
