// The named columns of the survey, resolved once against the header of the
// loaded table.

use crate::dashboard::*;

use std::fmt::Display;

use survey_stats::{check_column, FilterColumns, Table};

/// The questions of the survey that the dashboard reads.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum SurveyColumn {
    Id,
    Role,
    Function,
    Location,
    HrProcesses,
    ImprovementAreas,
    HrAccess,
    // Section 1
    OverallRating,
    CommunicationRating,
    CommunicationReasons,
    HrResponsive,
    // Section 2
    Tenure,
    RecruitingRating,
    RecruitingNegativeReasons,
    RecruitingPositiveReasons,
    RecruitingImprovements,
    OnboardingRating,
    OnboardingNegativeReasons,
    OnboardingPositiveReasons,
    OnboardingHelpful,
    OnboardingImprovements,
    // Section 3
    PerformanceRating,
    CareerComfort,
    SkillsTagging,
    // Section 4
    LmsRating,
    LearningFormat,
    TrainingParticipation,
    TrainingRecommendations,
    LearningImprovements,
    // Section 5
    CompensationCampaign,
    CompensationData,
    CompensationMissingData,
    CompensationManagement,
    CompensationRating,
    SalaryRetroactivity,
    BonusCampaign,
    BonusRating,
    BonusManagement,
    BonusDates,
    // Section 6
    PayrollTeam,
    PayrollRating,
    PayrollInternal,
    PayrollLegalUpdates,
    PayrollAutonomy,
    PayrollFeatures,
    PayrollGlobalPlatform,
    PayrollKpis,
    PayrollMassEntries,
    PayrollTimeLink,
    PayrollCoreHrLink,
    // Section 7
    TimeTeam,
    TimeSystem,
    TimeRating,
    TimeSelfService,
    TimeVacationCounters,
    TimeShiftScheduling,
    TimeReporting,
    TimeMissingFeatures,
    TimeLeaveWorkflow,
    TimeRetroactivity,
    // Section 8
    HrisValuable,
    HrisGaps,
    HrisTimeWellSpent,
    HrisThreeWords,
}

/// Where a column is found in a questionnaire that was not reconfigured.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum DefaultLocator {
    Header(&'static str),
    Position(usize),
}

use DefaultLocator::{Header as H, Position as P};

// In the declaration order of `SurveyColumn`.
const COLUMNS: &[(SurveyColumn, &str, DefaultLocator)] = &[
    (SurveyColumn::Id, "id", H("ID")),
    (
        SurveyColumn::Role,
        "role",
        H("What is your role at the company ?"),
    ),
    (
        SurveyColumn::Function,
        "function",
        H("What function are you part of ?"),
    ),
    (SurveyColumn::Location, "location", H("Where are you located ?")),
    (
        SurveyColumn::HrProcesses,
        "hrProcesses",
        H("What HR processes do you interact with the most in your day-to-day work ?"),
    ),
    (
        SurveyColumn::ImprovementAreas,
        "improvementAreas",
        H("In what areas do you think HR could improve its capabilities to enhance how they deliver services and support you ?"),
    ),
    (
        SurveyColumn::HrAccess,
        "hrAccess",
        H("How do you access HR Information ?"),
    ),
    (SurveyColumn::OverallRating, "overallRating", P(11)),
    (SurveyColumn::CommunicationRating, "communicationRating", P(13)),
    (SurveyColumn::CommunicationReasons, "communicationReasons", P(14)),
    (SurveyColumn::HrResponsive, "hrResponsive", P(15)),
    (SurveyColumn::Tenure, "tenure", P(16)),
    (SurveyColumn::RecruitingRating, "recruitingRating", P(17)),
    (
        SurveyColumn::RecruitingNegativeReasons,
        "recruitingNegativeReasons",
        P(18),
    ),
    (
        SurveyColumn::RecruitingPositiveReasons,
        "recruitingPositiveReasons",
        P(19),
    ),
    (
        SurveyColumn::RecruitingImprovements,
        "recruitingImprovements",
        P(20),
    ),
    (SurveyColumn::OnboardingRating, "onboardingRating", P(21)),
    (
        SurveyColumn::OnboardingNegativeReasons,
        "onboardingNegativeReasons",
        P(22),
    ),
    (
        SurveyColumn::OnboardingPositiveReasons,
        "onboardingPositiveReasons",
        P(23),
    ),
    (SurveyColumn::OnboardingHelpful, "onboardingHelpful", P(24)),
    (
        SurveyColumn::OnboardingImprovements,
        "onboardingImprovements",
        P(25),
    ),
    (SurveyColumn::PerformanceRating, "performanceRating", P(26)),
    (SurveyColumn::CareerComfort, "careerComfort", P(28)),
    (SurveyColumn::SkillsTagging, "skillsTagging", P(30)),
    (SurveyColumn::LmsRating, "lmsRating", P(31)),
    (SurveyColumn::LearningFormat, "learningFormat", P(32)),
    (
        SurveyColumn::TrainingParticipation,
        "trainingParticipation",
        P(33),
    ),
    (
        SurveyColumn::TrainingRecommendations,
        "trainingRecommendations",
        P(34),
    ),
    (
        SurveyColumn::LearningImprovements,
        "learningImprovements",
        H("What could be improved or what kind of format is missing today ?"),
    ),
    (SurveyColumn::CompensationCampaign, "compensationCampaign", P(36)),
    (SurveyColumn::CompensationData, "compensationData", P(37)),
    (
        SurveyColumn::CompensationMissingData,
        "compensationMissingData",
        H("What data is missing according to you ?"),
    ),
    (
        SurveyColumn::CompensationManagement,
        "compensationManagement",
        P(39),
    ),
    (SurveyColumn::CompensationRating, "compensationRating", P(40)),
    (SurveyColumn::SalaryRetroactivity, "salaryRetroactivity", P(43)),
    (SurveyColumn::BonusCampaign, "bonusCampaign", P(44)),
    (SurveyColumn::BonusRating, "bonusRating", P(45)),
    (SurveyColumn::BonusManagement, "bonusManagement", P(46)),
    (SurveyColumn::BonusDates, "bonusDates", P(47)),
    (SurveyColumn::PayrollTeam, "payrollTeam", P(48)),
    (SurveyColumn::PayrollRating, "payrollRating", P(49)),
    (SurveyColumn::PayrollInternal, "payrollInternal", P(50)),
    (SurveyColumn::PayrollLegalUpdates, "payrollLegalUpdates", P(51)),
    (SurveyColumn::PayrollAutonomy, "payrollAutonomy", P(52)),
    (SurveyColumn::PayrollFeatures, "payrollFeatures", P(53)),
    (
        SurveyColumn::PayrollGlobalPlatform,
        "payrollGlobalPlatform",
        P(54),
    ),
    (SurveyColumn::PayrollKpis, "payrollKpis", P(55)),
    (SurveyColumn::PayrollMassEntries, "payrollMassEntries", P(56)),
    (SurveyColumn::PayrollTimeLink, "payrollTimeLink", P(57)),
    (SurveyColumn::PayrollCoreHrLink, "payrollCoreHrLink", P(58)),
    (SurveyColumn::TimeTeam, "timeTeam", P(59)),
    (SurveyColumn::TimeSystem, "timeSystem", P(60)),
    (SurveyColumn::TimeRating, "timeRating", P(61)),
    (SurveyColumn::TimeSelfService, "timeSelfService", P(62)),
    (
        SurveyColumn::TimeVacationCounters,
        "timeVacationCounters",
        P(63),
    ),
    (SurveyColumn::TimeShiftScheduling, "timeShiftScheduling", P(64)),
    (SurveyColumn::TimeReporting, "timeReporting", P(65)),
    (SurveyColumn::TimeMissingFeatures, "timeMissingFeatures", P(66)),
    (SurveyColumn::TimeLeaveWorkflow, "timeLeaveWorkflow", P(67)),
    (SurveyColumn::TimeRetroactivity, "timeRetroactivity", P(68)),
    (
        SurveyColumn::HrisValuable,
        "hrisValuable",
        H("In the context of your job, what are the most valuable activities your current HRIS enable you to do?"),
    ),
    (
        SurveyColumn::HrisGaps,
        "hrisGaps",
        H("In the context of your job, what do your current HRIS fail to address?"),
    ),
    (SurveyColumn::HrisTimeWellSpent, "hrisTimeWellSpent", P(71)),
    (
        SurveyColumn::HrisThreeWords,
        "hrisThreeWords",
        H("In 3 words, how would you describe your current user-experience with the HRIS ?"),
    ),
];

impl SurveyColumn {
    pub fn all() -> impl Iterator<Item = SurveyColumn> {
        COLUMNS.iter().map(|(c, _, _)| *c)
    }

    /// The name of the column in the configuration file.
    pub fn key(&self) -> &'static str {
        COLUMNS[*self as usize].1
    }

    pub fn from_key(key: &str) -> Option<SurveyColumn> {
        COLUMNS.iter().find(|(_, k, _)| *k == key).map(|(c, _, _)| *c)
    }

    pub fn default_locator(&self) -> ColumnLocator {
        match COLUMNS[*self as usize].2 {
            DefaultLocator::Header(h) => ColumnLocator::Header(h.to_string()),
            DefaultLocator::Position(p) => ColumnLocator::Position(p),
        }
    }
}

/// How a column is found in the table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColumnLocator {
    /// Exact text of the header, ignoring surrounding whitespace.
    Header(String),
    /// 0-based position.
    Position(usize),
}

impl Display for ColumnLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnLocator::Header(h) => write!(f, "header {:?}", h),
            ColumnLocator::Position(p) => write!(f, "column number {}", p + 1),
        }
    }
}

/// The position of every survey column in one table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Schema {
    indices: Vec<usize>,
}

impl Schema {
    /// Finds all the survey columns in the table. The first missing
    /// column rejects the whole table.
    pub fn resolve(table: &Table, overrides: &[(SurveyColumn, ColumnLocator)]) -> DResult<Schema> {
        let mut indices: Vec<usize> = Vec::with_capacity(COLUMNS.len());
        for column in SurveyColumn::all() {
            let locator = overrides
                .iter()
                .rev()
                .find(|(c, _)| *c == column)
                .map(|(_, l)| l.clone())
                .unwrap_or_else(|| column.default_locator());
            let idx = match &locator {
                ColumnLocator::Header(h) => table.column_index(h),
                ColumnLocator::Position(p) => check_column(table, *p).ok().map(|_| *p),
            };
            let idx = idx.context(MissingSurveyColumnSnafu {
                column: column.key(),
                locator: locator.to_string(),
            })?;
            debug!("Schema::resolve: {} -> {}", column.key(), idx);
            indices.push(idx);
        }
        Ok(Schema { indices })
    }

    pub fn index(&self, column: SurveyColumn) -> usize {
        self.indices[column as usize]
    }

    pub fn filter_columns(&self) -> FilterColumns {
        FilterColumns {
            role: self.index(SurveyColumn::Role),
            function: self.index(SurveyColumn::Function),
            location: self.index(SurveyColumn::Location),
        }
    }

    /// The question as written in the header of the table.
    pub fn title<'a>(&self, table: &'a Table, column: SurveyColumn) -> &'a str {
        table
            .header
            .get(self.index(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use survey_stats::builder::TableBuilder;

    pub const WIDTH: usize = 73;

    /// A questionnaire with all the survey columns, in their usual place.
    pub fn sample_header() -> Vec<String> {
        let mut header: Vec<String> = (0..WIDTH).map(|i| format!("Question {}", i)).collect();
        let titled: [(usize, SurveyColumn); 12] = [
            (0, SurveyColumn::Id),
            (1, SurveyColumn::Role),
            (2, SurveyColumn::Function),
            (3, SurveyColumn::Location),
            (4, SurveyColumn::HrProcesses),
            (5, SurveyColumn::ImprovementAreas),
            (7, SurveyColumn::HrAccess),
            (35, SurveyColumn::LearningImprovements),
            (38, SurveyColumn::CompensationMissingData),
            (69, SurveyColumn::HrisValuable),
            (70, SurveyColumn::HrisGaps),
            (72, SurveyColumn::HrisThreeWords),
        ];
        for (pos, c) in titled.iter() {
            if let ColumnLocator::Header(h) = c.default_locator() {
                header[*pos] = h;
            }
        }
        header
    }

    /// 10 respondents: 6 located in Europe, 4 managers of whom 2 are in
    /// Europe.
    pub fn sample_table() -> Table {
        let people: [(&str, &str, &str); 10] = [
            ("Manager", "HR", "Europe"),
            ("Manager", "Finance", "Europe"),
            ("Manager", "IT", "Asia"),
            ("Manager", "HR", "North America"),
            ("Employee", "HR", "Europe"),
            ("Employee", "IT", "Europe"),
            ("Employee", "Finance", "Europe"),
            ("Employee", "IT", "Europe"),
            ("Director", "Finance", "Asia"),
            ("Director", "HR", "Oceania"),
        ];
        let ratings = ["5", "4", "2", "3", "1", "4", "5", "2", "4", "3"];
        let mut b = TableBuilder::from_header(sample_header());
        for (idx, (role, function, location)) in people.iter().enumerate() {
            let mut cells: Vec<Option<String>> = vec![None; WIDTH];
            let mut set = |pos: usize, v: &str| cells[pos] = Some(v.to_string());
            let rating = ratings[idx];
            let yes = if idx % 2 == 0 { "Yes" } else { "No" };
            set(0, &format!("{}", idx + 1));
            set(1, *role);
            set(2, *function);
            set(3, *location);
            set(4, "Payroll;Recruiting;");
            set(5, if idx < 5 { "Payroll;None;" } else { "Learning;" });
            set(7, if idx % 3 == 0 { "Mobile;Laptop;" } else { "Laptop;" });
            for pos in [11, 13, 17, 21, 26, 28, 31, 40, 45, 49, 61] {
                set(pos, rating);
            }
            set(
                14,
                if idx % 2 == 0 {
                    "Great newsletters and clear channels"
                } else {
                    "Information arrives too slow"
                },
            );
            for pos in [15, 30, 33, 34, 36, 48, 54, 59, 71] {
                set(pos, yes);
            }
            set(16, if idx < 3 { "Less than a year" } else { "1-3 years" });
            set(18, "Too long;Unclear steps;");
            set(19, "Friendly recruiters;");
            set(20, "Interviews;");
            set(22, "Missing equipment;");
            set(23, "Buddy program;");
            set(24, "Buddy program;Welcome day;");
            set(25, "IT setup;");
            set(32, "E-learning;Classroom;");
            set(35, "More video content");
            set(37, "Yes");
            set(38, "Market data");
            set(39, "National Campaign;");
            for pos in [43, 44, 47, 51, 55, 56, 57, 58, 60, 62, 63, 64, 65, 67, 68] {
                set(pos, "Yes");
            }
            set(46, "Regional Campaign;");
            set(50, "Internal");
            set(52, "Autonomous");
            set(53, "Easy reporting and clean exports");
            set(66, "Mobile app for shift swaps");
            set(69, "Self service requests");
            set(70, "Reporting across countries");
            set(72, "Slow clunky dated");
            b.add_cells(cells);
        }
        b.build()
    }
}
