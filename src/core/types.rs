use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementProfile {
    pub current_age: u32,
    pub retirement_age: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub annual_rate_pct: f64,
}

impl RetirementProfile {
    pub fn monthly_surplus(&self) -> f64 {
        self.monthly_income - self.monthly_expenses
    }

    pub fn months_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age).saturating_mul(12)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct GoalId(pub u64);

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "goal-{}", self.0)
    }
}

/// Which side of a goal the user fixed; the other side is solved for.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GoalPlan {
    #[serde(rename_all = "camelCase")]
    TargetYear { target_year: i32 },
    #[serde(rename_all = "camelCase")]
    MonthlyContribution { monthly_contribution: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalSpec {
    pub name: String,
    pub target_amount: f64,
    pub annual_rate_pct: f64,
    pub plan: GoalPlan,
}

/// Both unknowns of a goal, fixed at the moment it was added or edited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResolution {
    pub monthly_contribution: f64,
    pub horizon_months: f64,
    pub target_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub target_amount: f64,
    pub annual_rate_pct: f64,
    pub plan: GoalPlan,
    pub resolved: GoalResolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub age: u32,
    pub year: i32,
    pub months_elapsed: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMilestone {
    pub goal_id: GoalId,
    pub name: String,
    pub target_year: i32,
    pub age: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub points: Vec<TimelinePoint>,
    pub milestones: Vec<GoalMilestone>,
}
