use super::finance::{
    FinanceError, future_value_of_annuity, months_to_reach_goal, required_contribution,
};
use super::types::{Goal, GoalId, GoalPlan, GoalResolution, GoalSpec, RetirementProfile};

/// Ordered goals for one planning session.
///
/// Each goal is resolved once when it is added or edited. Changing the
/// retirement profile afterwards never moves a goal's cached numbers.
#[derive(Debug, Clone, Default)]
pub struct GoalLedger {
    goals: Vec<Goal>,
    next_id: u64,
}

pub fn resolve_goal(spec: &GoalSpec, current_year: i32) -> Result<GoalResolution, FinanceError> {
    match spec.plan {
        GoalPlan::TargetYear { target_year } => {
            let months = (i64::from(target_year) - i64::from(current_year)) * 12;
            let monthly_contribution =
                required_contribution(spec.target_amount, spec.annual_rate_pct, months)?;
            Ok(GoalResolution {
                monthly_contribution,
                horizon_months: months as f64,
                target_year,
            })
        }
        GoalPlan::MonthlyContribution {
            monthly_contribution,
        } => {
            let months =
                months_to_reach_goal(spec.target_amount, monthly_contribution, spec.annual_rate_pct)?;
            let years = (months.ceil() / 12.0).ceil();
            if years > f64::from(i32::MAX - current_year.max(0)) {
                return Err(FinanceError::Overflow {
                    context: "goal target year",
                });
            }
            Ok(GoalResolution {
                monthly_contribution,
                horizon_months: months,
                target_year: current_year + years as i32,
            })
        }
    }
}

impl GoalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spec: GoalSpec, current_year: i32) -> Result<&Goal, FinanceError> {
        let resolved = resolve_goal(&spec, current_year)?;
        let id = GoalId(self.next_id);
        self.next_id += 1;

        tracing::debug!(%id, name = %spec.name, ?resolved, "goal added");
        self.goals.push(Goal {
            id,
            name: spec.name,
            target_amount: spec.target_amount,
            annual_rate_pct: spec.annual_rate_pct,
            plan: spec.plan,
            resolved,
        });
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// Replace a goal's own fields and re-resolve it in place. Returns
    /// `Ok(None)` when `id` is not in the ledger; on error the goal is left as
    /// it was.
    pub fn edit(
        &mut self,
        id: GoalId,
        spec: GoalSpec,
        current_year: i32,
    ) -> Result<Option<&Goal>, FinanceError> {
        let Some(index) = self.goals.iter().position(|goal| goal.id == id) else {
            return Ok(None);
        };

        let resolved = resolve_goal(&spec, current_year)?;
        let goal = &mut self.goals[index];
        goal.name = spec.name;
        goal.target_amount = spec.target_amount;
        goal.annual_rate_pct = spec.annual_rate_pct;
        goal.plan = spec.plan;
        goal.resolved = resolved;
        Ok(Some(goal))
    }

    /// Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: GoalId) -> Option<Goal> {
        let index = self.goals.iter().position(|goal| goal.id == id)?;
        Some(self.goals.remove(index))
    }

    pub fn get(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn total_monthly_commitment(&self) -> f64 {
        self.goals
            .iter()
            .map(|goal| goal.resolved.monthly_contribution)
            .sum()
    }

    pub fn remaining_for_retirement(&self, profile: &RetirementProfile) -> f64 {
        profile.monthly_surplus() - self.total_monthly_commitment()
    }

    pub fn is_overcommitted(&self, profile: &RetirementProfile) -> bool {
        self.remaining_for_retirement(profile) < 0.0
    }

    pub fn projected_retirement_net_worth(
        &self,
        profile: &RetirementProfile,
    ) -> Result<f64, FinanceError> {
        future_value_of_annuity(
            self.remaining_for_retirement(profile),
            profile.annual_rate_pct,
            profile.months_to_retirement(),
        )
    }
}
