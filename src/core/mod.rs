mod finance;
mod ledger;
mod timeline;
mod types;

pub use finance::{
    FinanceError, future_value_of_annuity, monthly_rate, months_to_reach_goal,
    required_contribution,
};
pub use ledger::{GoalLedger, resolve_goal};
pub use timeline::project_timeline;
pub use types::{
    Goal, GoalId, GoalMilestone, GoalPlan, GoalResolution, GoalSpec, RetirementProfile, Timeline,
    TimelinePoint,
};
