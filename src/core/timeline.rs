use super::finance::{FinanceError, future_value_of_annuity};
use super::ledger::GoalLedger;
use super::types::{GoalMilestone, RetirementProfile, Timeline, TimelinePoint};

/// Year-by-year balance of the retirement pot, from today up to the
/// retirement age, plus one milestone per goal for chart annotations.
pub fn project_timeline(
    profile: &RetirementProfile,
    ledger: &GoalLedger,
    current_year: i32,
) -> Result<Timeline, FinanceError> {
    let contribution = ledger.remaining_for_retirement(profile);
    let years = profile.retirement_age.saturating_sub(profile.current_age);

    let mut points = Vec::with_capacity(years as usize + 1);
    for offset in 0..=years {
        let months_elapsed = offset.saturating_mul(12);
        let balance =
            future_value_of_annuity(contribution, profile.annual_rate_pct, months_elapsed)?;
        points.push(TimelinePoint {
            age: profile.current_age + offset,
            year: current_year.saturating_add_unsigned(offset),
            months_elapsed,
            balance,
        });
    }

    let milestones = ledger
        .goals()
        .iter()
        .map(|goal| GoalMilestone {
            goal_id: goal.id,
            name: goal.name.clone(),
            target_year: goal.resolved.target_year,
            age: i64::from(profile.current_age) + i64::from(goal.resolved.target_year)
                - i64::from(current_year),
        })
        .collect();

    Ok(Timeline { points, milestones })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GoalPlan, GoalSpec};

    const YEAR: i32 = 2026;

    fn sample_profile() -> RetirementProfile {
        RetirementProfile {
            current_age: 30,
            retirement_age: 65,
            monthly_income: 5_000.0,
            monthly_expenses: 2_000.0,
            annual_rate_pct: 5.0,
        }
    }

    #[test]
    fn timeline_spans_current_to_retirement_age() {
        let profile = sample_profile();
        let ledger = GoalLedger::new();
        let timeline = project_timeline(&profile, &ledger, YEAR).expect("finite");

        assert_eq!(timeline.points.len(), 36);
        let first = timeline.points[0];
        assert_eq!((first.age, first.year, first.balance), (30, YEAR, 0.0));
        let last = timeline.points[35];
        assert_eq!((last.age, last.year, last.months_elapsed), (65, YEAR + 35, 420));
        assert_eq!(
            last.balance,
            ledger
                .projected_retirement_net_worth(&profile)
                .expect("finite")
        );
        assert!(timeline.milestones.is_empty());
    }

    #[test]
    fn balances_grow_with_positive_surplus() {
        let profile = sample_profile();
        let timeline = project_timeline(&profile, &GoalLedger::new(), YEAR).expect("finite");

        assert!(
            timeline
                .points
                .windows(2)
                .all(|pair| pair[1].balance > pair[0].balance)
        );
    }

    #[test]
    fn milestones_follow_goal_order_and_map_to_age() {
        let profile = sample_profile();
        let mut ledger = GoalLedger::new();
        let house = ledger
            .add(
                GoalSpec {
                    name: "House".to_string(),
                    target_amount: 50_000.0,
                    annual_rate_pct: 5.0,
                    plan: GoalPlan::TargetYear {
                        target_year: YEAR + 10,
                    },
                },
                YEAR,
            )
            .expect("resolvable")
            .id;
        ledger
            .add(
                GoalSpec {
                    name: "Car".to_string(),
                    target_amount: 12_000.0,
                    annual_rate_pct: 0.0,
                    plan: GoalPlan::MonthlyContribution {
                        monthly_contribution: 500.0,
                    },
                },
                YEAR,
            )
            .expect("resolvable");

        let timeline = project_timeline(&profile, &ledger, YEAR).expect("finite");
        assert_eq!(timeline.milestones.len(), 2);
        assert_eq!(timeline.milestones[0].goal_id, house);
        assert_eq!(timeline.milestones[0].age, 40);
        assert_eq!(timeline.milestones[1].name, "Car");
        assert_eq!(timeline.milestones[1].age, 32);
    }

    #[test]
    fn overcommitted_profile_gives_falling_balances() {
        let mut profile = sample_profile();
        profile.monthly_expenses = 6_000.0;
        let timeline = project_timeline(&profile, &GoalLedger::new(), YEAR).expect("finite");

        assert!(timeline.points[1].balance < 0.0);
        assert!(timeline.points[35].balance < timeline.points[1].balance);
    }
}
