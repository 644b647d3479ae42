use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FinanceError {
    #[error("goal horizon must be in the future (got {months} months)")]
    Domain { months: i64 },
    #[error(
        "a monthly contribution of {monthly_contribution:.2} can never reach {target_amount:.2} at this rate; raise the contribution or extend the horizon"
    )]
    Unreachable {
        target_amount: f64,
        monthly_contribution: f64,
    },
    #[error("{context} is outside the representable range")]
    Overflow { context: &'static str },
}

impl FinanceError {
    pub fn kind(&self) -> &'static str {
        match self {
            FinanceError::Domain { .. } => "domain",
            FinanceError::Unreachable { .. } => "unreachable",
            FinanceError::Overflow { .. } => "overflow",
        }
    }
}

pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}

/// `(1 + r)^months - 1`, computed without the cancellation of the naive form.
fn growth_minus_one(r: f64, months: f64) -> f64 {
    (months * r.ln_1p()).exp_m1()
}

fn finite(value: f64, context: &'static str) -> Result<f64, FinanceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FinanceError::Overflow { context })
    }
}

/// Future value of an ordinary annuity: `contribution` deposited at the end of
/// each month for `months` months, compounded monthly.
pub fn future_value_of_annuity(
    contribution: f64,
    annual_rate_pct: f64,
    months: u32,
) -> Result<f64, FinanceError> {
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return finite(contribution * f64::from(months), "future value");
    }

    let growth = finite(growth_minus_one(r, f64::from(months)), "growth factor")?;
    finite(contribution * growth / r, "future value")
}

/// Monthly contribution needed for the annuity to reach `target_amount` after
/// `months` months.
pub fn required_contribution(
    target_amount: f64,
    annual_rate_pct: f64,
    months: i64,
) -> Result<f64, FinanceError> {
    if months <= 0 {
        return Err(FinanceError::Domain { months });
    }

    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return finite(target_amount / months as f64, "required contribution");
    }

    let growth = finite(growth_minus_one(r, months as f64), "growth factor")?;
    finite(target_amount * r / growth, "required contribution")
}

/// Fractional number of months a fixed `contribution` needs to reach
/// `target_amount`. Callers wanting whole deposits should round up.
pub fn months_to_reach_goal(
    target_amount: f64,
    contribution: f64,
    annual_rate_pct: f64,
) -> Result<f64, FinanceError> {
    if target_amount <= 0.0 {
        return Ok(0.0);
    }

    let unreachable = FinanceError::Unreachable {
        target_amount,
        monthly_contribution: contribution,
    };
    if contribution <= 0.0 {
        return Err(unreachable);
    }

    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return finite(target_amount / contribution, "months to goal");
    }

    // Interest earned on the target must stay below the contribution, or the
    // logarithm below has no real solution.
    let headroom = contribution - target_amount * r;
    if headroom <= 0.0 {
        return Err(unreachable);
    }

    // ln(C / (C - T*r)) written as -ln(1 - T*r/C) so tiny rates keep their digits.
    let pace = target_amount * r / contribution;
    finite(-(-pace).ln_1p() / r.ln_1p(), "months to goal")
}
