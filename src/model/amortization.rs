use rust_decimal::{Decimal, MathematicalOps};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::MortgageQuoteType,
};

const MONTHS_PER_YEAR: i32 = 12;

/**
 * Calculates the monthly installment and total repayment of a french amortization loan.
 *
 * `cuota = P * i / (1 - (1 + i)^-n)` with `i = tae / 100 / 12` and `n = plazo * 12`.
 * A zero rate, or one too small to compound at decimal precision, falls back to linear amortization, `cuota = P / n`.
 *
 * # Arguments
 * `principal`: The borrowed capital, must be positive.
 * `tae`: The annual nominal rate as a percentage, e.g. 3.5. Must not be negative.
 * `term_years`: The term in years, must be positive.
 *
 * # Returns
 * A Result containing the `MortgageQuoteType` or a validation `ApplicationError`.
 */
pub fn calculate_installment(principal: Decimal, tae: Decimal, term_years: i32) -> Result<MortgageQuoteType, ApplicationError> {
    if principal <= Decimal::ZERO {
        return Err(ApplicationError::new(ErrorType::Validation, "capital_solicitado must be positive".to_string()));
    }
    if tae < Decimal::ZERO {
        return Err(ApplicationError::new(ErrorType::Validation, "tae must not be negative".to_string()));
    }
    if term_years <= 0 {
        return Err(ApplicationError::new(ErrorType::Validation, "plazo must be positive".to_string()));
    }
    let installments = term_years.checked_mul(MONTHS_PER_YEAR).ok_or_else(out_of_range)?;
    let installments_dec = Decimal::from(installments);

    let monthly_rate = tae / Decimal::ONE_HUNDRED / Decimal::from(MONTHS_PER_YEAR);
    // (1 + i)^n, the negative exponent is folded into the quotient below.
    let growth = (Decimal::ONE + monthly_rate).checked_powu(installments.unsigned_abs().into()).ok_or_else(out_of_range)?;
    let denominator = growth - Decimal::ONE;
    // Rates below decimal precision leave nothing to compound.
    let monthly_payment = if denominator.is_zero() {
        principal.checked_div(installments_dec).ok_or_else(out_of_range)?
    } else {
        let numerator = principal.checked_mul(monthly_rate).and_then(|value| value.checked_mul(growth)).ok_or_else(out_of_range)?;
        numerator.checked_div(denominator).ok_or_else(out_of_range)?
    };
    let total_repayment = monthly_payment.checked_mul(installments_dec).ok_or_else(out_of_range)?;
    Ok(MortgageQuoteType::new(monthly_payment, total_repayment))
}

fn out_of_range() -> ApplicationError {
    ApplicationError::new(ErrorType::Validation, "Mortgage parameters out of range".to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reference_quote() {
        let quote = calculate_installment(Decimal::from(100_000), Decimal::new(35, 1), 20).unwrap();
        assert_eq!(quote.monthly_payment.round_dp(2), Decimal::new(57996, 2));
        assert_eq!(quote.total_repayment.round_dp(2), Decimal::new(13919033, 2));
    }

    #[test]
    fn test_thirty_year_quote() {
        let quote = calculate_installment(Decimal::from(200_000), Decimal::from(2), 30).unwrap();
        assert_eq!(quote.monthly_payment.round_dp(2), Decimal::new(73924, 2));
        assert_eq!(quote.total_repayment.round_dp(0), Decimal::from(266_126));
    }

    #[test]
    fn test_total_is_installment_times_months() {
        let quote = calculate_installment(Decimal::new(15_000_050, 2), Decimal::new(425, 2), 15).unwrap();
        assert_eq!(quote.total_repayment, quote.monthly_payment * Decimal::from(180));
        assert!(quote.total_repayment > Decimal::new(15_000_050, 2));
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let quote = calculate_installment(Decimal::from(120_000), Decimal::ZERO, 10).unwrap();
        assert_eq!(quote.monthly_payment, Decimal::from(1000));
        assert_eq!(quote.total_repayment, Decimal::from(120_000));
    }

    #[test]
    fn test_rate_below_precision_is_linear() {
        let quote = calculate_installment(Decimal::from(100_000), Decimal::new(1, 27), 20).unwrap();
        assert_eq!(quote.monthly_payment, Decimal::from(100_000) / Decimal::from(240));
        assert_eq!(quote.total_repayment.round_dp(2), Decimal::from(100_000));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let result = calculate_installment(Decimal::from(100_000), Decimal::new(-1, 0), 20);
        assert_eq!(result.unwrap_err().error_type, ErrorType::Validation);
    }

    #[test]
    fn test_non_positive_term_is_rejected() {
        assert!(calculate_installment(Decimal::from(100_000), Decimal::new(35, 1), 0).is_err());
        assert!(calculate_installment(Decimal::from(100_000), Decimal::new(35, 1), -5).is_err());
    }

    #[test]
    fn test_non_positive_principal_is_rejected() {
        assert!(calculate_installment(Decimal::ZERO, Decimal::new(35, 1), 20).is_err());
        assert!(calculate_installment(Decimal::from(-10), Decimal::new(35, 1), 20).is_err());
    }

    #[test]
    fn test_overflowing_term_is_rejected() {
        let result = calculate_installment(Decimal::from(100_000), Decimal::from(50), i32::MAX);
        assert_eq!(result.unwrap_err().error_type, ErrorType::Validation);
    }
}
