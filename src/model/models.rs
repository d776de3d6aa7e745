use actix_web::web;
use rust_decimal::Decimal;

use crate::{
    api::rest::{CustomerAddUpdateRequest, MortgageAddRequest},
    dao::customers::QueryCustomerDbResp,
    model::{
        apperror::{ApplicationError, ErrorType},
        dni::{is_valid_dni, normalize_dni},
    },
};

/**
 * Maximum length of the free text columns of `clientes`.
 */
const MAX_TEXT_LENGTH: usize = 100;

/**
 * Input for adding or updating a customer.
 */
#[derive(Debug, Clone)]
pub struct CustomerAddUpdateInputType {
    pub name: String,
    pub dni: String,
    pub email: String,
    pub requested_capital: Decimal,
}

impl CustomerAddUpdateInputType {
    /**
     * Validates the customer input.
     *
     * # Returns
     * The input with its DNI normalized if valid, otherwise a validation `ApplicationError`.
     */
    pub fn validate(mut self) -> Result<Self, ApplicationError> {
        if !is_valid_dni(&self.dni) {
            return Err(ApplicationError::new(ErrorType::Validation, "DNI inválido".to_string()));
        }
        self.dni = normalize_dni(&self.dni);
        if self.name.chars().count() > MAX_TEXT_LENGTH {
            return Err(ApplicationError::new(ErrorType::Validation, format!("nombre must be at most {MAX_TEXT_LENGTH} characters")));
        }
        if self.email.chars().count() > MAX_TEXT_LENGTH {
            return Err(ApplicationError::new(ErrorType::Validation, format!("email must be at most {MAX_TEXT_LENGTH} characters")));
        }
        if self.requested_capital <= Decimal::ZERO {
            return Err(ApplicationError::new(ErrorType::Validation, "capital_solicitado must be positive".to_string()));
        }
        Ok(self)
    }
}

impl From<web::Json<CustomerAddUpdateRequest>> for CustomerAddUpdateInputType {
    fn from(request: web::Json<CustomerAddUpdateRequest>) -> Self {
        let request = request.into_inner();
        CustomerAddUpdateInputType { name: request.name, dni: request.dni, email: request.email, requested_capital: request.requested_capital }
    }
}

/**
 * A stored customer.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetailType {
    pub id: i64,
    pub name: String,
    pub dni: String,
    pub email: String,
    pub requested_capital: Decimal,
}

impl CustomerDetailType {
    pub fn new(id: i64, name: String, dni: String, email: String, requested_capital: Decimal) -> Self {
        CustomerDetailType { id, name, dni, email, requested_capital }
    }
}

impl From<QueryCustomerDbResp> for CustomerDetailType {
    fn from(row: QueryCustomerDbResp) -> Self {
        CustomerDetailType::new(row.0, row.1, row.2, row.3, row.4)
    }
}

/**
 * Input for adding a mortgage to an existing customer.
 */
#[derive(Debug, Clone)]
pub struct MortgageAddInputType {
    /**
     * DNI of the customer owning the mortgage.
     */
    pub dni: String,
    /**
     * Annual nominal rate as a percentage.
     */
    pub tae: Decimal,
    /**
     * Term in years.
     */
    pub term: i32,
}

impl MortgageAddInputType {
    /**
     * Validates the mortgage input. Rate and term are checked again by the calculator.
     *
     * # Returns
     * The input with its DNI normalized if valid, otherwise a validation `ApplicationError`.
     */
    pub fn validate(mut self) -> Result<Self, ApplicationError> {
        if !is_valid_dni(&self.dni) {
            return Err(ApplicationError::new(ErrorType::Validation, "DNI inválido".to_string()));
        }
        self.dni = normalize_dni(&self.dni);
        if self.tae < Decimal::ZERO {
            return Err(ApplicationError::new(ErrorType::Validation, "tae must not be negative".to_string()));
        }
        if self.term <= 0 {
            return Err(ApplicationError::new(ErrorType::Validation, "plazo must be positive".to_string()));
        }
        Ok(self)
    }
}

impl From<web::Json<MortgageAddRequest>> for MortgageAddInputType {
    fn from(request: web::Json<MortgageAddRequest>) -> Self {
        let request = request.into_inner();
        MortgageAddInputType { dni: request.dni, tae: request.tae, term: request.term }
    }
}

/**
 * Result of the mortgage calculation.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct MortgageQuoteType {
    pub monthly_payment: Decimal,
    pub total_repayment: Decimal,
}

impl MortgageQuoteType {
    pub fn new(monthly_payment: Decimal, total_repayment: Decimal) -> Self {
        MortgageQuoteType { monthly_payment, total_repayment }
    }
}
