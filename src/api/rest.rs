use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{CustomerDetailType, MortgageQuoteType},
};

/***************** Customer models *********************/

/**
 * Request structure for adding or updating a customer.
 *
 * On update the `dni` must be valid but the DNI in the path is the one kept.
 */
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerAddUpdateRequest {
    #[serde(rename = "nombre")]
    pub name: String,
    #[schema(example = "12345678Z")]
    pub dni: String,
    pub email: String,
    #[serde(rename = "capital_solicitado")]
    #[schema(example = 150000.0)]
    pub requested_capital: Decimal,
}

/**
 * Response structure for a customer.
 */
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    /**
     * Identifier assigned by the database.
     */
    id: i64,
    /**
     * Full name of the customer.
     */
    #[serde(rename = "nombre")]
    name: String,
    /**
     * National identity document number.
     */
    dni: String,
    /**
     * Email address.
     */
    email: String,
    /**
     * Capital the customer asks to borrow.
     */
    #[serde(rename = "capital_solicitado", with = "rust_decimal::serde::float")]
    requested_capital: Decimal,
}

impl From<CustomerDetailType> for CustomerResponse {
    fn from(customer: CustomerDetailType) -> Self {
        CustomerResponse { id: customer.id, name: customer.name, dni: customer.dni, email: customer.email, requested_capital: customer.requested_capital }
    }
}

/**
 * Response structure for a deleted customer.
 */
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDeleteResponse {
    message: String,
}

impl Default for CustomerDeleteResponse {
    fn default() -> Self {
        CustomerDeleteResponse { message: "Cliente eliminado exitosamente".to_string() }
    }
}

/***************** Mortgage models *********************/

/**
 * Request structure for adding a mortgage to an existing customer.
 */
#[derive(Debug, Deserialize, ToSchema)]
pub struct MortgageAddRequest {
    /**
     * DNI of the customer.
     */
    pub dni: String,
    /**
     * Annual nominal rate as a percentage.
     */
    pub tae: Decimal,
    /**
     * Term in years.
     */
    #[serde(rename = "plazo")]
    pub term: i32,
}

/**
 * Response structure for an added mortgage.
 */
#[derive(Debug, Serialize, ToSchema)]
pub struct MortgageQuoteResponse {
    #[serde(rename = "cuota_mensual", with = "rust_decimal::serde::float")]
    monthly_payment: Decimal,
    #[serde(rename = "total_a_devolver", with = "rust_decimal::serde::float")]
    total_repayment: Decimal,
}

impl From<MortgageQuoteType> for MortgageQuoteResponse {
    fn from(quote: MortgageQuoteType) -> Self {
        MortgageQuoteResponse { monthly_payment: quote.monthly_payment, total_repayment: quote.total_repayment }
    }
}

/***************** Error models *********************/

/**
 * Custom error response for the application.
 */
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /**
     * The error code associated with the error type.
     */
    pub code: u16,
    /**
     * A human-readable message describing the error.
     */
    pub message: String,
}

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        get_statuscode(&self.error_type)
    }

    /**
     * Generates an error response for the application error.
     */
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse { code: get_error_code(&self.error_type), message: self.message.clone() };
        HttpResponse::build(get_statuscode(&self.error_type)).json(&error_response)
    }
}

/**
* Maps application errors to HTTP status codes.
*
* # Arguments
* `application_error`: The type of error that occurred.
*
* # Returns
* The corresponding HTTP status code.
*/
fn get_statuscode(application_error: &ErrorType) -> StatusCode {
    match application_error {
        ErrorType::Initialization | ErrorType::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorType::Validation => StatusCode::BAD_REQUEST,
        ErrorType::NotFound => StatusCode::NOT_FOUND,
    }
}

/**
 * Maps application errors to error codes.
 *
 * # Arguments
 * `application_error`: The type of error that occurred.
 *
 * # Returns
 * The corresponding error code.
 */
fn get_error_code(application_error: &ErrorType) -> u16 {
    match application_error {
        ErrorType::Initialization => 1001,
        ErrorType::Validation => 1002,
        ErrorType::DatabaseError => 1003,
        ErrorType::NotFound => 1004,
    }
}
