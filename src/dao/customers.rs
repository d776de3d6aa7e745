use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{Instrument, instrument};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{CustomerAddUpdateInputType, CustomerDetailType, MortgageQuoteType},
};

/**
 * Database response type for querying a customer.
 */
pub type QueryCustomerDbResp = (i64, String, String, String, Decimal);

/**
 * SQL query to retrieve a customer by DNI.
 */
const QUERY_CUSTOMER: &str = "SELECT id, nombre, dni, email, capital_solicitado FROM clientes WHERE dni = $1";

/**
 * SQL query to add a new customer.
 */
const ADD_CUSTOMER: &str = "INSERT INTO clientes (nombre, dni, email, capital_solicitado) VALUES ($1, $2, $3, $4) RETURNING id, nombre, dni, email, capital_solicitado";

/**
 * SQL query to update a customer. The DNI is the lookup key and never changes.
 */
const UPDATE_CUSTOMER: &str = "UPDATE clientes SET nombre = $1, email = $2, capital_solicitado = $3 WHERE dni = $4 RETURNING id, nombre, dni, email, capital_solicitado";

/**
 * SQL query to delete a customer.
 */
const DELETE_CUSTOMER: &str = "DELETE FROM clientes WHERE dni = $1";

/**
 * SQL query to add a mortgage.
 */
const ADD_MORTGAGE: &str = "INSERT INTO hipotecas (tae, plazo, cuota_mensual, total_a_devolver, cliente_id) VALUES ($1, $2, $3, $4, $5) RETURNING id";

/**
 * DAO for customer and mortgage database operations.
 */
pub struct CustomerDao {}

impl CustomerDao {
    /**
     * Creates a new instance of `CustomerDao`.
     *
     * # Returns
     * A new instance of `CustomerDao`.
     */
    pub fn new() -> Self {
        CustomerDao {}
    }

    /**
     * Retrieves a customer by DNI.
     *
     * # Arguments
     * `connection`: The database connection.
     * `dni`: The DNI of the customer.
     *
     * # Returns
     * A Result containing the `CustomerDetailType`, or a `NotFound` `ApplicationError` if no customer has the DNI.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_customer(&self, connection: &mut PgConnection, dni: &str) -> Result<CustomerDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<QueryCustomerDbResp> = sqlx::query_as(QUERY_CUSTOMER)
            .bind(dni)
            .fetch_optional(connection)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        let Some(row) = result else {
            tracing::debug!("Customer with DNI {} not found", dni);
            return Err(customer_not_found());
        };
        Ok(CustomerDetailType::from(row))
    }

    /**
     * Adds a new customer to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `customer_add_input`: The validated customer input.
     *
     * # Returns
     * A Result containing the stored customer including its generated id.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_customer(&self, transaction: &mut PgConnection, customer_add_input: CustomerAddUpdateInputType) -> Result<CustomerDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let row: QueryCustomerDbResp = sqlx::query_as(ADD_CUSTOMER)
            .bind(customer_add_input.name)
            .bind(customer_add_input.dni)
            .bind(customer_add_input.email)
            .bind(customer_add_input.requested_capital)
            .fetch_one(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        Ok(CustomerDetailType::from(row))
    }

    /**
     * Updates name, email and requested capital of the customer with the given DNI.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `dni`: The DNI of the customer to update.
     * `customer_update_input`: The validated customer input. Its DNI is ignored.
     *
     * # Returns
     * A Result containing the updated customer, or a `NotFound` `ApplicationError`.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn update_customer(&self, transaction: &mut PgConnection, dni: &str, customer_update_input: CustomerAddUpdateInputType) -> Result<CustomerDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<QueryCustomerDbResp> = sqlx::query_as(UPDATE_CUSTOMER)
            .bind(customer_update_input.name)
            .bind(customer_update_input.email)
            .bind(customer_update_input.requested_capital)
            .bind(dni)
            .fetch_optional(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        let Some(row) = result else {
            tracing::debug!("Customer with DNI {} not found for update", dni);
            return Err(customer_not_found());
        };
        Ok(CustomerDetailType::from(row))
    }

    /**
     * Deletes a customer by DNI.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `dni`: The DNI of the customer to delete.
     *
     * # Returns
     * A result indicating success or failure of the operation.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn delete_customer(&self, transaction: &mut PgConnection, dni: &str) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(DELETE_CUSTOMER)
            .bind(dni)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Customer with DNI {} not found for deletion", dni);
            return Err(customer_not_found());
        }
        Ok(())
    }

    /**
     * Adds a mortgage for a customer.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `customer_id`: The id of the owning customer.
     * `tae`: Annual nominal rate as a percentage.
     * `term`: Term in years.
     * `quote`: The calculated installment and total repayment.
     *
     * # Returns
     * A Result containing the id of the new mortgage.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_mortgage(&self, transaction: &mut PgConnection, customer_id: i64, tae: Decimal, term: i32, quote: &MortgageQuoteType) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let mortgage_id: (i64,) = sqlx::query_as(ADD_MORTGAGE)
            .bind(tae)
            .bind(term)
            .bind(quote.monthly_payment)
            .bind(quote.total_repayment)
            .bind(customer_id)
            .fetch_one(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        Ok(mortgage_id.0)
    }

    /**
     * Handles database errors and maps them to application errors.
     * Store errors are server errors, the message names the violated constraint where known.
     *
     * # Arguments
     * `error`: The error returned by sqlx.
     *
     * # Returns
     * An `ApplicationError` corresponding to the database error.
     */
    fn handle_database_error(error: &sqlx::Error) -> ApplicationError {
        let Some(db_error) = error.as_database_error() else {
            tracing::error!("Failed to execute database operation: {}", error);
            return ApplicationError::new(ErrorType::DatabaseError, "Failed to execute database operation".to_string());
        };
        tracing::info!("Database error code: {:?}", db_error.code());
        let message = match db_error.code().as_deref() {
            // Unique violation
            Some("23505") => "Customer with this DNI already exists",
            // Foreign key violation
            Some("23503") => "Customer is referenced by existing mortgages",
            // Value too long
            Some("22001") => "Value too long",
            _ => "Unhandled database error",
        };
        tracing::error!("Database error: {}", db_error);
        ApplicationError::new(ErrorType::DatabaseError, message.to_string())
    }
}

fn customer_not_found() -> ApplicationError {
    ApplicationError::new(ErrorType::NotFound, "Cliente no encontrado".to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handle_non_database_error() {
        let error = CustomerDao::handle_database_error(&sqlx::Error::PoolTimedOut);
        assert_eq!(error.error_type, ErrorType::DatabaseError);
        assert_eq!(error.message, "Failed to execute database operation");
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let error = CustomerDao::handle_database_error(&sqlx::Error::RowNotFound);
        assert_eq!(error.error_type, ErrorType::DatabaseError);
    }

    #[test]
    fn test_customer_not_found() {
        let error = customer_not_found();
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Cliente no encontrado");
    }
}
