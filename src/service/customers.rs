use sqlx::{Pool, Postgres};

use crate::{
    dao::customers::CustomerDao,
    model::{
        amortization::calculate_installment,
        apperror::{ApplicationError, ErrorType},
        models::{CustomerAddUpdateInputType, CustomerDetailType, MortgageAddInputType, MortgageQuoteType},
    },
};

/**
 * Represents the service for managing customers and their mortgages.
 */
pub struct CustomerService {
    /**
     * The DAO for customer and mortgage operations.
     */
    customer_dao: CustomerDao,
    /**
     * Optional connection pool for database operations. Optional for test purposes until we have a better way to mock the database.
     */
    connection_pool: Option<Pool<Postgres>>,
}

impl CustomerService {
    /**
     * Creates a new instance of `CustomerService`.
     *
     * # Arguments
     * `customer_dao`: The DAO for customer operations.
     * `connection_pool`: Optional connection pool for database operations.
     *
     * # Returns
     * A new instance of `CustomerService`.
     */
    pub fn new(customer_dao: CustomerDao, connection_pool: Option<Pool<Postgres>>) -> Self {
        CustomerService { customer_dao, connection_pool }
    }

    /**
     * Retrieves a customer by DNI.
     *
     * # Arguments
     * `dni`: The DNI of the customer.
     *
     * # Returns
     * A Result containing `CustomerDetailType` or an `ApplicationError`.
     */
    pub async fn get_customer(&self, dni: &str) -> Result<CustomerDetailType, ApplicationError> {
        let connection_pool = self.connection_pool()?;
        let mut connection = connection_pool.acquire().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to acquire connection: {err}")))?;
        self.customer_dao.get_customer(&mut connection, dni).await
    }

    /**
     * Adds a new customer.
     *
     * # Arguments
     * `customer_add_input`: The validated customer input.
     *
     * # Returns
     * A Result containing the stored customer or an `ApplicationError`.
     */
    pub async fn add_customer(&self, customer_add_input: CustomerAddUpdateInputType) -> Result<CustomerDetailType, ApplicationError> {
        let connection_pool = self.connection_pool()?;
        let mut transaction = connection_pool.begin().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))?;
        match self.customer_dao.add_customer(&mut transaction, customer_add_input).await {
            Ok(customer) => {
                transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))?;
                Ok(customer)
            }
            Err(err) => {
                transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
                Err(err)
            }
        }
    }

    /**
     * Updates name, email and requested capital of a customer. The DNI never changes.
     *
     * # Arguments
     * `dni`: The DNI of the customer to update.
     * `customer_update_input`: The validated customer input.
     *
     * # Returns
     * A Result containing the updated customer or an `ApplicationError`.
     */
    pub async fn update_customer(&self, dni: &str, customer_update_input: CustomerAddUpdateInputType) -> Result<CustomerDetailType, ApplicationError> {
        let connection_pool = self.connection_pool()?;
        let mut transaction = connection_pool.begin().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))?;
        match self.customer_dao.update_customer(&mut transaction, dni, customer_update_input).await {
            Ok(customer) => {
                transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))?;
                Ok(customer)
            }
            Err(err) => {
                transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
                Err(err)
            }
        }
    }

    /**
     * Deletes a customer by DNI.
     *
     * # Arguments
     * `dni`: The DNI of the customer to delete.
     *
     * # Returns
     * A Result indicating success or an `ApplicationError`.
     */
    pub async fn delete_customer(&self, dni: &str) -> Result<(), ApplicationError> {
        let connection_pool = self.connection_pool()?;
        let mut transaction = connection_pool.begin().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))?;
        match self.customer_dao.delete_customer(&mut transaction, dni).await {
            Ok(()) => transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))?,
            Err(err) => {
                transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
                return Err(err);
            }
        }
        Ok(())
    }

    /**
     * Calculates and stores a mortgage for an existing customer, using the customer's requested capital.
     *
     * # Arguments
     * `mortgage_add_input`: The validated mortgage input.
     *
     * # Returns
     * A Result containing the calculated `MortgageQuoteType` or an `ApplicationError`.
     */
    pub async fn add_mortgage(&self, mortgage_add_input: MortgageAddInputType) -> Result<MortgageQuoteType, ApplicationError> {
        let connection_pool = self.connection_pool()?;
        let mut transaction = connection_pool.begin().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))?;
        match self.quote_and_store_mortgage(&mut transaction, mortgage_add_input).await {
            Ok(quote) => {
                transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))?;
                Ok(quote)
            }
            Err(err) => {
                transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
                Err(err)
            }
        }
    }

    async fn quote_and_store_mortgage(&self, transaction: &mut sqlx::PgConnection, mortgage_add_input: MortgageAddInputType) -> Result<MortgageQuoteType, ApplicationError> {
        let customer = self.customer_dao.get_customer(&mut *transaction, &mortgage_add_input.dni).await?;
        let quote = calculate_installment(customer.requested_capital, mortgage_add_input.tae, mortgage_add_input.term)?;
        let mortgage_id = self.customer_dao.add_mortgage(transaction, customer.id, mortgage_add_input.tae, mortgage_add_input.term, &quote).await?;
        tracing::debug!("Stored mortgage {} for customer {}", mortgage_id, customer.id);
        Ok(quote)
    }

    fn connection_pool(&self) -> Result<&Pool<Postgres>, ApplicationError> {
        self.connection_pool.as_ref().ok_or_else(|| ApplicationError::new(ErrorType::DatabaseError, "No database connection available".to_string()))
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::*;

    fn service_without_database() -> CustomerService {
        CustomerService::new(CustomerDao::new(), None)
    }

    #[actix_web::test]
    async fn test_get_customer_without_database() {
        let result = service_without_database().get_customer("12345678Z").await;
        let err = result.unwrap_err();
        assert_eq!(err.error_type, ErrorType::DatabaseError);
        assert_eq!(err.message, "No database connection available");
    }

    #[actix_web::test]
    async fn test_add_mortgage_without_database() {
        let input = MortgageAddInputType { dni: "12345678Z".to_string(), tae: Decimal::new(35, 1), term: 20 };
        let result = service_without_database().add_mortgage(input).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::DatabaseError);
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    use super::*;

    #[sqlx::test]
    async fn test_add_mortgage_for_missing_customer() {
        let service = CustomerService::new(CustomerDao::new(), Some(init_db().await));
        let input = MortgageAddInputType { dni: "99999999R".to_string(), tae: Decimal::new(35, 1), term: 20 };
        let result = service.add_mortgage(input).await;
        assert_eq!(result.unwrap_err().error_type, ErrorType::NotFound);
    }

    #[sqlx::test]
    async fn test_customer_lifecycle_with_mortgage() {
        let service = CustomerService::new(CustomerDao::new(), Some(init_db().await));
        let input = CustomerAddUpdateInputType { name: "Lifecycle".to_string(), dni: "00000004G".to_string(), email: "life@example.com".to_string(), requested_capital: Decimal::from(100_000) };
        let added = service.add_customer(input).await.unwrap();
        let quote = service.add_mortgage(MortgageAddInputType { dni: "00000004G".to_string(), tae: Decimal::new(35, 1), term: 20 }).await.unwrap();
        assert_eq!(quote.monthly_payment.round_dp(2), Decimal::new(57996, 2));
        assert_eq!(service.get_customer("00000004G").await.unwrap(), added);
        // Clean up, the mortgage references the customer.
        let pool = init_db().await;
        sqlx::query("DELETE FROM hipotecas WHERE cliente_id = $1").bind(added.id).execute(&pool).await.unwrap();
        service.delete_customer("00000004G").await.unwrap();
        assert_eq!(service.get_customer("00000004G").await.unwrap_err().error_type, ErrorType::NotFound);
    }

    /**
     * Initialize the database connection pool.
     */
    async fn init_db() -> PgPool {
        dotenv::from_filename("./sqlx-postgresql-migration/.env-test").ok();
        let pool = PgPool::connect(dotenv::var("DATABASE_URL").unwrap().as_str()).await.unwrap();
        sqlx::migrate!("./sqlx-postgresql-migration/migrations").run(&pool).await.unwrap();
        pool
    }
}
