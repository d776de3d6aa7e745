use crate::service::customers::CustomerService;

/**
* Represents the application state shared across the Actix web application.
*/
pub struct AppState {
    /**
     * The customer service for handling customer and mortgage operations.
     */
    pub customer_service: CustomerService,
}

/**
 * Creates a new instance of `AppState`.
 *
 * # Arguments
 * `customer_service`: The customer service for handling customer and mortgage operations.
 */
impl AppState {
    pub fn new(customer_service: CustomerService) -> Self {
        AppState { customer_service }
    }
}
