use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    endpoints,
    rest::{CustomerAddUpdateRequest, CustomerDeleteResponse, CustomerResponse, ErrorResponse, MortgageAddRequest, MortgageQuoteResponse},
};

/**
 * Path of the generated OpenAPI document.
 */
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/**
 * OpenAPI document for the customer and mortgage endpoints.
 */
#[derive(OpenApi)]
#[openapi(
    info(
        title = "API de Hipotecas y Clientes",
        description = "API para gestionar clientes y simular hipotecas.",
        version = "1.0.0"
    ),
    paths(endpoints::customer_add, endpoints::customer_get, endpoints::customer_update, endpoints::customer_delete, endpoints::mortgage_add),
    components(schemas(CustomerAddUpdateRequest, CustomerResponse, CustomerDeleteResponse, MortgageAddRequest, MortgageQuoteResponse, ErrorResponse)),
    tags(
        (name = "clientes", description = "Customer management"),
        (name = "hipotecas", description = "Mortgage simulation")
    )
)]
pub struct ApiDoc;

/**
 * Swagger UI served under `/docs`, backed by the generated document.
 */
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs/{_:.*}").url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_document_info() {
        let document = ApiDoc::openapi();
        assert_eq!(document.info.title, "API de Hipotecas y Clientes");
        assert_eq!(document.info.version, "1.0.0");
    }

    #[test]
    fn test_document_schemas() {
        let document = ApiDoc::openapi();
        let schemas = document.components.expect("components").schemas;
        for name in ["CustomerAddUpdateRequest", "CustomerResponse", "CustomerDeleteResponse", "MortgageAddRequest", "MortgageQuoteResponse", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "{name}");
        }
    }
}
