use actix_web::{
    HttpRequest, HttpResponse, delete, get, post, put,
    web::{self, Path},
};
use tracing::{Instrument, instrument};

use crate::{
    api::{
        rest::{CustomerAddUpdateRequest, CustomerDeleteResponse, CustomerResponse, ErrorResponse, MortgageAddRequest, MortgageQuoteResponse},
        state::AppState,
    },
    model::{
        apperror::{ApplicationError, ErrorType},
        dni::normalize_dni,
        models::{CustomerAddUpdateInputType, MortgageAddInputType},
    },
};

/**
 * Endpoint to add a new customer.
 */
#[utoipa::path(
    post,
    path = "/clientes",
    tag = "clientes",
    summary = "Crear Cliente",
    description = "Crea un nuevo cliente con los datos proporcionados.",
    request_body = CustomerAddUpdateRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid DNI or body", body = ErrorResponse),
        (status = 500, description = "Database error, e.g. duplicate DNI", body = ErrorResponse)
    )
)]
#[instrument(skip(http_request, app_state), fields(service = "addCustomer", trace_id = get_trace_id(&http_request), result))]
#[post("/clientes")]
pub async fn customer_add(http_request: HttpRequest, request_body: web::Json<CustomerAddUpdateRequest>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let customer_add_input = CustomerAddUpdateInputType::from(request_body).validate()?;
    let customer = app_state.customer_service.add_customer(customer_add_input).instrument(span).await?;
    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}

/**
 * Endpoint to retrieve a customer by DNI.
 */
#[utoipa::path(
    get,
    path = "/clientes/{dni}",
    tag = "clientes",
    summary = "Obtener Cliente",
    description = "Obtén los detalles de un cliente utilizando su DNI.",
    params(("dni" = String, Path, description = "DNI of the customer")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(http_request, app_state), fields(service = "getCustomer", trace_id = get_trace_id(&http_request), result))]
#[get("/clientes/{dni}")]
pub async fn customer_get(path: Path<String>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let dni = normalize_dni(&path.into_inner());
    let customer = app_state.customer_service.get_customer(&dni).instrument(span).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

/**
 * Endpoint to update a customer. The DNI in the path is kept.
 */
#[utoipa::path(
    put,
    path = "/clientes/{dni}",
    tag = "clientes",
    summary = "Actualizar Cliente",
    description = "Actualiza los datos de un cliente existente utilizando su DNI.",
    params(("dni" = String, Path, description = "DNI of the customer")),
    request_body = CustomerAddUpdateRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(http_request, app_state), fields(service = "updateCustomer", trace_id = get_trace_id(&http_request), result))]
#[put("/clientes/{dni}")]
pub async fn customer_update(path: Path<String>, http_request: HttpRequest, request_body: web::Json<CustomerAddUpdateRequest>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let dni = normalize_dni(&path.into_inner());
    let customer_update_input = CustomerAddUpdateInputType::from(request_body).validate()?;
    let customer = app_state.customer_service.update_customer(&dni, customer_update_input).instrument(span).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

/**
 * Endpoint to delete a customer.
 */
#[utoipa::path(
    delete,
    path = "/clientes/{dni}",
    tag = "clientes",
    summary = "Eliminar Cliente",
    description = "Elimina un cliente existente utilizando su DNI.",
    params(("dni" = String, Path, description = "DNI of the customer")),
    responses(
        (status = 200, description = "Customer deleted", body = CustomerDeleteResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Database error, e.g. customer has mortgages", body = ErrorResponse)
    )
)]
#[instrument(skip(http_request, app_state), fields(service = "deleteCustomer", trace_id = get_trace_id(&http_request), result))]
#[delete("/clientes/{dni}")]
pub async fn customer_delete(path: Path<String>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let dni = normalize_dni(&path.into_inner());
    app_state.customer_service.delete_customer(&dni).instrument(span).await?;
    Ok(HttpResponse::Ok().json(CustomerDeleteResponse::default()))
}

/**
 * Endpoint to add a mortgage for an existing customer.
 */
#[utoipa::path(
    post,
    path = "/hipotecas",
    tag = "hipotecas",
    summary = "Crear Hipoteca",
    description = "Crea una hipoteca para un cliente existente.",
    request_body = MortgageAddRequest,
    responses(
        (status = 201, description = "Mortgage created", body = MortgageQuoteResponse),
        (status = 400, description = "Invalid DNI, rate or term", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
#[instrument(skip(http_request, app_state), fields(service = "addMortgage", trace_id = get_trace_id(&http_request), result))]
#[post("/hipotecas")]
pub async fn mortgage_add(http_request: HttpRequest, request_body: web::Json<MortgageAddRequest>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let mortgage_add_input = MortgageAddInputType::from(request_body).validate()?;
    let quote = app_state.customer_service.add_mortgage(mortgage_add_input).instrument(span).await?;
    Ok(HttpResponse::Created().json(MortgageQuoteResponse::from(quote)))
}

/**
 * JSON extractor configuration. Body errors use the same error format as the rest of the API.
 */
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _http_request| {
        tracing::debug!("Invalid request body: {}", err);
        ApplicationError::new(ErrorType::Validation, format!("Invalid request body: {err}")).into()
    })
}

/**
 * Retrieves the trace ID from the HTTP request headers.
 * If the trace ID is not present, a new UUID is generated.
 */
fn get_trace_id(http_request: &HttpRequest) -> String {
    http_request.headers().get("X-Trace-ID")
        .and_then(|v| v.to_str().ok().map(std::string::ToString::to_string))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod test {
    use actix_web::{App, http::StatusCode, test, test::TestRequest};
    use serde_json::json;

    use super::*;
    use crate::{api::openapi::{OPENAPI_JSON_PATH, swagger_ui}, dao::customers::CustomerDao, service::customers::CustomerService};

    #[actix_web::test]
    async fn test_get_trace_id_exists() {
        let request = TestRequest::default()
            .insert_header(("X-Trace-ID", "test"))
            .to_http_request();
        let trace_id = get_trace_id(&request);
        assert_eq!(trace_id, "test");
    }

    #[actix_web::test]
    async fn test_get_trace_id_not_exists() {
        let request = TestRequest::default()
            .to_http_request();
        let trace_id = get_trace_id(&request);
        assert!(uuid::Uuid::parse_str(&trace_id).is_ok());
    }

    /**
     * Sends a request to an app without database and returns status and body.
     */
    async fn call(request: TestRequest) -> (StatusCode, serde_json::Value) {
        let state = web::Data::new(AppState::new(CustomerService::new(CustomerDao::new(), None)));
        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(json_config())
                .service(customer_add)
                .service(customer_get)
                .service(customer_update)
                .service(customer_delete)
                .service(mortgage_add)
                .service(swagger_ui()),
        )
        .await;
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body: serde_json::Value = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_add_customer_invalid_dni() {
        let body = json!({"nombre": "Ana", "dni": "12345678A", "email": "ana@example.com", "capital_solicitado": 100000});
        let (status, body) = call(TestRequest::post().uri("/clientes").set_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1002);
        assert_eq!(body["message"], "DNI inválido");
    }

    #[actix_web::test]
    async fn test_add_customer_malformed_body() {
        let body = json!({"nombre": "Ana", "dni": "12345678Z"});
        let (status, body) = call(TestRequest::post().uri("/clientes").set_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1002);
    }

    #[actix_web::test]
    async fn test_add_customer_valid_reaches_database() {
        let body = json!({"nombre": "Ana", "dni": "12345678Z", "email": "ana@example.com", "capital_solicitado": 100000});
        let (status, body) = call(TestRequest::post().uri("/clientes").set_json(body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 1003);
    }

    #[actix_web::test]
    async fn test_update_customer_invalid_body_dni() {
        let body = json!({"nombre": "Ana", "dni": "1234", "email": "ana@example.com", "capital_solicitado": 100000});
        let (status, _) = call(TestRequest::put().uri("/clientes/12345678Z").set_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_and_delete_customer_without_database() {
        let (status, _) = call(TestRequest::get().uri("/clientes/12345678Z")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let (status, _) = call(TestRequest::delete().uri("/clientes/12345678Z")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_lowercase_path_dni_is_accepted() {
        let (status, body) = call(TestRequest::get().uri("/clientes/12345678z")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 1003);
        let (status, _) = call(TestRequest::delete().uri("/clientes/12345678z")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_openapi_document_lists_all_paths() {
        let (status, body) = call(TestRequest::get().uri(OPENAPI_JSON_PATH)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "API de Hipotecas y Clientes");
        let paths = &body["paths"];
        assert!(paths["/clientes"]["post"].is_object());
        assert!(paths["/clientes/{dni}"]["get"].is_object());
        assert!(paths["/clientes/{dni}"]["put"].is_object());
        assert!(paths["/clientes/{dni}"]["delete"].is_object());
        assert!(paths["/hipotecas"]["post"].is_object());
        assert_eq!(paths["/hipotecas"]["post"]["summary"], "Crear Hipoteca");
    }

    #[actix_web::test]
    async fn test_add_mortgage_invalid_input() {
        let (status, body) = call(TestRequest::post().uri("/hipotecas").set_json(json!({"dni": "12345678A", "tae": 3.5, "plazo": 20}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "DNI inválido");
        let (status, body) = call(TestRequest::post().uri("/hipotecas").set_json(json!({"dni": "12345678Z", "tae": 3.5, "plazo": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "plazo must be positive");
        let (status, _) = call(TestRequest::post().uri("/hipotecas").set_json(json!({"dni": "12345678Z", "tae": -1, "plazo": 20}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
