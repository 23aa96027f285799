use actix_web::{get, http::header::AUTHORIZATION, post, web, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{
    app_state::AppState,
    auth::{Claims, JwtService},
    errors::{AppError, AppResult},
    graphql::Schema,
};

/// Claims from an `Authorization: Bearer` header. No header means an
/// anonymous request; a header that is present but unusable is rejected.
pub fn bearer_claims(req: &HttpRequest, jwt_service: &JwtService) -> AppResult<Option<Claims>> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

    jwt_service.validate_token(token.trim()).map(Some)
}

#[post("/graphql")]
async fn graphql(
    schema: web::Data<Schema>,
    state: web::Data<AppState>,
    http_request: HttpRequest,
    request: GraphQLRequest,
) -> Result<GraphQLResponse, AppError> {
    let mut request = request.into_inner();

    if let Some(claims) = bearer_claims(&http_request, &state.jwt_service)? {
        log::debug!("GraphQL request from {} ({:?})", claims.sub, claims.role);
        request = request.data(claims);
    }

    Ok(schema.execute(request).await.into())
}

#[get("/graphiql")]
async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::UserRole,
        graphql::create_schema,
        test_utils::fixtures::{test_state, untouched_repositories},
    };
    use actix_web::{http::StatusCode, test, App};

    async fn app_parts() -> (AppState, Schema) {
        let state = test_state(untouched_repositories()).await;
        let schema = create_schema(state.clone());
        (state, schema)
    }

    #[actix_web::test]
    async fn test_invalid_token_is_rejected_before_execution() {
        let (state, schema) = app_parts().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(schema))
                .service(graphql),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .insert_header((AUTHORIZATION, "Bearer not-a-jwt"))
            .set_json(serde_json::json!({ "query": "{ myAttempts { items { id } } }" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_anonymous_request_gets_unauthorized_code() {
        let (state, schema) = app_parts().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(schema))
                .service(graphql),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .set_json(serde_json::json!({ "query": "{ myAttempts { items { id } } }" }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHORIZED");
        assert_eq!(body["errors"][0]["extensions"]["retryable"], false);
    }

    #[actix_web::test]
    async fn test_learner_cannot_read_grading_queue() {
        let (state, schema) = app_parts().await;
        let token = state
            .jwt_service
            .create_token("learner-1", UserRole::Learner)
            .expect("token should be created");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(schema))
                .service(graphql),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "query": "{ gradingQueue { items { id } } }" }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["errors"][0]["extensions"]["code"], "FORBIDDEN");
    }

    #[actix_web::test]
    async fn test_band_preview_for_grader() {
        let (state, schema) = app_parts().await;
        let token = state
            .jwt_service
            .create_token("grader-1", UserRole::Grader)
            .expect("token should be created");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(schema))
                .service(graphql),
        )
        .await;

        let query = "{ bandPreview(scores: { taskResponse: 6.5, lexicalResources: 7.0, \
                     grammarRangeAndAccuracy: 6.5, coherenceAndCohesion: 7.0 }) { band display } }";
        let req = test::TestRequest::post()
            .uri("/graphql")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "query": query }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["bandPreview"]["band"], 7.0);
        assert_eq!(body["data"]["bandPreview"]["display"], "7");
    }

    #[actix_web::test]
    async fn test_graphiql_page() {
        let app = test::init_service(App::new().service(graphiql)).await;

        let req = test::TestRequest::get().uri("/graphiql").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }
}
