//! OpenAPI document generated from the route table.
//!
//! Handlers carry no documentation attributes; this pass walks
//! [`routes::table`](crate::routes::table) and emits one operation per entry,
//! with component schemas taken from the view-model types.

use std::collections::BTreeSet;

use utoipa::openapi::{
    content::ContentBuilder,
    info::InfoBuilder,
    path::{HttpMethod, Operation, OperationBuilder, ParameterBuilder, ParameterIn, Paths},
    request_body::RequestBodyBuilder,
    response::{Response, ResponseBuilder},
    schema::{
        ArrayBuilder, ComponentsBuilder, KnownFormat, ObjectBuilder, Ref, Schema, SchemaFormat,
        Type,
    },
    security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme},
    tag::TagBuilder,
    OpenApi, OpenApiBuilder, RefOr, Required,
};

use crate::{
    auth::Access,
    error::ApiException,
    handler::todo::{TodoParams, UpdateTodoRequest},
    model::{TodoLevel, TodoVm, UserFields, UserRole, UserVm},
    routes::{Route, Shape, Verb, ERROR_BODY},
};

pub const SECURITY_SCHEME: &str = "bearer";

pub fn document(routes: &[Route]) -> OpenApi {
    let mut paths = Paths::new();
    for route in routes {
        paths.add_path_operation(route.path, vec![http_method(route.verb)], operation(route));
    }

    let tags: BTreeSet<&str> = routes.iter().map(|r| r.model).collect();

    let components = ComponentsBuilder::new()
        .schema_from::<TodoLevel>()
        .schema_from::<TodoVm>()
        .schema_from::<TodoParams>()
        .schema_from::<UpdateTodoRequest>()
        .schema_from::<UserRole>()
        .schema_from::<UserFields>()
        .schema_from::<UserVm>()
        .schema_from::<ApiException>()
        .security_scheme(
            SECURITY_SCHEME,
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        )
        .build();

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Todo API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("CRUD over todos and users with role-gated routes."))
                .build(),
        )
        .paths(paths)
        .components(Some(components))
        .tags(Some(tags.into_iter().map(|name| TagBuilder::new().name(name).build())))
        .build()
}

fn operation(route: &Route) -> Operation {
    let mut op = OperationBuilder::new()
        .operation_id(Some(route.operation_id()))
        .summary(Some(route.summary))
        .tag(route.model);

    for name in path_params(route.path) {
        op = op.parameter(
            ParameterBuilder::new()
                .name(name)
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .schema(Some(uuid_schema()))
                .build(),
        );
    }

    for param in &route.query {
        let value = match param.schema {
            Some(name) => RefOr::Ref(Ref::from_schema_name(name)),
            None => RefOr::T(Schema::Object(
                ObjectBuilder::new().schema_type(Type::String).build(),
            )),
        };
        let schema = if param.repeated {
            RefOr::T(Schema::Array(ArrayBuilder::new().items(value).build()))
        } else {
            value
        };
        op = op.parameter(
            ParameterBuilder::new()
                .name(param.name)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .description(Some(param.description))
                .schema(Some(schema))
                .build(),
        );
    }

    if let Some(body) = route.body {
        op = op.request_body(Some(
            RequestBodyBuilder::new()
                .content(
                    "application/json",
                    ContentBuilder::new().schema(Some(shape_schema(body))).build(),
                )
                .required(Some(Required::True))
                .build(),
        ));
    }

    for reply in &route.replies {
        op = op.response(
            reply.status.as_u16().to_string(),
            json_response(reply.description, reply.body),
        );
    }

    if let Access::Roles(roles) = route.access {
        let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        op = op
            .security(SecurityRequirement::new(SECURITY_SCHEME, Vec::<String>::new()))
            .description(Some(format!("Roles: {}", roles.join(", "))))
            .response("401", json_response("Missing or invalid credential", ERROR_BODY))
            .response("403", json_response("Role not permitted", ERROR_BODY));
    }

    op.build()
}

fn json_response(description: &str, body: Shape) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            "application/json",
            ContentBuilder::new().schema(Some(shape_schema(body))).build(),
        )
        .build()
}

fn http_method(verb: Verb) -> HttpMethod {
    match verb {
        Verb::Get => HttpMethod::Get,
        Verb::Post => HttpMethod::Post,
        Verb::Put => HttpMethod::Put,
        Verb::Delete => HttpMethod::Delete,
    }
}

fn shape_schema(shape: Shape) -> RefOr<Schema> {
    match shape {
        Shape::One(name) => RefOr::Ref(Ref::from_schema_name(name)),
        Shape::Many(name) => RefOr::T(Schema::Array(
            ArrayBuilder::new()
                .items(RefOr::Ref(Ref::from_schema_name(name)))
                .build(),
        )),
    }
}

fn uuid_schema() -> RefOr<Schema> {
    RefOr::T(Schema::Object(
        ObjectBuilder::new()
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid)))
            .build(),
    ))
}

/// Names of `{param}` segments in an axum path.
fn path_params(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::routes::table;

    fn doc() -> OpenApi {
        document(&table())
    }

    #[test]
    fn every_route_is_documented() {
        let doc = doc();
        for route in table() {
            let op = doc
                .paths
                .get_path_operation(route.path, http_method(route.verb))
                .unwrap_or_else(|| panic!("{} {} missing", route.path, route.operation_id()));
            assert_eq!(op.operation_id.as_deref(), Some(route.operation_id().as_str()));
        }
    }

    #[test]
    fn paths_are_grouped() {
        let doc = doc();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, ["/todos", "/todos/{id}", "/users"]);
    }

    #[test]
    fn gated_routes_require_bearer_and_public_ones_do_not() {
        let doc = doc();
        let create = doc.paths.get_path_operation("/todos", HttpMethod::Post).unwrap();
        assert!(create.security.is_some());
        assert!(create.responses.responses.contains_key("403"));

        let update = doc.paths.get_path_operation("/todos", HttpMethod::Put).unwrap();
        assert!(update.security.is_none());
        assert!(update.responses.responses.contains_key("200"));
        assert!(update.responses.responses.contains_key("404"));
    }

    #[test]
    fn components_include_view_models_and_security_scheme() {
        let doc = doc();
        let components = doc.components.as_ref().unwrap();
        for name in ["TodoVm", "TodoLevel", "UserVm", "ApiException", "TodoParams"] {
            assert!(components.schemas.contains_key(name), "{name} missing");
        }
        assert!(components.security_schemes.contains_key(SECURITY_SCHEME));
    }

    #[test]
    fn document_serializes() {
        let json = doc().to_pretty_json().unwrap();
        assert!(json.contains("Todo_GetAll"));
    }

    #[test]
    fn extracts_path_params() {
        assert_eq!(path_params("/todos/{id}").collect::<Vec<_>>(), ["id"]);
        assert_eq!(path_params("/todos").count(), 0);
    }
}
