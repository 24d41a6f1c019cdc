//! Request handlers: JSON bodies in, commands through the store, JSON out.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use oxide_store_core::{Command, Database, RawRow};

use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

#[derive(Debug, Deserialize)]
struct CreateTableBody {
    name: String,
    #[serde(default)]
    schema: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct InsertBody {
    #[serde(default)]
    data: Vec<RawRow>,
}

#[derive(Debug, Default, Deserialize)]
struct SelectBody {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    conditions: RawRow,
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    #[serde(default)]
    conditions: RawRow,
    data: RawRow,
}

#[derive(Debug, Default, Deserialize)]
struct DeleteBody {
    #[serde(default)]
    conditions: RawRow,
}

/// Builds the API router over a shared database.
#[must_use]
pub fn api_router(db: Arc<Database>) -> Router {
    Router::new()
        .post("/tables", with_db(&db, create_table))
        .delete("/tables/{name}", with_db(&db, drop_table))
        .post("/tables/{name}/rows", with_db(&db, insert_rows))
        .post("/tables/{name}/select", with_db(&db, select_rows))
        .patch("/tables/{name}/rows", with_db(&db, update_rows))
        .delete("/tables/{name}/rows", with_db(&db, delete_rows))
        .post("/tables/{name}/deduplicate", with_db(&db, remove_duplicates))
        .get("/schema", with_db(&db, introspect))
        .post("/execute", with_db(&db, execute_command))
}

/// Adapts a sync `(db, request) -> Response` function into a route handler.
fn with_db<F>(
    db: &Arc<Database>,
    handler: F,
) -> impl Fn(Request) -> futures::future::Ready<Response> + Send + Sync + 'static
where
    F: Fn(&Database, &Request) -> Response + Send + Sync + 'static,
{
    let db = Arc::clone(db);
    move |request| futures::future::ready(handler(&db, &request))
}

fn run(db: &Database, command: Command) -> Response {
    match db.execute(command) {
        Ok(output) => Response::json(&output),
        Err(error) => Response::store_error(&error),
    }
}

fn parse_body<T: DeserializeOwned>(request: &Request) -> Result<T, Response> {
    request
        .parse_json()
        .map_err(|error| Response::bad_request(error.to_string()))
}

fn table_name(request: &Request) -> String {
    request.params.get("name").unwrap_or_default().to_string()
}

fn create_table(db: &Database, request: &Request) -> Response {
    let body: CreateTableBody = match parse_body(request) {
        Ok(body) => body,
        Err(response) => return response,
    };
    run(
        db,
        Command::CreateTable {
            name: body.name,
            schema: body.schema,
        },
    )
}

fn drop_table(db: &Database, request: &Request) -> Response {
    run(
        db,
        Command::DropTable {
            name: table_name(request),
        },
    )
}

fn insert_rows(db: &Database, request: &Request) -> Response {
    let body: InsertBody = match parse_body(request) {
        Ok(body) => body,
        Err(response) => return response,
    };
    run(
        db,
        Command::Insert {
            to: table_name(request),
            data: body.data,
        },
    )
}

fn select_rows(db: &Database, request: &Request) -> Response {
    let body: Option<SelectBody> = match parse_body(request) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let body = body.unwrap_or_default();
    run(
        db,
        Command::Select {
            from: table_name(request),
            fields: body.fields,
            conditions: body.conditions,
        },
    )
}

fn update_rows(db: &Database, request: &Request) -> Response {
    let body: UpdateBody = match parse_body(request) {
        Ok(body) => body,
        Err(response) => return response,
    };
    run(
        db,
        Command::Update {
            table: table_name(request),
            conditions: body.conditions,
            data: body.data,
        },
    )
}

fn delete_rows(db: &Database, request: &Request) -> Response {
    let body: Option<DeleteBody> = match parse_body(request) {
        Ok(body) => body,
        Err(response) => return response,
    };
    run(
        db,
        Command::Delete {
            from: table_name(request),
            conditions: body.unwrap_or_default().conditions,
        },
    )
}

fn remove_duplicates(db: &Database, request: &Request) -> Response {
    run(
        db,
        Command::RemoveDuplicates {
            from: table_name(request),
        },
    )
}

fn introspect(db: &Database, _request: &Request) -> Response {
    Response::json(&db.introspect_schema())
}

/// Runs a raw tagged command, the generic escape hatch next to the typed
/// routes. An unsupported `type` tag is a domain error (409); a malformed
/// payload for a supported tag is a marshalling failure (500).
fn execute_command(db: &Database, request: &Request) -> Response {
    let value: Value = match parse_body(request) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match Command::from_json(value) {
        Ok(command) => run(db, command),
        Err(error) => Response::store_error(&error),
    }
}
