use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use rand::RngCore;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::availability::{extract, summarize, AvailabilityGrid, ExtractionQuery, Level};
use crate::display;
use crate::error::BoardError;
use crate::parser::parse_import_payload;
use crate::store;

const SESSION_MEMBERS: &str = "selected_members";
const SESSION_LEVEL: &str = "current_level";

/// Shared state: the store handle, injected into every handler.
pub struct AppState {
    pub db: Mutex<Connection>,
}

#[derive(Serialize)]
pub struct BoardResponse {
    months: Vec<u32>,
    current_month: Option<u32>,
    members: Vec<String>,
    selected_members: Vec<String>,
    current_level: String,
    attendance_html: String,
    headcount_html: String,
    extraction_html: Option<String>,
    metadata_html: String,
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct BoardParams {
    month: Option<u32>,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    members: Vec<String>,
    level: String,
}

// Board endpoint: the full view for one month, plus the extraction result
// when the session holds a query.
async fn get_board(
    params: web::Query<BoardParams>,
    session: Session,
    state: web::Data<AppState>,
) -> std::result::Result<HttpResponse, BoardError> {
    let (records, metadata) = {
        let conn = state.db.lock().unwrap();
        (store::load_records(&conn)?, store::load_metadata(&conn)?)
    };

    // Session-held extraction query; defaults when unset.
    let selected_members: Vec<String> = session
        .get(SESSION_MEMBERS)
        .unwrap_or(None)
        .unwrap_or_default();
    let level = session
        .get::<String>(SESSION_LEVEL)
        .unwrap_or(None)
        .map(|tag| Level::parse(&tag))
        .unwrap_or_default();

    let grid = AvailabilityGrid::from_records(&records);
    let months = grid.months_present();
    // Requested month, or the first available one. An empty store renders
    // empty months and tables: a legitimate state, not an error.
    let current_month = params.month.or_else(|| months.first().copied());
    let monthly = match current_month {
        Some(month) => grid.filter_by_month(month),
        None => grid.clone(),
    };

    let mut notice = None;
    let extraction_html = if selected_members.is_empty() {
        // Empty selection means no extraction was requested.
        None
    } else {
        let query = ExtractionQuery {
            members: selected_members.clone(),
            level,
        };
        match extract(&monthly, &query) {
            Ok(result) => Some(display::extraction_table(&result).to_html()),
            Err(err) => {
                notice = Some(err.to_string());
                None
            }
        }
    };

    Ok(HttpResponse::Ok().json(BoardResponse {
        months,
        current_month,
        members: grid.members().to_vec(),
        selected_members,
        current_level: level.as_str().to_string(),
        attendance_html: display::grid_table(&monthly).to_html(),
        headcount_html: display::headcount_table(&summarize(&monthly)).to_html(),
        extraction_html,
        metadata_html: display::metadata_table(grid.members(), &metadata).to_html(),
        notice,
    }))
}

// Schedule export upload endpoint. A parse failure leaves the store
// untouched and reports the reason.
async fn post_upload(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> std::result::Result<HttpResponse, BoardError> {
    let payload = parse_import_payload(&body)?;
    let record_count = payload.records.len();

    let mut conn = state.db.lock().unwrap();
    store::replace_all(&mut conn, &payload.records, &payload.metadata)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "records": record_count,
    })))
}

// Saves the extraction query in the session; the next board fetch applies it.
async fn post_extract(req: web::Json<ExtractRequest>, session: Session) -> Result<HttpResponse> {
    session
        .insert(SESSION_MEMBERS, &req.members)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    session
        .insert(SESSION_LEVEL, &req.level)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn post_clear(session: Session) -> Result<HttpResponse> {
    session.remove(SESSION_MEMBERS);
    session.remove(SESSION_LEVEL);
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, db_path: String) -> std::io::Result<()> {
    let conn = store::open(&db_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let app_state = web::Data::new(AppState {
        db: Mutex::new(conn),
    });

    // Cookie signing key, regenerated on every start: sessions do not
    // outlive the server process.
    let mut key_bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut key_bytes);
    let secret_key = Key::from(&key_bytes);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/api/board", web::get().to(get_board))
            .route("/api/upload", web::post().to(post_upload))
            .route("/api/extract", web::post().to(post_extract))
            .route("/api/clear", web::post().to(post_clear))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
