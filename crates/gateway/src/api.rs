//! REST handlers.
//!
//! Public:
//!
//! - `GET  /health`                — Liveness and version
//! - `POST /auth/login`            — Exchange credentials for a bearer token
//! - `POST /auth/register`         — Create a pending staff account
//!
//! Bearer-authenticated:
//!
//! - `POST /auth/logout`           — Revoke the presented token
//! - `/residents`, `/appointments`, `/medications`, `/rooms`
//!                                 — list, create, get, update, delete
//! - `/users`                      — list, get, update, delete
//! - `/mutuelles`, `/physicians`, `/motifs`, `/catalog`
//!                                 — read-only reference data
//! - `POST /chat`                  — Ask the assistant a question
//! - `GET  /chat/context`          — The context the assistant would see

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::{Extension, Router};
use isenior_assistant::AssembledContext;
use isenior_core::model::{
    AppointmentInput, AppointmentView, Medication, MedicationView, Motif, Mutuelle,
    PatientMedicationInput, Physician, ResidentInput, ResidentView, RoomInput, RoomView,
    UserUpdate, UserView,
};
use isenior_domain::Registration;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::{Caller, SharedState};

// ── Routers ───────────────────────────────────────────────────────────────

/// Routes reachable without a token.
pub fn public_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Routes behind the bearer-token middleware.
pub fn protected_router() -> Router<SharedState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/residents", get(list_residents).post(create_resident))
        .route(
            "/residents/{id}",
            get(get_resident).put(update_resident).delete(delete_resident),
        )
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/medications", get(list_medications).post(create_medication))
        .route(
            "/medications/{id}",
            get(get_medication)
                .put(update_medication)
                .delete(delete_medication),
        )
        .route("/rooms", get(list_rooms).post(create_room))
        .route(
            "/rooms/{number}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/mutuelles", get(list_mutuelles))
        .route("/mutuelles/{id}", get(get_mutuelle))
        .route("/physicians", get(list_physicians))
        .route("/physicians/{id}", get(get_physician))
        .route("/motifs", get(list_motifs))
        .route("/catalog", get(list_catalog))
        .route("/catalog/{id}", get(get_catalog_entry))
        .route("/chat", post(chat))
        .route("/chat/context", get(chat_context))
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

/// `{"message": …}` acknowledgement for deletes and logout.
#[derive(Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Deserialize)]
pub struct ResidentFilter {
    #[serde(default)]
    pub resident_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CapacityUpdate {
    pub capacity: i64,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

type Created<T> = (StatusCode, Json<T>);

fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

// ── Health & auth ─────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn login(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .services
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;
    let token = state.sessions.issue(&user.username, &user.role).await;
    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role: user.role,
    }))
}

async fn register(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<Registration>,
) -> ApiResult<Created<UserView>> {
    let user = state.services.users.register(payload).await?;
    Ok(created(user))
}

async fn logout(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
) -> Json<Ack> {
    state.sessions.revoke(&caller.token).await;
    info!(username = %caller.username, "Logged out");
    Ack::new("Logged out")
}

// ── Residents ─────────────────────────────────────────────────────────────

async fn list_residents(State(state): State<SharedState>) -> ApiResult<Json<Vec<ResidentView>>> {
    Ok(Json(state.services.residents.list().await?))
}

async fn get_resident(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ResidentView>> {
    Ok(Json(state.services.residents.get(id).await?))
}

async fn create_resident(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<ResidentInput>,
) -> ApiResult<Created<ResidentView>> {
    Ok(created(state.services.residents.create(input).await?))
}

async fn update_resident(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ResidentInput>,
) -> ApiResult<Json<ResidentView>> {
    Ok(Json(state.services.residents.update(id, input).await?))
}

async fn delete_resident(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Ack>> {
    state.services.residents.delete(id).await?;
    Ok(Ack::new(format!("Resident {id} deleted")))
}

// ── Appointments ──────────────────────────────────────────────────────────

async fn list_appointments(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ResidentFilter>,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    Ok(Json(
        state.services.appointments.list(filter.resident_id).await?,
    ))
}

async fn get_appointment(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<AppointmentView>> {
    Ok(Json(state.services.appointments.get(id).await?))
}

async fn create_appointment(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<AppointmentInput>,
) -> ApiResult<Created<AppointmentView>> {
    Ok(created(state.services.appointments.create(input).await?))
}

async fn update_appointment(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<AppointmentInput>,
) -> ApiResult<Json<AppointmentView>> {
    Ok(Json(state.services.appointments.update(id, input).await?))
}

async fn delete_appointment(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Ack>> {
    state.services.appointments.delete(id).await?;
    Ok(Ack::new(format!("Appointment {id} deleted")))
}

// ── Patient medications ───────────────────────────────────────────────────

async fn list_medications(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ResidentFilter>,
) -> ApiResult<Json<Vec<MedicationView>>> {
    Ok(Json(
        state.services.medications.list(filter.resident_id).await?,
    ))
}

async fn get_medication(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MedicationView>> {
    Ok(Json(state.services.medications.get(id).await?))
}

async fn create_medication(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<PatientMedicationInput>,
) -> ApiResult<Created<MedicationView>> {
    Ok(created(state.services.medications.create(input).await?))
}

async fn update_medication(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<PatientMedicationInput>,
) -> ApiResult<Json<MedicationView>> {
    Ok(Json(state.services.medications.update(id, input).await?))
}

async fn delete_medication(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Ack>> {
    state.services.medications.delete(id).await?;
    Ok(Ack::new(format!("Medication assignment {id} deleted")))
}

// ── Rooms ─────────────────────────────────────────────────────────────────

async fn list_rooms(State(state): State<SharedState>) -> ApiResult<Json<Vec<RoomView>>> {
    Ok(Json(state.services.rooms.list().await?))
}

async fn get_room(
    State(state): State<SharedState>,
    ApiPath(number): ApiPath<i64>,
) -> ApiResult<Json<RoomView>> {
    Ok(Json(state.services.rooms.get(number).await?))
}

async fn create_room(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<RoomInput>,
) -> ApiResult<Created<RoomView>> {
    Ok(created(state.services.rooms.create(input).await?))
}

async fn update_room(
    State(state): State<SharedState>,
    ApiPath(number): ApiPath<i64>,
    ApiJson(update): ApiJson<CapacityUpdate>,
) -> ApiResult<Json<RoomView>> {
    Ok(Json(
        state
            .services
            .rooms
            .update_capacity(number, update.capacity)
            .await?,
    ))
}

async fn delete_room(
    State(state): State<SharedState>,
    ApiPath(number): ApiPath<i64>,
) -> ApiResult<Json<Ack>> {
    state.services.rooms.delete(number).await?;
    Ok(Ack::new(format!("Room {number} deleted")))
}

// ── Users ─────────────────────────────────────────────────────────────────

async fn list_users(State(state): State<SharedState>) -> ApiResult<Json<Vec<UserView>>> {
    Ok(Json(state.services.users.list().await?))
}

async fn get_user(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserView>> {
    Ok(Json(state.services.users.get(id).await?))
}

async fn update_user(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<UserView>> {
    let before = state.services.users.get(id).await?;
    let user = state.services.users.update(id, update).await?;
    // A renamed or suspended account must log in again.
    if before.username != user.username || user.status != before.status {
        state.sessions.revoke_user(&before.username).await;
    }
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Ack>> {
    let user = state.services.users.delete(id).await?;
    state.sessions.revoke_user(&user.username).await;
    Ok(Ack::new(format!("User {id} deleted")))
}

// ── Reference data ────────────────────────────────────────────────────────

async fn list_mutuelles(State(state): State<SharedState>) -> ApiResult<Json<Vec<Mutuelle>>> {
    Ok(Json(state.services.reference.mutuelles().await?))
}

async fn get_mutuelle(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Mutuelle>> {
    Ok(Json(state.services.reference.mutuelle(id).await?))
}

async fn list_physicians(State(state): State<SharedState>) -> ApiResult<Json<Vec<Physician>>> {
    Ok(Json(state.services.reference.physicians().await?))
}

async fn get_physician(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Physician>> {
    Ok(Json(state.services.reference.physician(id).await?))
}

async fn list_motifs(State(state): State<SharedState>) -> ApiResult<Json<Vec<Motif>>> {
    Ok(Json(state.services.reference.motifs().await?))
}

async fn list_catalog(State(state): State<SharedState>) -> ApiResult<Json<Vec<Medication>>> {
    Ok(Json(state.services.reference.medications().await?))
}

async fn get_catalog_entry(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Medication>> {
    Ok(Json(state.services.reference.medication(id).await?))
}

// ── Chat ──────────────────────────────────────────────────────────────────

async fn chat(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let reply = state
        .mediator
        .reply(&caller.username, &payload.message)
        .await?;
    Ok(Json(ChatResponse { reply }))
}

async fn chat_context(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<AssembledContext>> {
    Ok(Json(state.assembler.assemble(&caller.username).await?))
}
