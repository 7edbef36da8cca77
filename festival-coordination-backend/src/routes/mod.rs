//! The JSON API. Requests are matched by hand on method and path segments.

pub mod admin;
pub mod aarti;
pub mod bhog;
pub mod events;
pub mod flats;
pub mod gallery;
pub mod participation;

use bytes::Bytes;
use headers::ContentType;
use http::{Method, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt as _, Full, Limited};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::fixtures::{Building, FlatRoster};
use crate::wizard::nomination::{NewNomination, NominationKind, NominationWizard};
use crate::wizard::WizardError;
use crate::{FestivalState, ResponseTypedHeaderExt as _};

pub type ApiResponse = Response<Full<Bytes>>;

pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminResource {
    Bookings,
    Nominations,
    Bhog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Events,
    Event(String),
    EventNominations(String),
    Nominations,
    Flats,
    AartiSchedule,
    AartiBookings,
    AartiAvailability,
    Bhog,
    Participation,
    Gallery,
    AdminDelete(AdminResource, String),
}

impl Route {
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        Some(match segments.as_slice() {
            ["api", "health"] => Self::Health,
            ["api", "events"] => Self::Events,
            ["api", "events", slug] => Self::Event((*slug).to_owned()),
            ["api", "events", slug, "nominations"] => Self::EventNominations((*slug).to_owned()),
            ["api", "nominations"] => Self::Nominations,
            ["api", "flats"] => Self::Flats,
            ["api", "aarti", "schedule"] => Self::AartiSchedule,
            ["api", "aarti", "bookings"] => Self::AartiBookings,
            ["api", "aarti", "availability"] => Self::AartiAvailability,
            ["api", "bhog"] => Self::Bhog,
            ["api", "participation"] => Self::Participation,
            ["api", "gallery"] => Self::Gallery,
            ["api", "admin", resource, id] => {
                let resource = match *resource {
                    "bookings" => AdminResource::Bookings,
                    "nominations" => AdminResource::Nominations,
                    "bhog" => AdminResource::Bhog,
                    _ => return None,
                };
                Self::AdminDelete(resource, (*id).to_owned())
            }
            _ => return None,
        })
    }
}

pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<ApiResponse, AppError> {
    let body = serde_json::to_vec(value).map_err(AppError::Encode)?;
    Ok(Response::builder()
        .status(status)
        .typed_header(ContentType::json())
        .body(Full::new(Bytes::from(body)))?)
}

pub async fn read_json<T, B>(body: B) -> Result<T, AppError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(AppError::Body)?
        .to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn query<T: DeserializeOwned>(query: Option<&str>) -> Result<T, AppError> {
    Ok(serde_urlencoded::from_str(query.unwrap_or_default())?)
}

/// What the nomination forms post.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NominationPayload {
    pub building: String,
    pub flat: String,
    pub user_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub bhog_item: Option<String>,
}

/// Walks the nomination wizard with everything the form collected.
pub fn nominate(
    kind: NominationKind,
    roster: &FlatRoster,
    payload: &NominationPayload,
) -> Result<NewNomination, WizardError> {
    let mut wizard = NominationWizard::new(kind, roster);
    wizard.select_building(payload.building.parse::<Building>()?)?;
    wizard.next()?;
    wizard.select_flat(payload.flat.trim())?;
    wizard.next()?;
    wizard.set_user_name(&payload.user_name);
    wizard.set_phone_number(&payload.phone_number);
    if let Some(item) = &payload.bhog_item {
        wizard.set_bhog_item(item);
    }
    wizard.submit()
}

fn health() -> Result<ApiResponse, AppError> {
    #[derive(Serialize)]
    struct Health {
        status: &'static str,
    }
    json(StatusCode::OK, &Health { status: "ok" })
}

pub async fn dispatch<B>(state: &FestivalState, request: Request<B>) -> Result<ApiResponse, AppError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = request.uri().path().to_owned();
    let route = Route::parse(&path).ok_or_else(|| AppError::NotFound(format!("route {path}")))?;
    let query = request.uri().query().map(str::to_owned);
    let query = query.as_deref();
    let method = request.method().clone();

    match (route, method) {
        (Route::Health, Method::GET) => health(),
        (Route::Events, Method::GET) => events::list(state),
        (Route::Event(slug), Method::GET) => events::show(state, &slug),
        (Route::EventNominations(slug), Method::GET) => events::nominations(state, &slug).await,
        (Route::EventNominations(slug), Method::POST) => {
            let payload = read_json(request.into_body()).await?;
            events::nominate(state, &slug, &payload).await
        }
        (Route::Nominations, Method::GET) => events::all_nominations(state, query).await,
        (Route::Flats, Method::GET) => flats::list(state),
        (Route::AartiSchedule, Method::GET) => aarti::schedule(state).await,
        (Route::AartiBookings, Method::GET) => aarti::bookings(state).await,
        (Route::AartiBookings, Method::POST) => {
            let payload = read_json(request.into_body()).await?;
            aarti::book(state, payload).await
        }
        (Route::AartiAvailability, Method::GET) => aarti::availability(state, query).await,
        (Route::Bhog, Method::GET) => bhog::list(state, query).await,
        (Route::Bhog, Method::POST) => {
            let payload = read_json(request.into_body()).await?;
            bhog::nominate(state, &payload).await
        }
        (Route::Participation, Method::GET) => participation::overview(state, query).await,
        (Route::Gallery, Method::GET) => gallery::list(state, query).await,
        (Route::AdminDelete(resource, id), Method::DELETE) => {
            admin::delete(state, request.headers(), resource, &id).await
        }
        _ => Err(AppError::MethodNotAllowed),
    }
}

/// Never fails, errors become JSON error responses.
pub async fn handle<B>(state: &FestivalState, request: Request<B>) -> ApiResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = dispatch(state, request)
        .await
        .unwrap_or_else(AppError::into_response);
    debug!("{method} {path} -> {}", response.status());
    response
}
